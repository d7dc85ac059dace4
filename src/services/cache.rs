//! Query cache shared by every controller of a dashboard.

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::Resource;
use crate::domain::query::QueryKey;
use crate::domain::resource::ResourceKind;
use crate::pagination::Page;

/// Default bound on cached pages.
pub const MAX_ENTRIES: usize = 256;

struct Entry {
    page: Arc<dyn Any + Send + Sync>,
    stored_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, Entry>,
    epochs: HashMap<ResourceKind, u64>,
}

/// Pages keyed by [`QueryKey`], with per-resource invalidation epochs.
///
/// A fetch reads the epoch of its resource before hitting the network and
/// hands it back to [`insert`](Self::insert); if the resource was invalidated
/// in between the page is dropped instead of cached.
///
/// Inserting sweeps expired pages and keeps at most `max_entries`, evicting
/// the oldest first.
pub struct QueryCache {
    state: Mutex<CacheState>,
    ttl: Option<Duration>,
    max_entries: usize,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_limits(None, MAX_ENTRIES)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self::with_limits(ttl, MAX_ENTRIES)
    }

    pub fn with_limits(ttl: Option<Duration>, max_entries: usize) -> Self {
        Self {
            state: Mutex::default(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn epoch(&self, resource: ResourceKind) -> u64 {
        self.state().epochs.get(&resource).copied().unwrap_or_default()
    }

    pub fn get<T: Resource>(&self, key: &QueryKey) -> Option<Arc<Page<T>>> {
        let mut state = self.state();
        let entry = state.entries.get(key)?;
        if self
            .ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
        {
            state.entries.remove(key);
            return None;
        }
        Arc::clone(&entry.page).downcast::<Page<T>>().ok()
    }

    /// Stores `page` unless `key.resource` was invalidated after `epoch` was
    /// read. Returns whether the page was stored.
    pub fn insert<T: Resource>(&self, key: QueryKey, epoch: u64, page: Arc<Page<T>>) -> bool {
        let mut state = self.state();
        let current = state.epochs.get(&key.resource).copied().unwrap_or_default();
        if current != epoch {
            log::debug!("Dropping stale {} page {}", key.resource, key.page);
            return false;
        }

        let now = Instant::now();
        if let Some(ttl) = self.ttl {
            state
                .entries
                .retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
        }
        while state.entries.len() >= self.max_entries && !state.entries.contains_key(&key) {
            let Some(oldest) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            state.entries.remove(&oldest);
        }

        state.entries.insert(
            key,
            Entry {
                page,
                stored_at: now,
            },
        );
        true
    }

    /// Drops every cached page of `resource` and bumps its epoch.
    pub fn invalidate(&self, resource: ResourceKind) {
        let mut state = self.state();
        *state.epochs.entry(resource).or_default() += 1;
        state.entries.retain(|key, _| key.resource != resource);
    }

    pub fn invalidate_all(&self, resources: &[ResourceKind]) {
        for resource in resources {
            self.invalidate(*resource);
        }
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::campaign::Campaign;
    use crate::domain::types::CampaignId;

    fn campaigns(count: i64) -> Arc<Page<Campaign>> {
        let created_at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let items = (1..=count)
            .map(|id| Campaign {
                id: CampaignId::new(id).unwrap(),
                name: format!("Campaign {id}"),
                industry: "Retail".into(),
                created_at,
            })
            .collect();
        Arc::new(Page::new(items, 1, 20, count as u64).unwrap())
    }

    #[test]
    fn identical_keys_share_a_page() {
        let cache = QueryCache::new();
        let key = QueryKey::new(ResourceKind::Campaigns);
        let epoch = cache.epoch(ResourceKind::Campaigns);

        assert!(cache.insert(key.clone(), epoch, campaigns(2)));
        let first = cache.get::<Campaign>(&key).unwrap();
        let second = cache.get::<Campaign>(&key).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn invalidation_rejects_inflight_results() {
        let cache = QueryCache::new();
        let key = QueryKey::new(ResourceKind::Campaigns);
        let epoch = cache.epoch(ResourceKind::Campaigns);

        cache.invalidate(ResourceKind::Campaigns);

        assert!(!cache.insert(key.clone(), epoch, campaigns(2)));
        assert!(cache.get::<Campaign>(&key).is_none());
    }

    #[test]
    fn invalidation_is_scoped_to_the_resource() {
        let cache = QueryCache::new();
        let campaigns_key = QueryKey::new(ResourceKind::Campaigns);
        let messages_key = QueryKey::new(ResourceKind::Messages);
        cache.insert(campaigns_key.clone(), 0, campaigns(1));
        cache.insert(messages_key.clone(), 0, campaigns(1));

        cache.invalidate(ResourceKind::Messages);

        assert!(cache.get::<Campaign>(&campaigns_key).is_some());
        assert!(cache.get::<Campaign>(&messages_key).is_none());
        assert_eq!(cache.epoch(ResourceKind::Messages), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = QueryCache::with_ttl(Some(Duration::from_secs(60)));
        let key = QueryKey::new(ResourceKind::Campaigns);
        cache.insert(key.clone(), 0, campaigns(1));

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(cache.get::<Campaign>(&key).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn oldest_page_is_evicted_at_capacity() {
        let cache = QueryCache::with_limits(None, 2);
        let first = QueryKey::new(ResourceKind::Campaigns);
        let second = first.with_page(2);
        let third = first.with_page(3);

        cache.insert(first.clone(), 0, campaigns(1));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert(second.clone(), 0, campaigns(1));
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert(third.clone(), 0, campaigns(1));

        assert_eq!(cache.len(), 2);
        assert!(cache.get::<Campaign>(&first).is_none());
        assert!(cache.get::<Campaign>(&third).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_sweeps_expired_pages_under_other_keys() {
        let cache = QueryCache::with_ttl(Some(Duration::from_secs(60)));
        let searched = QueryKey::new(ResourceKind::Campaigns).param("search", "spring");
        cache.insert(searched, 0, campaigns(1));

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.insert(QueryKey::new(ResourceKind::Campaigns), 0, campaigns(1));

        assert_eq!(cache.len(), 1);
    }
}
