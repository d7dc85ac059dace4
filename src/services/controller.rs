//! The list/filter/paginate/mutate controller shared by every dashboard view.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use crate::domain::Resource;
use crate::domain::mutation::Mutation;
use crate::domain::query::QueryKey;
use crate::domain::types::TempId;
use crate::dto::{Notice, NoticeKind, PendingItem, ViewSnapshot, ViewStatus};
use crate::filters::{FilterError, FilterScope, FilterState, FilterValue, apply_client_filter};
use crate::models::config::DashboardConfig;
use crate::models::listing::RawListing;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Page};
use crate::repository::errors::{ApiError, ApiResult};
use crate::repository::{ResourceReader, ResourceWriter};
use crate::services::cache::QueryCache;
use crate::services::{ServiceError, ServiceResult};

/// Exponential backoff with full jitter for idempotent reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Upper bound of the sleep before attempt `attempt + 1`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Randomized delay in `[ceiling / 2, ceiling]`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let ceiling = self.ceiling(attempt);
        let jitter: f64 = rand::random();
        ceiling.mul_f64(0.5 + jitter / 2.0)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControllerOptions {
    pub page_size: u32,
    pub retry: RetryPolicy,
    pub search_debounce: Duration,
    /// Filters the view starts with and returns to on reset.
    pub default_filters: FilterState,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_ITEMS_PER_PAGE,
            retry: RetryPolicy::default(),
            search_debounce: Duration::from_millis(300),
            default_filters: FilterState::default(),
        }
    }
}

impl ControllerOptions {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            page_size: config.page_size,
            retry: RetryPolicy {
                max_attempts: config.retry_max_attempts.max(1),
                base_delay: Duration::from_millis(config.retry_base_delay_ms),
                max_delay: Duration::from_millis(config.retry_max_delay_ms),
            },
            search_debounce: config.search_debounce(),
            default_filters: FilterState::default(),
        }
    }

    #[must_use]
    pub fn default_filters(mut self, filters: FilterState) -> Self {
        self.default_filters = filters;
        self
    }
}

/// Result of a load as seen by the caller that started it.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadOutcome<T> {
    Loaded(Arc<Page<T>>),
    Failed(ApiError),
    /// A newer load started before this one finished; its result was
    /// discarded.
    Superseded,
    /// The view was unmounted.
    Cancelled,
}

impl<T> LoadOutcome<T> {
    pub fn page(&self) -> Option<&Arc<Page<T>>> {
        match self {
            LoadOutcome::Loaded(page) => Some(page),
            _ => None,
        }
    }
}

struct ViewModel<T> {
    status: ViewStatus,
    filters: FilterState,
    page: u32,
    /// Last successfully loaded page.
    current: Option<Arc<Page<T>>>,
    error: Option<ApiError>,
    notice: Option<Notice>,
    pending: Vec<PendingItem<T>>,
}

/// Drives one list view over resource `T` through the transport `A`.
pub struct ViewDataController<T: Resource, A: ?Sized> {
    api: Arc<A>,
    cache: Arc<QueryCache>,
    options: ControllerOptions,
    state: Mutex<ViewModel<T>>,
    generation: AtomicU64,
    search_seq: AtomicU64,
    unmounted: watch::Sender<bool>,
}

impl<T, A> ViewDataController<T, A>
where
    T: Resource,
    A: ResourceReader + ResourceWriter + ?Sized,
{
    /// Default filters outside the resource schema are dropped with a
    /// warning.
    pub fn new(api: Arc<A>, cache: Arc<QueryCache>, mut options: ControllerOptions) -> Self {
        let (defaults, rejected) = options.default_filters.validated(T::KIND);
        for err in rejected {
            log::warn!("Ignoring default filter for {}: {err}", T::KIND);
        }
        options.default_filters = defaults;

        let (unmounted, _) = watch::channel(false);
        let state = ViewModel {
            status: ViewStatus::Idle,
            filters: options.default_filters.clone(),
            page: 1,
            current: None,
            error: None,
            notice: None,
            pending: Vec::new(),
        };

        Self {
            api,
            cache,
            options,
            state: Mutex::new(state),
            generation: AtomicU64::new(0),
            search_seq: AtomicU64::new(0),
            unmounted,
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewModel<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_unmounted(&self) -> bool {
        *self.unmounted.borrow()
    }

    async fn wait_unmounted(&self) {
        let mut rx = self.unmounted.subscribe();
        // The sender lives as long as `self`, so this only returns once set.
        let _ = rx.wait_for(|unmounted| *unmounted).await;
    }

    /// Current query key derived from filters and pagination.
    pub fn query_key(&self) -> QueryKey {
        let state = self.state();
        QueryKey::from_filters(T::KIND, &state.filters, state.page, self.options.page_size)
    }

    pub fn filters(&self) -> FilterState {
        self.state().filters.clone()
    }

    /// Loads `page` with `filters`, replacing the view's filter state.
    ///
    /// Filters that do not fit the resource schema are rejected and the
    /// view is left as it was.
    pub async fn load(&self, page: u32, filters: FilterState) -> ServiceResult<LoadOutcome<T>> {
        filters.validate(T::KIND)?;
        {
            let mut state = self.state();
            state.page = page.max(1);
            state.filters = filters;
        }
        Ok(self.fetch().await)
    }

    /// Re-fetches the current query.
    pub async fn refresh(&self) -> LoadOutcome<T> {
        self.fetch().await
    }

    /// Retry affordance after a failed load.
    pub async fn retry(&self) -> LoadOutcome<T> {
        self.fetch().await
    }

    pub async fn set_page(&self, page: u32) -> LoadOutcome<T> {
        self.state().page = page.max(1);
        self.fetch().await
    }

    /// Applies a discrete filter change immediately.
    ///
    /// Server-scoped fields reset the view to page 1 and fetch; client-scoped
    /// fields only refine the current page.
    pub async fn set_filter(&self, field: &str, value: FilterValue) -> ServiceResult<LoadOutcome<T>> {
        let scope = {
            let mut state = self.state();
            state.filters.set(T::KIND, field, value)?;
            let scope = T::KIND.filter_field(field).map(|declared| declared.scope);
            if scope == Some(FilterScope::Server) {
                state.page = 1;
            }
            scope
        };
        Ok(self.after_filter_change(scope).await)
    }

    pub async fn clear_filter(&self, field: &str) -> LoadOutcome<T> {
        let scope = {
            let mut state = self.state();
            if state.filters.remove(field).is_none() {
                None
            } else {
                let scope = T::KIND.filter_field(field).map(|declared| declared.scope);
                if scope == Some(FilterScope::Server) {
                    state.page = 1;
                }
                scope
            }
        };
        self.after_filter_change(scope).await
    }

    async fn after_filter_change(&self, scope: Option<FilterScope>) -> LoadOutcome<T> {
        if scope == Some(FilterScope::Server) {
            return self.fetch().await;
        }
        let current = self.state().current.clone();
        match current {
            Some(page) => LoadOutcome::Loaded(page),
            None => self.fetch().await,
        }
    }

    /// Free-text search, debounced: only the last call within the debounce
    /// window reaches the backend.
    pub async fn search(&self, text: impl Into<String>) -> ServiceResult<LoadOutcome<T>> {
        let text = text.into();
        if T::KIND.filter_field("search").is_none() {
            return Err(FilterError::UnknownField {
                resource: T::KIND,
                field: "search".to_string(),
            }
            .into());
        }

        let seq = self.search_seq.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::select! {
            _ = tokio::time::sleep(self.options.search_debounce) => {}
            _ = self.wait_unmounted() => return Ok(LoadOutcome::Cancelled),
        }
        if self.search_seq.load(Ordering::SeqCst) != seq {
            return Ok(LoadOutcome::Superseded);
        }

        self.set_filter("search", FilterValue::Text(text)).await
    }

    /// Returns the filters to their defaults and the view to page 1.
    ///
    /// Pending debounced searches are dropped. Call [`refresh`](Self::refresh)
    /// to load the reset view.
    pub fn reset_filters(&self) {
        self.search_seq.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        state.filters = self.options.default_filters.clone();
        state.page = 1;
    }

    pub fn dismiss_notice(&self) {
        self.state().notice = None;
    }

    /// Ends the view's lifetime: in-flight requests, backoff sleeps and
    /// debounce waits stop and no further state is written.
    pub fn unmount(&self) {
        self.unmounted.send_replace(true);
        self.generation.fetch_add(1, Ordering::SeqCst);
        log::debug!("{} view unmounted", T::KIND);
    }

    async fn fetch(&self) -> LoadOutcome<T> {
        if self.is_unmounted() {
            return LoadOutcome::Cancelled;
        }

        let (key, generation) = {
            let mut state = self.state();
            state.status = ViewStatus::Loading;
            let key = QueryKey::from_filters(
                T::KIND,
                &state.filters,
                state.page,
                self.options.page_size,
            );
            (key, self.generation.fetch_add(1, Ordering::SeqCst) + 1)
        };

        if let Some(page) = self.cache.get::<T>(&key) {
            return self.apply(generation, Ok(page));
        }

        let epoch = self.cache.epoch(T::KIND);
        let result = tokio::select! {
            result = self.fetch_with_retry(&key) => result,
            _ = self.wait_unmounted() => Err(ApiError::Cancelled),
        };

        let result = result
            .and_then(|raw| raw.into_page::<T>(&key))
            .map(Arc::new)
            .map_err(|err| {
                match err {
                    ApiError::Cancelled => log::debug!("Load of {} cancelled", T::KIND),
                    _ => log::error!("Failed to load {} page {}: {err}", T::KIND, key.page),
                }
                err
            });

        if let Ok(page) = &result {
            self.cache.insert(key, epoch, Arc::clone(page));
        }

        self.apply(generation, result)
    }

    async fn fetch_with_retry(&self, key: &QueryKey) -> ApiResult<RawListing> {
        let policy = self.options.retry;
        let mut attempt = 1;
        loop {
            match self.api.fetch_page(key).await {
                Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                    let delay = policy.delay(attempt);
                    log::warn!(
                        "Attempt {attempt} to load {} failed: {err}; retrying in {delay:?}",
                        key.resource
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn apply(&self, generation: u64, result: ApiResult<Arc<Page<T>>>) -> LoadOutcome<T> {
        let mut state = self.state();
        if self.is_unmounted() {
            return LoadOutcome::Cancelled;
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                state.status = ViewStatus::Loaded;
                state.error = None;
                state.current = Some(Arc::clone(&page));
                state.pending.retain(|pending| !pending.confirmed);
                if state
                    .notice
                    .as_ref()
                    .is_some_and(|notice| notice.kind == NoticeKind::LoadFailed)
                {
                    state.notice = None;
                }
                LoadOutcome::Loaded(page)
            }
            Err(err) => {
                state.status = ViewStatus::Errored;
                if matches!(err, ApiError::Decode(_)) {
                    state.current = None;
                }
                state.notice = Some(Notice::load_failed(&err));
                state.error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Performs `mutation`, invalidates every affected resource and, when
    /// this view's resource is among them, waits for the re-fetch.
    ///
    /// Failures leave cached pages untouched and raise a mutation notice.
    pub async fn mutate(&self, mutation: Mutation) -> ServiceResult<Value> {
        if self.is_unmounted() {
            return Err(ServiceError::Unmounted);
        }

        let action = mutation.describe();
        let reply = self.api.execute(&mutation).await.map_err(|err| {
            log::error!("Failed to {action}: {err}");
            if !self.is_unmounted() {
                self.state().notice = Some(Notice::mutation_failed(&action, &err));
            }
            err
        })?;

        let refreshed = self.invalidate_after(&mutation).await;
        self.settle_notice(&action, refreshed.as_ref());
        Ok(reply)
    }

    /// Invalidates what `mutation` touched and re-fetches this view when it
    /// is among them.
    async fn invalidate_after(&self, mutation: &Mutation) -> Option<LoadOutcome<T>> {
        let affected = mutation.affected();
        self.cache.invalidate_all(&affected);
        if affected.contains(&T::KIND) {
            Some(self.refresh().await)
        } else {
            None
        }
    }

    /// Success notice for a write, unless the follow-up load failed: that
    /// `LoadFailed` notice stays so the view's retry is not hidden.
    fn settle_notice(&self, action: &str, refreshed: Option<&LoadOutcome<T>>) {
        if self.is_unmounted() || matches!(refreshed, Some(LoadOutcome::Failed(_))) {
            return;
        }
        self.state().notice = Some(Notice::success(format!("Done: {action}")));
    }

    /// Shows `placeholder` until the create behind `mutation` settles.
    ///
    /// On success the placeholder is swapped for the server record and kept,
    /// marked confirmed, until a load succeeds; on failure it is removed.
    pub async fn create_optimistic(&self, placeholder: T, mutation: Mutation) -> ServiceResult<T> {
        if self.is_unmounted() {
            return Err(ServiceError::Unmounted);
        }

        let temp_id = TempId::new();
        self.state().pending.push(PendingItem {
            temp_id,
            item: placeholder,
            confirmed: false,
        });

        let action = mutation.describe();
        let created = self
            .api
            .execute(&mutation)
            .await
            .and_then(|reply| {
                serde_json::from_value::<T>(reply).map_err(|err| ApiError::Decode(err.to_string()))
            })
            .map_err(|err| {
                log::error!("Failed to {action}: {err}");
                err
            });

        match created {
            Ok(record) => {
                if !self.is_unmounted() {
                    let mut state = self.state();
                    if let Some(pending) = state.pending.iter_mut().find(|p| p.temp_id == temp_id) {
                        pending.item = record.clone();
                        pending.confirmed = true;
                    }
                }
                // A successful re-fetch prunes confirmed items in `apply`.
                let refreshed = self.invalidate_after(&mutation).await;
                self.settle_notice(&action, refreshed.as_ref());
                Ok(record)
            }
            Err(err) => {
                if !self.is_unmounted() {
                    let mut state = self.state();
                    state.pending.retain(|pending| pending.temp_id != temp_id);
                    state.notice = Some(Notice::mutation_failed(&action, &err));
                }
                if matches!(err, ApiError::Decode(_)) {
                    // The write may have happened; make sure the list catches up.
                    self.invalidate_after(&mutation).await;
                }
                Err(err.into())
            }
        }
    }

    /// Render-ready view of the current state.
    pub fn snapshot(&self) -> ViewSnapshot<T> {
        let state = self.state();
        let (page, refined) = match &state.current {
            Some(page) => (
                Some(apply_client_filter(page, &state.filters)),
                state.filters.has_client_filters(T::KIND),
            ),
            None => (None, false),
        };

        let links = state
            .current
            .as_ref()
            .map(|page| page.links())
            .unwrap_or_default();
        let can_retry = state.status == ViewStatus::Errored;

        match page {
            Some(page) => ViewSnapshot {
                status: state.status,
                is_empty: state.status == ViewStatus::Loaded
                    && page.items.is_empty()
                    && state.pending.is_empty(),
                items: page.items,
                pending: state.pending.clone(),
                page: page.page,
                page_size: page.page_size,
                total: page.total,
                total_pages: page.total_pages,
                fetched: page.fetched,
                refined,
                links,
                error: state.error.clone(),
                can_retry,
                notice: state.notice.clone(),
            },
            None => ViewSnapshot {
                status: state.status,
                items: Vec::new(),
                pending: state.pending.clone(),
                page: state.page,
                page_size: self.options.page_size,
                total: 0,
                total_pages: 1,
                fetched: 0,
                refined,
                links,
                // Decode failures degrade to an empty list with a retry.
                is_empty: state.status != ViewStatus::Loading
                    && state.status != ViewStatus::Idle
                    && state.pending.is_empty(),
                error: state.error.clone(),
                can_retry,
                notice: state.notice.clone(),
            },
        }
    }
}
