#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use outreach_dashboard::domain::mutation::{Action, Mutation};
use outreach_dashboard::domain::query::QueryKey;
use outreach_dashboard::domain::resource::ResourceKind;
use outreach_dashboard::domain::settings::{Settings, SettingsSection};
use outreach_dashboard::models::listing::RawListing;
use outreach_dashboard::repository::errors::{ApiError, ApiResult};
use outreach_dashboard::repository::{
    ResourceReader, ResourceWriter, SettingsReader, SettingsWriter,
};
use serde_json::{Value, json};

/// In-memory stand-in for the REST backend.
///
/// Records are kept as JSON per collection. Reads are computed when the
/// request arrives and then optionally held back, so a delayed response
/// carries the data as it was when the request was made.
#[derive(Default)]
pub struct FakeBackend {
    records: Mutex<BTreeMap<ResourceKind, Vec<Value>>>,
    settings: Mutex<Settings>,
    next_delay: Mutex<Option<Duration>>,
    next_write_delay: Mutex<Option<Duration>>,
    next_error: Mutex<Option<ApiError>>,
    fetches: AtomicUsize,
    writes: AtomicUsize,
    saved: Mutex<Vec<(SettingsSection, Value)>>,
}

pub fn company(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Company {id}"),
        "industry": if id % 2 == 0 { "Software" } else { "Retail" },
        "country": "India",
        "email": format!("hello@company{id}.io"),
        "created_at": "2025-03-01T10:00:00",
    })
}

pub fn message(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "company_id": 1,
        "company_name": "Company 1",
        "type": "EMAIL",
        "stage": "INITIAL",
        "status": status,
        "subject": "Hello",
        "content": format!("Message {id}"),
        "created_at": "2025-03-01T10:00:00",
    })
}

pub fn product(id: i64, active: bool) -> Value {
    json!({
        "id": id,
        "name": format!("Product {id}"),
        "slug": format!("product-{id}"),
        "short_description": "Bookkeeping for retailers",
        "industry_tags": ["Retail"],
        "is_active": active,
        "created_at": "2025-03-01T10:00:00",
        "companies_count": 0,
        "campaigns_count": 0,
        "qualified_leads_count": 0,
    })
}

pub fn email_account(id: i64) -> Value {
    json!({
        "id": id,
        "email": format!("sales{id}@acme.io"),
        "display_name": null,
        "smtp_host": "smtp.gmail.com",
        "smtp_port": 587,
        "smtp_username": format!("sales{id}@acme.io"),
        "is_active": true,
        "is_default": id == 1,
        "daily_limit": 100,
        "emails_sent_today": 0,
        "created_at": "2025-03-01T10:00:00",
    })
}

/// Row a create starts from before the request body is merged in.
fn template(resource: ResourceKind, id: i64) -> Value {
    match resource {
        ResourceKind::Products => product(id, true),
        ResourceKind::EmailAccounts => email_account(id),
        _ => company(id),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_companies(self, count: i64) -> Self {
        self.seed(ResourceKind::Companies, (1..=count).map(company).collect())
    }

    pub fn with_messages(self, count: i64) -> Self {
        self.seed(
            ResourceKind::Messages,
            (1..=count)
                .map(|id| message(id, if id % 3 == 0 { "FAILED" } else { "SENT" }))
                .collect(),
        )
    }

    /// Every third product is inactive.
    pub fn with_products(self, count: i64) -> Self {
        self.seed(
            ResourceKind::Products,
            (1..=count).map(|id| product(id, id % 3 != 0)).collect(),
        )
    }

    pub fn with_email_accounts(self, count: i64) -> Self {
        self.seed(
            ResourceKind::EmailAccounts,
            (1..=count).map(email_account).collect(),
        )
    }

    pub fn with_settings(self, settings: Settings) -> Self {
        *self.settings.lock().unwrap() = settings;
        self
    }

    fn seed(self, resource: ResourceKind, rows: Vec<Value>) -> Self {
        self.records.lock().unwrap().insert(resource, rows);
        self
    }

    /// Holds the next read back for `delay`.
    pub fn delay_next(&self, delay: Duration) {
        *self.next_delay.lock().unwrap() = Some(delay);
    }

    /// Holds the next write back for `delay` before it is answered.
    pub fn delay_next_write(&self, delay: Duration) {
        *self.next_write_delay.lock().unwrap() = Some(delay);
    }

    /// Fails the next read or write with `err`.
    pub fn fail_next(&self, err: ApiError) {
        *self.next_error.lock().unwrap() = Some(err);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn count(&self, resource: ResourceKind) -> usize {
        self.records
            .lock()
            .unwrap()
            .get(&resource)
            .map_or(0, Vec::len)
    }

    pub fn saved(&self) -> Vec<(SettingsSection, Value)> {
        self.saved.lock().unwrap().clone()
    }

    fn take_error(&self) -> Option<ApiError> {
        self.next_error.lock().unwrap().take()
    }

    fn listing(&self, key: &QueryKey) -> RawListing {
        let records = self.records.lock().unwrap();
        let rows = records.get(&key.resource).cloned().unwrap_or_default();
        let mut params = key.params.clone();
        if key.resource == ResourceKind::Products {
            // The products endpoint hides inactive rows unless told otherwise.
            params
                .entry("active_only".to_string())
                .or_insert_with(|| "true".to_string());
        }
        let matching: Vec<Value> = rows
            .into_iter()
            .filter(|row| matches_params(row, &params))
            .collect();

        let total = matching.len() as u64;
        let skip = (key.page as usize - 1) * key.page_size as usize;
        let items = matching
            .into_iter()
            .skip(skip)
            .take(key.page_size as usize)
            .collect();
        RawListing::envelope(items, total, key.page, key.page_size)
    }

    fn remove(&self, resource: ResourceKind, ids: &[i64]) -> usize {
        let mut records = self.records.lock().unwrap();
        let rows = records.entry(resource).or_default();
        let before = rows.len();
        rows.retain(|row| !ids.contains(&row["id"].as_i64().unwrap_or_default()));
        before - rows.len()
    }
}

fn matches_params(row: &Value, params: &BTreeMap<String, String>) -> bool {
    params.iter().all(|(name, value)| match name.as_str() {
        "search" => {
            let needle = value.to_lowercase();
            ["name", "content", "company_name"].iter().any(|field| {
                row[field]
                    .as_str()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        }
        "active_only" => value != "true" || row["is_active"] == json!(true),
        field => row[field].as_str() == Some(value.as_str()),
    })
}

#[async_trait]
impl ResourceReader for FakeBackend {
    async fn fetch_page(&self, key: &QueryKey) -> ApiResult<RawListing> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        let listing = self.listing(key);
        let delay = self.next_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(listing)
    }
}

#[async_trait]
impl ResourceWriter for FakeBackend {
    async fn execute(&self, mutation: &Mutation) -> ApiResult<Value> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let delay = self.next_write_delay.lock().unwrap().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = self.take_error() {
            return Err(err);
        }

        match mutation {
            Mutation::Create { resource, body } => {
                let mut records = self.records.lock().unwrap();
                let rows = records.entry(*resource).or_default();
                let id = rows
                    .iter()
                    .filter_map(|row| row["id"].as_i64())
                    .max()
                    .unwrap_or_default()
                    + 1;
                let mut row = template(*resource, id);
                if let (Some(row), Some(fields)) = (row.as_object_mut(), body.as_object()) {
                    row.extend(fields.clone());
                }
                rows.push(row.clone());
                Ok(row)
            }
            Mutation::Update { resource, id, body } => {
                let mut records = self.records.lock().unwrap();
                let row = records
                    .entry(*resource)
                    .or_default()
                    .iter_mut()
                    .find(|row| row["id"].as_i64() == Some(*id))
                    .ok_or_else(|| ApiError::Server {
                        status: 404,
                        message: "Not found".into(),
                    })?;
                if let (Some(row), Some(fields)) = (row.as_object_mut(), body.as_object()) {
                    row.extend(fields.clone());
                }
                Ok(row.clone())
            }
            Mutation::Delete { resource, id } => {
                let deleted = self.remove(*resource, &[*id]);
                Ok(json!({ "deleted": deleted }))
            }
            Mutation::DeleteBatch { resource, ids } => {
                let deleted = self.remove(*resource, ids);
                Ok(json!({ "deleted": deleted }))
            }
            Mutation::RetryMessages { ids } => {
                let mut records = self.records.lock().unwrap();
                let mut retried = 0;
                for row in records.entry(ResourceKind::Messages).or_default() {
                    let id = row["id"].as_i64().unwrap_or_default();
                    if ids.contains(&id) && row["status"] == "FAILED" {
                        row["status"] = json!("DRAFT");
                        retried += 1;
                    }
                }
                Ok(json!({ "retried": retried }))
            }
            Mutation::Act {
                action: Action::TestConnection,
                ..
            } => Ok(json!({ "success": true, "message": "Connection test successful" })),
            _ => Ok(json!({ "status": "ok" })),
        }
    }
}

#[async_trait]
impl SettingsReader for FakeBackend {
    async fn fetch_settings(&self) -> ApiResult<Settings> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        Ok(self.settings.lock().unwrap().clone())
    }
}

#[async_trait]
impl SettingsWriter for FakeBackend {
    async fn save_settings(&self, section: SettingsSection, body: &Value) -> ApiResult<Value> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_error() {
            return Err(err);
        }
        self.saved.lock().unwrap().push((section, body.clone()));
        Ok(json!({ "status": "ok", "updated": body }))
    }
}
