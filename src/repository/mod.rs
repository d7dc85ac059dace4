//! Transport seams between the view layer and the REST backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::mutation::Mutation;
use crate::domain::query::QueryKey;
use crate::domain::resource::ResourceKind;
use crate::domain::settings::{Settings, SettingsSection};
use crate::models::listing::RawListing;
use crate::repository::errors::ApiResult;

pub mod errors;
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;

pub use http::{HttpRepository, HttpRepositoryBuilder};

#[async_trait]
pub trait ResourceReader: Send + Sync {
    /// Fetches one page of `key.resource` with the key's parameters.
    async fn fetch_page(&self, key: &QueryKey) -> ApiResult<RawListing>;
}

#[async_trait]
pub trait ResourceWriter: Send + Sync {
    /// Performs the write and returns the backend's JSON reply.
    async fn execute(&self, mutation: &Mutation) -> ApiResult<Value>;
}

#[async_trait]
pub trait SettingsReader: Send + Sync {
    async fn fetch_settings(&self) -> ApiResult<Settings>;
}

#[async_trait]
pub trait SettingsWriter: Send + Sync {
    /// Saves one settings section; `body` holds only the changed fields.
    async fn save_settings(&self, section: SettingsSection, body: &Value) -> ApiResult<Value>;
}

#[async_trait]
pub trait ExportReader: Send + Sync {
    /// Downloads the CSV export of `resource`.
    async fn export_csv(&self, resource: ResourceKind) -> ApiResult<String>;
}
