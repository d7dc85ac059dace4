//! Mock repository implementations for isolating services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::domain::mutation::Mutation;
use crate::domain::query::QueryKey;
use crate::domain::resource::ResourceKind;
use crate::domain::settings::{Settings, SettingsSection};
use crate::models::listing::RawListing;
use crate::repository::errors::ApiResult;
use crate::repository::{
    ExportReader, ResourceReader, ResourceWriter, SettingsReader, SettingsWriter,
};

mock! {
    pub Repository {}

    #[async_trait]
    impl ResourceReader for Repository {
        async fn fetch_page(&self, key: &QueryKey) -> ApiResult<RawListing>;
    }

    #[async_trait]
    impl ResourceWriter for Repository {
        async fn execute(&self, mutation: &Mutation) -> ApiResult<Value>;
    }

    #[async_trait]
    impl SettingsReader for Repository {
        async fn fetch_settings(&self) -> ApiResult<Settings>;
    }

    #[async_trait]
    impl SettingsWriter for Repository {
        async fn save_settings(&self, section: SettingsSection, body: &Value) -> ApiResult<Value>;
    }

    #[async_trait]
    impl ExportReader for Repository {
        async fn export_csv(&self, resource: ResourceKind) -> ApiResult<String>;
    }
}
