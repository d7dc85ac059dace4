//! Session wiring: logging, configuration and the shared client state.

use std::sync::Arc;

use crate::domain::Resource;
use crate::models::config::DashboardConfig;
use crate::repository::HttpRepository;
use crate::repository::errors::ApiResult;
use crate::services::cache::QueryCache;
use crate::services::controller::{ControllerOptions, ViewDataController};
use crate::services::settings::SettingsStore;

/// Loads `.env`, initializes logging and reads the dashboard configuration.
pub fn bootstrap() -> Result<DashboardConfig, config::ConfigError> {
    dotenvy::dotenv().ok(); // Load .env file
    init_logging();
    DashboardConfig::load().map_err(|err| {
        log::error!("Error loading dashboard config: {err}");
        err
    })
}

/// Installs `env_logger` with an `info` default; repeated calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Shared wiring for one dashboard session: the REST client, the query
/// cache every view reads through, and the settings store.
pub struct Dashboard {
    config: DashboardConfig,
    api: Arc<HttpRepository>,
    cache: Arc<QueryCache>,
    settings: SettingsStore<HttpRepository>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> ApiResult<Self> {
        let api = Arc::new(HttpRepository::from_config(&config)?);
        let cache = Arc::new(QueryCache::with_limits(config.cache_ttl(), config.cache_max_entries));
        let settings = SettingsStore::new(Arc::clone(&api));
        log::info!("Dashboard client for {}", config.api_base_url);

        Ok(Self {
            config,
            api,
            cache,
            settings,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn api(&self) -> &Arc<HttpRepository> {
        &self.api
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn settings(&self) -> &SettingsStore<HttpRepository> {
        &self.settings
    }

    /// A controller for one list view over `T`, sharing this dashboard's
    /// cache.
    pub fn controller<T: Resource>(&self) -> ViewDataController<T, HttpRepository> {
        ViewDataController::new(
            Arc::clone(&self.api),
            Arc::clone(&self.cache),
            ControllerOptions::from_config(&self.config),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::company::Company;
    use crate::domain::resource::ResourceKind;
    use crate::domain::settings::Theme;

    #[test]
    fn controllers_share_one_cache() {
        let mut config = DashboardConfig::new("http://localhost:8000/api/");
        config.page_size = 50;
        let dashboard = Dashboard::new(config).unwrap();

        let companies = dashboard.controller::<Company>();
        let key = companies.query_key();
        assert_eq!(key.resource, ResourceKind::Companies);
        assert_eq!(key.page_size, 50);
        assert_eq!(dashboard.api().base_url(), "http://localhost:8000/api");
        assert!(dashboard.cache().is_empty());
        assert_eq!(dashboard.settings().theme(), Theme::Dark);
    }
}
