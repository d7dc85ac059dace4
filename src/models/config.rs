//! Configuration model loaded from external sources.

use std::env;
use std::path::Path;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, MAX_ITEMS_PER_PAGE};

fn default_page_size() -> u32 {
    DEFAULT_ITEMS_PER_PAGE
}

fn default_request_timeout() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    200
}

fn default_retry_max_delay() -> u64 {
    5_000
}

fn default_search_debounce() -> u64 {
    300
}

fn default_cache_max_entries() -> usize {
    256
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
/// Settings shared by the REST client and the view controllers.
pub struct DashboardConfig {
    /// Base url of the REST API, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Total attempts for an idempotent GET, the first one included.
    #[serde(default = "default_retry_attempts")]
    pub retry_max_attempts: u32,
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay")]
    pub retry_max_delay_ms: u64,
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
    /// Cached pages expire after this many seconds; `0` keeps them until
    /// invalidated.
    #[serde(default)]
    pub cache_ttl_secs: u64,
    /// Upper bound on cached pages; the oldest page is evicted beyond it.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

impl DashboardConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout(),
            retry_max_attempts: default_retry_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
            retry_max_delay_ms: default_retry_max_delay(),
            search_debounce_ms: default_search_debounce(),
            cache_ttl_secs: 0,
            cache_max_entries: default_cache_max_entries(),
        }
    }

    /// Loads `config/default`, the optional `config/{APP_ENV}` profile and
    /// `APP_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        // Select config profile (defaults to `local`).
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());
        Self::load_from(Path::new("config"), &app_env)
    }

    pub fn load_from(dir: &Path, app_env: &str) -> Result<Self, ConfigError> {
        let default = dir.join("default");
        let profile = dir.join(app_env);

        let settings = Config::builder()
            .add_source(File::with_name(&default.to_string_lossy()))
            .add_source(File::with_name(&profile.to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("APP"))
            .build()?;

        let config: DashboardConfig = settings.try_deserialize()?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Message("api_base_url must not be empty".into()));
        }
        if self.page_size == 0 || self.page_size > MAX_ITEMS_PER_PAGE {
            return Err(ConfigError::Message(format!(
                "page_size must be between 1 and {MAX_ITEMS_PER_PAGE}"
            )));
        }
        if self.cache_max_entries == 0 {
            return Err(ConfigError::Message(
                "cache_max_entries must be at least 1".into(),
            ));
        }
        if self.retry_max_attempts == 0 {
            return Err(ConfigError::Message(
                "retry_max_attempts must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}
