//! reqwest-backed implementation of the transport traits.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::mutation::{Method, Mutation};
use crate::domain::query::QueryKey;
use crate::domain::resource::ResourceKind;
use crate::domain::settings::{Settings, SettingsSection};
use crate::models::config::DashboardConfig;
use crate::models::listing::RawListing;
use crate::repository::errors::{ApiError, ApiResult};
use crate::repository::{
    ExportReader, ResourceReader, ResourceWriter, SettingsReader, SettingsWriter,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct HttpRepositoryBuilder {
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl HttpRepositoryBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured reqwest client, e.g. with proxies or custom TLS.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> ApiResult<HttpRepository> {
        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| ApiError::Network(e.to_string()))?,
        };

        Ok(HttpRepository {
            client,
            base_url: self.base_url,
        })
    }
}

/// REST client for the outreach backend.
#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn builder(base_url: impl Into<String>) -> HttpRepositoryBuilder {
        HttpRepositoryBuilder::new(base_url)
    }

    pub fn from_config(config: &DashboardConfig) -> ApiResult<Self> {
        Self::builder(&config.api_base_url)
            .timeout(config.request_timeout())
            .build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            log::warn!("Request to {} failed: {e}", self.base_url);
            ApiError::Network(e.to_string())
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send(request).await?.bytes().await.map_err(body_error)?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// A body that could not be read in full never reached the parser, so it is
/// reported as a network failure and may be retried.
fn body_error(err: reqwest::Error) -> ApiError {
    log::warn!("Reading response body failed: {err}");
    ApiError::Network(err.to_string())
}

#[async_trait]
impl ResourceReader for HttpRepository {
    async fn fetch_page(&self, key: &QueryKey) -> ApiResult<RawListing> {
        let query = key.to_query_string()?;
        let url = format!("{}?{query}", self.url(key.resource.path()));
        log::debug!("GET {url}");
        self.send_json(self.client.get(url)).await
    }
}

#[async_trait]
impl ResourceWriter for HttpRepository {
    async fn execute(&self, mutation: &Mutation) -> ApiResult<Value> {
        let request = mutation.request()?;
        let url = self.url(&request.path);
        log::debug!("{:?} {url}", request.method);

        let builder = match request.method {
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = self.send(builder).await?;
        let text = response.text().await.map_err(body_error)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SettingsReader for HttpRepository {
    async fn fetch_settings(&self) -> ApiResult<Settings> {
        self.send_json(self.client.get(self.url("settings"))).await
    }
}

#[async_trait]
impl SettingsWriter for HttpRepository {
    async fn save_settings(&self, section: SettingsSection, body: &Value) -> ApiResult<Value> {
        let url = self.url(&format!("settings/{}", section.path()));
        self.send_json(self.client.put(url).json(body)).await
    }
}

#[async_trait]
impl ExportReader for HttpRepository {
    async fn export_csv(&self, resource: ResourceKind) -> ApiResult<String> {
        let Some(path) = resource.export_path() else {
            return Err(ApiError::Validation(format!(
                "{resource} cannot be exported"
            )));
        };
        self.send(self.client.get(self.url(path)))
            .await?
            .text()
            .await
            .map_err(body_error)
    }
}
