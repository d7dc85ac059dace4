//! Raw list payloads as returned by the backend.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::query::QueryKey;
use crate::pagination::Page;
use crate::repository::errors::{ApiError, ApiResult};

/// Page envelope of the paginated endpoints.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Envelope {
    pub items: Vec<Value>,
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    /// Ignored in favour of the value recomputed from `total`; older
    /// endpoints report `0` for an empty collection.
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// A list response in one of the shapes the backend produces.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawListing {
    Envelope(Envelope),
    /// Endpoints that return the full collection as a bare array.
    List(Vec<Value>),
}

impl RawListing {
    pub fn envelope(items: Vec<Value>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages = Page::<Value>::total_pages_for(total, page_size);
        RawListing::Envelope(Envelope {
            items,
            total,
            page: Some(page),
            page_size: Some(page_size),
            total_pages: Some(total_pages),
        })
    }

    /// Decodes the payload into a typed page for `key`.
    ///
    /// Bare arrays are paginated locally using the key's position.
    pub fn into_page<T: DeserializeOwned>(self, key: &QueryKey) -> ApiResult<Page<T>> {
        match self {
            RawListing::Envelope(envelope) => {
                let page_size = envelope.page_size.unwrap_or(key.page_size);
                let items = decode_items(envelope.items)?;
                let page = Page::new(
                    items,
                    envelope.page.unwrap_or(key.page),
                    page_size,
                    envelope.total,
                )?;
                Ok(page)
            }
            RawListing::List(all) => {
                let items = decode_items(all)?;
                Ok(Page::from_full_list(items, key.page, key.page_size))
            }
        }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> ApiResult<Vec<T>> {
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|err| ApiError::Decode(err.to_string())))
        .collect()
}
