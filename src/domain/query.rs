//! Cache identity of a list request.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::resource::ResourceKind;
use crate::domain::types::TypeConstraintError;
use crate::filters::FilterState;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, MAX_ITEMS_PER_PAGE};

/// Resource, position and server-side filter parameters of a list request.
///
/// Two requests with equal keys are expected to return the same page until
/// the resource is invalidated. Client-scoped filters never appear here.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryKey {
    pub resource: ResourceKind,
    pub page: u32,
    pub page_size: u32,
    pub params: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct QueryParams<'a> {
    page: u32,
    page_size: u32,
    #[serde(flatten)]
    params: &'a BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            resource,
            page: 1,
            page_size: DEFAULT_ITEMS_PER_PAGE,
            params: BTreeMap::new(),
        }
    }

    /// Derives the key for `filters` at the given position.
    pub fn from_filters(
        resource: ResourceKind,
        filters: &FilterState,
        page: u32,
        page_size: u32,
    ) -> Self {
        Self::new(resource)
            .paginate(page, page_size)
            .params(filters.server_params(resource))
    }

    /// Sets the position, clamping to `1..` and `1..=MAX_ITEMS_PER_PAGE`.
    pub fn paginate(mut self, page: u32, page_size: u32) -> Self {
        self.page = page.max(1);
        self.page_size = page_size.clamp(1, MAX_ITEMS_PER_PAGE);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params.extend(params);
        self
    }

    /// The same query moved to another page.
    pub fn with_page(&self, page: u32) -> Self {
        self.clone().paginate(page, self.page_size)
    }

    /// Canonical url-encoded query string. Parameters are sorted so equal keys
    /// always produce the same string.
    pub fn to_query_string(&self) -> Result<String, TypeConstraintError> {
        serde_html_form::to_string(QueryParams {
            page: self.page,
            page_size: self.page_size,
            params: &self.params,
        })
        .map_err(|err| TypeConstraintError::InvalidValue(err.to_string()))
    }
}
