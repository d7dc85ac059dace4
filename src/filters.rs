//! Filter state owned by a view and the per-resource filter schemas.
//!
//! Every resource declares which filter fields it accepts. Server-scoped
//! fields travel as query parameters and therefore form part of the
//! [`QueryKey`](crate::domain::query::QueryKey); client-scoped fields only
//! refine the page that has already been fetched.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Resource;
use crate::domain::resource::ResourceKind;
use crate::pagination::Page;

/// Where a filter field is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FilterScope {
    /// Sent to the backend as a query parameter.
    Server,
    /// Applied in memory to the current page only.
    Client,
}

/// Shape of the value a filter field accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FilterKind {
    Text,
    Choice,
    DateRange,
    Flag,
}

/// Declaration of a single filter field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: FilterKind,
    pub scope: FilterScope,
}

impl FilterField {
    pub const fn server(name: &'static str, kind: FilterKind) -> Self {
        Self {
            name,
            kind,
            scope: FilterScope::Server,
        }
    }

    pub const fn client(name: &'static str, kind: FilterKind) -> Self {
        Self {
            name,
            kind,
            scope: FilterScope::Client,
        }
    }
}

/// A value selected by a filter control.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Choice(String),
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    Flag(bool),
}

impl FilterValue {
    pub const fn kind(&self) -> FilterKind {
        match self {
            FilterValue::Text(_) => FilterKind::Text,
            FilterValue::Choice(_) => FilterKind::Choice,
            FilterValue::DateRange { .. } => FilterKind::DateRange,
            FilterValue::Flag(_) => FilterKind::Flag,
        }
    }

    /// Returns `true` when the value does not restrict anything, e.g. an
    /// empty search box or an open-ended date range.
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) => s.trim().is_empty(),
            FilterValue::DateRange { from, to } => from.is_none() && to.is_none(),
            FilterValue::Flag(_) => false,
        }
    }

    /// Query parameters this value contributes when sent to the backend.
    fn to_params(&self, name: &str) -> Vec<(String, String)> {
        match self {
            FilterValue::Text(s) | FilterValue::Choice(s) => {
                vec![(name.to_string(), s.trim().to_string())]
            }
            FilterValue::DateRange { from, to } => {
                let mut params = Vec::new();
                if let Some(from) = from {
                    params.push((format!("{name}_from"), from.format("%Y-%m-%d").to_string()));
                }
                if let Some(to) = to {
                    params.push((format!("{name}_to"), to.format("%Y-%m-%d").to_string()));
                }
                params
            }
            FilterValue::Flag(flag) => vec![(name.to_string(), flag.to_string())],
        }
    }

    /// Evaluates this filter against a record field.
    pub fn matches(&self, field: Option<&FieldValue>) -> bool {
        match (self, field) {
            (FilterValue::Text(needle), Some(FieldValue::Text(haystack))) => haystack
                .to_lowercase()
                .contains(&needle.trim().to_lowercase()),
            (FilterValue::Choice(choice), Some(FieldValue::Text(value))) => {
                value.trim().eq_ignore_ascii_case(choice.trim())
            }
            (FilterValue::DateRange { from, to }, Some(FieldValue::Date(date))) => {
                from.is_none_or(|from| *date >= from) && to.is_none_or(|to| *date <= to)
            }
            (FilterValue::Flag(expected), Some(FieldValue::Flag(actual))) => expected == actual,
            _ => false,
        }
    }
}

/// Field value exposed by a record for client-side filtering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Flag(bool),
}

/// Errors raised when a filter does not fit the resource schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("{resource} has no filter named `{field}`")]
    UnknownField {
        resource: ResourceKind,
        field: String,
    },
    #[error("filter `{field}` expects a {expected:?} value")]
    KindMismatch { field: String, expected: FilterKind },
    #[error("filter `{field}` has its start after its end")]
    InvertedRange { field: String },
}

fn check(resource: ResourceKind, field: &str, value: &FilterValue) -> Result<(), FilterError> {
    let declared = resource
        .filter_field(field)
        .ok_or_else(|| FilterError::UnknownField {
            resource,
            field: field.to_string(),
        })?;

    if declared.kind != value.kind() {
        return Err(FilterError::KindMismatch {
            field: field.to_string(),
            expected: declared.kind,
        });
    }

    if let FilterValue::DateRange {
        from: Some(from),
        to: Some(to),
    } = value
    {
        if from > to {
            return Err(FilterError::InvertedRange {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// The client-held set of active filter values for a view.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    values: BTreeMap<String, FilterValue>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert without schema validation, for defaults and tests.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        if !value.is_blank() {
            self.values.insert(field.into(), value);
        }
        self
    }

    /// Validates `value` against the resource schema and stores it. Blank
    /// values clear the field instead.
    pub fn set(
        &mut self,
        resource: ResourceKind,
        field: &str,
        value: FilterValue,
    ) -> Result<(), FilterError> {
        check(resource, field, &value)?;
        if value.is_blank() {
            self.values.remove(field);
        } else {
            self.values.insert(field.to_string(), value);
        }
        Ok(())
    }

    /// Checks every stored value against the resource schema.
    pub fn validate(&self, resource: ResourceKind) -> Result<(), FilterError> {
        self.values
            .iter()
            .try_for_each(|(field, value)| check(resource, field, value))
    }

    /// Copy holding only the values that fit the resource schema, with the
    /// rejected ones reported alongside.
    pub fn validated(&self, resource: ResourceKind) -> (Self, Vec<FilterError>) {
        let mut valid = Self::new();
        let mut rejected = Vec::new();
        for (field, value) in &self.values {
            match check(resource, field, value) {
                Ok(()) => {
                    valid.values.insert(field.clone(), value.clone());
                }
                Err(err) => rejected.push(err),
            }
        }
        (valid, rejected)
    }

    pub fn remove(&mut self, field: &str) -> Option<FilterValue> {
        self.values.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.values.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Query parameters for the server-scoped filters of `resource`.
    pub fn server_params(&self, resource: ResourceKind) -> BTreeMap<String, String> {
        self.scoped(resource, FilterScope::Server)
            .flat_map(|(name, value)| value.to_params(name))
            .collect()
    }

    /// Returns `true` if any client-scoped filter is active.
    pub fn has_client_filters(&self, resource: ResourceKind) -> bool {
        self.scoped(resource, FilterScope::Client).next().is_some()
    }

    fn scoped(
        &self,
        resource: ResourceKind,
        scope: FilterScope,
    ) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.iter().filter(move |(name, _)| {
            resource
                .filter_field(name)
                .is_some_and(|field| field.scope == scope)
        })
    }

    /// Returns `true` if `record` satisfies every client-scoped filter.
    pub fn matches_client<T: Resource>(&self, record: &T) -> bool {
        self.scoped(T::KIND, FilterScope::Client)
            .all(|(name, value)| value.matches(record.field(name).as_ref()))
    }
}

/// A server page refined in memory by the client-scoped filters.
///
/// The pagination metadata is the server's: a page of 20 narrowed to 3 items
/// is still "page 1 of N".
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClientFiltered<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u32,
    /// Number of items on the server page before refinement.
    pub fetched: usize,
}

/// Applies the client-scoped filters of `filters` to the current page.
pub fn apply_client_filter<T: Resource>(page: &Page<T>, filters: &FilterState) -> ClientFiltered<T> {
    let items = page
        .items
        .iter()
        .filter(|item| filters.matches_client(*item))
        .cloned()
        .collect();

    ClientFiltered {
        items,
        page: page.page,
        page_size: page.page_size,
        total: page.total,
        total_pages: page.total_pages,
        fetched: page.items.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::company::Company;
    use crate::domain::types::CompanyId;

    fn company(id: i64, industry: &str, day: u32) -> Company {
        Company {
            id: CompanyId::new(id).expect("valid id"),
            name: format!("Company {id}"),
            industry: industry.to_string(),
            country: "India".to_string(),
            email: None,
            phone: None,
            website: None,
            created_at: NaiveDate::from_ymd_opt(2025, 3, day)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .expect("valid timestamp"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut filters = FilterState::new();
        let err = filters
            .set(
                ResourceKind::Companies,
                "colour",
                FilterValue::Text("red".into()),
            )
            .unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let mut filters = FilterState::new();
        let err = filters
            .set(ResourceKind::Messages, "status", FilterValue::Flag(true))
            .unwrap_err();
        assert_eq!(
            err,
            FilterError::KindMismatch {
                field: "status".into(),
                expected: FilterKind::Choice
            }
        );
    }

    #[test]
    fn validate_reports_entries_outside_the_schema() {
        let filters = FilterState::new()
            .with("search", FilterValue::Text("acme".into()))
            .with("shoe_size", FilterValue::Text("42".into()))
            .with("industry", FilterValue::Flag(true));

        assert!(filters.validate(ResourceKind::Companies).is_err());

        let (valid, rejected) = filters.validated(ResourceKind::Companies);
        assert_eq!(rejected.len(), 2);
        assert!(valid.validate(ResourceKind::Companies).is_ok());
        assert!(valid.get("search").is_some());
    }

    #[test]
    fn blank_values_clear_the_field() {
        let mut filters = FilterState::new();
        filters
            .set(
                ResourceKind::Companies,
                "search",
                FilterValue::Text("acme".into()),
            )
            .unwrap();
        filters
            .set(
                ResourceKind::Companies,
                "search",
                FilterValue::Text("  ".into()),
            )
            .unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn only_server_filters_become_params() {
        let filters = FilterState::new()
            .with("search", FilterValue::Text(" acme ".into()))
            .with("industry", FilterValue::Choice("software".into()));

        let params = filters.server_params(ResourceKind::Companies);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("search").map(String::as_str), Some("acme"));
        assert!(filters.has_client_filters(ResourceKind::Companies));
    }

    #[test]
    fn date_ranges_expand_to_bounds() {
        let filters = FilterState::new().with(
            "sent",
            FilterValue::DateRange {
                from: NaiveDate::from_ymd_opt(2025, 1, 1),
                to: None,
            },
        );
        let value = filters.get("sent").unwrap();
        assert_eq!(
            value.to_params("sent"),
            vec![("sent_from".to_string(), "2025-01-01".to_string())]
        );
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let mut filters = FilterState::new();
        let err = filters
            .set(
                ResourceKind::Companies,
                "created",
                FilterValue::DateRange {
                    from: NaiveDate::from_ymd_opt(2025, 2, 1),
                    to: NaiveDate::from_ymd_opt(2025, 1, 1),
                },
            )
            .unwrap_err();
        assert!(matches!(err, FilterError::InvertedRange { .. }));
    }

    #[test]
    fn client_filter_refines_without_touching_metadata() {
        let page = Page::new(
            vec![
                company(1, "Software", 1),
                company(2, "Healthcare", 2),
                company(3, "software", 3),
            ],
            1,
            3,
            9,
        )
        .expect("valid page");
        let filters =
            FilterState::new().with("industry", FilterValue::Choice("SOFTWARE".into()));

        let refined = apply_client_filter(&page, &filters);

        assert_eq!(refined.items.len(), 2);
        assert_eq!(refined.fetched, 3);
        assert_eq!(refined.total, 9);
        assert_eq!(refined.total_pages, 3);
        assert_eq!(refined.page, 1);
    }

    #[test]
    fn client_filter_never_grows_the_page() {
        let page = Page::new(vec![company(1, "Software", 1)], 1, 20, 1).unwrap();
        let refined = apply_client_filter(&page, &FilterState::new());
        assert!(refined.items.len() <= page.items.len());

        let dated = FilterState::new().with(
            "created",
            FilterValue::DateRange {
                from: NaiveDate::from_ymd_opt(2025, 3, 2),
                to: NaiveDate::from_ymd_opt(2025, 3, 31),
            },
        );
        assert!(apply_client_filter(&page, &dated).items.is_empty());
    }
}
