use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::filters::FieldValue;

pub mod automation;
pub mod campaign;
pub mod company;
pub mod email_account;
pub mod email_open;
pub mod lead;
pub mod message;
pub mod mutation;
pub mod product;
pub mod query;
pub mod resource;
pub mod settings;
pub mod template;
pub mod timestamp;
pub mod types;
pub mod unsubscribe;

/// A record type listed by one of the dashboard views.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the record belongs to.
    const KIND: ResourceKind;

    /// Server-side identifier.
    fn record_id(&self) -> i64;

    /// Value of a client-scoped filter field, `None` when the record has no
    /// such value.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Text field helper shared by the record implementations.
pub(crate) fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(value.to_string()))
}

/// `{id, name}` reference embedded in listing rows.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}

pub(crate) fn opt_text(value: Option<&str>) -> Option<FieldValue> {
    value.map(|v| FieldValue::Text(v.to_string()))
}
