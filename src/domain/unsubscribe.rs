use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::{CompanyId, ProductId, UnsubscribeId};
use crate::domain::{NamedRef, Resource, text, timestamp};
use crate::filters::FieldValue;

/// Address that opted out of a product's outreach.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Unsubscribe {
    pub id: UnsubscribeId,
    pub email: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(with = "timestamp")]
    pub unsubscribed_at: NaiveDateTime,
    #[serde(default)]
    pub product: Option<NamedRef>,
    #[serde(default)]
    pub company: Option<NamedRef>,
}

impl Resource for Unsubscribe {
    const KIND: ResourceKind = ResourceKind::Unsubscribes;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&format!(
                "{} {} {}",
                self.email,
                self.company.as_ref().map_or("", |c| c.name.as_str()),
                self.reason.as_deref().unwrap_or_default()
            )),
            _ => None,
        }
    }
}
