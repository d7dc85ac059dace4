use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::{CompanyId, EmailOpenId, MessageId, ProductId};
use crate::domain::{NamedRef, Resource, timestamp};
use crate::filters::FieldValue;

/// A tracking-pixel hit for a sent product email.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmailOpen {
    pub id: EmailOpenId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(with = "timestamp")]
    pub opened_at: NaiveDateTime,
    #[serde(default)]
    pub product: Option<NamedRef>,
    #[serde(default)]
    pub company: Option<NamedRef>,
}

impl Resource for EmailOpen {
    const KIND: ResourceKind = ResourceKind::EmailOpens;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "opened" => Some(FieldValue::Date(self.opened_at.date())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn product_listing_row_decodes() {
        let open: EmailOpen = serde_json::from_value(json!({
            "id": 8,
            "product_id": 2,
            "company_id": 5,
            "message_id": null,
            "email": "cto@acme.io",
            "opened_at": "2025-04-02T08:15:00",
            "product": {"id": 2, "name": "Ledger Pro"},
            "company": {"id": 5, "name": "Acme"}
        }))
        .expect("email open row");

        assert!(open.message_id.is_none());
        assert_eq!(open.product.map(|p| p.name), Some("Ledger Pro".to_string()));
    }
}
