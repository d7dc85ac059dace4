use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::{CompanyId, LeadId};
use crate::domain::{Resource, opt_text, timestamp};
use crate::filters::FieldValue;

/// A company whose reply was classified as interested.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct QualifiedLead {
    pub id: LeadId,
    pub company_id: CompanyId,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl Resource for QualifiedLead {
    const KIND: ResourceKind = ResourceKind::Leads;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => opt_text(self.company_name.as_deref()),
            "industry" => opt_text(self.industry.as_deref()),
            "intent" => opt_text(self.intent.as_deref()),
            "created" => Some(FieldValue::Date(self.created_at.date())),
            _ => None,
        }
    }
}
