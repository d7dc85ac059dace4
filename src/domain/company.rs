use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::CompanyId;
use crate::domain::{Resource, opt_text, text, timestamp};
use crate::filters::FieldValue;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: String,
    pub country: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl Resource for Company {
    const KIND: ResourceKind = ResourceKind::Companies;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&format!("{} {} {}", self.name, self.industry, self.country)),
            "industry" => text(&self.industry),
            "country" => text(&self.country),
            "email" => opt_text(self.email.as_deref()),
            "created" => Some(FieldValue::Date(self.created_at.date())),
            _ => None,
        }
    }
}

/// Fields that can be changed on an existing company.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateCompany {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}
