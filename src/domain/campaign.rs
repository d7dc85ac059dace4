use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::CampaignId;
use crate::domain::{Resource, text, timestamp};
use crate::filters::FieldValue;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub industry: String,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl Resource for Campaign {
    const KIND: ResourceKind = ResourceKind::Campaigns;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&self.name),
            "industry" => text(&self.industry),
            "created" => Some(FieldValue::Date(self.created_at.date())),
            _ => None,
        }
    }
}

/// Which pitch the generated campaign uses.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CampaignType {
    #[default]
    Sales,
    Website,
}

/// Request body for generating a campaign from fetched companies.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GenerateCampaign {
    pub industry: String,
    pub campaign_name: String,
    pub limit: u32,
    pub email_template_id: Option<i64>,
    pub whatsapp_template_id: Option<i64>,
    pub campaign_type: CampaignType,
    /// Only use companies fetched on this day (`YYYY-MM-DD`).
    pub fetched_on: Option<String>,
}
