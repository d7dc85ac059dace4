use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::resource::ResourceKind;
use crate::domain::types::{ProductId, TemplateId};
use crate::domain::{Resource, text, timestamp};
use crate::filters::FieldValue;

fn default_active() -> bool {
    true
}

/// A product pitched to companies matching its ideal customer profile.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default)]
    pub industry_tags: Vec<String>,
    /// Company search filters applied when fetching clients for the product.
    #[serde(default)]
    pub default_filters: Option<Map<String, Value>>,
    #[serde(default)]
    pub brochure_url: Option<String>,
    #[serde(default)]
    pub asset_urls: Option<Vec<String>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub companies_count: u64,
    #[serde(default)]
    pub campaigns_count: u64,
    #[serde(default)]
    pub qualified_leads_count: u64,
}

impl Product {
    pub fn targets_industry(&self, industry: &str) -> bool {
        self.industry_tags
            .iter()
            .any(|tag| tag.eq_ignore_ascii_case(industry))
    }
}

impl Resource for Product {
    const KIND: ResourceKind = ResourceKind::Products;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&format!(
                "{} {}",
                self.name,
                self.short_description.as_deref().unwrap_or_default()
            )),
            "industry" => text(&self.industry_tags.join(" ")),
            "active_only" => Some(FieldValue::Flag(self.is_active)),
            _ => None,
        }
    }
}

/// Payload for creating or fully updating a product.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub industry_tags: Vec<String>,
    pub brochure_url: Option<String>,
    pub email_template_ids: Vec<TemplateId>,
    pub whatsapp_template_ids: Vec<TemplateId>,
}

/// Request body for pulling companies that match a product's profile.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FetchProductClients {
    pub limit: u32,
    pub country: Option<String>,
    /// Merged over the product's `default_filters`.
    pub override_filters: Option<Map<String, Value>>,
}

/// Request body for generating a campaign from a product's companies.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct GenerateProductCampaign {
    pub campaign_name: Option<String>,
    pub limit: u32,
    pub email_template_id: Option<i64>,
    pub whatsapp_template_id: Option<i64>,
    pub fetched_on: Option<String>,
    pub attach_brochure: bool,
}
