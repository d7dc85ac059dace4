use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::domain::campaign::{CampaignType, GenerateCampaign};
use crate::domain::mutation::Mutation;
use crate::domain::types::TemplateId;
use crate::forms::{FormError, non_blank};

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for generating a campaign from fetched companies.
pub struct GenerateCampaignForm {
    #[validate(length(min = 1))]
    pub industry: String,
    #[validate(length(min = 1, max = 100))]
    pub campaign_name: String,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
    #[serde(default)]
    pub email_template_id: Option<i64>,
    #[serde(default)]
    pub whatsapp_template_id: Option<i64>,
    #[serde(default)]
    pub campaign_type: CampaignType,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub fetched_on: Option<String>,
}

impl GenerateCampaignForm {
    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        self.validate()?;

        let email_template_id = self.email_template_id.map(TemplateId::new).transpose()?;
        let whatsapp_template_id = self
            .whatsapp_template_id
            .map(TemplateId::new)
            .transpose()?;
        let fetched_on = non_blank(self.fetched_on.as_deref())
            .map(|raw| {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map(|date| date.format("%Y-%m-%d").to_string())
                    .map_err(|_| FormError::InvalidValue(format!("invalid date `{raw}`")))
            })
            .transpose()?;

        Ok(Mutation::GenerateCampaign(GenerateCampaign {
            industry: self.industry.trim().to_string(),
            campaign_name: self.campaign_name.trim().to_string(),
            limit: self.limit,
            email_template_id: email_template_id.map(TemplateId::get),
            whatsapp_template_id: whatsapp_template_id.map(TemplateId::get),
            campaign_type: self.campaign_type,
            fetched_on,
        }))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn generates_post_to_generate_endpoint() {
        let form: GenerateCampaignForm = serde_json::from_value(json!({
            "industry": "Retail",
            "campaign_name": "Spring",
            "campaign_type": "WEBSITE",
            "fetched_on": "2025-03-01",
        }))
        .unwrap();

        let request = form.into_mutation().unwrap().request().unwrap();
        assert_eq!(request.path, "campaigns/generate");
        let body = request.body.unwrap();
        assert_eq!(body["limit"], json!(10));
        assert_eq!(body["campaign_type"], json!("WEBSITE"));
    }

    #[test]
    fn rejects_bad_date() {
        let form: GenerateCampaignForm = serde_json::from_value(json!({
            "industry": "Retail",
            "campaign_name": "Spring",
            "fetched_on": "01/03/2025",
        }))
        .unwrap();
        assert!(matches!(form.into_mutation(), Err(FormError::InvalidValue(_))));
    }
}
