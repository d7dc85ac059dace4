use serde::Deserialize;
use validator::Validate;

use crate::domain::automation::NewAutomationConfig;
use crate::domain::mutation::Mutation;
use crate::domain::resource::ResourceKind;
use crate::domain::types::AutomationId;
use crate::forms::{FormError, non_blank};

fn default_daily_limit() -> u32 {
    30
}

fn default_send_hour() -> u8 {
    10
}

fn default_followup_1() -> u32 {
    3
}

fn default_followup_2() -> u32 {
    7
}

fn default_duration() -> u32 {
    7
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for an automated daily campaign.
pub struct AutomationForm {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub industry: String,
    #[validate(length(min = 1))]
    pub country: String,
    #[serde(default = "default_daily_limit")]
    #[validate(range(min = 1, max = 500))]
    pub daily_limit: u32,
    #[serde(default = "default_send_hour")]
    #[validate(range(max = 23))]
    pub send_time_hour: u8,
    #[serde(default)]
    #[validate(range(max = 59))]
    pub send_time_minute: u8,
    #[serde(default = "default_followup_1")]
    #[validate(range(min = 1, max = 60))]
    pub followup_day_1: u32,
    #[serde(default = "default_followup_2")]
    #[validate(range(min = 1, max = 90))]
    pub followup_day_2: u32,
    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 365))]
    pub run_duration_days: u32,
}

impl AutomationForm {
    pub fn into_config(self) -> Result<(Option<AutomationId>, NewAutomationConfig), FormError> {
        self.validate()?;
        if self.followup_day_2 <= self.followup_day_1 {
            return Err(FormError::FollowupOrder);
        }

        let id = self.id.map(AutomationId::new).transpose()?;
        Ok((
            id,
            NewAutomationConfig {
                name: non_blank(self.name.as_deref()).map(str::to_string),
                industry: self.industry.trim().to_string(),
                country: self.country.trim().to_string(),
                daily_limit: self.daily_limit,
                send_time_hour: self.send_time_hour,
                send_time_minute: self.send_time_minute,
                followup_day_1: self.followup_day_1,
                followup_day_2: self.followup_day_2,
                run_duration_days: self.run_duration_days,
            },
        ))
    }

    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        let (id, config) = self.into_config()?;
        let mutation = match id {
            Some(id) => Mutation::update(ResourceKind::Automations, id.get(), &config)?,
            None => Mutation::create(ResourceKind::Automations, &config)?,
        };
        Ok(mutation)
    }
}
