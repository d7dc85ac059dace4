use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::AutomationId;
use crate::domain::{Resource, opt_text, text, timestamp};
use crate::filters::FieldValue;

/// Lifecycle of an automated daily campaign.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AutomationStatus {
    #[default]
    Draft,
    Scheduled,
    Running,
    Paused,
    Completed,
}

impl AutomationStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            AutomationStatus::Draft => "draft",
            AutomationStatus::Scheduled => "scheduled",
            AutomationStatus::Running => "running",
            AutomationStatus::Paused => "paused",
            AutomationStatus::Completed => "completed",
        }
    }
}

impl Display for AutomationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

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

/// Configuration of an automated daily campaign.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AutomationConfig {
    pub id: AutomationId,
    #[serde(default)]
    pub name: Option<String>,
    pub industry: String,
    pub country: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub status: AutomationStatus,
    #[serde(default = "default_send_hour")]
    pub send_time_hour: u8,
    #[serde(default)]
    pub send_time_minute: u8,
    #[serde(default = "default_followup_1")]
    pub followup_day_1: u32,
    #[serde(default = "default_followup_2")]
    pub followup_day_2: u32,
    #[serde(default = "default_duration")]
    pub run_duration_days: u32,
    #[serde(default, with = "timestamp::option")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub total_companies_fetched: u64,
    #[serde(default)]
    pub total_messages_sent: u64,
    #[serde(default)]
    pub total_replies: u64,
    #[serde(default)]
    pub days_completed: u32,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub last_run_at: Option<NaiveDateTime>,
}

impl AutomationConfig {
    /// Display name, falling back to `industry / country`.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{} / {}", self.industry, self.country),
        }
    }

    pub fn can_start(&self) -> bool {
        matches!(
            self.status,
            AutomationStatus::Draft | AutomationStatus::Scheduled
        )
    }

    pub fn can_resume(&self) -> bool {
        self.status == AutomationStatus::Paused
    }
}

impl Resource for AutomationConfig {
    const KIND: ResourceKind = ResourceKind::Automations;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => opt_text(self.name.as_deref()),
            "status" => text(self.status.as_str()),
            "industry" => text(&self.industry),
            "country" => text(&self.country),
            "active" => Some(FieldValue::Flag(self.is_active)),
            _ => None,
        }
    }
}

/// Payload for creating an automation config.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewAutomationConfig {
    pub name: Option<String>,
    pub industry: String,
    pub country: String,
    pub daily_limit: u32,
    pub send_time_hour: u8,
    pub send_time_minute: u8,
    pub followup_day_1: u32,
    pub followup_day_2: u32,
    pub run_duration_days: u32,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_fields_take_backend_defaults() {
        let config: AutomationConfig = serde_json::from_value(json!({
            "id": 1,
            "industry": "Retail",
            "country": "India",
        }))
        .expect("minimal automation payload");

        assert_eq!(config.daily_limit, 30);
        assert_eq!(config.send_time_hour, 10);
        assert_eq!(config.followup_day_1, 3);
        assert_eq!(config.followup_day_2, 7);
        assert_eq!(config.status, AutomationStatus::Draft);
        assert_eq!(config.display_name(), "Retail / India");
        assert!(config.can_start());
        assert!(!config.can_resume());
        assert_eq!(config.field("active"), Some(FieldValue::Flag(false)));
    }
}
