use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::{ContactEmail, EmailAccountId};
use crate::domain::{Resource, text, timestamp};
use crate::filters::FieldValue;

/// A mailbox outreach emails are sent from. The backend never returns the
/// SMTP password.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmailAccount {
    pub id: EmailAccountId,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub is_active: bool,
    pub is_default: bool,
    pub daily_limit: u32,
    #[serde(default)]
    pub emails_sent_today: u32,
    #[serde(default, with = "timestamp::option")]
    pub last_used_at: Option<NaiveDateTime>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

impl EmailAccount {
    /// Sends left before the account hits its daily limit.
    pub fn remaining_today(&self) -> u32 {
        self.daily_limit.saturating_sub(self.emails_sent_today)
    }
}

impl Resource for EmailAccount {
    const KIND: ResourceKind = ResourceKind::EmailAccounts;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&format!(
                "{} {}",
                self.email,
                self.display_name.as_deref().unwrap_or_default()
            )),
            "active_only" => Some(FieldValue::Flag(self.is_active)),
            _ => None,
        }
    }
}

/// Payload for creating an email account.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewEmailAccount {
    pub email: ContactEmail,
    pub display_name: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub is_active: bool,
    pub is_default: bool,
    pub daily_limit: u32,
}

/// Partial update. Fields left `None` are not sent, so an untouched password
/// keeps its stored value.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct UpdateEmailAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<ContactEmail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn remaining_sends_never_underflow() {
        let account: EmailAccount = serde_json::from_value(json!({
            "id": 1,
            "email": "sales@acme.io",
            "smtp_host": "smtp.gmail.com",
            "smtp_port": 587,
            "smtp_username": "sales@acme.io",
            "is_active": true,
            "is_default": false,
            "daily_limit": 100,
            "emails_sent_today": 140,
            "created_at": "2025-03-01T10:00:00+05:30"
        }))
        .expect("email account payload");

        assert_eq!(account.remaining_today(), 0);
        assert_eq!(account.field("active_only"), Some(FieldValue::Flag(true)));
    }
}
