use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::resource::ResourceKind;
use crate::domain::types::{CampaignId, CompanyId, MessageId};
use crate::domain::{Resource, opt_text, text, timestamp};
use crate::filters::FieldValue;

/// Delivery channel of an outreach message.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Email,
    Whatsapp,
    Rcs,
}

/// Position of the message in the outreach sequence.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStage {
    Initial,
    #[serde(rename = "FOLLOWUP_1")]
    Followup1,
    #[serde(rename = "FOLLOWUP_2")]
    Followup2,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageStatus {
    Draft,
    Sent,
    Delivered,
    Read,
    Failed,
    Cancelled,
    Skipped,
}

impl MessageType {
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageType::Email => "EMAIL",
            MessageType::Whatsapp => "WHATSAPP",
            MessageType::Rcs => "RCS",
        }
    }
}

impl MessageStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageStage::Initial => "INITIAL",
            MessageStage::Followup1 => "FOLLOWUP_1",
            MessageStage::Followup2 => "FOLLOWUP_2",
        }
    }
}

impl MessageStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            MessageStatus::Draft => "DRAFT",
            MessageStatus::Sent => "SENT",
            MessageStatus::Delivered => "DELIVERED",
            MessageStatus::Read => "READ",
            MessageStatus::Failed => "FAILED",
            MessageStatus::Cancelled => "CANCELLED",
            MessageStatus::Skipped => "SKIPPED",
        }
    }

    /// Only failed messages can be queued again.
    pub const fn is_retryable(self) -> bool {
        matches!(self, MessageStatus::Failed)
    }
}

impl Display for MessageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Display for MessageStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub company_id: CompanyId,
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    /// Denormalized by the backend for list views.
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub stage: MessageStage,
    pub status: MessageStatus,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
    #[serde(default, with = "timestamp::option")]
    pub scheduled_for: Option<NaiveDateTime>,
    #[serde(default, with = "timestamp::option")]
    pub sent_at: Option<NaiveDateTime>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl Resource for Message {
    const KIND: ResourceKind = ResourceKind::Messages;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&format!(
                "{} {}",
                self.company_name.as_deref().unwrap_or_default(),
                self.content
            )),
            "type" => text(self.message_type.as_str()),
            "status" => text(self.status.as_str()),
            "stage" => text(self.stage.as_str()),
            "subject" => opt_text(self.subject.as_deref()),
            "sent" => self.sent_at.map(|sent| FieldValue::Date(sent.date())),
            _ => None,
        }
    }
}
