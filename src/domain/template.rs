use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::message::MessageType;
use crate::domain::resource::ResourceKind;
use crate::domain::types::TemplateId;
use crate::domain::{Resource, text, timestamp};
use crate::filters::FieldValue;

/// Reusable message body with `{{placeholder}}` variables.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: MessageType,
    #[serde(default)]
    pub subject: Option<String>,
    pub content: String,
    /// JSON-encoded list of variable names, as stored by the backend.
    #[serde(default)]
    pub variables: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

impl Template {
    /// Names of the `{{placeholders}}` used in the subject and body.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        for source in [self.subject.as_deref().unwrap_or_default(), &self.content] {
            let mut rest = source;
            while let Some(start) = rest.find("{{") {
                let after = &rest[start + 2..];
                let Some(end) = after.find("}}") else {
                    break;
                };
                let name = after[..end].trim().to_string();
                if !name.is_empty() && !names.contains(&name) {
                    names.push(name);
                }
                rest = &after[end + 2..];
            }
        }
        names
    }
}

impl Resource for Template {
    const KIND: ResourceKind = ResourceKind::Templates;

    fn record_id(&self) -> i64 {
        self.id.get()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "search" => text(&format!("{} {}", self.name, self.content)),
            "type" => text(self.template_type.as_str()),
            _ => None,
        }
    }
}

/// Payload for creating or replacing a template.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: MessageType,
    pub subject: Option<String>,
    pub content: String,
    pub variables: Option<String>,
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn placeholders_are_collected_once() {
        let template = Template {
            id: TemplateId::new(1).unwrap(),
            name: "Intro".into(),
            template_type: MessageType::Email,
            subject: Some("Hi {{company_name}}".into()),
            content: "Dear {{ company_name }}, we build for {{industry}}. {{broken".into(),
            variables: None,
            created_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        assert_eq!(template.placeholders(), vec!["company_name", "industry"]);
    }
}
