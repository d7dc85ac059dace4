use serde::Deserialize;
use validator::Validate;

use crate::domain::message::MessageType;
use crate::domain::mutation::Mutation;
use crate::domain::resource::ResourceKind;
use crate::domain::template::NewTemplate;
use crate::domain::types::TemplateId;
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Form data for creating or editing a message template.
pub struct TemplateForm {
    /// Present when editing an existing template.
    #[serde(default)]
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(rename = "type")]
    pub template_type: MessageType,
    #[serde(default)]
    pub subject: Option<String>,
    #[validate(length(min = 1))]
    pub content: String,
    #[serde(default)]
    pub variables: Option<String>,
}

impl TemplateForm {
    pub fn into_new_template(self) -> Result<(Option<TemplateId>, NewTemplate), FormError> {
        self.validate()?;

        let id = self.id.map(TemplateId::new).transpose()?;
        let subject = non_blank(self.subject.as_deref()).map(str::to_string);
        if self.template_type == MessageType::Email && subject.is_none() {
            return Err(FormError::MissingSubject);
        }
        let variables = non_blank(self.variables.as_deref())
            .map(|raw| {
                serde_json::from_str::<Vec<String>>(raw)
                    .map(|_| raw.to_string())
                    .map_err(|_| FormError::InvalidValue("variables must be a JSON list".into()))
            })
            .transpose()?;

        Ok((
            id,
            NewTemplate {
                name: self.name.trim().to_string(),
                template_type: self.template_type,
                subject,
                content: self.content,
                variables,
            },
        ))
    }

    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        let (id, template) = self.into_new_template()?;
        let mutation = match id {
            Some(id) => Mutation::update(ResourceKind::Templates, id.get(), &template)?,
            None => Mutation::create(ResourceKind::Templates, &template)?,
        };
        Ok(mutation)
    }
}

/// Renders template content for a preview pane, stripping unsafe markup.
pub fn preview_html(content: &str) -> String {
    ammonia::clean(&content.replace('\n', "<br>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutation::Method;

    fn form(template_type: MessageType, subject: Option<&str>) -> TemplateForm {
        TemplateForm {
            id: None,
            name: "Intro".into(),
            template_type,
            subject: subject.map(str::to_string),
            content: "Hello {{company_name}}".into(),
            variables: Some(r#"["company_name"]"#.into()),
        }
    }

    #[test]
    fn email_templates_require_subject() {
        assert!(matches!(
            form(MessageType::Email, Some("  ")).into_new_template(),
            Err(FormError::MissingSubject)
        ));
        assert!(form(MessageType::Whatsapp, None).into_new_template().is_ok());
    }

    #[test]
    fn editing_produces_put() {
        let mut edit = form(MessageType::Email, Some("Hi"));
        edit.id = Some(8);
        let request = edit.into_mutation().unwrap().request().unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.path, "templates/8");
    }

    #[test]
    fn variables_must_be_a_list() {
        let mut bad = form(MessageType::Whatsapp, None);
        bad.variables = Some("company_name".into());
        assert!(matches!(
            bad.into_new_template(),
            Err(FormError::InvalidValue(_))
        ));
    }

    #[test]
    fn preview_strips_scripts() {
        let html = preview_html("Hi<script>alert(1)</script>\nthere");
        assert!(!html.contains("script"));
        assert!(html.contains("<br>"));
    }
}
