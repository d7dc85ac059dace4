use serde::Deserialize;
use validator::Validate;

use crate::domain::email_account::{NewEmailAccount, UpdateEmailAccount};
use crate::domain::mutation::Mutation;
use crate::domain::resource::ResourceKind;
use crate::domain::settings::is_masked;
use crate::domain::types::{ContactEmail, EmailAccountId, NonEmptyString};
use crate::forms::{FormError, non_blank};

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_daily_limit() -> u32 {
    100
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
/// Form data for adding a sending mailbox.
pub struct AddEmailAccountForm {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_smtp_host")]
    #[validate(length(min = 1))]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    #[validate(range(min = 1))]
    pub smtp_port: u16,
    /// Defaults to the email address.
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[validate(length(min = 1))]
    pub smtp_password: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "default_daily_limit")]
    #[validate(range(min = 1, max = 2000))]
    pub daily_limit: u32,
}

impl AddEmailAccountForm {
    pub fn into_new_account(self) -> Result<NewEmailAccount, FormError> {
        self.validate()?;
        let email = ContactEmail::new(self.email)?;
        let smtp_username = non_blank(self.smtp_username.as_deref())
            .map_or_else(|| email.as_str().to_string(), str::to_string);

        Ok(NewEmailAccount {
            display_name: non_blank(self.display_name.as_deref()).map(str::to_string),
            smtp_host: NonEmptyString::new(self.smtp_host)?.into_inner(),
            smtp_port: self.smtp_port,
            smtp_username,
            smtp_password: self.smtp_password,
            is_active: self.is_active,
            is_default: self.is_default,
            daily_limit: self.daily_limit,
            email,
        })
    }

    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        let account = self.into_new_account()?;
        Ok(Mutation::create(ResourceKind::EmailAccounts, &account)?)
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// Edits to an existing mailbox; a blank or masked password keeps the
/// stored one.
pub struct EditEmailAccountForm {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub smtp_host: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub smtp_username: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 1, max = 2000))]
    pub daily_limit: Option<u32>,
}

impl EditEmailAccountForm {
    pub fn into_update(self) -> Result<(EmailAccountId, UpdateEmailAccount), FormError> {
        self.validate()?;
        let id = EmailAccountId::new(self.id)?;
        let email = non_blank(self.email.as_deref())
            .map(ContactEmail::new)
            .transpose()?;
        let smtp_password = self
            .smtp_password
            .filter(|password| !password.trim().is_empty() && !is_masked(password));

        Ok((
            id,
            UpdateEmailAccount {
                email,
                display_name: self.display_name.map(|name| name.trim().to_string()),
                smtp_host: self.smtp_host.map(|host| host.trim().to_string()),
                smtp_port: self.smtp_port,
                smtp_username: non_blank(self.smtp_username.as_deref()).map(str::to_string),
                smtp_password,
                is_active: self.is_active,
                is_default: self.is_default,
                daily_limit: self.daily_limit,
            },
        ))
    }

    pub fn into_mutation(self) -> Result<Mutation, FormError> {
        let (id, update) = self.into_update()?;
        Ok(Mutation::update(ResourceKind::EmailAccounts, id.get(), &update)?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::settings::mask_secret;

    #[test]
    fn new_account_takes_backend_defaults() {
        let form: AddEmailAccountForm = serde_json::from_value(json!({
            "email": " Sales@Acme.IO ",
            "smtp_password": "app-password",
        }))
        .unwrap();

        let account = form.into_new_account().unwrap();
        assert_eq!(account.email.as_str(), "sales@acme.io");
        assert_eq!(account.smtp_username, "sales@acme.io");
        assert_eq!(account.smtp_host, "smtp.gmail.com");
        assert_eq!(account.smtp_port, 587);
        assert_eq!(account.daily_limit, 100);
        assert!(account.is_active);
    }

    #[test]
    fn missing_password_is_rejected() {
        let form: AddEmailAccountForm = serde_json::from_value(json!({
            "email": "sales@acme.io",
            "smtp_password": "",
        }))
        .unwrap();
        assert!(matches!(form.into_new_account(), Err(FormError::Validation(_))));
    }

    #[test]
    fn masked_password_is_not_resent() {
        let form = EditEmailAccountForm {
            id: 2,
            smtp_password: Some(mask_secret("app-password-123")),
            daily_limit: Some(150),
            ..EditEmailAccountForm::default()
        };

        let request = form.into_mutation().unwrap().request().unwrap();
        assert_eq!(request.path, "email-accounts/2");
        assert_eq!(request.body, Some(json!({ "daily_limit": 150 })));
    }
}
