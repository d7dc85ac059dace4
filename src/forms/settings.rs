use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::settings::{
    EmailSettings, GeneralSettings, NotificationSettings, Theme, is_masked, mask_secret,
};
use crate::domain::types::{ContactEmail, WebsiteUrl};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
/// General settings; unset fields are left unchanged.
pub struct GeneralSettingsForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 8))]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl GeneralSettingsForm {
    /// Validates the form, normalizing the website url in place.
    pub fn check(mut self) -> Result<Self, FormError> {
        self.validate()?;
        if let Some(website) = non_blank(self.company_website.as_deref()) {
            self.company_website = Some(WebsiteUrl::new(website)?.into_inner());
        }
        Ok(self)
    }

    pub fn apply(&self, general: &mut GeneralSettings) {
        if let Some(name) = &self.company_name {
            general.company_name = name.clone();
        }
        if let Some(website) = &self.company_website {
            general.company_website = website.clone();
        }
        if let Some(timezone) = &self.timezone {
            general.timezone = timezone.clone();
        }
        if let Some(language) = &self.language {
            general.language = language.clone();
        }
        if let Some(theme) = self.theme {
            general.theme = theme;
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
/// SMTP settings; a masked or blank password keeps the stored one.
pub struct EmailSettingsForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub smtp_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub smtp_port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp_password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_name: Option<String>,
}

impl EmailSettingsForm {
    pub fn check(mut self) -> Result<Self, FormError> {
        self.validate()?;
        if let Some(from_email) = non_blank(self.from_email.as_deref()) {
            self.from_email = Some(ContactEmail::new(from_email)?.into_inner());
        }
        if self
            .smtp_password
            .as_deref()
            .is_some_and(|password| password.trim().is_empty() || is_masked(password))
        {
            self.smtp_password = None;
        }
        Ok(self)
    }

    /// Updates the local copy; the stored password is never echoed back, so
    /// the masked placeholder is kept.
    pub fn apply(&self, email: &mut EmailSettings) {
        if let Some(server) = &self.smtp_server {
            email.smtp_server = server.clone();
        }
        if let Some(port) = self.smtp_port {
            email.smtp_port = port;
        }
        if let Some(username) = &self.smtp_username {
            email.smtp_username = username.clone();
        }
        if let Some(password) = &self.smtp_password {
            email.smtp_password = mask_secret(password);
        }
        if let Some(from_email) = &self.from_email {
            email.from_email = from_email.clone();
        }
        if let Some(from_name) = &self.from_name {
            email.from_name = from_name.clone();
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct NotificationSettingsForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_notifications: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_reports: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_reports: Option<bool>,
}

impl NotificationSettingsForm {
    pub fn check(self) -> Result<Self, FormError> {
        self.validate()?;
        Ok(self)
    }

    pub fn apply(&self, notifications: &mut NotificationSettings) {
        if let Some(value) = self.email_notifications {
            notifications.email_notifications = value;
        }
        if let Some(value) = self.reply_notifications {
            notifications.reply_notifications = value;
        }
        if let Some(value) = self.daily_reports {
            notifications.daily_reports = value;
        }
        if let Some(value) = self.weekly_reports {
            notifications.weekly_reports = value;
        }
    }
}
