//! Dashboard-wide settings as exposed by `GET /settings`.

use serde::{Deserialize, Deserializer, Serialize};

/// Colour scheme preference.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralSettings {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_website: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub theme: Theme,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            company_website: String::new(),
            timezone: default_timezone(),
            language: default_language(),
            theme: Theme::default(),
        }
    }
}

/// SMTP settings. The password arrives masked from the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmailSettings {
    #[serde(default)]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port", deserialize_with = "port_from_any")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_username: String,
    #[serde(default)]
    pub smtp_password: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub from_name: String,
}

fn default_smtp_port() -> u16 {
    587
}

/// The settings table stores every value as text, so the port may arrive as
/// `"587"` or `587`.
fn port_from_any<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(raw) if raw.trim().is_empty() => Ok(default_smtp_port()),
        Port::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid smtp port `{raw}`"))),
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: String::new(),
            from_name: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationSettings {
    #[serde(default = "enabled")]
    pub email_notifications: bool,
    #[serde(default = "enabled")]
    pub reply_notifications: bool,
    #[serde(default)]
    pub daily_reports: bool,
    #[serde(default = "enabled")]
    pub weekly_reports: bool,
}

fn enabled() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            reply_notifications: true,
            daily_reports: false,
            weekly_reports: true,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

impl Settings {
    pub fn theme(&self) -> Theme {
        self.general.theme
    }
}

/// Independently saved group of settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingsSection {
    General,
    Email,
    Notifications,
}

impl SettingsSection {
    pub const fn path(self) -> &'static str {
        match self {
            SettingsSection::General => "general",
            SettingsSection::Email => "email",
            SettingsSection::Notifications => "notifications",
        }
    }
}

/// Masks a secret for display: the first and last four characters survive
/// when the secret is longer than eight characters.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}****{tail}")
}

/// Returns `true` if `value` looks like a secret masked by [`mask_secret`].
pub fn is_masked(value: &str) -> bool {
    value.contains("****")
}
