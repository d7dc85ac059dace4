//! Validated user input that turns into mutations or settings payloads.

use thiserror::Error;
use validator::ValidationErrors;

pub mod automation;
pub mod batch;
pub mod campaign;
pub mod company;
pub mod email_account;
pub mod product;
pub mod settings;
pub mod template;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid id")]
    InvalidId,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid url")]
    InvalidUrl,

    #[error("email templates need a subject")]
    MissingSubject,

    #[error("nothing selected")]
    EmptySelection,

    #[error("second follow-up must come after the first")]
    FollowupOrder,

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Trims the value, mapping blank input to `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
