//! Error conversion glue between layers.
//!
//! The domain layer must not depend on form or transport error types, so the
//! conversions live here.

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::pagination::PageError;
#[cfg(feature = "client")]
use crate::repository::errors::ApiError;

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::NonPositiveId => FormError::InvalidId,
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::EmptyString => FormError::InvalidName,
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            TypeConstraintError::InvalidUuid => FormError::InvalidValue(err.to_string()),
            TypeConstraintError::InvalidValue(message) => FormError::InvalidValue(message),
        }
    }
}

#[cfg(feature = "client")]
impl From<TypeConstraintError> for ApiError {
    fn from(err: TypeConstraintError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

/// A page that breaks its own invariants can only come from a bad payload.
#[cfg(feature = "client")]
impl From<PageError> for ApiError {
    fn from(err: PageError) -> Self {
        ApiError::Decode(err.to_string())
    }
}
