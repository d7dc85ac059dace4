//! Stateful services built on the transport traits.

use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::filters::FilterError;
use crate::forms::FormError;
use crate::repository::errors::ApiError;

pub mod cache;
pub mod controller;
pub mod export;
pub mod settings;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("view has been unmounted")]
    Unmounted,
}

pub type ServiceResult<T> = Result<T, ServiceError>;
