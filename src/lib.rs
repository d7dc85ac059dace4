#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod error_conversions;
#[cfg(feature = "data")]
pub mod filters;
#[cfg(feature = "data")]
pub mod forms;
#[cfg(feature = "data")]
pub mod pagination;

#[cfg(feature = "client")]
pub mod dashboard;
#[cfg(feature = "client")]
pub mod dto;
#[cfg(feature = "client")]
pub mod models;
#[cfg(feature = "client")]
pub mod repository;
#[cfg(feature = "client")]
pub mod services;

#[cfg(feature = "client")]
pub use dashboard::{Dashboard, bootstrap, init_logging};
