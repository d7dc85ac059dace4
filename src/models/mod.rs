//! Wire-level models: configuration and raw listing payloads.

pub mod config;
pub mod listing;
