mod barcode_event_repository;
mod barcode_repository;
mod cjsm_directory_repository;
mod client;
mod config;
mod recipient_repository;
mod sign_in_code_repository;

pub use barcode_event_repository::*;
pub use barcode_repository::*;
pub use cjsm_directory_repository::*;
pub use client::*;
pub use config::*;
pub use recipient_repository::*;
pub use sign_in_code_repository::*;

/// PostgreSQL error code for unique_violation
pub(crate) const UNIQUE_VIOLATION: &str = "23505";
