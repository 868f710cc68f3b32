//! In-memory repositories used by tests and local runs without PostgreSQL.

mod barcode_event_repository;
mod barcode_repository;
mod cjsm_directory_repository;
mod recipient_repository;
mod sign_in_code_repository;

pub use barcode_event_repository::*;
pub use barcode_repository::*;
pub use cjsm_directory_repository::*;
pub use recipient_repository::*;
pub use sign_in_code_repository::*;
