mod barcode_check_service;
mod barcode_locks;
mod barcode_service;
mod report_scheduler;
mod report_service;
mod sign_in_service;

pub use barcode_check_service::*;
pub use barcode_locks::*;
pub use barcode_service::*;
pub use report_scheduler::*;
pub use report_service::*;
pub use sign_in_service::*;
