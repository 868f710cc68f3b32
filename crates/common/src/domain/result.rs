use chrono::{DateTime, Utc};
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Barcode not found: {0}")]
    BarcodeNotFound(String),

    #[error("Barcode {barcode} was already scanned at {scanned_location} on {scanned_date}")]
    DuplicateBarcode {
        barcode: String,
        scanned_date: DateTime<Utc>,
        scanned_location: String,
        created_by: String,
    },

    #[error("Barcode {barcode} created on {created_date} has expired after {barcode_expiry_days} days")]
    ExpiredBarcode {
        barcode: String,
        created_date: DateTime<Utc>,
        barcode_expiry_days: u32,
        created_by: String,
    },

    #[error("Barcode {barcode} was selected for a random security check")]
    RandomCheckRequired { barcode: String, created_by: String },

    #[error("Recipient not found for barcode: {0}")]
    RecipientNotFound(String),

    #[error("Barcode already exists: {0}")]
    BarcodeAlreadyExists(String),

    #[error("Invalid barcode status: {0}")]
    InvalidBarcodeStatus(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Email is not registered in the CJSM directory: {0}")]
    EmailNotInCjsmDirectory(String),

    #[error("Invalid sign-in code")]
    InvalidSignInCode,

    #[error("Sign-in code expired")]
    SignInCodeExpired,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("No report recipients configured")]
    NoReportRecipients,

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
