use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Number of digits in an issued barcode
pub const BARCODE_LENGTH: usize = 12;

/// Barcode identity. The code is the primary key and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barcode {
    pub code: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for persisting a barcode identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBarcodeRepoInput {
    pub code: String,
}

/// Input for looking up a barcode identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBarcodeRepoInput {
    pub code: String,
}

/// Repository trait for barcode identities
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BarcodeRepository: Send + Sync {
    /// Check whether a code has already been persisted
    async fn barcode_exists(&self, input: GetBarcodeRepoInput) -> DomainResult<bool>;

    /// Persist a new code. Fails with `BarcodeAlreadyExists` if the code is taken.
    async fn create_barcode(&self, input: CreateBarcodeRepoInput) -> DomainResult<Barcode>;

    /// Persist the code if it is not already present and return the stored identity
    async fn get_or_create_barcode(&self, input: CreateBarcodeRepoInput) -> DomainResult<Barcode>;
}

/// Source of candidate barcode codes
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait BarcodeCodeGenerator: Send + Sync {
    fn generate_code(&self) -> String;
}

/// Generates uniformly random numeric codes of `BARCODE_LENGTH` digits
pub struct RandomBarcodeCodeGenerator;

impl RandomBarcodeCodeGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RandomBarcodeCodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl BarcodeCodeGenerator for RandomBarcodeCodeGenerator {
    fn generate_code(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..BARCODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_code_is_twelve_digits() {
        let generator = RandomBarcodeCodeGenerator::new();
        for _ in 0..100 {
            let code = generator.generate_code();
            assert_eq!(code.len(), BARCODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_generated_codes_differ() {
        let generator = RandomBarcodeCodeGenerator::default();
        let first = generator.generate_code();
        let second = generator.generate_code();
        assert_ne!(first, second);
    }
}
