use crate::domain::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};

/// Number of digits in a one-time sign-in code
pub const SIGN_IN_CODE_LENGTH: usize = 6;

// =============================================================================
// Domain Types
// =============================================================================

/// Pending one-time sign-in code. Only the hash of the code is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCode {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// Input for storing a code, replacing any pending code for the same email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertSignInCodeInput {
    pub email: String,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

/// Input for operations keyed by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInCodeByEmailInput {
    pub email: String,
}

/// Output from generating a sign-in code
#[derive(Debug, Clone)]
pub struct GenerateSignInCodeOutput {
    /// The code to email to the user
    pub raw_code: String,
    /// The hash of the code (for storage)
    pub code_hash: String,
}

// =============================================================================
// Traits
// =============================================================================

/// Repository trait for pending sign-in codes
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SignInCodeRepository: Send + Sync {
    async fn upsert_sign_in_code(&self, input: UpsertSignInCodeInput) -> DomainResult<SignInCode>;

    async fn get_sign_in_code(&self, input: SignInCodeByEmailInput)
        -> DomainResult<Option<SignInCode>>;

    /// Record a failed attempt and return the new attempt count
    async fn increment_sign_in_code_attempts(&self, input: SignInCodeByEmailInput)
        -> DomainResult<u32>;

    async fn delete_sign_in_code(&self, input: SignInCodeByEmailInput) -> DomainResult<()>;
}

/// Trait for sign-in code generation and hashing
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait SignInCodeProvider: Send + Sync {
    fn generate_code(&self) -> GenerateSignInCodeOutput;

    fn hash_code(&self, raw_code: &str) -> String;
}

// =============================================================================
// Implementation
// =============================================================================

/// Random numeric codes hashed with SHA-256
pub struct NumericSignInCodeProvider;

impl NumericSignInCodeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NumericSignInCodeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SignInCodeProvider for NumericSignInCodeProvider {
    fn generate_code(&self) -> GenerateSignInCodeOutput {
        let mut rng = rand::thread_rng();
        let raw_code: String = (0..SIGN_IN_CODE_LENGTH)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        let code_hash = self.hash_code(&raw_code);

        GenerateSignInCodeOutput {
            raw_code,
            code_hash,
        }
    }

    fn hash_code(&self, raw_code: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(raw_code.trim().as_bytes());
        hex::encode(hasher.finalize())
    }
}
