use crate::auth::AuthClaims;
use crate::domain::DomainResult;

/// Trait for authentication token operations (JWT access tokens)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait AuthTokenProvider: Send + Sync {
    /// Generate an access token for a subject with the given roles
    fn generate_token(&self, subject: &str, roles: Vec<String>) -> DomainResult<String>;

    /// Validate an access token and return its claims
    fn validate_token(&self, token: &str) -> DomainResult<AuthClaims>;
}
