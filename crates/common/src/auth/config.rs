/// Role carried by sender tokens issued after a successful sign-in
pub const ROLE_CREATE_BARCODE: &str = "ROLE_SLM_CREATE_BARCODE";

/// Role carried by mailroom staff tokens
pub const ROLE_SCAN_BARCODE: &str = "ROLE_SLM_SCAN_BARCODE";

/// Configuration for JWT token generation
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_minutes: u64,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_minutes: u64) -> Self {
        Self {
            secret,
            expiration_minutes,
        }
    }
}

/// Configuration for one-time sign-in codes
#[derive(Debug, Clone)]
pub struct SignInCodeConfig {
    pub expiry_minutes: u64,
    pub max_attempts: u32,
}

impl Default for SignInCodeConfig {
    fn default() -> Self {
        Self {
            expiry_minutes: 10,
            max_attempts: 5,
        }
    }
}
