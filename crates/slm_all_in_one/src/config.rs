use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // HTTP configuration
    #[serde(default = "default_http_host")]
    pub http_host: String,

    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request paths excluded from access logs (comma-separated)
    #[serde(default = "default_http_ignored_paths")]
    pub http_ignored_paths: String,

    /// CORS allowed origins (comma-separated list, "*" for all origins, empty to disable)
    #[serde(default)]
    pub http_cors_allowed_origins: String,

    // PostgreSQL configuration
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    #[serde(default = "default_postgres_max_pool_size")]
    pub postgres_max_pool_size: usize,

    /// Path to PostgreSQL migrations directory
    #[serde(default = "default_postgres_migrations_dir")]
    pub postgres_migrations_dir: String,

    /// Path to goose binary
    #[serde(default = "default_postgres_goose_binary_path")]
    pub postgres_goose_binary_path: String,

    // JWT configuration
    /// JWT signing secret, shared with the mailroom token issuer
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_minutes")]
    pub jwt_expiration_minutes: u64,

    // Sign-in codes
    #[serde(default = "default_sign_in_code_expiry_minutes")]
    pub sign_in_code_expiry_minutes: u64,

    #[serde(default = "default_sign_in_code_max_attempts")]
    pub sign_in_code_max_attempts: u32,

    // Barcode checks
    #[serde(default = "default_barcode_expiry_days")]
    pub barcode_expiry_days: u32,

    /// Share of valid checks sent for manual inspection, 0 to 100
    #[serde(default)]
    pub random_check_percentage: u32,

    // Reports
    /// Daily report recipients (comma-separated). The scheduler is off when empty.
    #[serde(default)]
    pub report_recipients: String,

    /// UTC hour at which the previous day's report is sent
    #[serde(default = "default_report_hour_utc")]
    pub report_hour_utc: u32,

    /// Log email bodies, including sign-in codes. Local use only.
    #[serde(default)]
    pub email_log_body: bool,

    // OpenTelemetry configuration
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    #[serde(default = "default_otel_enabled")]
    pub otel_enabled: bool,

    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

// HTTP defaults
fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_http_ignored_paths() -> String {
    "/health".to_string()
}

// PostgreSQL defaults
fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "send_legal_mail".to_string()
}

fn default_postgres_username() -> String {
    "slm".to_string()
}

fn default_postgres_password() -> String {
    "slm".to_string()
}

fn default_postgres_max_pool_size() -> usize {
    10
}

fn default_postgres_migrations_dir() -> String {
    "/home/slm/migrations/postgres".to_string()
}

fn default_postgres_goose_binary_path() -> String {
    "goose".to_string()
}

// JWT defaults
fn default_jwt_secret() -> String {
    "change-me-in-production".to_string()
}

fn default_jwt_expiration_minutes() -> u64 {
    60 * 24
}

// Sign-in defaults
fn default_sign_in_code_expiry_minutes() -> u64 {
    10
}

fn default_sign_in_code_max_attempts() -> u32 {
    5
}

// Barcode defaults
fn default_barcode_expiry_days() -> u32 {
    28
}

fn default_report_hour_utc() -> u32 {
    6
}

// OpenTelemetry defaults
fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_enabled() -> bool {
    false
}

fn default_otel_service_name() -> String {
    "slm-all-in-one".to_string()
}

fn split_comma_separated(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = Config::builder()
            .add_source(Environment::with_prefix("SLM"))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.random_check_percentage > 100 {
            return Err(ConfigError::Message(format!(
                "random_check_percentage must be between 0 and 100, got {}",
                self.random_check_percentage
            )));
        }
        if self.report_hour_utc > 23 {
            return Err(ConfigError::Message(format!(
                "report_hour_utc must be between 0 and 23, got {}",
                self.report_hour_utc
            )));
        }
        Ok(())
    }

    pub fn ignored_paths(&self) -> Vec<String> {
        split_comma_separated(&self.http_ignored_paths)
    }

    pub fn report_recipients(&self) -> Vec<String> {
        split_comma_separated(&self.report_recipients)
    }
}
