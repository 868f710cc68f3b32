pub mod auth;
pub mod domain;
pub mod email;
pub mod garde;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod telemetry;

// Re-export mocks when testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use auth::{MockAuthTokenProvider, MockSignInCodeProvider, MockSignInCodeRepository};
#[cfg(any(test, feature = "testing"))]
pub use domain::{
    MockBarcodeCodeGenerator, MockBarcodeEventRepository, MockBarcodeRepository,
    MockCjsmDirectoryRepository, MockClock, MockEmailSender, MockRandomCheckProvider,
    MockRecipientRepository,
};
