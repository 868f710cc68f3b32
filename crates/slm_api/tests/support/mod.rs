#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::auth::{
    AuthTokenProvider, JwtAuthTokenProvider, JwtConfig, NumericSignInCodeProvider,
    SignInCodeConfig,
};
use common::domain::{
    BarcodeEvent, BarcodeEventRepository, CjsmDirectoryEntry, Clock, EmailMessage, EmailSender,
    DomainResult, GetBarcodeHistoryRepoInput, RandomBarcodeCodeGenerator, RandomCheckProvider,
};
use common::memory::{
    InMemoryBarcodeEventRepository, InMemoryBarcodeRepository, InMemoryCjsmDirectoryRepository,
    InMemoryRecipientRepository, InMemorySignInCodeRepository,
};
use slm_api::{
    BarcodeCheckConfig, BarcodeCheckService, BarcodeService, CheckBarcodeRequest, SignInService,
    SlmApiState,
};
use std::sync::{Arc, Mutex};

pub const SENDER: &str = "someone@firm.cjsm.net";
pub const SENDER_ORGANISATION: &str = "Firm LLP";
pub const MAILROOM_USER: &str = "mailroom-user-1";
pub const JWT_SECRET: &str = "test-secret";

/// Clock that only moves when told to
pub struct TestClock {
    now: Mutex<DateTime<Utc>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Always draws the same percentage
pub struct FixedRandom(pub u32);

impl RandomCheckProvider for FixedRandom {
    fn next_percentage(&self) -> u32 {
        self.0
    }
}

/// Keeps sent messages for inspection
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait::async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: EmailMessage) -> DomainResult<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

pub fn directory_entry(email: &str, organisation: &str) -> CjsmDirectoryEntry {
    CjsmDirectoryEntry {
        secure_email: email.to_string(),
        first_name: "Some".to_string(),
        last_name: "One".to_string(),
        organisation: organisation.to_string(),
        town_city: "Leeds".to_string(),
        business_type: "Solicitor".to_string(),
    }
}

/// Services wired to in-memory stores
pub struct Harness {
    pub clock: Arc<TestClock>,
    pub events: InMemoryBarcodeEventRepository,
    pub barcodes: InMemoryBarcodeRepository,
    pub emails: Arc<RecordingEmailSender>,
    pub barcode_service: Arc<BarcodeService>,
    pub check_service: Arc<BarcodeCheckService>,
    pub sign_in_service: Arc<SignInService>,
    pub tokens: Arc<JwtAuthTokenProvider>,
}

impl Harness {
    pub fn new(config: BarcodeCheckConfig) -> Self {
        Self::with_random(config, Arc::new(FixedRandom(99)))
    }

    pub fn with_random(config: BarcodeCheckConfig, random: Arc<dyn RandomCheckProvider>) -> Self {
        let clock = Arc::new(TestClock::new());
        let events = InMemoryBarcodeEventRepository::new();
        let barcodes = InMemoryBarcodeRepository::new();
        let directory = Arc::new(InMemoryCjsmDirectoryRepository::with_entries([
            directory_entry(SENDER, SENDER_ORGANISATION),
        ]));
        let emails = Arc::new(RecordingEmailSender::default());
        let tokens = Arc::new(JwtAuthTokenProvider::new(JwtConfig::new(
            JWT_SECRET.to_string(),
            60,
        )));

        let barcode_service = Arc::new(BarcodeService::new(
            Arc::new(barcodes.clone()),
            Arc::new(events.clone()),
            Arc::new(InMemoryRecipientRepository::new()),
            Arc::new(RandomBarcodeCodeGenerator::new()),
            clock.clone(),
        ));
        let check_service = Arc::new(BarcodeCheckService::new(
            Arc::new(barcodes.clone()),
            Arc::new(events.clone()),
            directory.clone(),
            random,
            clock.clone(),
            config,
        ));
        let sign_in_service = Arc::new(SignInService::new(
            directory,
            Arc::new(InMemorySignInCodeRepository::new()),
            Arc::new(NumericSignInCodeProvider::new()),
            tokens.clone(),
            emails.clone(),
            clock.clone(),
            SignInCodeConfig::default(),
        ));

        Self {
            clock,
            events,
            barcodes,
            emails,
            barcode_service,
            check_service,
            sign_in_service,
            tokens,
        }
    }

    pub fn state(&self) -> SlmApiState {
        SlmApiState {
            barcode_service: self.barcode_service.clone(),
            barcode_check_service: self.check_service.clone(),
            sign_in_service: self.sign_in_service.clone(),
            auth_token_provider: self.tokens.clone(),
        }
    }

    pub fn token(&self, subject: &str, role: &str) -> String {
        self.tokens
            .generate_token(subject, vec![role.to_string()])
            .unwrap()
    }

    pub async fn create(&self) -> String {
        self.barcode_service.create_barcode(SENDER).await.unwrap()
    }

    pub async fn check(&self, barcode: &str, location: &str) -> DomainResult<String> {
        self.check_service
            .check_barcode(CheckBarcodeRequest {
                user_id: MAILROOM_USER.to_string(),
                barcode: barcode.to_string(),
                location: location.to_string(),
            })
            .await
    }

    pub async fn history(&self, barcode: &str) -> Vec<BarcodeEvent> {
        self.events
            .find_events_by_barcode(GetBarcodeHistoryRepoInput {
                barcode: barcode.to_string(),
            })
            .await
            .unwrap()
    }
}
