use chrono::NaiveDate;
use common::domain::{
    AppendBarcodeEventRepoInput, BarcodeCodeGenerator, BarcodeEventRepository, BarcodeRepository,
    BarcodeStatus, Clock, CreateBarcodeRepoInput, CreateRecipientRepoInput, DomainError,
    DomainResult, GetBarcodeRepoInput, GetRecipientByBarcodeRepoInput, Recipient,
    RecipientRepository,
};
use common::garde::validate_struct;
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The person a barcode is issued for
#[derive(Debug, Clone, Validate)]
pub struct RecipientDetails {
    #[garde(length(min = 1, max = 60))]
    pub recipient_name: String,
    #[garde(length(min = 1, max = 10))]
    pub prison_code: String,
    #[garde(pattern(r"^[A-Za-z][0-9]{4}[A-Za-z]{2}$"))]
    pub prison_number: Option<String>,
    #[garde(skip)]
    pub date_of_birth: Option<NaiveDate>,
}

/// Request to issue a barcode for a declared recipient
#[derive(Debug, Clone, Validate)]
pub struct CreateBarcodeRequest {
    #[garde(length(min = 1))]
    pub user_id: String,
    #[garde(dive)]
    pub recipient: RecipientDetails,
}

#[derive(Debug, Clone, Validate)]
pub struct GetRecipientRequest {
    #[garde(length(min = 1))]
    pub barcode: String,
}

/// Issues barcodes and records who they are addressed to
pub struct BarcodeService {
    barcode_repository: Arc<dyn BarcodeRepository>,
    event_repository: Arc<dyn BarcodeEventRepository>,
    recipient_repository: Arc<dyn RecipientRepository>,
    code_generator: Arc<dyn BarcodeCodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl BarcodeService {
    pub fn new(
        barcode_repository: Arc<dyn BarcodeRepository>,
        event_repository: Arc<dyn BarcodeEventRepository>,
        recipient_repository: Arc<dyn RecipientRepository>,
        code_generator: Arc<dyn BarcodeCodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            barcode_repository,
            event_repository,
            recipient_repository,
            code_generator,
            clock,
        }
    }

    /// Issue a new unique barcode and record its `CREATED` event
    #[instrument(skip(self))]
    pub async fn create_barcode(&self, user_id: &str) -> DomainResult<String> {
        let code = loop {
            let candidate = self.code_generator.generate_code();

            if self
                .barcode_repository
                .barcode_exists(GetBarcodeRepoInput {
                    code: candidate.clone(),
                })
                .await?
            {
                debug!("generated barcode already exists, retrying");
                continue;
            }

            match self
                .barcode_repository
                .create_barcode(CreateBarcodeRepoInput { code: candidate })
                .await
            {
                Ok(barcode) => break barcode.code,
                // Lost a race with a concurrent insert of the same code
                Err(DomainError::BarcodeAlreadyExists(_)) => continue,
                Err(e) => return Err(e),
            }
        };

        self.event_repository
            .append_event(AppendBarcodeEventRepoInput {
                barcode: code.clone(),
                user_id: user_id.to_string(),
                status: BarcodeStatus::Created,
                location: String::new(),
                created_at: self.clock.now(),
            })
            .await?;

        debug!(barcode = %code, "barcode created");
        Ok(code)
    }

    /// Validate the recipient, issue a barcode and store the recipient against it
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create_barcode_for_recipient(
        &self,
        request: CreateBarcodeRequest,
    ) -> DomainResult<Recipient> {
        validate_struct(&request)?;
        self.validate_identity(&request.recipient)?;

        let barcode = self.create_barcode(&request.user_id).await?;
        let recipient = request.recipient;

        let recipient = self
            .recipient_repository
            .create_recipient(CreateRecipientRepoInput {
                id: xid::new().to_string(),
                barcode,
                recipient_name: recipient.recipient_name.trim().to_string(),
                prison_code: recipient.prison_code.trim().to_uppercase(),
                prison_number: recipient.prison_number.map(|n| n.to_uppercase()),
                date_of_birth: recipient.date_of_birth,
                created_by: request.user_id,
            })
            .await?;

        debug!(barcode = %recipient.barcode, recipient_id = %recipient.id, "recipient recorded");
        Ok(recipient)
    }

    #[instrument(skip(self, request), fields(barcode = %request.barcode))]
    pub async fn get_recipient(&self, request: GetRecipientRequest) -> DomainResult<Recipient> {
        validate_struct(&request)?;

        self.recipient_repository
            .get_recipient_by_barcode(GetRecipientByBarcodeRepoInput {
                barcode: request.barcode.clone(),
            })
            .await?
            .ok_or(DomainError::RecipientNotFound(request.barcode))
    }

    /// Exactly one of prison number and date of birth identifies the recipient
    fn validate_identity(&self, recipient: &RecipientDetails) -> DomainResult<()> {
        match (&recipient.prison_number, recipient.date_of_birth) {
            (Some(_), None) => Ok(()),
            (None, Some(date_of_birth)) => {
                if date_of_birth >= self.clock.now().date_naive() {
                    return Err(DomainError::ValidationError(
                        "date_of_birth: must be in the past".to_string(),
                    ));
                }
                Ok(())
            }
            (Some(_), Some(_)) => Err(DomainError::ValidationError(
                "provide either prison_number or date_of_birth, not both".to_string(),
            )),
            (None, None) => Err(DomainError::ValidationError(
                "one of prison_number or date_of_birth is required".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::domain::{
        Barcode, BarcodeEvent, MockBarcodeCodeGenerator, MockBarcodeEventRepository,
        MockBarcodeRepository, MockClock, MockRecipientRepository,
    };
    use mockall::Sequence;

    const USER: &str = "someone@firm.cjsm.net";

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap());
        clock
    }

    fn created_event_repo() -> MockBarcodeEventRepository {
        let mut repo = MockBarcodeEventRepository::new();
        repo.expect_append_event()
            .withf(|input| input.status == BarcodeStatus::Created && input.user_id == USER)
            .times(1)
            .returning(|input| {
                Ok(BarcodeEvent {
                    id: 1,
                    barcode: input.barcode,
                    user_id: input.user_id,
                    status: input.status,
                    location: input.location,
                    created_at: input.created_at,
                })
            });
        repo
    }

    fn recipient_repo() -> MockRecipientRepository {
        let mut repo = MockRecipientRepository::new();
        repo.expect_create_recipient().returning(|input| {
            Ok(Recipient {
                id: input.id,
                barcode: input.barcode,
                recipient_name: input.recipient_name,
                prison_code: input.prison_code,
                prison_number: input.prison_number,
                date_of_birth: input.date_of_birth,
                created_by: input.created_by,
                created_at: Some(Utc::now()),
            })
        });
        repo
    }

    fn details(prison_number: Option<&str>, date_of_birth: Option<NaiveDate>) -> RecipientDetails {
        RecipientDetails {
            recipient_name: "John Smith".to_string(),
            prison_code: "lei".to_string(),
            prison_number: prison_number.map(str::to_string),
            date_of_birth,
        }
    }

    fn service_with(
        barcode_repo: MockBarcodeRepository,
        event_repo: MockBarcodeEventRepository,
        generator: MockBarcodeCodeGenerator,
    ) -> BarcodeService {
        BarcodeService::new(
            Arc::new(barcode_repo),
            Arc::new(event_repo),
            Arc::new(recipient_repo()),
            Arc::new(generator),
            Arc::new(clock()),
        )
    }

    #[tokio::test]
    async fn test_create_barcode_retries_existing_and_racing_codes() {
        let mut generator = MockBarcodeCodeGenerator::new();
        let mut seq = Sequence::new();
        for code in ["111111111111", "222222222222", "333333333333"] {
            generator
                .expect_generate_code()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move || code.to_string());
        }

        let mut barcode_repo = MockBarcodeRepository::new();
        barcode_repo
            .expect_barcode_exists()
            .returning(|input| Ok(input.code == "111111111111"));
        barcode_repo
            .expect_create_barcode()
            .returning(|input| match input.code.as_str() {
                "222222222222" => Err(DomainError::BarcodeAlreadyExists(input.code)),
                _ => Ok(Barcode {
                    code: input.code,
                    created_at: Some(Utc::now()),
                }),
            });

        let service = service_with(barcode_repo, created_event_repo(), generator);

        assert_eq!(service.create_barcode(USER).await.unwrap(), "333333333333");
    }

    #[tokio::test]
    async fn test_create_barcode_propagates_repository_errors() {
        let mut generator = MockBarcodeCodeGenerator::new();
        generator
            .expect_generate_code()
            .returning(|| "111111111111".to_string());
        let mut barcode_repo = MockBarcodeRepository::new();
        barcode_repo.expect_barcode_exists().returning(|_| Ok(false));
        barcode_repo
            .expect_create_barcode()
            .returning(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("down"))));
        let mut event_repo = MockBarcodeEventRepository::new();
        event_repo.expect_append_event().never();

        let service = service_with(barcode_repo, event_repo, generator);

        assert!(matches!(
            service.create_barcode(USER).await,
            Err(DomainError::RepositoryError(_))
        ));
    }

    fn issuing_service() -> BarcodeService {
        let mut generator = MockBarcodeCodeGenerator::new();
        generator
            .expect_generate_code()
            .returning(|| "123456789012".to_string());
        let mut barcode_repo = MockBarcodeRepository::new();
        barcode_repo.expect_barcode_exists().returning(|_| Ok(false));
        barcode_repo.expect_create_barcode().returning(|input| {
            Ok(Barcode {
                code: input.code,
                created_at: Some(Utc::now()),
            })
        });
        service_with(barcode_repo, created_event_repo(), generator)
    }

    fn no_issue_service() -> BarcodeService {
        let mut barcode_repo = MockBarcodeRepository::new();
        barcode_repo.expect_create_barcode().never();
        service_with(
            barcode_repo,
            MockBarcodeEventRepository::new(),
            MockBarcodeCodeGenerator::new(),
        )
    }

    #[tokio::test]
    async fn test_create_for_recipient_normalises_prison_fields() {
        let service = issuing_service();

        let recipient = service
            .create_barcode_for_recipient(CreateBarcodeRequest {
                user_id: USER.to_string(),
                recipient: details(Some("a1234bc"), None),
            })
            .await
            .unwrap();

        assert_eq!(recipient.barcode, "123456789012");
        assert_eq!(recipient.prison_number.as_deref(), Some("A1234BC"));
        assert_eq!(recipient.prison_code, "LEI");
        assert_eq!(recipient.created_by, USER);
        assert!(!recipient.id.is_empty());
    }

    #[tokio::test]
    async fn test_create_for_recipient_with_date_of_birth() {
        let service = issuing_service();
        let dob = NaiveDate::from_ymd_opt(1980, 1, 31).unwrap();

        let recipient = service
            .create_barcode_for_recipient(CreateBarcodeRequest {
                user_id: USER.to_string(),
                recipient: details(None, Some(dob)),
            })
            .await
            .unwrap();

        assert_eq!(recipient.date_of_birth, Some(dob));
        assert!(recipient.prison_number.is_none());
    }

    #[tokio::test]
    async fn test_recipient_identity_rules() {
        let service = no_issue_service();
        let past = NaiveDate::from_ymd_opt(1980, 1, 31);
        let future = NaiveDate::from_ymd_opt(2030, 1, 1);

        for recipient in [
            details(None, None),
            details(Some("A1234BC"), past),
            details(None, future),
            details(Some("12345"), None),
        ] {
            let result = service
                .create_barcode_for_recipient(CreateBarcodeRequest {
                    user_id: USER.to_string(),
                    recipient,
                })
                .await;
            assert!(
                matches!(result, Err(DomainError::ValidationError(_))),
                "unexpected {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_get_recipient_not_found() {
        let mut recipients = MockRecipientRepository::new();
        recipients
            .expect_get_recipient_by_barcode()
            .returning(|_| Ok(None));
        let service = BarcodeService::new(
            Arc::new(MockBarcodeRepository::new()),
            Arc::new(MockBarcodeEventRepository::new()),
            Arc::new(recipients),
            Arc::new(MockBarcodeCodeGenerator::new()),
            Arc::new(clock()),
        );

        let result = service
            .get_recipient(GetRecipientRequest {
                barcode: "123456789012".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::RecipientNotFound(code)) if code == "123456789012"));
    }
}
