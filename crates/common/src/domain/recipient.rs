use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Declared recipient of the mail a barcode was issued for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub id: String,
    pub barcode: String,
    pub recipient_name: String,
    pub prison_code: String,
    pub prison_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Internal input with generated ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecipientRepoInput {
    pub id: String,
    pub barcode: String,
    pub recipient_name: String,
    pub prison_code: String,
    pub prison_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_by: String,
}

/// Input for looking up the recipient declared for a barcode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRecipientByBarcodeRepoInput {
    pub barcode: String,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RecipientRepository: Send + Sync {
    async fn create_recipient(&self, input: CreateRecipientRepoInput) -> DomainResult<Recipient>;

    async fn get_recipient_by_barcode(
        &self,
        input: GetRecipientByBarcodeRepoInput,
    ) -> DomainResult<Option<Recipient>>;
}
