use crate::domain::{
    CreateRecipientRepoInput, DomainError, DomainResult, GetRecipientByBarcodeRepoInput,
    Recipient, RecipientRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory recipients keyed by barcode
#[derive(Clone)]
pub struct InMemoryRecipientRepository {
    recipients: Arc<RwLock<HashMap<String, Recipient>>>,
}

impl InMemoryRecipientRepository {
    pub fn new() -> Self {
        Self {
            recipients: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRecipientRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecipientRepository for InMemoryRecipientRepository {
    async fn create_recipient(&self, input: CreateRecipientRepoInput) -> DomainResult<Recipient> {
        let mut recipients = self.recipients.write().await;
        if recipients.contains_key(&input.barcode) {
            return Err(DomainError::BarcodeAlreadyExists(input.barcode));
        }
        let recipient = Recipient {
            id: input.id,
            barcode: input.barcode.clone(),
            recipient_name: input.recipient_name,
            prison_code: input.prison_code,
            prison_number: input.prison_number,
            date_of_birth: input.date_of_birth,
            created_by: input.created_by,
            created_at: Some(Utc::now()),
        };
        recipients.insert(input.barcode, recipient.clone());
        Ok(recipient)
    }

    async fn get_recipient_by_barcode(
        &self,
        input: GetRecipientByBarcodeRepoInput,
    ) -> DomainResult<Option<Recipient>> {
        let recipients = self.recipients.read().await;
        Ok(recipients.get(&input.barcode).cloned())
    }
}
