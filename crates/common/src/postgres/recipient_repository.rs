use crate::domain::{
    CreateRecipientRepoInput, DomainError, DomainResult, GetRecipientByBarcodeRepoInput,
    Recipient, RecipientRepository,
};
use crate::postgres::{PostgresClient, UNIQUE_VIOLATION};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, instrument};

/// Recipient row for PostgreSQL storage
#[derive(Debug, Clone)]
pub struct RecipientRow {
    pub id: String,
    pub barcode: String,
    pub recipient_name: String,
    pub prison_code: String,
    pub prison_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Recipient {
            id: row.id,
            barcode: row.barcode,
            recipient_name: row.recipient_name,
            prison_code: row.prison_code,
            prison_number: row.prison_number,
            date_of_birth: row.date_of_birth,
            created_by: row.created_by,
            created_at: Some(row.created_at),
        }
    }
}

/// PostgreSQL implementation of RecipientRepository trait
#[derive(Clone)]
pub struct PostgresRecipientRepository {
    client: PostgresClient,
}

impl PostgresRecipientRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecipientRepository for PostgresRecipientRepository {
    #[instrument(skip(self, input), fields(recipient_id = %input.id, barcode = %input.barcode))]
    async fn create_recipient(&self, input: CreateRecipientRepoInput) -> DomainResult<Recipient> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let now = Utc::now();

        let result = conn
            .execute(
                "INSERT INTO recipients
                   (id, barcode, recipient_name, prison_code, prison_number, date_of_birth, created_by, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &input.id,
                    &input.barcode,
                    &input.recipient_name,
                    &input.prison_code,
                    &input.prison_number,
                    &input.date_of_birth,
                    &input.created_by,
                    &now,
                ],
            )
            .await;

        if let Err(e) = result {
            if let Some(db_err) = e.as_db_error() {
                if db_err.code().code() == UNIQUE_VIOLATION {
                    return Err(DomainError::BarcodeAlreadyExists(input.barcode));
                }
            }
            return Err(DomainError::RepositoryError(e.into()));
        }

        debug!(recipient_id = %input.id, "recipient stored");

        Ok(Recipient {
            id: input.id,
            barcode: input.barcode,
            recipient_name: input.recipient_name,
            prison_code: input.prison_code,
            prison_number: input.prison_number,
            date_of_birth: input.date_of_birth,
            created_by: input.created_by,
            created_at: Some(now),
        })
    }

    #[instrument(skip(self, input), fields(barcode = %input.barcode))]
    async fn get_recipient_by_barcode(
        &self,
        input: GetRecipientByBarcodeRepoInput,
    ) -> DomainResult<Option<Recipient>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT id, barcode, recipient_name, prison_code, prison_number, date_of_birth, created_by, created_at
                 FROM recipients WHERE barcode = $1",
                &[&input.barcode],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| {
            RecipientRow {
                id: row.get("id"),
                barcode: row.get("barcode"),
                recipient_name: row.get("recipient_name"),
                prison_code: row.get("prison_code"),
                prison_number: row.get("prison_number"),
                date_of_birth: row.get("date_of_birth"),
                created_by: row.get("created_by"),
                created_at: row.get("created_at"),
            }
            .into()
        }))
    }
}
