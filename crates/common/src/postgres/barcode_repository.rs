use crate::domain::{
    Barcode, BarcodeRepository, CreateBarcodeRepoInput, DomainError, DomainResult,
    GetBarcodeRepoInput,
};
use crate::postgres::{PostgresClient, UNIQUE_VIOLATION};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

/// PostgreSQL implementation of BarcodeRepository trait
#[derive(Clone)]
pub struct PostgresBarcodeRepository {
    client: PostgresClient,
}

impl PostgresBarcodeRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BarcodeRepository for PostgresBarcodeRepository {
    #[instrument(skip(self, input), fields(barcode = %input.code))]
    async fn barcode_exists(&self, input: GetBarcodeRepoInput) -> DomainResult<bool> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM barcodes WHERE code = $1)",
                &[&input.code],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.get(0))
    }

    #[instrument(skip(self, input), fields(barcode = %input.code))]
    async fn create_barcode(&self, input: CreateBarcodeRepoInput) -> DomainResult<Barcode> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let now = Utc::now();

        let result = conn
            .execute(
                "INSERT INTO barcodes (code, created_at) VALUES ($1, $2)",
                &[&input.code, &now],
            )
            .await;

        if let Err(e) = result {
            if let Some(db_err) = e.as_db_error() {
                if db_err.code().code() == UNIQUE_VIOLATION {
                    return Err(DomainError::BarcodeAlreadyExists(input.code));
                }
            }
            return Err(DomainError::RepositoryError(e.into()));
        }

        debug!(barcode = %input.code, "barcode persisted");

        Ok(Barcode {
            code: input.code,
            created_at: Some(now),
        })
    }

    #[instrument(skip(self, input), fields(barcode = %input.code))]
    async fn get_or_create_barcode(&self, input: CreateBarcodeRepoInput) -> DomainResult<Barcode> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        conn.execute(
            "INSERT INTO barcodes (code, created_at) VALUES ($1, $2)
             ON CONFLICT (code) DO NOTHING",
            &[&input.code, &Utc::now()],
        )
        .await
        .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let row = conn
            .query_one(
                "SELECT code, created_at FROM barcodes WHERE code = $1",
                &[&input.code],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let created_at: DateTime<Utc> = row.get("created_at");
        Ok(Barcode {
            code: row.get("code"),
            created_at: Some(created_at),
        })
    }
}
