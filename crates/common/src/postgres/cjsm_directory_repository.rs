use crate::domain::{
    CjsmDirectoryEntry, CjsmDirectoryRepository, DomainError, DomainResult,
    FindCjsmDirectoryEntryRepoInput,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use tracing::instrument;

/// PostgreSQL implementation of CjsmDirectoryRepository trait.
///
/// The `cjsm_directory` table is loaded out of band; this repository only reads it.
#[derive(Clone)]
pub struct PostgresCjsmDirectoryRepository {
    client: PostgresClient,
}

impl PostgresCjsmDirectoryRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CjsmDirectoryRepository for PostgresCjsmDirectoryRepository {
    #[instrument(skip(self, input), fields(secure_email = %input.secure_email))]
    async fn find_by_secure_email(
        &self,
        input: FindCjsmDirectoryEntryRepoInput,
    ) -> DomainResult<Option<CjsmDirectoryEntry>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT secure_email, first_name, last_name, organisation, town_city, business_type
                 FROM cjsm_directory WHERE lower(secure_email) = lower($1)
                 LIMIT 1",
                &[&input.secure_email],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| CjsmDirectoryEntry {
            secure_email: row.get("secure_email"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            organisation: row.get("organisation"),
            town_city: row.get("town_city"),
            business_type: row.get("business_type"),
        }))
    }
}
