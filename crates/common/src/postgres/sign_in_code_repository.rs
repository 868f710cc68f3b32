use crate::auth::{
    SignInCode, SignInCodeByEmailInput, SignInCodeRepository, UpsertSignInCodeInput,
};
use crate::domain::{DomainError, DomainResult};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};

/// PostgreSQL implementation of SignInCodeRepository trait.
///
/// Emails are stored lower-cased so one address has at most one pending code.
#[derive(Clone)]
pub struct PostgresSignInCodeRepository {
    client: PostgresClient,
}

impl PostgresSignInCodeRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SignInCodeRepository for PostgresSignInCodeRepository {
    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn upsert_sign_in_code(&self, input: UpsertSignInCodeInput) -> DomainResult<SignInCode> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let email = input.email.to_lowercase();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO sign_in_codes (email, code_hash, expires_at, attempts, created_at)
             VALUES ($1, $2, $3, 0, $4)
             ON CONFLICT (email) DO UPDATE
               SET code_hash = EXCLUDED.code_hash,
                   expires_at = EXCLUDED.expires_at,
                   attempts = 0,
                   created_at = EXCLUDED.created_at",
            &[&email, &input.code_hash, &input.expires_at, &now],
        )
        .await
        .map_err(|e| DomainError::RepositoryError(e.into()))?;

        debug!("sign-in code stored");

        Ok(SignInCode {
            email,
            code_hash: input.code_hash,
            expires_at: input.expires_at,
            attempts: 0,
            created_at: Some(now),
        })
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn get_sign_in_code(
        &self,
        input: SignInCodeByEmailInput,
    ) -> DomainResult<Option<SignInCode>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT email, code_hash, expires_at, attempts, created_at
                 FROM sign_in_codes WHERE email = $1",
                &[&input.email.to_lowercase()],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| {
            let attempts: i32 = row.get("attempts");
            SignInCode {
                email: row.get("email"),
                code_hash: row.get("code_hash"),
                expires_at: row.get("expires_at"),
                attempts: attempts.max(0) as u32,
                created_at: Some(row.get("created_at")),
            }
        }))
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn increment_sign_in_code_attempts(
        &self,
        input: SignInCodeByEmailInput,
    ) -> DomainResult<u32> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "UPDATE sign_in_codes SET attempts = attempts + 1
                 WHERE email = $1 RETURNING attempts",
                &[&input.email.to_lowercase()],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        match row {
            Some(row) => {
                let attempts: i32 = row.get("attempts");
                Ok(attempts.max(0) as u32)
            }
            None => Err(DomainError::InvalidSignInCode),
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    async fn delete_sign_in_code(&self, input: SignInCodeByEmailInput) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        conn.execute(
            "DELETE FROM sign_in_codes WHERE email = $1",
            &[&input.email.to_lowercase()],
        )
        .await
        .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(())
    }
}
