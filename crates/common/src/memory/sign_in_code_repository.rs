use crate::auth::{
    SignInCode, SignInCodeByEmailInput, SignInCodeRepository, UpsertSignInCodeInput,
};
use crate::domain::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory pending sign-in codes keyed by lower-cased email
#[derive(Clone)]
pub struct InMemorySignInCodeRepository {
    codes: Arc<RwLock<HashMap<String, SignInCode>>>,
}

impl InMemorySignInCodeRepository {
    pub fn new() -> Self {
        Self {
            codes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySignInCodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignInCodeRepository for InMemorySignInCodeRepository {
    async fn upsert_sign_in_code(&self, input: UpsertSignInCodeInput) -> DomainResult<SignInCode> {
        let email = input.email.to_lowercase();
        let code = SignInCode {
            email: email.clone(),
            code_hash: input.code_hash,
            expires_at: input.expires_at,
            attempts: 0,
            created_at: Some(Utc::now()),
        };
        self.codes.write().await.insert(email, code.clone());
        Ok(code)
    }

    async fn get_sign_in_code(
        &self,
        input: SignInCodeByEmailInput,
    ) -> DomainResult<Option<SignInCode>> {
        let codes = self.codes.read().await;
        Ok(codes.get(&input.email.to_lowercase()).cloned())
    }

    async fn increment_sign_in_code_attempts(
        &self,
        input: SignInCodeByEmailInput,
    ) -> DomainResult<u32> {
        let mut codes = self.codes.write().await;
        match codes.get_mut(&input.email.to_lowercase()) {
            Some(code) => {
                code.attempts += 1;
                Ok(code.attempts)
            }
            None => Err(DomainError::InvalidSignInCode),
        }
    }

    async fn delete_sign_in_code(&self, input: SignInCodeByEmailInput) -> DomainResult<()> {
        self.codes.write().await.remove(&input.email.to_lowercase());
        Ok(())
    }
}
