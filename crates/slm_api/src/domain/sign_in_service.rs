use chrono::Duration;
use common::auth::{
    AuthTokenProvider, SignInCodeByEmailInput, SignInCodeConfig, SignInCodeProvider,
    SignInCodeRepository, UpsertSignInCodeInput, ROLE_CREATE_BARCODE,
};
use common::domain::{
    CjsmDirectoryRepository, Clock, DomainError, DomainResult, EmailMessage, EmailSender,
    FindCjsmDirectoryEntryRepoInput,
};
use common::garde::validate_struct;
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Validate)]
pub struct RequestSignInCodeRequest {
    #[garde(email)]
    pub email: String,
}

#[derive(Debug, Clone, Validate)]
pub struct VerifySignInCodeRequest {
    #[garde(email)]
    pub email: String,
    #[garde(length(min = 1))]
    pub code: String,
}

/// Signs senders in with a one-time code emailed to their CJSM address
pub struct SignInService {
    directory_repository: Arc<dyn CjsmDirectoryRepository>,
    sign_in_code_repository: Arc<dyn SignInCodeRepository>,
    sign_in_code_provider: Arc<dyn SignInCodeProvider>,
    auth_token_provider: Arc<dyn AuthTokenProvider>,
    email_sender: Arc<dyn EmailSender>,
    clock: Arc<dyn Clock>,
    config: SignInCodeConfig,
}

impl SignInService {
    pub fn new(
        directory_repository: Arc<dyn CjsmDirectoryRepository>,
        sign_in_code_repository: Arc<dyn SignInCodeRepository>,
        sign_in_code_provider: Arc<dyn SignInCodeProvider>,
        auth_token_provider: Arc<dyn AuthTokenProvider>,
        email_sender: Arc<dyn EmailSender>,
        clock: Arc<dyn Clock>,
        config: SignInCodeConfig,
    ) -> Self {
        Self {
            directory_repository,
            sign_in_code_repository,
            sign_in_code_provider,
            auth_token_provider,
            email_sender,
            clock,
            config,
        }
    }

    /// Email a fresh sign-in code, replacing any code already pending for the address
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn request_sign_in_code(&self, request: RequestSignInCodeRequest) -> DomainResult<()> {
        validate_struct(&request)?;
        let email = request.email.trim().to_lowercase();

        self.directory_repository
            .find_by_secure_email(FindCjsmDirectoryEntryRepoInput {
                secure_email: email.clone(),
            })
            .await?
            .ok_or_else(|| DomainError::EmailNotInCjsmDirectory(email.clone()))?;

        let generated = self.sign_in_code_provider.generate_code();
        let expires_at =
            self.clock.now() + Duration::minutes(self.config.expiry_minutes as i64);

        self.sign_in_code_repository
            .upsert_sign_in_code(UpsertSignInCodeInput {
                email: email.clone(),
                code_hash: generated.code_hash,
                expires_at,
            })
            .await?;

        self.email_sender
            .send(EmailMessage {
                to: email,
                subject: "Your Send Legal Mail sign-in code".to_string(),
                body: format!(
                    "Your sign-in code is {}. It expires in {} minutes.",
                    generated.raw_code, self.config.expiry_minutes
                ),
            })
            .await?;

        debug!("sign-in code issued");
        Ok(())
    }

    /// Exchange a valid code for an access token. Codes are single use.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn verify_sign_in_code(&self, request: VerifySignInCodeRequest) -> DomainResult<String> {
        validate_struct(&request)?;
        let email = request.email.trim().to_lowercase();
        let key = SignInCodeByEmailInput {
            email: email.clone(),
        };

        let stored = self
            .sign_in_code_repository
            .get_sign_in_code(key.clone())
            .await?
            .ok_or(DomainError::InvalidSignInCode)?;

        if stored.expires_at <= self.clock.now() {
            self.sign_in_code_repository.delete_sign_in_code(key).await?;
            return Err(DomainError::SignInCodeExpired);
        }

        if self.sign_in_code_provider.hash_code(&request.code) != stored.code_hash {
            let attempts = self
                .sign_in_code_repository
                .increment_sign_in_code_attempts(key.clone())
                .await?;
            if attempts >= self.config.max_attempts {
                info!(attempts, "sign-in code locked out");
                self.sign_in_code_repository.delete_sign_in_code(key).await?;
            }
            return Err(DomainError::InvalidSignInCode);
        }

        self.sign_in_code_repository.delete_sign_in_code(key).await?;

        let token = self
            .auth_token_provider
            .generate_token(&email, vec![ROLE_CREATE_BARCODE.to_string()])?;

        info!("sender signed in");
        Ok(token)
    }
}
