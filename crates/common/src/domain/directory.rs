use crate::domain::result::DomainResult;
use async_trait::async_trait;

/// Entry from the CJSM (Criminal Justice Secure eMail) directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CjsmDirectoryEntry {
    pub secure_email: String,
    pub first_name: String,
    pub last_name: String,
    pub organisation: String,
    pub town_city: String,
    pub business_type: String,
}

/// Input for looking up a directory entry by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCjsmDirectoryEntryRepoInput {
    pub secure_email: String,
}

/// Read-only access to the CJSM directory. Lookups ignore email case.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CjsmDirectoryRepository: Send + Sync {
    async fn find_by_secure_email(
        &self,
        input: FindCjsmDirectoryEntryRepoInput,
    ) -> DomainResult<Option<CjsmDirectoryEntry>>;
}
