use crate::domain::{
    CjsmDirectoryEntry, CjsmDirectoryRepository, DomainResult, FindCjsmDirectoryEntryRepoInput,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory CJSM directory keyed by lower-cased secure email
#[derive(Clone)]
pub struct InMemoryCjsmDirectoryRepository {
    entries: Arc<RwLock<HashMap<String, CjsmDirectoryEntry>>>,
}

impl InMemoryCjsmDirectoryRepository {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_entries(entries: impl IntoIterator<Item = CjsmDirectoryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.secure_email.to_lowercase(), entry))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    pub async fn insert(&self, entry: CjsmDirectoryEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.secure_email.to_lowercase(), entry);
    }
}

impl Default for InMemoryCjsmDirectoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CjsmDirectoryRepository for InMemoryCjsmDirectoryRepository {
    async fn find_by_secure_email(
        &self,
        input: FindCjsmDirectoryEntryRepoInput,
    ) -> DomainResult<Option<CjsmDirectoryEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.get(&input.secure_email.to_lowercase()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_ignores_case() {
        let repo = InMemoryCjsmDirectoryRepository::with_entries([CjsmDirectoryEntry {
            secure_email: "Someone@Firm.cjsm.net".to_string(),
            first_name: "Some".to_string(),
            last_name: "One".to_string(),
            organisation: "Firm LLP".to_string(),
            town_city: "Leeds".to_string(),
            business_type: "Solicitor".to_string(),
        }]);

        let found = repo
            .find_by_secure_email(FindCjsmDirectoryEntryRepoInput {
                secure_email: "someone@firm.CJSM.net".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(found.map(|e| e.organisation), Some("Firm LLP".to_string()));
    }
}
