use crate::domain::{
    Barcode, BarcodeRepository, CreateBarcodeRepoInput, DomainError, DomainResult,
    GetBarcodeRepoInput,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of BarcodeRepository using HashMap
#[derive(Clone)]
pub struct InMemoryBarcodeRepository {
    barcodes: Arc<RwLock<HashMap<String, Barcode>>>,
}

impl InMemoryBarcodeRepository {
    pub fn new() -> Self {
        Self {
            barcodes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn count(&self) -> usize {
        self.barcodes.read().await.len()
    }
}

impl Default for InMemoryBarcodeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BarcodeRepository for InMemoryBarcodeRepository {
    async fn barcode_exists(&self, input: GetBarcodeRepoInput) -> DomainResult<bool> {
        let barcodes = self.barcodes.read().await;
        Ok(barcodes.contains_key(&input.code))
    }

    async fn create_barcode(&self, input: CreateBarcodeRepoInput) -> DomainResult<Barcode> {
        let mut barcodes = self.barcodes.write().await;
        if barcodes.contains_key(&input.code) {
            return Err(DomainError::BarcodeAlreadyExists(input.code));
        }
        let barcode = Barcode {
            code: input.code.clone(),
            created_at: Some(Utc::now()),
        };
        barcodes.insert(input.code, barcode.clone());
        Ok(barcode)
    }

    async fn get_or_create_barcode(&self, input: CreateBarcodeRepoInput) -> DomainResult<Barcode> {
        let mut barcodes = self.barcodes.write().await;
        let barcode = barcodes
            .entry(input.code.clone())
            .or_insert_with(|| Barcode {
                code: input.code,
                created_at: Some(Utc::now()),
            });
        Ok(barcode.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_rejects_existing_code() {
        let repo = InMemoryBarcodeRepository::new();
        let input = CreateBarcodeRepoInput {
            code: "123456789012".to_string(),
        };

        repo.create_barcode(input.clone()).await.unwrap();
        let result = repo.create_barcode(input).await;

        assert!(matches!(result, Err(DomainError::BarcodeAlreadyExists(code)) if code == "123456789012"));
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let repo = InMemoryBarcodeRepository::new();
        let input = CreateBarcodeRepoInput {
            code: "DOES-NOT-EXIST".to_string(),
        };

        let first = repo.get_or_create_barcode(input.clone()).await.unwrap();
        let second = repo.get_or_create_barcode(input).await.unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(repo.count().await, 1);
    }
}
