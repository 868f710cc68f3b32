use crate::domain::{
    AppendBarcodeEventRepoInput, BarcodeEvent, BarcodeEventRepository, BarcodeStatus,
    CountBarcodeEventsBetweenRepoInput, DomainResult, FindBarcodeEventsRepoInput,
    GetBarcodeHistoryRepoInput,
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory event ledger. Ids are assigned sequentially from 1.
#[derive(Clone)]
pub struct InMemoryBarcodeEventRepository {
    events: Arc<RwLock<Vec<BarcodeEvent>>>,
}

impl InMemoryBarcodeEventRepository {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Every stored event in ledger order
    pub async fn all_events(&self) -> Vec<BarcodeEvent> {
        sorted(self.events.read().await.iter().cloned())
    }
}

impl Default for InMemoryBarcodeEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(events: impl Iterator<Item = BarcodeEvent>) -> Vec<BarcodeEvent> {
    let mut events: Vec<BarcodeEvent> = events.collect();
    events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    events
}

#[async_trait]
impl BarcodeEventRepository for InMemoryBarcodeEventRepository {
    async fn append_event(&self, input: AppendBarcodeEventRepoInput) -> DomainResult<BarcodeEvent> {
        let mut events = self.events.write().await;
        let event = BarcodeEvent {
            id: events.len() as i64 + 1,
            barcode: input.barcode,
            user_id: input.user_id,
            status: input.status,
            location: input.location,
            created_at: input.created_at,
        };
        events.push(event.clone());
        Ok(event)
    }

    async fn find_events_by_barcode_and_status(
        &self,
        input: FindBarcodeEventsRepoInput,
    ) -> DomainResult<Vec<BarcodeEvent>> {
        let events = self.events.read().await;
        Ok(sorted(
            events
                .iter()
                .filter(|e| e.barcode == input.barcode && e.status == input.status)
                .cloned(),
        ))
    }

    async fn find_most_recent_event_by_barcode_and_status(
        &self,
        input: FindBarcodeEventsRepoInput,
    ) -> DomainResult<Option<BarcodeEvent>> {
        Ok(self
            .find_events_by_barcode_and_status(input)
            .await?
            .into_iter()
            .last())
    }

    async fn find_events_by_barcode(
        &self,
        input: GetBarcodeHistoryRepoInput,
    ) -> DomainResult<Vec<BarcodeEvent>> {
        let events = self.events.read().await;
        Ok(sorted(
            events
                .iter()
                .filter(|e| e.barcode == input.barcode)
                .cloned(),
        ))
    }

    async fn count_events_by_status(&self, status: BarcodeStatus) -> DomainResult<u64> {
        let events = self.events.read().await;
        Ok(events.iter().filter(|e| e.status == status).count() as u64)
    }

    async fn count_events_by_status_between(
        &self,
        input: CountBarcodeEventsBetweenRepoInput,
    ) -> DomainResult<u64> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| {
                e.status == input.status && e.created_at >= input.from && e.created_at < input.to
            })
            .count() as u64)
    }

    async fn count_distinct_barcodes_by_status(&self, status: BarcodeStatus) -> DomainResult<u64> {
        let events = self.events.read().await;
        let barcodes: HashSet<&str> = events
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.barcode.as_str())
            .collect();
        Ok(barcodes.len() as u64)
    }

    async fn count_distinct_users_by_status(&self, status: BarcodeStatus) -> DomainResult<u64> {
        let events = self.events.read().await;
        let users: HashSet<&str> = events
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.user_id.as_str())
            .collect();
        Ok(users.len() as u64)
    }
}
