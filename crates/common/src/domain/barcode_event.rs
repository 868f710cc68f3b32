use crate::domain::result::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status recorded on a barcode event.
///
/// Statuses are not a strict state machine: every check appends a new event,
/// so several of these can appear in one barcode's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BarcodeStatus {
    Created,
    Checked,
    Duplicate,
    Expired,
    RandomCheck,
}

impl BarcodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarcodeStatus::Created => "CREATED",
            BarcodeStatus::Checked => "CHECKED",
            BarcodeStatus::Duplicate => "DUPLICATE",
            BarcodeStatus::Expired => "EXPIRED",
            BarcodeStatus::RandomCheck => "RANDOM_CHECK",
        }
    }
}

impl fmt::Display for BarcodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarcodeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(BarcodeStatus::Created),
            "CHECKED" => Ok(BarcodeStatus::Checked),
            "DUPLICATE" => Ok(BarcodeStatus::Duplicate),
            "EXPIRED" => Ok(BarcodeStatus::Expired),
            "RANDOM_CHECK" => Ok(BarcodeStatus::RandomCheck),
            other => Err(DomainError::InvalidBarcodeStatus(other.to_string())),
        }
    }
}

/// One entry in a barcode's append-only history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeEvent {
    pub id: i64,
    pub barcode: String,
    pub user_id: String,
    pub status: BarcodeStatus,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Input for appending an event to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBarcodeEventRepoInput {
    pub barcode: String,
    pub user_id: String,
    pub status: BarcodeStatus,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Input for querying a barcode's events with a given status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindBarcodeEventsRepoInput {
    pub barcode: String,
    pub status: BarcodeStatus,
}

/// Input for querying a barcode's full history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBarcodeHistoryRepoInput {
    pub barcode: String,
}

/// Input for counting events with a status inside `[from, to)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountBarcodeEventsBetweenRepoInput {
    pub status: BarcodeStatus,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Append-only event ledger.
///
/// Events are never updated or deleted. Every query that returns several
/// events orders them by `created_at`, then by `id`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BarcodeEventRepository: Send + Sync {
    /// Persist an event and return it with its assigned id
    async fn append_event(&self, input: AppendBarcodeEventRepoInput) -> DomainResult<BarcodeEvent>;

    /// All events for a barcode with the given status, oldest first
    async fn find_events_by_barcode_and_status(
        &self,
        input: FindBarcodeEventsRepoInput,
    ) -> DomainResult<Vec<BarcodeEvent>>;

    /// The newest event for a barcode with the given status
    async fn find_most_recent_event_by_barcode_and_status(
        &self,
        input: FindBarcodeEventsRepoInput,
    ) -> DomainResult<Option<BarcodeEvent>>;

    /// Full history of a barcode, oldest first
    async fn find_events_by_barcode(
        &self,
        input: GetBarcodeHistoryRepoInput,
    ) -> DomainResult<Vec<BarcodeEvent>>;

    async fn count_events_by_status(&self, status: BarcodeStatus) -> DomainResult<u64>;

    async fn count_events_by_status_between(
        &self,
        input: CountBarcodeEventsBetweenRepoInput,
    ) -> DomainResult<u64>;

    async fn count_distinct_barcodes_by_status(&self, status: BarcodeStatus) -> DomainResult<u64>;

    async fn count_distinct_users_by_status(&self, status: BarcodeStatus) -> DomainResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            BarcodeStatus::Created,
            BarcodeStatus::Checked,
            BarcodeStatus::Duplicate,
            BarcodeStatus::Expired,
            BarcodeStatus::RandomCheck,
        ] {
            assert_eq!(status.as_str().parse::<BarcodeStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result = "SCANNED".parse::<BarcodeStatus>();
        assert!(matches!(result, Err(DomainError::InvalidBarcodeStatus(s)) if s == "SCANNED"));
    }

    #[test]
    fn test_status_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&BarcodeStatus::RandomCheck).unwrap();
        assert_eq!(json, "\"RANDOM_CHECK\"");
    }
}
