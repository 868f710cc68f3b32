use crate::domain::{
    AppendBarcodeEventRepoInput, BarcodeEvent, BarcodeEventRepository, BarcodeStatus,
    CountBarcodeEventsBetweenRepoInput, DomainError, DomainResult, FindBarcodeEventsRepoInput,
    GetBarcodeHistoryRepoInput,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_postgres::Row;
use tracing::{debug, instrument};

/// Barcode event row for PostgreSQL storage
#[derive(Debug, Clone)]
pub struct BarcodeEventRow {
    pub id: i64,
    pub barcode: String,
    pub user_id: String,
    pub status: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Row> for BarcodeEventRow {
    fn from(row: &Row) -> Self {
        Self {
            id: row.get("id"),
            barcode: row.get("barcode"),
            user_id: row.get("user_id"),
            status: row.get("status"),
            location: row.get("location"),
            created_at: row.get("created_at"),
        }
    }
}

impl TryFrom<BarcodeEventRow> for BarcodeEvent {
    type Error = DomainError;

    fn try_from(row: BarcodeEventRow) -> Result<Self, Self::Error> {
        Ok(BarcodeEvent {
            id: row.id,
            barcode: row.barcode,
            user_id: row.user_id,
            status: row.status.parse()?,
            location: row.location,
            created_at: row.created_at,
        })
    }
}

fn rows_to_events(rows: &[Row]) -> DomainResult<Vec<BarcodeEvent>> {
    rows.iter()
        .map(|row| BarcodeEvent::try_from(BarcodeEventRow::from(row)))
        .collect()
}

const SELECT_EVENT_COLUMNS: &str =
    "SELECT id, barcode, user_id, status, location, created_at FROM barcode_events";

/// PostgreSQL implementation of BarcodeEventRepository trait
#[derive(Clone)]
pub struct PostgresBarcodeEventRepository {
    client: PostgresClient,
}

impl PostgresBarcodeEventRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    async fn count(&self, sql: &str, status: BarcodeStatus) -> DomainResult<u64> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(sql, &[&status.as_str()])
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl BarcodeEventRepository for PostgresBarcodeEventRepository {
    #[instrument(skip(self, input), fields(barcode = %input.barcode, status = %input.status))]
    async fn append_event(&self, input: AppendBarcodeEventRepoInput) -> DomainResult<BarcodeEvent> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                "INSERT INTO barcode_events (barcode, user_id, status, location, created_at)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id",
                &[
                    &input.barcode,
                    &input.user_id,
                    &input.status.as_str(),
                    &input.location,
                    &input.created_at,
                ],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let id: i64 = row.get("id");
        debug!(event_id = id, "barcode event appended");

        Ok(BarcodeEvent {
            id,
            barcode: input.barcode,
            user_id: input.user_id,
            status: input.status,
            location: input.location,
            created_at: input.created_at,
        })
    }

    #[instrument(skip(self, input), fields(barcode = %input.barcode, status = %input.status))]
    async fn find_events_by_barcode_and_status(
        &self,
        input: FindBarcodeEventsRepoInput,
    ) -> DomainResult<Vec<BarcodeEvent>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                &format!(
                    "{SELECT_EVENT_COLUMNS} WHERE barcode = $1 AND status = $2
                     ORDER BY created_at ASC, id ASC"
                ),
                &[&input.barcode, &input.status.as_str()],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        rows_to_events(&rows)
    }

    #[instrument(skip(self, input), fields(barcode = %input.barcode, status = %input.status))]
    async fn find_most_recent_event_by_barcode_and_status(
        &self,
        input: FindBarcodeEventsRepoInput,
    ) -> DomainResult<Option<BarcodeEvent>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                &format!(
                    "{SELECT_EVENT_COLUMNS} WHERE barcode = $1 AND status = $2
                     ORDER BY created_at DESC, id DESC LIMIT 1"
                ),
                &[&input.barcode, &input.status.as_str()],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        row.map(|r| BarcodeEvent::try_from(BarcodeEventRow::from(&r)))
            .transpose()
    }

    #[instrument(skip(self, input), fields(barcode = %input.barcode))]
    async fn find_events_by_barcode(
        &self,
        input: GetBarcodeHistoryRepoInput,
    ) -> DomainResult<Vec<BarcodeEvent>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let rows = conn
            .query(
                &format!(
                    "{SELECT_EVENT_COLUMNS} WHERE barcode = $1 ORDER BY created_at ASC, id ASC"
                ),
                &[&input.barcode],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        rows_to_events(&rows)
    }

    #[instrument(skip(self))]
    async fn count_events_by_status(&self, status: BarcodeStatus) -> DomainResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM barcode_events WHERE status = $1",
            status,
        )
        .await
    }

    #[instrument(skip(self, input), fields(status = %input.status))]
    async fn count_events_by_status_between(
        &self,
        input: CountBarcodeEventsBetweenRepoInput,
    ) -> DomainResult<u64> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_one(
                "SELECT COUNT(*) FROM barcode_events
                 WHERE status = $1 AND created_at >= $2 AND created_at < $3",
                &[&input.status.as_str(), &input.from, &input.to],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        let count: i64 = row.get(0);
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self))]
    async fn count_distinct_barcodes_by_status(&self, status: BarcodeStatus) -> DomainResult<u64> {
        self.count(
            "SELECT COUNT(DISTINCT barcode) FROM barcode_events WHERE status = $1",
            status,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn count_distinct_users_by_status(&self, status: BarcodeStatus) -> DomainResult<u64> {
        self.count(
            "SELECT COUNT(DISTINCT user_id) FROM barcode_events WHERE status = $1",
            status,
        )
        .await
    }
}
