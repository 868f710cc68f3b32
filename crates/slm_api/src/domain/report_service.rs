use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use common::domain::{
    BarcodeEventRepository, BarcodeStatus, CountBarcodeEventsBetweenRepoInput, DomainError,
    DomainResult, EmailMessage, EmailSender,
};
use serde::Serialize;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Usage figures for one UTC day plus all-time totals.
///
/// Scans of codes that were never issued are recorded as CHECKED events, so the
/// checked counts cover every scan attempt rather than only issued barcodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BarcodeStatistics {
    pub date: Option<NaiveDate>,
    pub barcodes_created_on_day: u64,
    /// Scan attempts on the day, unknown codes included
    pub barcodes_checked_on_day: u64,
    pub duplicates_on_day: u64,
    pub expired_on_day: u64,
    pub random_checks_on_day: u64,
    pub total_barcodes_created: u64,
    /// All-time scan attempts, unknown codes included
    pub total_barcodes_checked: u64,
    /// Distinct scanned codes, unknown codes included
    pub unique_barcodes_checked: u64,
    pub unique_creating_users: u64,
}

impl BarcodeStatistics {
    /// Plain-text table used as the report email body
    pub fn render_table(&self) -> String {
        let rows = [
            ("Barcodes created", self.barcodes_created_on_day),
            ("Scans (incl. unknown codes)", self.barcodes_checked_on_day),
            ("Duplicate scans", self.duplicates_on_day),
            ("Expired scans", self.expired_on_day),
            ("Random checks", self.random_checks_on_day),
            ("Total barcodes created", self.total_barcodes_created),
            ("Total scans (incl. unknown codes)", self.total_barcodes_checked),
            ("Unique codes scanned (incl. unknown)", self.unique_barcodes_checked),
            ("Unique creating users", self.unique_creating_users),
        ];
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

        let mut table = String::new();
        if let Some(date) = self.date {
            let _ = writeln!(table, "Send Legal Mail statistics for {date}");
            let _ = writeln!(table);
        }
        for (label, value) in rows {
            let _ = writeln!(table, "{label:<width$} | {value:>8}");
        }
        table
    }
}

/// Start and end of a UTC calendar day, end exclusive
fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Builds daily statistics from the event ledger and mails them out
pub struct ReportService {
    event_repository: Arc<dyn BarcodeEventRepository>,
    email_sender: Arc<dyn EmailSender>,
    recipients: Vec<String>,
}

impl ReportService {
    pub fn new(
        event_repository: Arc<dyn BarcodeEventRepository>,
        email_sender: Arc<dyn EmailSender>,
        recipients: Vec<String>,
    ) -> Self {
        Self {
            event_repository,
            email_sender,
            recipients,
        }
    }

    pub fn has_recipients(&self) -> bool {
        !self.recipients.is_empty()
    }

    #[instrument(skip(self))]
    pub async fn daily_statistics(&self, date: NaiveDate) -> DomainResult<BarcodeStatistics> {
        let (from, to) = day_window(date);
        let on_day = |status| CountBarcodeEventsBetweenRepoInput { status, from, to };
        let events = &self.event_repository;

        let statistics = BarcodeStatistics {
            date: Some(date),
            barcodes_created_on_day: events
                .count_events_by_status_between(on_day(BarcodeStatus::Created))
                .await?,
            barcodes_checked_on_day: events
                .count_events_by_status_between(on_day(BarcodeStatus::Checked))
                .await?,
            duplicates_on_day: events
                .count_events_by_status_between(on_day(BarcodeStatus::Duplicate))
                .await?,
            expired_on_day: events
                .count_events_by_status_between(on_day(BarcodeStatus::Expired))
                .await?,
            random_checks_on_day: events
                .count_events_by_status_between(on_day(BarcodeStatus::RandomCheck))
                .await?,
            total_barcodes_created: events.count_events_by_status(BarcodeStatus::Created).await?,
            total_barcodes_checked: events.count_events_by_status(BarcodeStatus::Checked).await?,
            unique_barcodes_checked: events
                .count_distinct_barcodes_by_status(BarcodeStatus::Checked)
                .await?,
            unique_creating_users: events
                .count_distinct_users_by_status(BarcodeStatus::Created)
                .await?,
        };

        debug!(?statistics, "statistics computed");
        Ok(statistics)
    }

    /// Email the statistics for `date` to every configured recipient
    #[instrument(skip(self))]
    pub async fn send_daily_report(&self, date: NaiveDate) -> DomainResult<()> {
        if self.recipients.is_empty() {
            return Err(DomainError::NoReportRecipients);
        }

        let body = self.daily_statistics(date).await?.render_table();
        let subject = format!("Send Legal Mail daily report {date}");

        for recipient in &self.recipients {
            self.email_sender
                .send(EmailMessage {
                    to: recipient.clone(),
                    subject: subject.clone(),
                    body: body.clone(),
                })
                .await?;
        }

        info!(recipients = self.recipients.len(), "daily report sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::domain::{MockBarcodeEventRepository, MockEmailSender};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 9).unwrap()
    }

    #[test]
    fn test_day_window_is_utc_midnight_to_midnight() {
        let (from, to) = day_window(date());
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 6, 9, 0, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_empty_recipients_fails_before_querying() {
        let mut events = MockBarcodeEventRepository::new();
        events.expect_count_events_by_status_between().never();
        events.expect_count_events_by_status().never();
        let mut email = MockEmailSender::new();
        email.expect_send().never();

        let service = ReportService::new(Arc::new(events), Arc::new(email), vec![]);

        assert!(matches!(
            service.send_daily_report(date()).await,
            Err(DomainError::NoReportRecipients)
        ));
    }

    fn counting_events() -> MockBarcodeEventRepository {
        let mut events = MockBarcodeEventRepository::new();
        events
            .expect_count_events_by_status_between()
            .withf(|input| {
                input.from == Utc.with_ymd_and_hms(2025, 6, 9, 0, 0, 0).unwrap()
                    && input.to == Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap()
            })
            .returning(|input| {
                Ok(match input.status {
                    BarcodeStatus::Created => 5,
                    BarcodeStatus::Checked => 4,
                    BarcodeStatus::Duplicate => 3,
                    BarcodeStatus::Expired => 2,
                    BarcodeStatus::RandomCheck => 1,
                })
            });
        events
            .expect_count_events_by_status()
            .returning(|status| Ok(if status == BarcodeStatus::Created { 50 } else { 40 }));
        events
            .expect_count_distinct_barcodes_by_status()
            .returning(|_| Ok(30));
        events
            .expect_count_distinct_users_by_status()
            .returning(|_| Ok(7));
        events
    }

    #[tokio::test]
    async fn test_daily_statistics() {
        let service = ReportService::new(
            Arc::new(counting_events()),
            Arc::new(MockEmailSender::new()),
            vec![],
        );

        let statistics = service.daily_statistics(date()).await.unwrap();

        assert_eq!(
            statistics,
            BarcodeStatistics {
                date: Some(date()),
                barcodes_created_on_day: 5,
                barcodes_checked_on_day: 4,
                duplicates_on_day: 3,
                expired_on_day: 2,
                random_checks_on_day: 1,
                total_barcodes_created: 50,
                total_barcodes_checked: 40,
                unique_barcodes_checked: 30,
                unique_creating_users: 7,
            }
        );
    }

    #[tokio::test]
    async fn test_report_sent_to_each_recipient() {
        let mut email = MockEmailSender::new();
        email
            .expect_send()
            .withf(|message| {
                message.subject.contains("2025-06-09") && message.body.contains("Duplicate scans")
            })
            .times(2)
            .returning(|_| Ok(()));

        let service = ReportService::new(
            Arc::new(counting_events()),
            Arc::new(email),
            vec!["ops@example.com".to_string(), "lead@example.com".to_string()],
        );

        assert!(service.send_daily_report(date()).await.is_ok());
    }

    #[test]
    fn test_render_table_aligns_values() {
        let table = BarcodeStatistics {
            barcodes_created_on_day: 12,
            ..Default::default()
        }
        .render_table();

        let created = table
            .lines()
            .find(|line| line.starts_with("Barcodes created"))
            .unwrap();
        let (_, value) = created.split_once(" | ").unwrap();
        assert_eq!(value, format!("{:>8}", 12));
    }

    #[test]
    fn test_render_table_labels_scan_counts_as_including_unknown_codes() {
        let table = BarcodeStatistics {
            barcodes_checked_on_day: 3,
            total_barcodes_checked: 7,
            unique_barcodes_checked: 5,
            ..Default::default()
        }
        .render_table();

        let value_of = |label: &str| {
            table
                .lines()
                .find(|line| line.starts_with(label))
                .and_then(|line| line.split_once(" | "))
                .map(|(_, value)| value.trim().to_string())
        };
        assert_eq!(value_of("Scans (incl. unknown codes)").as_deref(), Some("3"));
        assert_eq!(
            value_of("Total scans (incl. unknown codes)").as_deref(),
            Some("7")
        );
        assert_eq!(
            value_of("Unique codes scanned (incl. unknown)").as_deref(),
            Some("5")
        );
        assert!(!table.contains("Barcodes checked"));
    }
}
