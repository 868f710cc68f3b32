use crate::domain::ReportService;
use chrono::{DateTime, Duration, NaiveTime, Utc};
use common::domain::Clock;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// First time strictly after `now` at `hour`:00 UTC
pub fn next_run_after(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let at = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(at).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Sends the previous day's report once a day at a fixed UTC hour
pub struct ReportScheduler {
    report_service: Arc<ReportService>,
    clock: Arc<dyn Clock>,
    hour_utc: u32,
}

impl ReportScheduler {
    pub fn new(report_service: Arc<ReportService>, clock: Arc<dyn Clock>, hour_utc: u32) -> Self {
        Self {
            report_service,
            clock,
            hour_utc,
        }
    }

    /// Run until the token is cancelled. Report failures are logged and the schedule continues.
    pub async fn run(self, cancellation_token: CancellationToken) -> anyhow::Result<()> {
        info!(hour_utc = self.hour_utc, "report scheduler started");

        loop {
            let now = self.clock.now();
            let next = next_run_after(now, self.hour_utc);
            let wait = (next - now).to_std().unwrap_or_default();
            debug!(next_run = %next, "waiting for next report");

            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("report scheduler stopping");
                    return Ok(());
                }
                _ = tokio::time::sleep(wait) => {}
            }

            let report_date = next.date_naive() - Duration::days(1);
            if let Err(e) = self.report_service.send_daily_report(report_date).await {
                error!(date = %report_date, error = %e, "failed to send daily report");
            }
        }
    }
}
