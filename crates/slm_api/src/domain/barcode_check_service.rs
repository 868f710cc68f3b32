use crate::domain::BarcodeLocks;
use chrono::Duration;
use common::domain::{
    AppendBarcodeEventRepoInput, BarcodeEvent, BarcodeEventRepository, BarcodeRepository,
    BarcodeStatus, CjsmDirectoryRepository, Clock, CreateBarcodeRepoInput, DomainError,
    DomainResult, FindBarcodeEventsRepoInput, FindCjsmDirectoryEntryRepoInput,
    RandomCheckProvider,
};
use common::garde::validate_struct;
use garde::Validate;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Returned in place of a creator when a barcode has no creation record
pub const UNKNOWN_CREATOR: &str = "Unknown (internal error: no creation record)";

/// Policy settings for barcode checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarcodeCheckConfig {
    pub barcode_expiry_days: u32,
    /// Share of otherwise valid checks flagged for manual inspection, 0 to 100
    pub random_check_percentage: u32,
}

impl Default for BarcodeCheckConfig {
    fn default() -> Self {
        Self {
            barcode_expiry_days: 28,
            random_check_percentage: 0,
        }
    }
}

/// Request to check a barcode presented at a mailroom
#[derive(Debug, Clone, Validate)]
pub struct CheckBarcodeRequest {
    #[garde(length(min = 1))]
    pub user_id: String,
    #[garde(length(min = 1))]
    pub barcode: String,
    #[garde(skip)]
    pub location: String,
}

/// Result of the ordered checks for one barcode
#[derive(Debug, Clone, PartialEq, Eq)]
enum CheckOutcome {
    Passed {
        created_by: String,
    },
    NotFound,
    Duplicate {
        first_check: BarcodeEvent,
        created_by: String,
    },
    Expired {
        created: BarcodeEvent,
        created_by: String,
    },
    RandomCheck {
        created_by: String,
    },
}

impl CheckOutcome {
    /// Status of the single event recorded for this outcome
    fn status(&self) -> BarcodeStatus {
        match self {
            CheckOutcome::Passed { .. } | CheckOutcome::NotFound => BarcodeStatus::Checked,
            CheckOutcome::Duplicate { .. } => BarcodeStatus::Duplicate,
            CheckOutcome::Expired { .. } => BarcodeStatus::Expired,
            CheckOutcome::RandomCheck { .. } => BarcodeStatus::RandomCheck,
        }
    }

    fn into_result(self, barcode: String, barcode_expiry_days: u32) -> DomainResult<String> {
        match self {
            CheckOutcome::Passed { created_by } => Ok(created_by),
            CheckOutcome::NotFound => Err(DomainError::BarcodeNotFound(barcode)),
            CheckOutcome::Duplicate {
                first_check,
                created_by,
            } => Err(DomainError::DuplicateBarcode {
                barcode,
                scanned_date: first_check.created_at,
                scanned_location: first_check.location,
                created_by,
            }),
            CheckOutcome::Expired {
                created,
                created_by,
            } => Err(DomainError::ExpiredBarcode {
                barcode,
                created_date: created.created_at,
                barcode_expiry_days,
                created_by,
            }),
            CheckOutcome::RandomCheck { created_by } => Err(DomainError::RandomCheckRequired {
                barcode,
                created_by,
            }),
        }
    }
}

/// Verifies barcodes presented at prison mailrooms.
///
/// Checks run in a fixed order (existence, duplicate, expiry, random sampling)
/// and the first failure decides the outcome. Every call records exactly one
/// event in the ledger before returning, including calls that fail.
pub struct BarcodeCheckService {
    barcode_repository: Arc<dyn BarcodeRepository>,
    event_repository: Arc<dyn BarcodeEventRepository>,
    directory_repository: Arc<dyn CjsmDirectoryRepository>,
    random_check_provider: Arc<dyn RandomCheckProvider>,
    clock: Arc<dyn Clock>,
    config: BarcodeCheckConfig,
    locks: BarcodeLocks,
}

impl BarcodeCheckService {
    pub fn new(
        barcode_repository: Arc<dyn BarcodeRepository>,
        event_repository: Arc<dyn BarcodeEventRepository>,
        directory_repository: Arc<dyn CjsmDirectoryRepository>,
        random_check_provider: Arc<dyn RandomCheckProvider>,
        clock: Arc<dyn Clock>,
        config: BarcodeCheckConfig,
    ) -> Self {
        Self {
            barcode_repository,
            event_repository,
            directory_repository,
            random_check_provider,
            clock,
            config,
            locks: BarcodeLocks::new(),
        }
    }

    /// Check a barcode and return who created it.
    ///
    /// Fails with `BarcodeNotFound`, `DuplicateBarcode`, `ExpiredBarcode` or
    /// `RandomCheckRequired` when a check does not pass.
    #[instrument(skip(self, request), fields(barcode = %request.barcode, user_id = %request.user_id))]
    pub async fn check_barcode(&self, request: CheckBarcodeRequest) -> DomainResult<String> {
        validate_struct(&request)?;

        let _guard = self.locks.acquire(&request.barcode).await;

        // Unknown codes are kept as identities so they are never issued later
        self.barcode_repository
            .get_or_create_barcode(CreateBarcodeRepoInput {
                code: request.barcode.clone(),
            })
            .await?;

        let outcome = self.evaluate(&request.barcode).await?;
        let status = outcome.status();

        self.event_repository
            .append_event(AppendBarcodeEventRepoInput {
                barcode: request.barcode.clone(),
                user_id: request.user_id,
                status,
                location: request.location,
                created_at: self.clock.now(),
            })
            .await?;

        match &outcome {
            CheckOutcome::Passed { .. } => debug!("barcode check passed"),
            _ => info!(status = %status, "barcode check failed"),
        }

        outcome.into_result(request.barcode, self.config.barcode_expiry_days)
    }

    async fn evaluate(&self, barcode: &str) -> DomainResult<CheckOutcome> {
        let created = self
            .event_repository
            .find_most_recent_event_by_barcode_and_status(FindBarcodeEventsRepoInput {
                barcode: barcode.to_string(),
                status: BarcodeStatus::Created,
            })
            .await?;

        let Some(created) = created else {
            return Ok(CheckOutcome::NotFound);
        };

        let created_by = self.resolve_created_by(Some(&created)).await;

        let prior_checks = self
            .event_repository
            .find_events_by_barcode_and_status(FindBarcodeEventsRepoInput {
                barcode: barcode.to_string(),
                status: BarcodeStatus::Checked,
            })
            .await?;

        if let Some(first_check) = prior_checks.into_iter().next() {
            return Ok(CheckOutcome::Duplicate {
                first_check,
                created_by,
            });
        }

        let expires_before =
            self.clock.now() - Duration::days(i64::from(self.config.barcode_expiry_days));
        if created.created_at < expires_before {
            return Ok(CheckOutcome::Expired {
                created,
                created_by,
            });
        }

        if self.random_check_provider.next_percentage() < self.config.random_check_percentage {
            return Ok(CheckOutcome::RandomCheck { created_by });
        }

        Ok(CheckOutcome::Passed { created_by })
    }

    /// Organisation name of the barcode's creator, falling back to their email.
    ///
    /// Directory failures also fall back to the email so the check is still recorded.
    async fn resolve_created_by(&self, created: Option<&BarcodeEvent>) -> String {
        let Some(created) = created else {
            return UNKNOWN_CREATOR.to_string();
        };

        let entry = match self
            .directory_repository
            .find_by_secure_email(FindCjsmDirectoryEntryRepoInput {
                secure_email: created.user_id.clone(),
            })
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                warn!(creator = %created.user_id, error = %e, "directory lookup failed, using creator email");
                None
            }
        };

        entry
            .map(|entry| entry.organisation)
            .filter(|organisation| !organisation.trim().is_empty())
            .unwrap_or_else(|| created.user_id.clone())
    }
}
