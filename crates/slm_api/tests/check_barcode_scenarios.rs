mod support;

use chrono::Duration;
use common::domain::{
    BarcodeStatus, Clock, DomainError, RandomCheckProvider, ThreadRngRandomCheckProvider,
};
use slm_api::BarcodeCheckConfig;
use std::sync::Arc;
use support::*;

fn config(barcode_expiry_days: u32, random_check_percentage: u32) -> BarcodeCheckConfig {
    BarcodeCheckConfig {
        barcode_expiry_days,
        random_check_percentage,
    }
}

#[tokio::test]
async fn test_create_then_check_returns_organisation() {
    let harness = Harness::new(config(28, 0));
    let barcode = harness.create().await;

    let created_by = harness.check(&barcode, "HMP Leeds").await.unwrap();

    assert_eq!(created_by, SENDER_ORGANISATION);
    let statuses: Vec<BarcodeStatus> = harness
        .history(&barcode)
        .await
        .into_iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(statuses, vec![BarcodeStatus::Created, BarcodeStatus::Checked]);
}

#[tokio::test]
async fn test_second_check_is_duplicate_of_first_scan() {
    let harness = Harness::new(config(28, 0));
    let barcode = harness.create().await;
    let first_scan_at = harness.clock.now();

    harness.check(&barcode, "HMP Leeds").await.unwrap();
    harness.clock.advance(Duration::hours(2));
    let result = harness.check(&barcode, "HMP Hull").await;

    match result {
        Err(DomainError::DuplicateBarcode {
            scanned_date,
            scanned_location,
            created_by,
            ..
        }) => {
            assert_eq!(scanned_date, first_scan_at);
            assert_eq!(scanned_location, "HMP Leeds");
            assert_eq!(created_by, SENDER_ORGANISATION);
        }
        other => panic!("expected duplicate, got {other:?}"),
    }

    let history = harness.history(&barcode).await;
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].status, BarcodeStatus::Duplicate);
    assert_eq!(history[2].location, "HMP Hull");
}

#[tokio::test]
async fn test_third_check_still_reports_first_scan() {
    let harness = Harness::new(config(28, 0));
    let barcode = harness.create().await;

    harness.check(&barcode, "HMP Leeds").await.unwrap();
    let _ = harness.check(&barcode, "HMP Hull").await;
    let result = harness.check(&barcode, "HMP York").await;

    assert!(matches!(
        result,
        Err(DomainError::DuplicateBarcode { scanned_location, .. }) if scanned_location == "HMP Leeds"
    ));
    assert_eq!(harness.history(&barcode).await.len(), 4);
}

#[tokio::test]
async fn test_zero_day_expiry() {
    let harness = Harness::new(config(0, 0));
    let barcode = harness.create().await;
    let created_at = harness.clock.now();

    harness.clock.advance(Duration::seconds(1));
    let result = harness.check(&barcode, "").await;

    match result {
        Err(DomainError::ExpiredBarcode {
            created_date,
            barcode_expiry_days,
            created_by,
            ..
        }) => {
            assert_eq!(created_date, created_at);
            assert_eq!(barcode_expiry_days, 0);
            assert_eq!(created_by, SENDER_ORGANISATION);
        }
        other => panic!("expected expired, got {other:?}"),
    }
    assert_eq!(
        harness.history(&barcode).await.last().map(|e| e.status),
        Some(BarcodeStatus::Expired)
    );
}

#[tokio::test]
async fn test_unknown_barcode_is_not_found_and_recorded() {
    let harness = Harness::new(config(28, 0));

    let result = harness.check("DOES-NOT-EXIST", "HMP Leeds").await;

    assert!(matches!(result, Err(DomainError::BarcodeNotFound(_))));
    let history = harness.history("DOES-NOT-EXIST").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, BarcodeStatus::Checked);
    assert_eq!(history[0].user_id, MAILROOM_USER);
    assert_eq!(harness.barcodes.count().await, 1);
}

#[tokio::test]
async fn test_duplicate_wins_over_expiry() {
    let harness = Harness::new(config(1, 0));
    let barcode = harness.create().await;

    harness.check(&barcode, "HMP Leeds").await.unwrap();
    harness.clock.advance(Duration::days(5));
    let result = harness.check(&barcode, "HMP Leeds").await;

    assert!(matches!(result, Err(DomainError::DuplicateBarcode { .. })));
}

#[tokio::test]
async fn test_every_check_appends_exactly_one_event() {
    let harness = Harness::new(config(3, 0));
    let fresh = harness.create().await;
    let old = harness.create().await;
    harness.clock.advance(Duration::days(4));
    let fresh_later = harness.create().await;

    let attempts = [
        fresh_later.clone(),
        fresh_later.clone(),
        old.clone(),
        fresh.clone(),
        "DOES-NOT-EXIST".to_string(),
        "DOES-NOT-EXIST".to_string(),
    ];

    for barcode in attempts {
        let before = harness.events.all_events().await.len();
        let _ = harness.check(&barcode, "HMP Leeds").await;
        let after = harness.events.all_events().await.len();
        assert_eq!(after, before + 1, "check of {barcode} changed the ledger by {}", after - before);
    }
}

async fn random_check_count(percentage: u32) -> usize {
    let harness = Harness::with_random(
        config(28, percentage),
        Arc::new(ThreadRngRandomCheckProvider) as Arc<dyn RandomCheckProvider>,
    );
    let mut flagged = 0;
    for _ in 0..1000 {
        let barcode = harness.create().await;
        match harness.check(&barcode, "").await {
            Ok(_) => {}
            Err(DomainError::RandomCheckRequired { .. }) => flagged += 1,
            Err(other) => panic!("unexpected {other:?}"),
        }
    }
    flagged
}

#[tokio::test]
async fn test_random_sampling_rates() {
    assert_eq!(random_check_count(0).await, 0);
    assert_eq!(random_check_count(100).await, 1000);

    let half = random_check_count(50).await;
    assert!(half > 0 && half < 1000, "50% sampling flagged {half} of 1000");
}

#[tokio::test]
async fn test_concurrent_first_checks_admit_one() {
    let harness = Arc::new(Harness::new(config(28, 0)));
    let barcode = harness.create().await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let harness = harness.clone();
        let barcode = barcode.clone();
        handles.push(tokio::spawn(async move {
            harness.check(&barcode, &format!("desk-{i}")).await
        }));
    }

    let mut passed = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => passed += 1,
            Err(DomainError::DuplicateBarcode { .. }) => duplicates += 1,
            Err(other) => panic!("unexpected {other:?}"),
        }
    }

    assert_eq!(passed, 1);
    assert_eq!(duplicates, 9);
    assert_eq!(harness.history(&barcode).await.len(), 11);
}

#[tokio::test]
async fn test_directory_outage_still_records_scan() {
    let harness = Harness::new(config(28, 0));
    let barcode = harness.create().await;

    let mut directory = common::domain::MockCjsmDirectoryRepository::new();
    directory
        .expect_find_by_secure_email()
        .returning(|_| Err(DomainError::RepositoryError(anyhow::anyhow!("directory offline"))));
    let check_service = slm_api::BarcodeCheckService::new(
        Arc::new(harness.barcodes.clone()),
        Arc::new(harness.events.clone()),
        Arc::new(directory),
        Arc::new(FixedRandom(99)),
        harness.clock.clone(),
        config(28, 0),
    );

    let created_by = check_service
        .check_barcode(slm_api::CheckBarcodeRequest {
            user_id: MAILROOM_USER.to_string(),
            barcode: barcode.clone(),
            location: "HMP Leeds".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(created_by, SENDER);
    let statuses: Vec<BarcodeStatus> = harness
        .history(&barcode)
        .await
        .into_iter()
        .map(|e| e.status)
        .collect();
    assert_eq!(statuses, vec![BarcodeStatus::Created, BarcodeStatus::Checked]);
}
