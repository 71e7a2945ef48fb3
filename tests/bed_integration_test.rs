//! Integration tests for bed reconciliation

mod common;

use common::*;
use std::sync::Arc;
use ward_sync::core::sync::exit_code;
use ward_sync::domain::{AckResult, BedStatus, EntityKind, NotificationTarget, SyncError};

#[tokio::test]
async fn test_new_active_bed_is_announced_then_inserted() {
    let source = Arc::new(MemorySource {
        beds: vec![bed("UTI-01", BedStatus::Active)],
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::default());
    let notifier = Arc::new(ScriptedNotifier::accepting());

    let summary = bed_coordinator(source, destination.clone(), notifier.clone(), false)
        .execute()
        .await;

    assert!(summary.is_successful());
    assert_eq!(summary.detected_new, 1);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.notified, 1);
    assert_eq!(notifier.entity_ids(), vec!["UTI-01"]);
    assert_eq!(destination.bed_status("UTI-01"), Some(BedStatus::Active));

    let logs = destination.notifications();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].target, NotificationTarget::Bed);
}

#[tokio::test]
async fn test_new_inactive_bed_is_inserted_silently() {
    let source = Arc::new(MemorySource {
        beds: vec![bed("UTI-02", BedStatus::Inactive)],
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::default());
    let notifier = Arc::new(ScriptedNotifier::accepting());

    let summary = bed_coordinator(source, destination.clone(), notifier.clone(), false)
        .execute()
        .await;

    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.notified, 0);
    assert_eq!(notifier.call_count(), 0);
    assert!(destination.notifications().is_empty());
    assert_eq!(destination.bed_status("UTI-02"), Some(BedStatus::Inactive));
}

#[tokio::test]
async fn test_status_change_is_announced_then_updated() {
    let source = Arc::new(MemorySource {
        beds: vec![
            bed("UTI-01", BedStatus::Inactive),
            bed("UTI-02", BedStatus::Active),
        ],
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::with_beds(vec![
        bed("UTI-01", BedStatus::Active),
        bed("UTI-02", BedStatus::Active),
    ]));
    let notifier = Arc::new(ScriptedNotifier::accepting());

    let summary = bed_coordinator(source, destination.clone(), notifier.clone(), false)
        .execute()
        .await;

    assert_eq!(summary.detected_new, 0);
    assert_eq!(summary.detected_changed, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(notifier.entity_ids(), vec!["UTI-01"]);
    assert_eq!(destination.bed_status("UTI-01"), Some(BedStatus::Inactive));
    assert_eq!(destination.bed_status("UTI-02"), Some(BedStatus::Active));
}

#[tokio::test]
async fn test_rejected_beds_are_left_untouched() {
    let source = Arc::new(MemorySource {
        beds: vec![
            bed("UTI-01", BedStatus::Inactive),
            bed("UTI-03", BedStatus::Active),
        ],
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::with_beds(vec![bed(
        "UTI-01",
        BedStatus::Active,
    )]));
    let notifier = Arc::new(ScriptedNotifier::new(|_| {
        AckResult::ApplicationError("unit not mapped".to_string())
    }));

    let summary = bed_coordinator(source, destination.clone(), notifier.clone(), false)
        .execute()
        .await;

    assert_eq!(notifier.call_count(), 2);
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 0);
    assert_eq!(summary.notified, 0);
    assert_eq!(summary.failures.len(), 2);
    assert!(summary.failures.iter().all(|f| f.entity == EntityKind::Bed));
    assert_eq!(summary.exit_code(), exit_code::RECORD_FAILURES);

    assert_eq!(destination.bed_status("UTI-01"), Some(BedStatus::Active));
    assert_eq!(destination.bed_status("UTI-03"), None);
}

#[tokio::test]
async fn test_dry_run_only_reports_delta() {
    let source = Arc::new(MemorySource {
        beds: vec![
            bed("UTI-01", BedStatus::Inactive),
            bed("UTI-04", BedStatus::Active),
        ],
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::with_beds(vec![bed(
        "UTI-01",
        BedStatus::Active,
    )]));
    let notifier = Arc::new(ScriptedNotifier::accepting());

    let summary = bed_coordinator(source, destination.clone(), notifier.clone(), true)
        .execute()
        .await;

    assert!(summary.dry_run);
    assert_eq!(summary.detected_new, 1);
    assert_eq!(summary.detected_changed, 1);
    assert_eq!(summary.inserted + summary.updated + summary.notified, 0);
    assert_eq!(notifier.call_count(), 0);
    assert_eq!(destination.bed_status("UTI-01"), Some(BedStatus::Active));
    assert_eq!(destination.bed_status("UTI-04"), None);
}

#[tokio::test]
async fn test_source_failure_is_fatal() {
    let source = Arc::new(MemorySource {
        beds: vec![bed("UTI-01", BedStatus::Active)],
        fail_on: Some(EntityKind::Bed),
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::default());
    let notifier = Arc::new(ScriptedNotifier::accepting());

    let summary = bed_coordinator(source, destination.clone(), notifier.clone(), false)
        .execute()
        .await;

    assert!(matches!(
        summary.fatal,
        Some(SyncError::Read {
            entity: EntityKind::Bed,
            ..
        })
    ));
    assert_eq!(summary.exit_code(), exit_code::FATAL);
    assert_eq!(notifier.call_count(), 0);
    assert!(destination.runs().is_empty());
}

#[tokio::test]
async fn test_unchanged_beds_produce_no_traffic() {
    let beds = vec![
        bed("UTI-01", BedStatus::Active),
        bed("UTI-02", BedStatus::Inactive),
    ];
    let source = Arc::new(MemorySource {
        beds: beds.clone(),
        ..MemorySource::default()
    });
    let destination = Arc::new(MemoryDestination::with_beds(beds));
    let notifier = Arc::new(ScriptedNotifier::accepting());

    let summary = bed_coordinator(source, destination, notifier.clone(), false)
        .execute()
        .await;

    assert!(summary.is_successful());
    assert_eq!(summary.detected_new + summary.detected_changed, 0);
    assert_eq!(notifier.call_count(), 0);
}
