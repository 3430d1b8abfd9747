// libs/scheduling-cell/tests/conflict_detection_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;

use scheduling_cell::models::{ConflictKind, SchedulingRules, WorkingHours};
use scheduling_cell::services::conflict::ConflictDetectionService;

mod common;
use common::{at, existing, request_at, StubProvider, OPERATORY, PATIENT, PROVIDER};

fn detector(stub: StubProvider) -> ConflictDetectionService {
    ConflictDetectionService::new(Arc::new(stub))
}

#[tokio::test]
async fn empty_calendar_is_bookable() {
    let detector = detector(StubProvider::default());

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 30))
        .await
        .unwrap();

    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn provider_overlap_yields_one_provider_conflict() {
    // Same provider, different operatory and patient, 09:15-09:45 against a
    // 09:00-09:30 request.
    let booked = existing(1, 555, PROVIDER, 99, at(9, 15), 30);
    let detector = detector(StubProvider::with_appointments(vec![booked.clone()]));

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 30))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Provider);
    assert_eq!(conflicts[0].appointments.len(), 1);
    assert_eq!(conflicts[0].appointments[0].id, booked.id);
}

#[tokio::test]
async fn back_to_back_appointments_do_not_conflict() {
    let booked = existing(1, PATIENT, PROVIDER, OPERATORY, at(8, 30), 30);
    let detector = detector(StubProvider::with_appointments(vec![booked]));

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 30))
        .await
        .unwrap();

    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn one_appointment_can_hit_multiple_partitions() {
    // Same provider AND same patient: the overlap is reported once per
    // dimension, provider first.
    let booked = existing(1, PATIENT, PROVIDER, 99, at(9, 0), 60);
    let detector = detector(StubProvider::with_appointments(vec![booked]));

    let conflicts = detector
        .detect_conflicts(&request_at(9, 30, 30))
        .await
        .unwrap();

    let kinds: Vec<ConflictKind> = conflicts.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ConflictKind::Provider, ConflictKind::Patient]);
    assert_eq!(conflicts[0].appointments.len(), 1);
    assert_eq!(conflicts[1].appointments.len(), 1);
}

#[tokio::test]
async fn provider_conflict_lists_every_overlapping_appointment() {
    let first = existing(1, 555, PROVIDER, 99, at(9, 0), 30);
    let second = existing(2, 556, PROVIDER, 98, at(9, 30), 30);
    let detector = detector(StubProvider::with_appointments(vec![first, second]));

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 60))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Provider);
    let ids: Vec<i64> = conflicts[0].appointments.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn duration_over_maximum_is_flagged_regardless_of_calendar() {
    let stub = StubProvider {
        rules: Some(SchedulingRules {
            max_appointment_duration_minutes: 240,
            buffer_minutes: 0,
            allow_double_booking: false,
        }),
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 300))
        .await
        .unwrap();

    assert!(conflicts.iter().any(|c| c.kind == ConflictKind::Duration));
}

#[tokio::test]
async fn request_before_opening_hour_is_flagged() {
    let stub = StubProvider {
        working_hours: Some(WorkingHours {
            start_hour: 8,
            end_hour: 17,
            is_working: true,
        }),
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let conflicts = detector
        .detect_conflicts(&request_at(7, 0, 30))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Hours);
}

#[tokio::test]
async fn request_running_past_closing_hour_is_flagged() {
    let detector = detector(StubProvider::default());

    // 16:30 + 120 minutes ends at 18:30, past the default 17:00 close.
    let conflicts = detector
        .detect_conflicts(&request_at(16, 30, 120))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Hours);
}

#[tokio::test]
async fn non_working_day_is_flagged() {
    let stub = StubProvider {
        working_hours: Some(WorkingHours {
            start_hour: 8,
            end_hour: 17,
            is_working: false,
        }),
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let conflicts = detector
        .detect_conflicts(&request_at(10, 0, 30))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Hours);
}

#[tokio::test]
async fn missing_schedule_data_falls_back_to_default_window() {
    // Stub returns no working hours at all; the 8-17 default applies.
    let detector = detector(StubProvider::default());

    let inside = detector.detect_conflicts(&request_at(9, 0, 30)).await.unwrap();
    assert!(inside.is_empty());

    let outside = detector.detect_conflicts(&request_at(7, 0, 30)).await.unwrap();
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].kind, ConflictKind::Hours);
}

#[tokio::test]
async fn buffer_violation_is_flagged_without_direct_overlap() {
    // Back-to-back with the same provider: no direct overlap, but inside a
    // 15-minute buffer.
    let booked = existing(1, 555, PROVIDER, 99, at(8, 30), 30);
    let stub = StubProvider {
        appointments: vec![booked],
        rules: Some(SchedulingRules {
            max_appointment_duration_minutes: 240,
            buffer_minutes: 15,
            allow_double_booking: false,
        }),
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 30))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Buffer);
}

#[tokio::test]
async fn buffer_check_ignores_patient_only_neighbors() {
    // Same patient, different provider and operatory, adjacent within the
    // buffer: patients may book back-to-back.
    let booked = existing(1, PATIENT, 88, 99, at(8, 30), 30);
    let stub = StubProvider {
        appointments: vec![booked],
        rules: Some(SchedulingRules {
            max_appointment_duration_minutes: 240,
            buffer_minutes: 15,
            allow_double_booking: false,
        }),
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 30))
        .await
        .unwrap();

    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn calendar_fetch_failure_degrades_to_single_system_conflict() {
    let stub = StubProvider {
        fail_appointment_fetch: true,
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let conflicts = detector
        .detect_conflicts(&request_at(9, 0, 30))
        .await
        .unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::System);
    assert!(conflicts[0].appointments.is_empty());
}

#[tokio::test]
async fn non_positive_duration_is_a_fatal_error() {
    use scheduling_cell::models::SchedulingError;

    let detector = detector(StubProvider::default());

    let result = detector.detect_conflicts(&request_at(9, 0, 0)).await;
    assert_matches!(result, Err(SchedulingError::InvalidDuration(0)));
}

#[tokio::test]
async fn conflicts_come_back_in_fixed_kind_order() {
    // Provider overlap + patient overlap + excessive duration + outside
    // working hours, all at once.
    let provider_clash = existing(1, 555, PROVIDER, 99, at(18, 0), 60);
    let patient_clash = existing(2, PATIENT, 88, 98, at(18, 0), 60);
    let stub = StubProvider {
        appointments: vec![provider_clash, patient_clash],
        rules: Some(SchedulingRules {
            max_appointment_duration_minutes: 240,
            buffer_minutes: 0,
            allow_double_booking: false,
        }),
        ..StubProvider::default()
    };
    let detector = detector(stub);

    let kinds: Vec<ConflictKind> = detector
        .detect_conflicts(&request_at(18, 0, 300))
        .await
        .unwrap()
        .iter()
        .map(|c| c.kind)
        .collect();

    assert_eq!(
        kinds,
        vec![
            ConflictKind::Provider,
            ConflictKind::Patient,
            ConflictKind::Duration,
            ConflictKind::Hours,
        ]
    );
}
