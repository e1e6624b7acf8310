#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{family_after, family_before};
use recon_core::core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START};
use recon_core::errors::ReconcileError;
use recon_core::logging_facility::test_capture::init_test_capture;
use recon_core::{log_op_end, log_op_error, log_op_start, reconcile, Rules};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name);

    let start = capture.last_boundary(op_name, EVENT_START).unwrap();
    assert_eq!(start.component(), Some("logging_facility_tests"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event(), Some(EVENT_END));
    assert_eq!(events[0].duration_ms(), Some(42));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ReconcileError::InvalidRules {
        reason: "bad".to_string(),
    };
    log_op_error!(op_name, err, duration_ms = 10);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].level, tracing::Level::ERROR);
    assert_eq!(events[0].err_code(), Some("ERR_INVALID_RULES"));
    assert_eq!(events[0].err_kind(), Some("InvalidRules"));
}

#[test]
fn test_reconcile_emits_start_and_end() {
    let capture = init_test_capture();

    reconcile(&Rules::default(), &family_before(), &family_after()).unwrap();

    assert!(capture.last_boundary("reconcile", EVENT_START).is_some());
    let has_count = capture
        .events_for_op("reconcile")
        .iter()
        .any(|e| e.event() == Some(EVENT_END) && e.entry_count() == Some(11));
    assert!(has_count, "end event should carry entry_count=11");
}

#[test]
fn test_consolidate_failure_emits_error_event() {
    let capture = init_test_capture();
    let result = reconcile(&Rules::default(), &family_before(), &family_after()).unwrap();

    let _ = result.consolidate("characters.[").unwrap_err();

    let found = capture.events_for_op("consolidate").into_iter().any(|e| {
        e.event() == Some(EVENT_END_ERROR)
            && e.err_code() == Some("ERR_PATTERN_COMPILATION")
            && e.expression() == Some("characters.[")
    });
    assert!(found);
}

#[test]
fn test_display_key_emits_boundaries() {
    let capture = init_test_capture();
    let result = reconcile(&Rules::default(), &family_before(), &family_after()).unwrap();

    let _ = result
        .display_key("characters", |_: &recon_core::Slot| "k".to_string())
        .unwrap();

    assert!(capture.last_boundary("display_key", EVENT_START).is_some());
    assert!(capture.last_boundary("display_key", EVENT_END).is_some());
}

#[test]
fn test_rename_past_sequence_end_emits_error_boundary() {
    let capture = init_test_capture();

    let _ = reconcile(
        &Rules::new().rename("show", "characters.99"),
        &family_before(),
        &family_after(),
    )
    .unwrap_err();

    let failed = capture.events_for_op("reconcile").into_iter().any(|e| {
        e.event() == Some(EVENT_END_ERROR) && e.err_code() == Some("ERR_INVALID_PATH")
    });
    assert!(failed);
}
