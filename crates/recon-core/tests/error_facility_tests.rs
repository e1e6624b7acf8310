#![allow(clippy::unwrap_used, clippy::expect_used)]

use recon_core::errors::{RcError, RcErrorKind, ReconcileError};

#[test]
fn test_error_codes_are_stable() {
    let cases = [
        (RcErrorKind::InvalidPath, "ERR_INVALID_PATH"),
        (RcErrorKind::PatternCompilation, "ERR_PATTERN_COMPILATION"),
        (RcErrorKind::InvalidRules, "ERR_INVALID_RULES"),
        (RcErrorKind::MapFailed, "ERR_MAP_FAILED"),
        (RcErrorKind::Io, "ERR_IO"),
        (RcErrorKind::Serialization, "ERR_SERIALIZATION"),
    ];
    for (kind, code) in cases {
        assert_eq!(kind.code(), code);
        assert_eq!(RcError::new(kind).code(), code);
    }
}

#[test]
fn test_pattern_error_converts_with_expression() {
    let err = ReconcileError::PatternCompilation {
        expression: "characters.[".to_string(),
        reason: "unbalanced '[' at position 11".to_string(),
    };
    let rc: RcError = err.into();

    assert_eq!(rc.kind(), RcErrorKind::PatternCompilation);
    assert_eq!(rc.expression(), Some("characters.["));
    assert_eq!(rc.op(), Some("compile_pattern"));
    assert!(rc.message().contains("unbalanced"));
}

#[test]
fn test_map_error_converts_with_path() {
    let err = ReconcileError::MapFailed {
        path: "characters.[].age".to_string(),
        message: "boom".to_string(),
    };
    let rc: RcError = err.into();

    assert_eq!(rc.kind(), RcErrorKind::MapFailed);
    assert_eq!(rc.path(), Some("characters.[].age"));
    assert_eq!(rc.to_string(), "[ERR_MAP_FAILED] in operation 'normalize_before': boom (path: characters.[].age)");
}

#[test]
fn test_domain_error_messages() {
    let err = ReconcileError::InvalidPath {
        path: "a..b".to_string(),
        reason: "path contains an empty segment".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Invalid path 'a..b': path contains an empty segment"
    );
}

#[test]
fn test_builder_context_is_optional() {
    let rc = RcError::new(RcErrorKind::Serialization);
    assert_eq!(rc.to_string(), "[ERR_SERIALIZATION]");
    assert!(rc.op().is_none());
    assert!(rc.source_error().is_none());
}

#[test]
fn test_rename_past_sequence_end_converts_to_invalid_path() {
    let err = recon_core::reconcile(
        &recon_core::Rules::new().rename("a", "b.7"),
        &serde_json::json!({"a": 1}),
        &serde_json::json!({}),
    )
    .unwrap_err();
    let rc: RcError = err.into();

    assert_eq!(rc.code(), "ERR_INVALID_PATH");
    assert_eq!(rc.path(), Some("b.7"));
    assert!(rc.message().contains("index 7"));
}
