use pretty_assertions::assert_eq;

use crate::{Diagnostic, DiagnosticQueue, ErrorCode};

#[test]
fn emit_error_returns_guarantee_and_counts() {
    let mut queue = DiagnosticQueue::new();
    assert!(!queue.has_errors());

    let _proof = queue.emit_error(Diagnostic::error(ErrorCode::E4001, "read-only variable: IFS"));
    assert!(queue.has_errors());
    assert_eq!(queue.error_count(), 1);
    assert!(queue.error_guaranteed().is_some());
}

#[test]
fn warnings_do_not_produce_error_guarantee() {
    let mut queue = DiagnosticQueue::new();
    queue.emit(Diagnostic::warning(
        ErrorCode::E4008,
        "failed to change group ID",
    ));
    assert!(!queue.has_errors());
    assert_eq!(queue.warning_count(), 1);
    assert!(queue.error_guaranteed().is_none());
}

#[test]
fn take_drains_and_resets() {
    let mut queue = DiagnosticQueue::new();
    queue.emit_error(Diagnostic::error(ErrorCode::E4003, "not an identifier: 1x"));
    queue.emit(Diagnostic::warning(ErrorCode::E4008, "setuid failed"));

    let drained = queue.take();
    assert_eq!(drained.len(), 2);
    assert!(!queue.has_errors());
    assert!(queue.diagnostics().is_empty());
}

#[test]
fn diagnostics_preserve_emission_order() {
    let mut queue = DiagnosticQueue::new();
    queue.emit_error(Diagnostic::error(ErrorCode::E4001, "first"));
    queue.emit_error(Diagnostic::error(ErrorCode::E4004, "second"));

    let codes: Vec<ErrorCode> = queue.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E4001, ErrorCode::E4004]);
}
