use dale_ir::{Loc, Name};

use super::*;

fn at(line: u32) -> Loc {
    Loc::new(Name::EMPTY, line, 1)
}

#[test]
fn counts_by_severity() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    let _ = queue.emit_error(Diagnostic::error(ErrorCode::InvalidType).at(at(1)));
    queue.warn(Diagnostic::warning(ErrorCode::StructContainsPadding).at(at(2)));

    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.warning_count(), 1);
    assert!(!queue.has_fatal());
    assert!(queue.has_errors().is_some());
}

#[test]
fn warnings_alone_are_not_errors() {
    let mut queue = DiagnosticQueue::new();
    queue.warn(Diagnostic::warning(ErrorCode::StructContainsPadding));
    assert!(queue.has_errors().is_none());
}

#[test]
fn fatal_is_tracked() {
    let mut queue = DiagnosticQueue::new();
    queue.add(Diagnostic::fatal(ErrorCode::DNodeHasNoString));
    assert!(queue.has_fatal());
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn error_limit_stops_recording() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for line in 1..=5 {
        let _ = queue.emit_error(Diagnostic::error(ErrorCode::InvalidType).at(at(line)));
    }
    assert!(queue.limit_reached());
    assert_eq!(queue.error_count(), 2);
    assert_eq!(queue.peek().count(), 2);

    // Fatal diagnostics still get through.
    assert!(queue.add(too_many_errors(2)));
}

#[test]
fn identical_reports_are_deduplicated() {
    let mut queue = DiagnosticQueue::new();
    let diag = Diagnostic::error(ErrorCode::NotInScope).at(at(3)).with_arg("x");
    assert!(queue.add(diag.clone()));
    assert!(!queue.add(diag));
    assert!(queue.add(Diagnostic::error(ErrorCode::NotInScope).at(at(3)).with_arg("y")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn flush_preserves_report_order() {
    let mut queue = DiagnosticQueue::new();
    let _ = queue.emit_error(Diagnostic::error(ErrorCode::InvalidType).at(at(9)));
    let _ = queue.emit_error(Diagnostic::error(ErrorCode::InvalidCast).at(at(1)));
    let codes: Vec<_> = queue.flush().into_iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::InvalidType, ErrorCode::InvalidCast]);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn emit_error_promotes_warnings() {
    let mut queue = DiagnosticQueue::new();
    let _ = queue.emit_error(Diagnostic::warning(ErrorCode::StructContainsPadding));
    assert_eq!(queue.error_count(), 1);
    assert!(queue.contains_code(ErrorCode::StructContainsPadding));
}
