//! Property-based tests for global definitions.

use dale_diagnostic::ErrorCode;
use dale_forms::{Constant, RecordingSink, Session, SessionConfig};
use proptest::prelude::*;

fn run(source: &str) -> (RecordingSink, Vec<ErrorCode>) {
    let mut sink = RecordingSink::new();
    let mut session = Session::new(SessionConfig::default().with_error_limit(0), &mut sink);
    let _ = session.process_source("prop.dt", source);
    let codes = session.diagnostics().peek().map(|d| d.code).collect();
    drop(session);
    (sink, codes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn int8_initialisers_in_range(value in i8::MIN..=i8::MAX) {
        let (sink, codes) = run(&format!("(def n (var intern int8 {value}))"));
        prop_assert!(codes.is_empty());
        let init = sink.global("n").and_then(|g| g.init.clone());
        prop_assert!(
            matches!(init, Some(Constant::Int { value: v, .. }) if v == i128::from(value)),
            "{init:?}"
        );
    }

    #[test]
    fn int8_initialisers_out_of_range(value in prop_oneof![-10_000i64..-128, 128i64..10_000]) {
        let (sink, codes) = run(&format!("(def n (var intern int8 {value}))"));
        prop_assert_eq!(codes, vec![ErrorCode::UnableToParseInteger]);
        prop_assert!(sink.global("n").is_none());
    }

    #[test]
    fn each_redefinition_is_reported(names in prop::collection::vec("[a-z]{1,3}", 1..12)) {
        let source: String = names
            .iter()
            .map(|name| format!("(def v{name} (var intern int 0))\n"))
            .collect();
        let (sink, codes) = run(&source);
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(sink.globals().len(), unique.len());
        prop_assert_eq!(codes.len(), names.len() - unique.len());
        prop_assert!(codes.iter().all(|&code| code == ErrorCode::RedefinitionOfVariable));
    }
}
