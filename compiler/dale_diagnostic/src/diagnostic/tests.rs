use pretty_assertions::assert_eq;

use super::*;

#[test]
fn renders_positional_arguments() {
    let diag = Diagnostic::error(ErrorCode::OverloadedFunctionOrMacroNotInScopeWithClosest)
        .with_arg("foo")
        .with_arg("int bool")
        .with_arg("int int");
    assert_eq!(
        diag.message(),
        "overloaded function/macro not in scope: 'foo' (parameters are int bool, closest candidate expects int int)"
    );
}

#[test]
fn missing_arguments_render_empty() {
    let diag = Diagnostic::error(ErrorCode::IfBranchesHaveDifferentTypes).with_arg("int");
    assert_eq!(
        diag.message(),
        "'if' branches must have the same type (got int and )"
    );
}

#[test]
fn template_without_placeholders() {
    assert_eq!(render_template("invalid type", &["x".to_owned()]), "invalid type");
    assert_eq!(render_template("%s", &["whole".to_owned()]), "whole");
}

#[test]
fn severity_predicates() {
    let error = Diagnostic::error(ErrorCode::InvalidType);
    let fatal = Diagnostic::fatal(ErrorCode::DNodeHasNoString);
    let warning = Diagnostic::warning(ErrorCode::StructContainsPadding);

    assert!(error.is_error() && !error.is_fatal());
    assert!(fatal.is_error() && fatal.is_fatal());
    assert!(!warning.is_error());
}

#[test]
fn render_includes_location_and_notes() {
    let interner = StringInterner::new();
    let loc = Loc::new(interner.intern("a.dt"), 2, 7);
    let diag = Diagnostic::error(ErrorCode::RedefinitionOfVariable)
        .at(loc)
        .with_arg("x")
        .with_note("previous definition here");
    assert_eq!(
        diag.render(&interner),
        "a.dt:2:7: error: variable 'x' has already been defined in this scope\n  note: previous definition here"
    );
}

#[test]
fn with_args_appends_in_order() {
    let diag = Diagnostic::error(ErrorCode::InvalidCast).with_args(["int", "(p void)"]);
    assert_eq!(diag.message(), "unable to cast from type int to type (p void)");
}
