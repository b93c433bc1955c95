use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::UnterminatedStringLiteral.to_string(), "E1001");
    assert_eq!(ErrorCode::RedefinitionOfVariable.as_str(), "E3040");
}

#[test]
fn test_phases() {
    assert_eq!(ErrorCode::InvalidInteger.phase(), Phase::Lexer);
    assert_eq!(ErrorCode::MissingRightParen.phase(), Phase::Parser);
    assert_eq!(ErrorCode::SetfOverridesMustReturnBool.phase(), Phase::Generator);

    assert!(ErrorCode::ExpectedLeftParen.is_reader_error());
    assert!(!ErrorCode::NotInScope.is_reader_error());
}

#[test]
fn test_templates() {
    assert_eq!(
        ErrorCode::RedefinitionOfVariable.template(),
        "variable '%s' has already been defined in this scope"
    );
    assert_eq!(
        ErrorCode::IfBranchesHaveDifferentTypes.template(),
        "'if' branches must have the same type (got %s and %s)"
    );
    assert_eq!(ErrorCode::FileError.template(), "%s: %s");
}

#[test]
fn test_unknown_raw_code() {
    assert_eq!(template_for_raw(9999), "(Unknown)");
    assert_eq!(template_for_raw(0), UNKNOWN_TEMPLATE);
    assert_eq!(template_for_raw(3059), "setf overrides must return bool");
}

#[test]
fn test_all_codes_are_unique_and_round_trip() {
    let mut seen = std::collections::HashSet::new();
    for &code in ErrorCode::ALL {
        assert!(seen.insert(code.raw()), "duplicate raw code {}", code.raw());
        assert_eq!(ErrorCode::from_raw(code.raw()), Some(code));
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(code));
        assert!(!code.template().is_empty());
    }
}

#[test]
fn test_numbering_matches_phase() {
    for &code in ErrorCode::ALL {
        let expected = match code.raw() / 1000 {
            1 => Phase::Lexer,
            2 => Phase::Parser,
            _ => Phase::Generator,
        };
        assert_eq!(code.phase(), expected, "{code}");
    }
}

#[test]
fn test_arity() {
    assert_eq!(ErrorCode::InvalidType.arity(), 0);
    assert_eq!(ErrorCode::NotInScope.arity(), 1);
    assert_eq!(ErrorCode::IncorrectArgType.arity(), 4);
    assert_eq!(
        ErrorCode::OverloadedFunctionOrMacroNotInScopeWithClosest.arity(),
        3
    );
}

#[test]
fn test_internal_faults() {
    assert!(ErrorCode::DNodeHasNoString.is_internal_fault());
    assert!(ErrorCode::MacroExpansionTooDeep.is_internal_fault());
    assert!(!ErrorCode::GotNullPointerFromMacroCall.is_internal_fault());
}

#[test]
fn test_from_str_rejects_garbage() {
    assert!("3040".parse::<ErrorCode>().is_err());
    assert!("E".parse::<ErrorCode>().is_err());
    assert!("E4242".parse::<ErrorCode>().is_err());
}
