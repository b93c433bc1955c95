//! Scope errors and their conversion into diagnostics.

use dale_diagnostic::{Diagnostic, ErrorCode};
use dale_ir::{Loc, Name, StringInterner};

/// A failed definition, lookup or namespace operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScopeError {
    RedefinitionOfVariable(Name),
    RedeclarationOfStruct(Name),
    RedeclarationOfEnum(Name),
    RedeclarationOfLabel(Name),
    RedeclarationOfFunctionOrMacro(Name),
    FunctionHasSameParamsAsMacro(Name),
    MacroHasSameParamsAsFunction(Name),
    ExternCXorOtherLinkageForName(Name),
    /// Qualified name whose namespace prefix does not resolve.
    NamespaceNotInScope(Name),
    NamespaceNotInContext(Name),
    CannotDeactivateInactiveNamespace(Name),
    CannotDeactivateNonLastNamespace(Name),
}

impl ScopeError {
    pub fn code(self) -> ErrorCode {
        match self {
            ScopeError::RedefinitionOfVariable(_) => ErrorCode::RedefinitionOfVariable,
            ScopeError::RedeclarationOfStruct(_) => ErrorCode::RedeclarationOfStruct,
            ScopeError::RedeclarationOfEnum(_) => ErrorCode::RedeclarationOfEnum,
            ScopeError::RedeclarationOfLabel(_) => ErrorCode::RedeclarationOfLabel,
            ScopeError::RedeclarationOfFunctionOrMacro(_) => {
                ErrorCode::RedeclarationOfFunctionOrMacro
            }
            ScopeError::FunctionHasSameParamsAsMacro(_) => ErrorCode::FunctionHasSameParamsAsMacro,
            ScopeError::MacroHasSameParamsAsFunction(_) => ErrorCode::MacroHasSameParamsAsFunction,
            ScopeError::ExternCXorOtherLinkageForName(_) => {
                ErrorCode::ExternCXorOtherLinkageForName
            }
            ScopeError::NamespaceNotInScope(_) => ErrorCode::NamespaceNotInScope,
            ScopeError::NamespaceNotInContext(_) => ErrorCode::NamespaceNotInContext,
            ScopeError::CannotDeactivateInactiveNamespace(_) => {
                ErrorCode::CannotDeactivateInactiveNamespace
            }
            ScopeError::CannotDeactivateNonLastNamespace(_) => {
                ErrorCode::CannotDeactivateNonLastNamespace
            }
        }
    }

    /// The name the error is about.
    pub fn name(self) -> Name {
        match self {
            ScopeError::RedefinitionOfVariable(n)
            | ScopeError::RedeclarationOfStruct(n)
            | ScopeError::RedeclarationOfEnum(n)
            | ScopeError::RedeclarationOfLabel(n)
            | ScopeError::RedeclarationOfFunctionOrMacro(n)
            | ScopeError::FunctionHasSameParamsAsMacro(n)
            | ScopeError::MacroHasSameParamsAsFunction(n)
            | ScopeError::ExternCXorOtherLinkageForName(n)
            | ScopeError::NamespaceNotInScope(n)
            | ScopeError::NamespaceNotInContext(n)
            | ScopeError::CannotDeactivateInactiveNamespace(n)
            | ScopeError::CannotDeactivateNonLastNamespace(n) => n,
        }
    }

    #[cold]
    pub fn into_diagnostic(self, loc: Loc, interner: &StringInterner) -> Diagnostic {
        let diag = Diagnostic::error(self.code()).at(loc);
        if self.code().arity() == 0 {
            diag
        } else {
            diag.with_arg(interner.lookup(self.name()))
        }
    }
}
