//! Type errors and their conversion into diagnostics.

use dale_diagnostic::{Diagnostic, ErrorCode};
use dale_ir::{Loc, Name, StringInterner};

use crate::{Idx, Pool};

/// A failed type check.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeError {
    InvalidCast { from: Idx, to: Idx },
    CannotDereferenceNonPointer { ty: Idx },
    CannotDereferenceVoidPointer { ty: Idx },
    NotFirstClass { ty: Idx },
    IfBranchesHaveDifferentTypes { then_ty: Idx, else_ty: Idx },
    IncorrectType { expected: Idx, found: Idx },
    IncorrectReturnType { expected: Idx, found: Idx },
    EnumTypeMustBeInteger,
    EnumValueDoesNotExist { element: Name },
    BitfieldMustHaveIntegerType,
}

impl TypeError {
    /// Error code reported for this failure.
    pub fn code(self) -> ErrorCode {
        match self {
            TypeError::InvalidCast { .. } => ErrorCode::InvalidCast,
            TypeError::CannotDereferenceNonPointer { .. } => ErrorCode::CannotDereferenceNonPointer,
            TypeError::CannotDereferenceVoidPointer { .. } => {
                ErrorCode::CannotDereferenceVoidPointer
            }
            TypeError::NotFirstClass { .. } => ErrorCode::TypeIsNotFirstClass,
            TypeError::IfBranchesHaveDifferentTypes { .. } => {
                ErrorCode::IfBranchesHaveDifferentTypes
            }
            TypeError::IncorrectType { .. } => ErrorCode::IncorrectType,
            TypeError::IncorrectReturnType { .. } => ErrorCode::IncorrectReturnType,
            TypeError::EnumTypeMustBeInteger => ErrorCode::EnumTypeMustBeInteger,
            TypeError::EnumValueDoesNotExist { .. } => ErrorCode::EnumValueDoesNotExist,
            TypeError::BitfieldMustHaveIntegerType => ErrorCode::BitfieldMustHaveIntegerType,
        }
    }

    /// Convert into a diagnostic, rendering types in source syntax.
    #[cold]
    pub fn into_diagnostic(self, loc: Loc, pool: &Pool, interner: &StringInterner) -> Diagnostic {
        let fmt = |idx: Idx| pool.format_type(idx, interner);
        let diag = Diagnostic::error(self.code()).at(loc);
        match self {
            TypeError::InvalidCast { from, to } => diag.with_arg(fmt(from)).with_arg(fmt(to)),
            TypeError::CannotDereferenceNonPointer { ty }
            | TypeError::CannotDereferenceVoidPointer { ty }
            | TypeError::NotFirstClass { ty } => diag.with_arg(fmt(ty)),
            TypeError::IfBranchesHaveDifferentTypes { then_ty, else_ty } => {
                diag.with_arg(fmt(then_ty)).with_arg(fmt(else_ty))
            }
            TypeError::IncorrectType { expected, found }
            | TypeError::IncorrectReturnType { expected, found } => {
                diag.with_arg(fmt(expected)).with_arg(fmt(found))
            }
            TypeError::EnumValueDoesNotExist { element } => {
                diag.with_arg(interner.lookup(element))
            }
            TypeError::EnumTypeMustBeInteger | TypeError::BitfieldMustHaveIntegerType => diag,
        }
    }
}
