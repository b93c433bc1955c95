//! Type compatibility checks used by the special forms.
//!
//! All checks are pure: they read the pool and return either a result type
//! or a [`TypeError`] for the caller to report.

use crate::{Idx, Pool, TypeData, TypeError};

/// Type equality. Structural for anonymous composites, nominal for structs
/// and enums; interning makes both an index comparison.
#[inline]
pub fn types_equal(a: Idx, b: Idx) -> bool {
    a == b
}

/// Whether an explicit `(cast value to)` is permitted.
///
/// Allowed: identical types, numeric to numeric (integers, floats, `bool`,
/// enums), pointer to pointer, and pointer to/from integers of at least
/// 64 bits. Everything else, notably struct reinterpretation, arrays, void
/// and functions, is rejected.
pub fn is_castable(pool: &Pool, from: Idx, to: Idx) -> bool {
    if from == to {
        return true;
    }
    if pool.is_numeric(from) && pool.is_numeric(to) {
        return true;
    }
    let wide_int = |idx: Idx| pool.int_info(idx).is_some_and(|(bits, _)| bits >= 64);
    match (pool.is_pointer(from), pool.is_pointer(to)) {
        (true, true) => true,
        (true, false) => wide_int(to),
        (false, true) => wide_int(from),
        (false, false) => false,
    }
}

/// [`is_castable`] as a check.
pub fn check_cast(pool: &Pool, from: Idx, to: Idx) -> Result<(), TypeError> {
    if is_castable(pool, from, to) {
        Ok(())
    } else {
        Err(TypeError::InvalidCast { from, to })
    }
}

/// Pointee of a dereferenceable pointer.
pub fn check_dereferenceable(pool: &Pool, ty: Idx) -> Result<Idx, TypeError> {
    match *pool.data(ty) {
        TypeData::Pointer { to, .. } if to.is_void() => {
            Err(TypeError::CannotDereferenceVoidPointer { ty })
        }
        TypeData::Pointer { to, .. } => Ok(to),
        _ => Err(TypeError::CannotDereferenceNonPointer { ty }),
    }
}

/// Whether values of `ty` can be stored, passed and returned.
///
/// Not first-class: `void`, function types, references and opaque structs.
pub fn check_first_class(pool: &Pool, ty: Idx) -> Result<(), TypeError> {
    let first_class = match pool.data(ty) {
        TypeData::Void | TypeData::Function { .. } | TypeData::Reference { .. } => false,
        TypeData::Struct { .. } => !pool.is_opaque_struct(ty),
        TypeData::Array { of, .. } => check_first_class(pool, *of).is_ok(),
        _ => true,
    };
    if first_class {
        Ok(())
    } else {
        Err(TypeError::NotFirstClass { ty })
    }
}

/// One arm of a conditional.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Branch {
    pub ty: Idx,
    /// The arm ends control flow (`return`, `goto`) and yields no value.
    pub terminates: bool,
}

/// Result type of `(if cond then else)`.
///
/// The branch types must be equal; a terminating branch does not
/// participate, so the other branch's type is taken.
pub fn unify_branches(then_branch: Branch, else_branch: Branch) -> Result<Idx, TypeError> {
    match (then_branch.terminates, else_branch.terminates) {
        (true, false) => Ok(else_branch.ty),
        (false, true) | (true, true) => Ok(then_branch.ty),
        (false, false) if types_equal(then_branch.ty, else_branch.ty) => Ok(then_branch.ty),
        (false, false) => Err(TypeError::IfBranchesHaveDifferentTypes {
            then_ty: then_branch.ty,
            else_ty: else_branch.ty,
        }),
    }
}

#[cfg(test)]
mod tests;
