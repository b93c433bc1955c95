//! Recursion safety for form dispatch and macro expansion.
//!
//! Two separate guards:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand, so deeply
//!   nested source (long `do` chains, nested calls) cannot overflow it.
//! - [`DepthBudget`] bounds *logical* recursion. A macro that expands to a
//!   call of itself never nests deeper in the source, only in the expander,
//!   so stack growth alone would just run until memory is exhausted.
//!
//! On WASM the stack guard is a passthrough.

/// Grow the stack when less than this remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each stack segment allocated on growth (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the remaining space is in the red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Returned by [`DepthBudget::try_enter`] when the limit would be exceeded.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DepthExceeded {
    pub limit: usize,
}

/// Counter bounding nested re-entry of a recursive pass.
///
/// Callers pair every successful [`try_enter`](Self::try_enter) with an
/// [`exit`](Self::exit); the budget is owned by the session rather than
/// held as an RAII guard because the recursive call needs `&mut` access to
/// the same session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepthBudget {
    depth: usize,
    limit: usize,
}

impl DepthBudget {
    /// Budget allowing `limit` nested entries (0 = unlimited).
    pub const fn new(limit: usize) -> Self {
        DepthBudget { depth: 0, limit }
    }

    /// Enter one level deeper.
    pub fn try_enter(&mut self) -> Result<(), DepthExceeded> {
        if self.limit > 0 && self.depth >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave one level.
    pub fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current nesting depth.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    pub const fn limit(&self) -> usize {
        self.limit
    }
}
