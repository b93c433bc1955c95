//! Proof that an error was reported.

use std::fmt;

/// Type-level proof that at least one error diagnostic was emitted.
///
/// Cannot be constructed outside this crate except through
/// [`DiagnosticQueue`](crate::DiagnosticQueue) or [`from_error_count`](Self::from_error_count).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Proof from an existing error count; `None` when no errors were counted.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}
