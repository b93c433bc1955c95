//! Diagnostic queue for collecting diagnostics across a compile session.
//!
//! Features:
//! - Error limit so a broken unit does not produce unbounded output
//! - Deduplication of identical reports (same code, location and arguments)
//! - Error, warning and fatal bookkeeping
//! - `ErrorGuaranteed` proof that errors were emitted

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

/// Configuration for diagnostic collection.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors recorded before the limit is reached (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic identical to one already recorded.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 64,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Ordered collection of the diagnostics reported so far.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
    has_fatal: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Record a diagnostic of any severity.
    ///
    /// Returns `true` if the diagnostic was recorded, `false` if it was
    /// filtered by the error limit or deduplication.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error && self.limit_reached() && !diag.is_fatal() {
            return false;
        }
        if self.config.deduplicate && self.diagnostics.contains(&diag) {
            return false;
        }

        match diag.severity {
            Severity::Error => self.error_count += 1,
            Severity::Fatal => {
                self.error_count += 1;
                self.has_fatal = true;
            }
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    ///
    /// Warnings and notes passed here are promoted to errors: a caller that
    /// wants an `ErrorGuaranteed` is reporting a failure.
    pub fn emit_error(&mut self, mut diag: Diagnostic) -> ErrorGuaranteed {
        if !diag.is_error() {
            diag.severity = Severity::Error;
        }
        // Filtered diagnostics are duplicates or over the limit; either way
        // an error is already on record.
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Record a warning.
    pub fn warn(&mut self, mut diag: Diagnostic) {
        diag.severity = Severity::Warning;
        self.add(diag);
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors collected (fatal errors included).
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Get the number of warnings collected.
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Check if a fatal diagnostic has been recorded.
    pub fn has_fatal(&self) -> bool {
        self.has_fatal
    }

    /// Proof that errors were emitted, if any were.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Whether any recorded diagnostic carries `code`.
    pub fn contains_code(&self, code: ErrorCode) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    /// Diagnostics without clearing the queue, in report order.
    pub fn peek(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Take every diagnostic, in report order, and reset the counters.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        self.warning_count = 0;
        self.has_fatal = false;
        std::mem::take(&mut self.diagnostics)
    }

    /// Configuration in effect.
    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }
}

/// Create a "too many errors" diagnostic.
#[cold]
pub fn too_many_errors(limit: usize) -> Diagnostic {
    Diagnostic::fatal(ErrorCode::TooManyErrors)
        .with_arg(limit.to_string())
        .with_note("raise the session error limit to see more")
}

#[cfg(test)]
mod tests;
