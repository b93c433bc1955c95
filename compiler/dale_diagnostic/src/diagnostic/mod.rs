//! Core diagnostic type.
//!
//! A [`Diagnostic`] is an error code plus the positional arguments for its
//! template, the location it was detected at and optional notes. The
//! message is rendered on demand from the code's template.

use std::fmt;

use dale_ir::{Loc, StringInterner};

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    /// Internal invariant violated; the session stops processing.
    Fatal,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Fatal => write!(f, "fatal error"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A reported problem.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    /// Error code; selects the message template.
    pub code: ErrorCode,
    pub severity: Severity,
    /// Where the problem was detected.
    pub loc: Loc,
    /// Template arguments, substituted for `%s` in order.
    pub args: Vec<String>,
    /// Additional notes providing context.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn new_with_severity(code: ErrorCode, severity: Severity) -> Self {
        Diagnostic {
            code,
            severity,
            loc: Loc::DUMMY,
            args: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    #[cold]
    pub fn error(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Error)
    }

    /// Create a new warning diagnostic.
    #[cold]
    pub fn warning(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Warning)
    }

    /// Create a diagnostic for a broken internal invariant.
    #[cold]
    pub fn fatal(code: ErrorCode) -> Self {
        Self::new_with_severity(code, Severity::Fatal)
    }

    /// Set the location.
    pub fn at(mut self, loc: Loc) -> Self {
        self.loc = loc;
        self
    }

    /// Append the next template argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several template arguments.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a note providing additional context.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Rendered message (template with arguments substituted).
    pub fn message(&self) -> String {
        render_template(self.code.template(), &self.args)
    }

    /// Check if this is an error (including fatal errors).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Fatal)
    }

    /// Check if this is a fatal error.
    pub fn is_fatal(&self) -> bool {
        matches!(self.severity, Severity::Fatal)
    }

    /// Render as `file:line:column: error: message`, followed by notes.
    pub fn render(&self, interner: &StringInterner) -> String {
        let mut out = format!(
            "{}: {}: {}",
            self.loc.display(interner),
            self.severity,
            self.message()
        );
        for note in &self.notes {
            out.push_str("\n  note: ");
            out.push_str(note);
        }
        out
    }
}

/// Substitute `%s` placeholders in `template` with `args`, in order.
///
/// Surplus placeholders render as empty; surplus arguments are ignored.
pub fn render_template(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
    let mut args = args.iter();
    let mut pieces = template.split("%s");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for piece in pieces {
        if let Some(arg) = args.next() {
            out.push_str(arg);
        }
        out.push_str(piece);
    }
    out
}

#[cfg(test)]
mod tests;
