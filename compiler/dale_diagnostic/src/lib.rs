//! Diagnostic system for the Dale semantic core.
//!
//! Every problem the compiler reports is a `(phase, code, template)` triple:
//! - `Phase` says which stage detected it (lexer, parser or generator)
//! - `ErrorCode` identifies it stably (`E3024`)
//! - the template is a message with positional `%s` placeholders
//!
//! # Error Guarantees
//!
//! `ErrorGuaranteed` is type-level proof that at least one error was
//! emitted. Form handlers return `Result<_, ErrorGuaranteed>`, and the only
//! way to build the error side is to push a diagnostic into the queue.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! fn handle_setf(..) -> Result<ParseResult, ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{render_template, Diagnostic, Severity};
pub use error_code::{template_for_raw, ErrorCode, Phase, UNKNOWN_TEMPLATE};
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
