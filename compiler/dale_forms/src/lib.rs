//! Macro expansion, special-form dispatch and compile sessions.
//!
//! A [`Session`] owns everything one translation unit needs and processes
//! top-level forms one at a time. Each form is routed by its head symbol
//! through the [`FormRegistry`]; anything that is not a special form is a
//! call, resolved among the visible functions and macros. Macro results are
//! dispatched again as if they had been written at the call site.
//!
//! # Example
//!
//! ```
//! use dale_forms::{RecordingSink, Session, SessionConfig};
//!
//! let mut sink = RecordingSink::new();
//! let mut session = Session::new(SessionConfig::default(), &mut sink);
//! session
//!     .process_source("main.dt", "(def n (var intern int 1))")
//!     .ok();
//! assert!(session.finish().is_ok());
//! assert!(sink.global("n").is_some());
//! ```

mod config;
mod dispatch;
mod expand;
mod forms;
mod function;
mod loader;
mod registry;
mod result;
mod session;
mod sink;
mod type_syntax;

use std::sync::Once;

pub use config::SessionConfig;
pub use dispatch::handle;
pub use expand::{
    expand, validate, InvalidExpansion, MacroBody, MacroContext, MacroTable, NativeMacro,
    TemplateMacro, REST,
};
pub use function::{FunctionContext, PendingGoto};
pub use loader::{is_valid_module_name, LoadError, MemoryLoader, ModuleLoader, NoModules};
pub use registry::{FormCall, FormFlags, FormHandler, FormRegistry, TopLevelHandler};
pub use result::ParseResult;
pub use session::{Output, Session, SessionError};
pub use sink::{CodeSink, Constant, DiscardSink, FunctionStart, Instruction, RecordingSink, Symbol};
pub use type_syntax::TypeSyntaxError;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set, and only the first call has an
/// effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
