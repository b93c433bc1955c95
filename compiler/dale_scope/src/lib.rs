//! Name resolution for the Dale semantic core.
//!
//! - [`ScopeManager`]: lexical frames over a namespace tree, with explicit
//!   namespace activation
//! - [`CallableTable`]: every function and macro, addressed by [`CallableId`]
//! - [`resolve_call`]: overload resolution over the visible callables
//!
//! # Lookup order
//!
//! 1. Lexical frames, innermost first
//! 2. The current namespace, then its ancestors up to the root
//! 3. Activated namespaces, most recently activated first
//!
//! Names containing `.` (`a.b.name`) are namespace-qualified and resolve
//! through the namespace tree instead.

mod callable;
mod error;
mod frame;
mod linkage;
mod manager;
mod resolve;

pub use callable::{
    CallableEntry, CallableFlags, CallableId, CallableKind, CallableTable, MacroId, Param,
};
pub use error::ScopeError;
pub use frame::{Frame, Label, TypeDeclKind, Variable};
pub use linkage::Linkage;
pub use manager::{NamespaceId, Registered, ScopeManager};
pub use resolve::{resolve_among, resolve_call, Resolution, ResolveError, ScoredCandidate};
