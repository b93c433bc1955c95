//! Dale IR - the expression tree the semantic core operates on.
//!
//! This crate contains the data structures shared by every phase:
//! - `Loc` for source locations (file, line, column)
//! - `Name` for interned identifiers
//! - `NodeArena` / `NodeId` for the symbolic-expression tree
//! - A small fixture reader that turns source text into nodes
//! - Opaque backend handles (`ValueHandle`, `BlockId`)
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: atom text → `Name(u32)`
//! - **Flatten Everything**: no `Box<Node>`, children are `NodeId(u32)` indices
//! - **Never Mutate**: macro expansion allocates new nodes instead of
//!   rewriting existing ones, so a call-site node never dangles

/// Compile-time assertion that a type has a specific size.
///
/// Used to prevent accidental size regressions in frequently-allocated types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod handle;
mod interner;
mod loc;
mod name;
mod node;
pub mod reader;

pub use handle::{BlockId, ValueHandle};
pub use interner::{InternError, StringInterner};
pub use loc::{Loc, LocDisplay};
pub use name::Name;
pub use node::{NodeArena, NodeDisplay, NodeId, NodeKind, NodeRange};
pub use reader::{read_forms, ReadError, ReadErrorKind};
