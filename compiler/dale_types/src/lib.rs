//! Type system for the Dale semantic core.
//!
//! Every type is an [`Idx`] into a [`Pool`]. Composite types are interned
//! structurally, so type equality is index equality; structs and enums are
//! nominal and carry their bodies in the pool's definition tables.
//!
//! The checks here are pure functions over the pool:
//! - [`is_castable`] / [`check_cast`] for explicit `cast`
//! - [`check_dereferenceable`], [`check_first_class`], [`unify_branches`]
//! - [`layout`] and [`struct_has_padding`] for C-like size/alignment
//! - [`coercion_rank`] for overload scoring

mod coerce;
mod compat;
mod data;
mod error;
mod idx;
mod layout;
mod pool;

pub use coerce::{coercion_rank, CoercionRank};
pub use compat::{
    check_cast, check_dereferenceable, check_first_class, is_castable, types_equal,
    unify_branches, Branch,
};
pub use data::{EnumDef, Field, StructDef, TypeData};
pub use error::TypeError;
pub use idx::Idx;
pub use layout::{layout, struct_has_padding, Layout};
pub use pool::Pool;
