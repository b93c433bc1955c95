//! Type index handle.
//!
//! # Design
//!
//! - 32-bit index into the [`Pool`](crate::Pool)
//! - Primitive types have fixed indices, pre-interned at pool creation
//! - Type equality is index comparison

use std::fmt;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // === Primitive Types ===
    // Order must match `Pool::new`.

    pub const VOID: Self = Self(0);
    pub const BOOL: Self = Self(1);
    /// `char`: 8-bit signed, distinct from `int8`.
    pub const CHAR: Self = Self(2);
    pub const INT8: Self = Self(3);
    pub const INT16: Self = Self(4);
    /// `int` / `int32`.
    pub const INT: Self = Self(5);
    pub const INT64: Self = Self(6);
    pub const INT128: Self = Self(7);
    pub const UINT8: Self = Self(8);
    pub const UINT16: Self = Self(9);
    /// `uint` / `uint32`.
    pub const UINT: Self = Self(10);
    pub const UINT64: Self = Self(11);
    pub const UINT128: Self = Self(12);
    /// 32-bit float.
    pub const FLOAT: Self = Self(13);
    /// 64-bit float.
    pub const DOUBLE: Self = Self(14);

    pub const INT32: Self = Self::INT;
    pub const UINT32: Self = Self::UINT;
    /// `size`: unsigned, pointer-sized.
    pub const SIZE: Self = Self::UINT64;

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 15;

    /// Sentinel value indicating no type.
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_void(self) -> bool {
        self.0 == Self::VOID.0
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Idx::NONE")
        } else {
            write!(f, "Idx({})", self.0)
        }
    }
}
