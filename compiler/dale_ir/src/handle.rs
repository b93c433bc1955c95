//! Opaque handles into the code-generation backend.
//!
//! The semantic core never looks inside these; it only threads them from
//! the code sink that produced them back into later instructions.

use std::fmt;

/// A value produced by the backend (register, global, constant).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct ValueHandle(u32);

impl ValueHandle {
    /// Placeholder for results that carry no backend value (e.g. `void`).
    pub const NONE: ValueHandle = ValueHandle(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        ValueHandle(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl fmt::Debug for ValueHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "%none")
        } else {
            write!(f, "%{}", self.0)
        }
    }
}

/// A basic block inside the function currently being generated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Blocks of global initialisers, outside any function.
    pub const GLOBAL: BlockId = BlockId(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        BlockId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::GLOBAL {
            write!(f, "bb.global")
        } else {
            write!(f, "bb{}", self.0)
        }
    }
}
