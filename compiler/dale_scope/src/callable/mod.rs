//! Functions and macros.
//!
//! Both kinds live in one [`CallableTable`] so that overload resolution can
//! rank them together: a call site does not know whether `foo` is a
//! function or a macro until a candidate wins.

use bitflags::bitflags;
use dale_ir::{Loc, Name, ValueHandle};
use dale_types::Idx;

use crate::Linkage;

/// Index of an entry in the [`CallableTable`]. Ids grow in registration order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Debug)]
#[repr(transparent)]
pub struct CallableId(u32);

impl CallableId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        CallableId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the session's macro table (template or native body).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct MacroId(u32);

impl MacroId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        MacroId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Properties of a callable entry.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct CallableFlags: u8 {
        /// Registered as the `setf-copy-assign` override.
        const SETF_OVERRIDE = 1 << 0;
        /// Declared without a body; a later definition completes it.
        const DECLARATION_ONLY = 1 << 1;
        /// Macro body supplied by the embedding application.
        const NATIVE_MACRO = 1 << 2;
    }
}

/// Function or macro.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallableKind {
    Function { ret: Idx },
    Macro { id: MacroId },
}

/// One parameter. Macro parameters may be untyped (`ty == None`) and then
/// accept any argument node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: Option<Idx>,
}

impl Param {
    pub const fn typed(name: Name, ty: Idx) -> Self {
        Param { name, ty: Some(ty) }
    }

    pub const fn untyped(name: Name) -> Self {
        Param { name, ty: None }
    }
}

/// A registered function or macro.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CallableEntry {
    pub name: Name,
    pub kind: CallableKind,
    pub params: Vec<Param>,
    /// Accepts extra arguments after `params`.
    pub variadic: bool,
    pub linkage: Linkage,
    pub flags: CallableFlags,
    pub loc: Loc,
    /// Backend symbol for functions; `ValueHandle::NONE` for macros.
    pub value: ValueHandle,
}

impl CallableEntry {
    pub fn is_macro(&self) -> bool {
        matches!(self.kind, CallableKind::Macro { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, CallableKind::Function { .. })
    }

    /// Return type of a function.
    pub fn return_type(&self) -> Option<Idx> {
        match self.kind {
            CallableKind::Function { ret } => Some(ret),
            CallableKind::Macro { .. } => None,
        }
    }

    /// Parameter types (untyped macro parameters as `None`).
    pub fn param_types(&self) -> impl Iterator<Item = Option<Idx>> + '_ {
        self.params.iter().map(|p| p.ty)
    }

    /// Identical parameter signature: same types in the same positions and
    /// the same variadic flag. Parameter names do not matter.
    pub fn same_signature(&self, other: &CallableEntry) -> bool {
        self.variadic == other.variadic && self.param_types().eq(other.param_types())
    }
}

/// Storage for every callable of a compile session.
#[derive(Clone, Debug, Default)]
pub struct CallableTable {
    entries: Vec<CallableEntry>,
}

impl CallableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry and hand out its id.
    pub fn insert(&mut self, entry: CallableEntry) -> CallableId {
        let id = CallableId::new(u32::try_from(self.entries.len()).unwrap_or(u32::MAX));
        self.entries.push(entry);
        id
    }

    pub fn get(&self, id: CallableId) -> Option<&CallableEntry> {
        self.entries.get(id.index())
    }

    pub fn get_mut(&mut self, id: CallableId) -> Option<&mut CallableEntry> {
        self.entries.get_mut(id.index())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CallableId, &CallableEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| (CallableId::new(u32::try_from(i).unwrap_or(u32::MAX)), e))
    }
}

#[cfg(test)]
mod tests;
