//! A single scope frame.

use dale_ir::{BlockId, Loc, Name, ValueHandle};
use dale_types::Idx;
use rustc_hash::FxHashMap;

use crate::{CallableId, Linkage};

/// A named storage location.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Variable {
    pub name: Name,
    pub ty: Idx,
    /// Declared `(const T)`: assignments are rejected.
    pub is_const: bool,
    pub linkage: Linkage,
    /// Address of the storage.
    pub address: ValueHandle,
    pub is_global: bool,
    pub loc: Loc,
}

/// A `(label name)` target.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Label {
    pub block: BlockId,
    /// Number of variables declared in the function before the label.
    pub declarations: u32,
    pub loc: Loc,
}

/// Whether a type name is being introduced by a struct or enum form.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TypeDeclKind {
    Struct,
    Enum,
}

/// Name tables of one lexical block or namespace.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub(crate) vars: FxHashMap<Name, Variable>,
    /// Callables by name, in registration order.
    pub(crate) callables: FxHashMap<Name, Vec<CallableId>>,
    pub(crate) types: FxHashMap<Name, Idx>,
    pub(crate) labels: FxHashMap<Name, Label>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn variable(&self, name: Name) -> Option<&Variable> {
        self.vars.get(&name)
    }

    pub fn type_named(&self, name: Name) -> Option<Idx> {
        self.types.get(&name).copied()
    }

    pub fn label(&self, name: Name) -> Option<&Label> {
        self.labels.get(&name)
    }

    pub fn callables(&self, name: Name) -> &[CallableId] {
        self.callables.get(&name).map_or(&[], Vec::as_slice)
    }

    /// Names of every variable, type and callable defined here.
    pub fn defined_names(&self) -> impl Iterator<Item = Name> + '_ {
        self.vars
            .keys()
            .chain(self.types.keys())
            .chain(self.callables.keys())
            .copied()
    }
}
