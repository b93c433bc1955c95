//! Type descriptors and nominal type bodies.

use dale_ir::Name;
use smallvec::SmallVec;

use crate::Idx;

/// Structural description of a type, interned in the [`Pool`](crate::Pool).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    Void,
    Bool,
    Char,
    Int {
        bits: u8,
        signed: bool,
    },
    Float {
        bits: u8,
    },
    /// `(p T)`; `is_const` marks a pointer to const data.
    Pointer {
        to: Idx,
        is_const: bool,
    },
    /// `(ref T)`: only valid as a parameter type.
    Reference {
        to: Idx,
    },
    Array {
        of: Idx,
        len: u64,
    },
    /// Nominal; the body lives in the pool's struct table.
    Struct {
        name: Name,
    },
    /// Nominal; the body lives in the pool's enum table.
    Enum {
        name: Name,
    },
    Function {
        params: SmallVec<[Idx; 4]>,
        variadic: bool,
        ret: Idx,
    },
}

/// One struct member.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Field {
    pub name: Name,
    pub ty: Idx,
    /// Width in bits for `(bf type width)` members.
    pub bitfield: Option<u8>,
}

/// Body of a struct type.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct StructDef {
    pub fields: Vec<Field>,
    /// Declared without a field list; cannot be instantiated by value.
    pub opaque: bool,
}

impl StructDef {
    /// Look up a field by name, with its position.
    pub fn field(&self, name: Name) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }
}

/// Body of an enum type.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct EnumDef {
    /// Integer type the elements are stored as.
    pub underlying: Idx,
    pub elements: Vec<(Name, i64)>,
}

impl EnumDef {
    pub fn value(&self, element: Name) -> Option<i64> {
        self.elements
            .iter()
            .find(|(name, _)| *name == element)
            .map(|&(_, value)| value)
    }
}
