//! Type pool: interned type descriptors plus struct and enum bodies.
//!
//! # Design
//!
//! Each distinct [`TypeData`] is stored once and addressed by [`Idx`].
//! Primitives are pre-interned in the order of the `Idx` constants.
//! Struct and enum bodies are keyed by their fully qualified name; a
//! nominal type may be interned (e.g. for a pointer-to-struct field) before
//! its body is known.

mod format;

use dale_ir::Name;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{EnumDef, Idx, StructDef, TypeData};

/// What `Pool::data` reads for indices it does not own.
static VOID_DATA: TypeData = TypeData::Void;

/// Interned storage for every type of a compile session.
#[derive(Clone, Debug)]
pub struct Pool {
    items: Vec<TypeData>,
    map: FxHashMap<TypeData, Idx>,
    structs: FxHashMap<Name, StructDef>,
    enums: FxHashMap<Name, EnumDef>,
}

impl Pool {
    /// Create a pool with all primitive types pre-interned.
    pub fn new() -> Self {
        let mut pool = Pool {
            items: Vec::with_capacity(64),
            map: FxHashMap::default(),
            structs: FxHashMap::default(),
            enums: FxHashMap::default(),
        };
        let primitives = [
            TypeData::Void,
            TypeData::Bool,
            TypeData::Char,
            TypeData::Int { bits: 8, signed: true },
            TypeData::Int { bits: 16, signed: true },
            TypeData::Int { bits: 32, signed: true },
            TypeData::Int { bits: 64, signed: true },
            TypeData::Int { bits: 128, signed: true },
            TypeData::Int { bits: 8, signed: false },
            TypeData::Int { bits: 16, signed: false },
            TypeData::Int { bits: 32, signed: false },
            TypeData::Int { bits: 64, signed: false },
            TypeData::Int { bits: 128, signed: false },
            TypeData::Float { bits: 32 },
            TypeData::Float { bits: 64 },
        ];
        for data in primitives {
            pool.intern(data);
        }
        debug_assert_eq!(pool.items.len(), Idx::PRIMITIVE_COUNT as usize);
        pool
    }

    /// Intern a descriptor, returning the existing index if already present.
    pub fn intern(&mut self, data: TypeData) -> Idx {
        if let Some(&idx) = self.map.get(&data) {
            return idx;
        }
        let idx = Idx::from_raw(u32::try_from(self.items.len()).unwrap_or(u32::MAX - 1));
        self.items.push(data.clone());
        self.map.insert(data, idx);
        idx
    }

    /// Descriptor of a type. `Idx::NONE` and foreign indices read as `Void`.
    pub fn data(&self, idx: Idx) -> &TypeData {
        self.items.get(idx.index()).unwrap_or(&VOID_DATA)
    }

    /// Number of interned types.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // === Constructors ===

    /// `(p to)`.
    pub fn pointer(&mut self, to: Idx) -> Idx {
        self.intern(TypeData::Pointer { to, is_const: false })
    }

    /// `(p (const to))`.
    pub fn const_pointer(&mut self, to: Idx) -> Idx {
        self.intern(TypeData::Pointer { to, is_const: true })
    }

    /// `(ref to)`.
    pub fn reference(&mut self, to: Idx) -> Idx {
        self.intern(TypeData::Reference { to })
    }

    /// `(array-of len of)`.
    pub fn array(&mut self, of: Idx, len: u64) -> Idx {
        self.intern(TypeData::Array { of, len })
    }

    /// Function type.
    pub fn function(&mut self, params: &[Idx], variadic: bool, ret: Idx) -> Idx {
        self.intern(TypeData::Function {
            params: SmallVec::from_slice(params),
            variadic,
            ret,
        })
    }

    /// Integer type of the given width and signedness.
    pub fn int(&mut self, bits: u8, signed: bool) -> Idx {
        self.intern(TypeData::Int { bits, signed })
    }

    /// Nominal struct type (body may not be defined yet).
    pub fn struct_type(&mut self, name: Name) -> Idx {
        self.intern(TypeData::Struct { name })
    }

    /// Nominal enum type (body may not be defined yet).
    pub fn enum_type(&mut self, name: Name) -> Idx {
        self.intern(TypeData::Enum { name })
    }

    // === Nominal bodies ===

    /// Record a struct body, returning the struct's type.
    ///
    /// A later definition replaces an opaque one; callers reject genuine
    /// redeclarations through the scope tables before getting here.
    pub fn define_struct(&mut self, name: Name, def: StructDef) -> Idx {
        tracing::trace!(?name, fields = def.fields.len(), opaque = def.opaque, "define struct");
        self.structs.insert(name, def);
        self.struct_type(name)
    }

    /// Record an enum body, returning the enum's type.
    pub fn define_enum(&mut self, name: Name, def: EnumDef) -> Idx {
        tracing::trace!(?name, elements = def.elements.len(), "define enum");
        self.enums.insert(name, def);
        self.enum_type(name)
    }

    pub fn struct_def(&self, name: Name) -> Option<&StructDef> {
        self.structs.get(&name)
    }

    pub fn enum_def(&self, name: Name) -> Option<&EnumDef> {
        self.enums.get(&name)
    }

    /// Struct body for a struct type index.
    pub fn struct_def_of(&self, idx: Idx) -> Option<&StructDef> {
        match self.data(idx) {
            TypeData::Struct { name } => self.struct_def(*name),
            _ => None,
        }
    }

    /// Enum body for an enum type index.
    pub fn enum_def_of(&self, idx: Idx) -> Option<&EnumDef> {
        match self.data(idx) {
            TypeData::Enum { name } => self.enum_def(*name),
            _ => None,
        }
    }

    // === Queries ===

    /// Width and signedness of integer-like types (`char` counts as `int8`).
    pub fn int_info(&self, idx: Idx) -> Option<(u8, bool)> {
        match *self.data(idx) {
            TypeData::Int { bits, signed } => Some((bits, signed)),
            TypeData::Char => Some((8, true)),
            _ => None,
        }
    }

    /// Integer types, `char` included; `bool` excluded.
    pub fn is_integer(&self, idx: Idx) -> bool {
        self.int_info(idx).is_some()
    }

    pub fn is_float(&self, idx: Idx) -> bool {
        matches!(self.data(idx), TypeData::Float { .. })
    }

    /// Types that participate in numeric casts: integers, floats, bool, enums.
    pub fn is_numeric(&self, idx: Idx) -> bool {
        matches!(
            self.data(idx),
            TypeData::Int { .. }
                | TypeData::Char
                | TypeData::Bool
                | TypeData::Float { .. }
                | TypeData::Enum { .. }
        )
    }

    pub fn is_pointer(&self, idx: Idx) -> bool {
        matches!(self.data(idx), TypeData::Pointer { .. })
    }

    /// Pointee and const flag of a pointer type.
    pub fn pointee(&self, idx: Idx) -> Option<(Idx, bool)> {
        match *self.data(idx) {
            TypeData::Pointer { to, is_const } => Some((to, is_const)),
            _ => None,
        }
    }

    pub fn is_array(&self, idx: Idx) -> bool {
        matches!(self.data(idx), TypeData::Array { .. })
    }

    pub fn is_reference(&self, idx: Idx) -> bool {
        matches!(self.data(idx), TypeData::Reference { .. })
    }

    /// Whether a struct type has no body or was declared opaque.
    pub fn is_opaque_struct(&self, idx: Idx) -> bool {
        match self.data(idx) {
            TypeData::Struct { name } => self.struct_def(*name).map_or(true, |d| d.opaque),
            _ => false,
        }
    }

    /// Strip one level of `(ref T)`.
    pub fn strip_reference(&self, idx: Idx) -> Idx {
        match *self.data(idx) {
            TypeData::Reference { to } => to,
            _ => idx,
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}
