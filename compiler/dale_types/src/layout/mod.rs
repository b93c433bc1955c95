//! C-like size and alignment.
//!
//! Integers and floats are aligned to their size, pointers and references
//! are 8 bytes, arrays are `len * size` with the element's alignment, and
//! struct fields are placed at the next multiple of their alignment with
//! the struct size rounded up to the largest field alignment.
//!
//! Consecutive bitfields share storage units of their declared type; a
//! bitfield that does not fit in the remaining bits of the current unit
//! starts a new one.

use crate::{Idx, Pool, StructDef, TypeData};

/// Size and alignment in bytes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub size: u64,
    pub align: u64,
}

impl Layout {
    const fn scalar(bytes: u64) -> Self {
        Layout {
            size: bytes,
            align: bytes,
        }
    }
}

const POINTER: Layout = Layout::scalar(8);

/// Layout of a type; `None` for types without a storage size (void,
/// functions, opaque structs).
pub fn layout(pool: &Pool, ty: Idx) -> Option<Layout> {
    match pool.data(ty) {
        TypeData::Void | TypeData::Function { .. } => None,
        TypeData::Bool | TypeData::Char => Some(Layout::scalar(1)),
        TypeData::Int { bits, .. } | TypeData::Float { bits } => {
            Some(Layout::scalar(u64::from(*bits).div_ceil(8)))
        }
        TypeData::Pointer { .. } | TypeData::Reference { .. } => Some(POINTER),
        TypeData::Array { of, len } => {
            let elem = layout(pool, *of)?;
            Some(Layout {
                size: elem.size.saturating_mul(*len),
                align: elem.align,
            })
        }
        TypeData::Enum { .. } => {
            let def = pool.enum_def_of(ty)?;
            layout(pool, def.underlying)
        }
        TypeData::Struct { .. } => {
            let def = pool.struct_def_of(ty)?;
            if def.opaque {
                return None;
            }
            struct_layout(pool, def).map(|(layout, _)| layout)
        }
    }
}

/// Whether the struct body contains padding bytes.
///
/// Opaque or undefined structs have no known body and report `false`.
pub fn struct_has_padding(pool: &Pool, ty: Idx) -> bool {
    pool.struct_def_of(ty)
        .filter(|def| !def.opaque)
        .and_then(|def| struct_layout(pool, def))
        .is_some_and(|(_, padding)| padding > 0)
}

fn align_to(offset: u64, align: u64) -> u64 {
    if align <= 1 {
        offset
    } else {
        offset.div_ceil(align) * align
    }
}

/// Layout of a struct body plus the number of padding bytes in it.
fn struct_layout(pool: &Pool, def: &StructDef) -> Option<(Layout, u64)> {
    let mut offset = 0u64;
    let mut align = 1u64;
    let mut used = 0u64;
    // Open bitfield unit: (unit size in bytes, bits still free).
    let mut unit: Option<(u64, u64)> = None;

    for field in &def.fields {
        let field_layout = layout(pool, field.ty)?;
        align = align.max(field_layout.align);

        if let Some(width) = field.bitfield {
            let width = u64::from(width);
            let unit_bits = field_layout.size * 8;
            match unit {
                Some((size, free)) if size == field_layout.size && free >= width => {
                    unit = Some((size, free - width));
                }
                _ => {
                    offset = align_to(offset, field_layout.align) + field_layout.size;
                    used += field_layout.size;
                    unit = Some((field_layout.size, unit_bits.saturating_sub(width)));
                }
            }
            continue;
        }

        unit = None;
        offset = align_to(offset, field_layout.align) + field_layout.size;
        used += field_layout.size;
    }

    let size = align_to(offset, align);
    Some((Layout { size, align }, size - used))
}

#[cfg(test)]
mod tests;
