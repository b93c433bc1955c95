use dale_ir::{Name, StringInterner};

use super::*;
use crate::{EnumDef, Field};

fn field(interner: &StringInterner, name: &str, ty: Idx) -> Field {
    Field {
        name: interner.intern(name),
        ty,
        bitfield: None,
    }
}

fn bits(interner: &StringInterner, name: &str, ty: Idx, width: u8) -> Field {
    Field {
        name: interner.intern(name),
        ty,
        bitfield: Some(width),
    }
}

fn define(pool: &mut Pool, name: Name, fields: Vec<Field>) -> Idx {
    pool.define_struct(
        name,
        StructDef {
            fields,
            opaque: false,
        },
    )
}

#[test]
fn scalar_layouts() {
    let mut pool = Pool::new();
    let ptr = pool.pointer(Idx::CHAR);
    assert_eq!(layout(&pool, Idx::INT), Some(Layout { size: 4, align: 4 }));
    assert_eq!(layout(&pool, Idx::DOUBLE), Some(Layout { size: 8, align: 8 }));
    assert_eq!(layout(&pool, Idx::BOOL), Some(Layout { size: 1, align: 1 }));
    assert_eq!(layout(&pool, ptr), Some(Layout { size: 8, align: 8 }));
    assert_eq!(layout(&pool, Idx::VOID), None);
}

#[test]
fn arrays_and_enums() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let arr = pool.array(Idx::INT16, 5);
    assert_eq!(layout(&pool, arr), Some(Layout { size: 10, align: 2 }));

    let e = pool.define_enum(
        interner.intern("small"),
        EnumDef {
            underlying: Idx::UINT8,
            elements: vec![],
        },
    );
    assert_eq!(layout(&pool, e), Some(Layout { size: 1, align: 1 }));
}

#[test]
fn struct_padding() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();

    let padded = define(
        &mut pool,
        interner.intern("padded"),
        vec![field(&interner, "c", Idx::CHAR), field(&interner, "i", Idx::INT)],
    );
    assert_eq!(layout(&pool, padded), Some(Layout { size: 8, align: 4 }));
    assert!(struct_has_padding(&pool, padded));

    let tight = define(
        &mut pool,
        interner.intern("tight"),
        vec![field(&interner, "a", Idx::INT), field(&interner, "b", Idx::INT)],
    );
    assert_eq!(layout(&pool, tight), Some(Layout { size: 8, align: 4 }));
    assert!(!struct_has_padding(&pool, tight));

    let tail = define(
        &mut pool,
        interner.intern("tail"),
        vec![field(&interner, "d", Idx::INT64), field(&interner, "c", Idx::CHAR)],
    );
    assert_eq!(layout(&pool, tail), Some(Layout { size: 16, align: 8 }));
    assert!(struct_has_padding(&pool, tail));
}

#[test]
fn bitfields_share_units() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let flags = define(
        &mut pool,
        interner.intern("flags"),
        vec![
            bits(&interner, "a", Idx::UINT, 3),
            bits(&interner, "b", Idx::UINT, 29),
            bits(&interner, "c", Idx::UINT, 1),
        ],
    );
    // a and b fill one 32-bit unit; c opens a second.
    assert_eq!(layout(&pool, flags), Some(Layout { size: 8, align: 4 }));
    assert!(!struct_has_padding(&pool, flags));
}

#[test]
fn opaque_structs_have_no_layout() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let opaque = pool.define_struct(
        interner.intern("file"),
        StructDef {
            fields: vec![],
            opaque: true,
        },
    );
    assert_eq!(layout(&pool, opaque), None);
    assert!(!struct_has_padding(&pool, opaque));
}
