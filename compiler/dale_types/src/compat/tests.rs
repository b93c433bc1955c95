use dale_ir::StringInterner;

use super::*;
use crate::{EnumDef, Field, StructDef};

#[test]
fn numeric_casts() {
    let pool = Pool::new();
    assert!(is_castable(&pool, Idx::INT, Idx::DOUBLE));
    assert!(is_castable(&pool, Idx::FLOAT, Idx::UINT8));
    assert!(is_castable(&pool, Idx::BOOL, Idx::INT64));
    assert!(is_castable(&pool, Idx::CHAR, Idx::INT));
}

#[test]
fn enums_cast_like_numbers() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let e = pool.define_enum(
        interner.intern("e"),
        EnumDef {
            underlying: Idx::INT,
            elements: vec![],
        },
    );
    assert!(is_castable(&pool, e, Idx::INT));
    assert!(is_castable(&pool, Idx::UINT8, e));
}

#[test]
fn pointer_casts() {
    let mut pool = Pool::new();
    let pi = pool.pointer(Idx::INT);
    let pc = pool.pointer(Idx::CHAR);
    assert!(is_castable(&pool, pi, pc));
    assert!(is_castable(&pool, pi, Idx::UINT64));
    assert!(is_castable(&pool, Idx::INT64, pc));
    assert_eq!(
        check_cast(&pool, pi, Idx::INT),
        Err(TypeError::InvalidCast { from: pi, to: Idx::INT })
    );
}

#[test]
fn rejected_casts() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let a = pool.define_struct(interner.intern("a"), StructDef::default());
    let b = pool.define_struct(interner.intern("b"), StructDef::default());
    let arr = pool.array(Idx::INT, 4);
    let func = pool.function(&[], false, Idx::VOID);

    assert!(!is_castable(&pool, a, b));
    assert!(!is_castable(&pool, arr, Idx::INT));
    assert!(!is_castable(&pool, Idx::VOID, Idx::INT));
    assert!(!is_castable(&pool, func, Idx::INT64));
    assert!(is_castable(&pool, a, a));
}

#[test]
fn dereference() {
    let mut pool = Pool::new();
    let pi = pool.const_pointer(Idx::INT);
    let pv = pool.pointer(Idx::VOID);
    assert_eq!(check_dereferenceable(&pool, pi), Ok(Idx::INT));
    assert_eq!(
        check_dereferenceable(&pool, pv),
        Err(TypeError::CannotDereferenceVoidPointer { ty: pv })
    );
    assert_eq!(
        check_dereferenceable(&pool, Idx::INT),
        Err(TypeError::CannotDereferenceNonPointer { ty: Idx::INT })
    );
}

#[test]
fn first_class() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let opaque = pool.struct_type(interner.intern("handle"));
    let concrete = pool.define_struct(
        interner.intern("pair"),
        StructDef {
            fields: vec![Field {
                name: interner.intern("a"),
                ty: Idx::INT,
                bitfield: None,
            }],
            opaque: false,
        },
    );
    let func = pool.function(&[Idx::INT], false, Idx::INT);
    let handle_ptr = pool.pointer(opaque);

    assert!(check_first_class(&pool, Idx::INT).is_ok());
    assert!(check_first_class(&pool, concrete).is_ok());
    assert!(check_first_class(&pool, handle_ptr).is_ok());
    assert!(check_first_class(&pool, Idx::VOID).is_err());
    assert!(check_first_class(&pool, opaque).is_err());
    assert_eq!(
        check_first_class(&pool, func),
        Err(TypeError::NotFirstClass { ty: func })
    );
}

#[test]
fn branch_unification() {
    let value = |ty| Branch { ty, terminates: false };
    let exits = |ty| Branch { ty, terminates: true };

    assert_eq!(unify_branches(value(Idx::INT), value(Idx::INT)), Ok(Idx::INT));
    assert_eq!(
        unify_branches(value(Idx::INT), value(Idx::BOOL)),
        Err(TypeError::IfBranchesHaveDifferentTypes {
            then_ty: Idx::INT,
            else_ty: Idx::BOOL
        })
    );
    assert_eq!(unify_branches(exits(Idx::VOID), value(Idx::BOOL)), Ok(Idx::BOOL));
    assert_eq!(unify_branches(value(Idx::INT), exits(Idx::VOID)), Ok(Idx::INT));
}

#[test]
fn diagnostics_render_types() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let diag = TypeError::IfBranchesHaveDifferentTypes {
        then_ty: Idx::INT,
        else_ty: Idx::BOOL,
    }
    .into_diagnostic(dale_ir::Loc::DUMMY, &pool, &interner);
    assert_eq!(
        diag.message(),
        "'if' branches must have the same type (got int and bool)"
    );
}
