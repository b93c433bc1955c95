use dale_ir::StringInterner;

use super::*;

fn function(name: Name, params: Vec<Param>, ret: Idx) -> CallableEntry {
    CallableEntry {
        name,
        kind: CallableKind::Function { ret },
        params,
        variadic: false,
        linkage: Linkage::Extern,
        flags: CallableFlags::empty(),
        loc: Loc::DUMMY,
        value: ValueHandle::NONE,
    }
}

#[test]
fn ids_follow_registration_order() {
    let interner = StringInterner::new();
    let mut table = CallableTable::new();
    let f = interner.intern("f");
    let a = table.insert(function(f, vec![], Idx::VOID));
    let b = table.insert(function(f, vec![], Idx::INT));
    assert!(a < b);
    assert_eq!(table.get(b).and_then(CallableEntry::return_type), Some(Idx::INT));
    assert_eq!(table.iter().count(), 2);
}

#[test]
fn signature_ignores_names() {
    let interner = StringInterner::new();
    let f = interner.intern("f");
    let a = function(f, vec![Param::typed(interner.intern("x"), Idx::INT)], Idx::VOID);
    let b = function(f, vec![Param::typed(interner.intern("y"), Idx::INT)], Idx::BOOL);
    let c = function(f, vec![Param::typed(interner.intern("x"), Idx::BOOL)], Idx::VOID);
    assert!(a.same_signature(&b));
    assert!(!a.same_signature(&c));

    let mut variadic = a.clone();
    variadic.variadic = true;
    assert!(!a.same_signature(&variadic));
}

#[test]
fn untyped_params_differ_from_typed() {
    let interner = StringInterner::new();
    let m = interner.intern("m");
    let x = interner.intern("x");
    let typed = function(m, vec![Param::typed(x, Idx::INT)], Idx::VOID);
    let mut untyped = typed.clone();
    untyped.params = vec![Param::untyped(x)];
    untyped.kind = CallableKind::Macro { id: MacroId::new(0) };
    assert!(!typed.same_signature(&untyped));
    assert!(untyped.is_macro());
    assert_eq!(untyped.return_type(), None);
}

#[test]
fn flags_compose() {
    let flags = CallableFlags::SETF_OVERRIDE | CallableFlags::DECLARATION_ONLY;
    assert!(flags.contains(CallableFlags::SETF_OVERRIDE));
    assert!(!flags.contains(CallableFlags::NATIVE_MACRO));
}
