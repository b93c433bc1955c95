use super::*;

#[test]
fn intern_is_idempotent() {
    let interner = StringInterner::new();
    let a = interner.intern("setf");
    let b = interner.intern("setf");
    assert_eq!(a, b);
    assert_eq!(interner.lookup(a), "setf");
}

#[test]
fn distinct_strings_get_distinct_names() {
    let interner = StringInterner::new();
    let a = interner.intern("x");
    let b = interner.intern("y");
    assert_ne!(a, b);
    assert_eq!(interner.len(), 3);
}

#[test]
fn empty_string_is_pre_interned() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    let name = interner.intern("present");
    assert_eq!(interner.get("present"), Some(name));
    assert_eq!(interner.len(), 2);
}

#[test]
fn foreign_name_resolves_to_empty() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(9999)), "");
}
