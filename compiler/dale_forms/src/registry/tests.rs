use pretty_assertions::assert_eq;

use super::*;

#[test]
fn core_forms_registered() {
    let registry = FormRegistry::with_core_forms();
    for head in ["def", "namespace", "using-namespace", "import", "include", "once", "do"] {
        assert!(registry.top_level(head).is_some(), "missing top-level form {head}");
    }
    for head in [
        "do", "if", "setf", "def", "@", "#", ":", "$", "cast", "return", "label", "goto", "array",
        "null",
    ] {
        assert!(registry.body(head).is_some(), "missing body form {head}");
    }
    assert!(registry.top_level("setf").is_none());
    assert!(registry.body("namespace").is_none());
}

#[test]
fn core_form_names() {
    let registry = FormRegistry::with_core_forms();
    assert!(registry.is_core_form("setf"));
    assert!(registry.is_core_form("core"));
    assert!(registry.is_core_form("using-namespace"));
    assert!(!registry.is_core_form("setf-copy-assign"));
    assert!(!registry.is_core_form("printf"));
}

#[test]
fn heads_are_unique_and_sorted() {
    let registry = FormRegistry::with_core_forms();
    let heads = registry.heads();
    let mut sorted = heads.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(heads, sorted);
    assert_eq!(heads.iter().filter(|h| **h == "def").count(), 1);
}

#[test]
fn empty_registry_knows_nothing() {
    let registry = FormRegistry::new();
    assert!(registry.body("if").is_none());
    assert!(registry.heads().is_empty());
}
