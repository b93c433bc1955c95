use super::*;

#[test]
fn module_names() {
    assert!(is_valid_module_name("cstdio"));
    assert!(is_valid_module_name("util.vector-2_x"));
    assert!(!is_valid_module_name(""));
    assert!(!is_valid_module_name("a/b"));
    assert!(!is_valid_module_name("with space"));
}

#[test]
fn memory_loader_reads_registered_sources() {
    let loader = MemoryLoader::new()
        .with_module("m", "(def x (var intern int 1))")
        .with_file("inc.dt", "(do) (do)");
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();

    let forms = loader.load_module("m", &interner, &mut arena);
    assert_eq!(forms.map(|f| f.len()), Ok(1));
    let forms = loader.read_file("inc.dt", &interner, &mut arena);
    assert_eq!(forms.map(|f| f.len()), Ok(2));
    assert_eq!(
        loader.load_module("missing", &interner, &mut arena),
        Err(LoadError::NotFound)
    );
}

#[test]
fn read_failures_are_reported() {
    let loader = MemoryLoader::new().with_module("broken", "(def x");
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    assert!(matches!(
        loader.load_module("broken", &interner, &mut arena),
        Err(LoadError::Read(_))
    ));
}

#[test]
fn no_modules_finds_nothing() {
    let interner = StringInterner::new();
    let mut arena = NodeArena::new();
    assert_eq!(
        NoModules.read_file("x.dt", &interner, &mut arena),
        Err(LoadError::NotFound)
    );
}
