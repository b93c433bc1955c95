use dale_ir::read_forms;
use dale_scope::TypeDeclKind;
use dale_types::TypeData;
use pretty_assertions::assert_eq;

use super::*;

struct Env {
    pool: Pool,
    scope: ScopeManager,
    interner: StringInterner,
    arena: NodeArena,
}

impl Env {
    fn new() -> Self {
        Env {
            pool: Pool::new(),
            scope: ScopeManager::new(),
            interner: StringInterner::new(),
            arena: NodeArena::new(),
        }
    }

    /// Parse the type written as the only element of `(t TYPE)`.
    fn parse(&mut self, source: &str) -> Result<(Idx, bool), TypeSyntaxError> {
        let file = self.interner.intern("types.dt");
        let forms = read_forms(&format!("(t {source})"), file, &self.interner, &mut self.arena);
        let Ok(forms) = forms else {
            panic!("fixture should read");
        };
        let node = self.arena.children(forms[0])[1];
        TypeParser {
            pool: &mut self.pool,
            scope: &self.scope,
            interner: &self.interner,
            arena: &self.arena,
        }
        .parse_qualified(node)
    }

    fn render(&mut self, source: &str) -> String {
        match self.parse(source) {
            Ok((ty, _)) => self.pool.format_type(ty, &self.interner),
            Err(err) => err.into_diagnostic(&self.interner).message(),
        }
    }
}

#[test]
fn primitives() {
    let mut env = Env::new();
    assert_eq!(env.parse("int"), Ok((Idx::INT, false)));
    assert_eq!(env.parse("int32"), Ok((Idx::INT, false)));
    assert_eq!(env.parse("size"), Ok((Idx::UINT64, false)));
    assert_eq!(env.parse("double"), Ok((Idx::DOUBLE, false)));
}

#[test]
fn composites_render_back() {
    let mut env = Env::new();
    assert_eq!(env.render("(p (const char))"), "(p (const char))");
    assert_eq!(env.render("(array-of 3 int)"), "(array-of 3 int)");
    assert_eq!(env.render("(fn int (int bool))"), "(fn int (int bool))");
    assert_eq!(env.render("(ref (p int))"), "(ref (p int))");
}

#[test]
fn const_wrapper_is_reported() {
    let mut env = Env::new();
    assert_eq!(env.parse("(const int)"), Ok((Idx::INT, true)));
    let Ok((ptr, false)) = env.parse("(p (const int))") else {
        panic!("pointer to const should parse");
    };
    assert!(matches!(
        env.pool.data(ptr),
        TypeData::Pointer { is_const: true, .. }
    ));
}

#[test]
fn function_type_params() {
    let mut env = Env::new();
    let Ok((ty, _)) = env.parse("(fn void (int ...))") else {
        panic!("variadic function type should parse");
    };
    assert!(matches!(
        env.pool.data(ty),
        TypeData::Function { variadic: true, .. }
    ));
    assert_eq!(env.render("(fn void (void))"), "(fn void (void))");
    assert_eq!(
        env.render("(fn void (int void))"),
        "'void' must be the only parameter"
    );
    assert_eq!(
        env.render("(fn void (... int))"),
        "the varargs specifier must be the last parameter"
    );
}

#[test]
fn named_types_resolve_through_scope() {
    let mut env = Env::new();
    let point = env.interner.intern("point");
    let ty = env.pool.struct_type(point);
    env.scope.define_type(point, ty, TypeDeclKind::Struct).ok();
    assert_eq!(env.parse("point"), Ok((ty, false)));
    assert_eq!(env.render("(p point)"), "(p point)");
}

#[test]
fn errors() {
    let mut env = Env::new();
    assert_eq!(env.render("widget"), "type not in scope: 'widget'");
    assert_eq!(env.render("(p)"), "parameter type requires 1 arguments (got 0 instead)");
    assert_eq!(env.render("(array-of n int)"), "invalid type");
    assert_eq!(env.render("(vector int)"), "invalid type");
    assert_eq!(env.render("gfx.widget"), "namespace not in scope: 'gfx.widget'");
}
