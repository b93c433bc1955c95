use dale_ir::read_forms;
use pretty_assertions::assert_eq;

use super::*;

struct Fixture {
    interner: StringInterner,
    arena: NodeArena,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            interner: StringInterner::new(),
            arena: NodeArena::new(),
        }
    }

    /// Elements of `(x ...)` read from `source`.
    fn nodes(&mut self, source: &str) -> Vec<NodeId> {
        let file = self.interner.intern("macro.dt");
        let Ok(forms) = read_forms(&format!("(x {source})"), file, &self.interner, &mut self.arena)
        else {
            panic!("fixture should read");
        };
        self.arena.children(forms[0])[1..].to_vec()
    }

    fn show(&self, node: NodeId) -> String {
        self.arena.display(node, &self.interner).to_string()
    }

    fn template(&mut self, params: &[&str], variadic: bool, body: &str) -> TemplateMacro {
        TemplateMacro {
            params: params.iter().map(|p| self.interner.intern(p)).collect(),
            variadic,
            body: self.nodes(body).first().copied(),
        }
    }
}

#[test]
fn template_substitutes_parameters() {
    let mut fx = Fixture::new();
    let swap = fx.template(&["a", "b"], false, "(f b a)");
    let args = fx.nodes("1 (g 2)");
    let loc = Loc::new(fx.interner.intern("call.dt"), 7, 3);
    let Some(result) = swap.instantiate(&mut fx.arena, &fx.interner, &args, loc) else {
        panic!("template has a body");
    };
    assert_eq!(fx.show(result), "(f (g 2) 1)");
    assert_eq!(fx.arena.loc(result), loc);
    assert_eq!(fx.arena.loc(fx.arena.children(result)[1]), loc);
}

#[test]
fn rest_splices_surplus_arguments() {
    let mut fx = Fixture::new();
    let call = fx.template(&["f"], true, "(do (f) (list rest))");
    let args = fx.nodes("g 1 2 3");
    let result = call.instantiate(&mut fx.arena, &fx.interner, &args, Loc::DUMMY);
    assert_eq!(result.map(|r| fx.show(r)), Some("(do (g) (list 1 2 3))".to_owned()));
}

#[test]
fn rest_is_plain_atom_for_fixed_arity() {
    let mut fx = Fixture::new();
    let fixed = fx.template(&["x"], false, "(rest x)");
    let args = fx.nodes("5");
    let result = fixed.instantiate(&mut fx.arena, &fx.interner, &args, Loc::DUMMY);
    assert_eq!(result.map(|r| fx.show(r)), Some("(rest 5)".to_owned()));
}

#[test]
fn instantiation_does_not_touch_inputs() {
    let mut fx = Fixture::new();
    let id = fx.template(&["x"], false, "(wrap x)");
    let args = fx.nodes("(inner 1)");
    let before = fx.show(args[0]);
    let Some(result) = id.instantiate(&mut fx.arena, &fx.interner, &args, Loc::DUMMY) else {
        panic!("template has a body");
    };
    assert_ne!(fx.arena.children(result)[1], args[0]);
    assert_eq!(fx.show(args[0]), before);
}

#[test]
fn empty_body_is_null() {
    let mut fx = Fixture::new();
    let empty = MacroBody::Template(TemplateMacro {
        params: Vec::new(),
        variadic: false,
        body: None,
    });
    assert_eq!(
        expand(&empty, &mut fx.arena, &fx.interner, &[], Loc::DUMMY),
        Err(InvalidExpansion::Null)
    );
}

#[test]
fn native_macro_builds_nodes() {
    let mut fx = Fixture::new();
    let twice = MacroBody::Native(Box::new(|cx: &mut MacroContext<'_>, args: &[NodeId]| {
        let plus = cx.atom("+");
        let a = cx.relocate(args[0]);
        let b = cx.relocate(args[0]);
        Some(cx.list(&[plus, a, b]))
    }));
    let args = fx.nodes("n");
    let result = expand(&twice, &mut fx.arena, &fx.interner, &args, Loc::DUMMY);
    assert_eq!(result.map(|r| fx.show(r)), Ok("(+ n n)".to_owned()));
}

#[test]
fn native_results_are_validated() {
    let mut fx = Fixture::new();
    let bogus = MacroBody::Native(Box::new(|_: &mut MacroContext<'_>, _: &[NodeId]| {
        Some(NodeId::new(9_999))
    }));
    assert_eq!(
        expand(&bogus, &mut fx.arena, &fx.interner, &[], Loc::DUMMY),
        Err(InvalidExpansion::NotANode)
    );

    let blank = MacroBody::Native(Box::new(|cx: &mut MacroContext<'_>, _: &[NodeId]| {
        let empty = cx.atom("");
        Some(cx.list(&[empty]))
    }));
    assert_eq!(
        expand(&blank, &mut fx.arena, &fx.interner, &[], Loc::DUMMY),
        Err(InvalidExpansion::EmptyAtom)
    );

    let nothing = MacroBody::Native(Box::new(|_: &mut MacroContext<'_>, _: &[NodeId]| None));
    assert_eq!(
        expand(&nothing, &mut fx.arena, &fx.interner, &[], Loc::DUMMY),
        Err(InvalidExpansion::Null)
    );
}

#[test]
fn table_hands_out_ids_in_order() {
    let mut table = MacroTable::new();
    let a = table.insert(MacroBody::Template(TemplateMacro {
        params: Vec::new(),
        variadic: false,
        body: None,
    }));
    let b = table.insert(MacroBody::Native(Box::new(
        |_: &mut MacroContext<'_>, _: &[NodeId]| None,
    )));
    assert_eq!((a.index(), b.index()), (0, 1));
    assert!(matches!(table.get(b), Some(MacroBody::Native(_))));
    assert_eq!(table.len(), 2);
}
