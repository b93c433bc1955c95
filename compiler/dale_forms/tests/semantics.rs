//! End-to-end behaviour of the forms layer.
//!
//! Each test feeds source text through a [`Session`] and checks the
//! diagnostics it produced or the code it drove into a [`RecordingSink`].

use dale_diagnostic::{ErrorCode, Severity};
use dale_forms::{
    Constant, Instruction, MacroContext, MemoryLoader, RecordingSink, Session, SessionConfig, SessionError,
};
use dale_ir::{BlockId, NodeId, ValueHandle};

fn codes(source: &str) -> Vec<ErrorCode> {
    let mut sink = RecordingSink::new();
    let mut session = Session::new(SessionConfig::default(), &mut sink);
    let _ = session.process_source("test.dt", source);
    session.diagnostics().peek().map(|d| d.code).collect()
}

/// Messages rendered from the template and arguments of each diagnostic.
fn messages(source: &str) -> Vec<String> {
    let mut sink = RecordingSink::new();
    let mut session = Session::new(SessionConfig::default(), &mut sink);
    let _ = session.process_source("test.dt", source);
    session.diagnostics().peek().map(|d| d.message()).collect()
}

fn compile(source: &str) -> RecordingSink {
    let mut sink = RecordingSink::new();
    let mut session = Session::new(SessionConfig::default(), &mut sink);
    let _ = session.process_source("test.dt", source);
    let finished = session.finish();
    assert!(finished.is_ok(), "{finished:?}");
    sink
}

fn calls(sink: &RecordingSink, callee: &str) -> usize {
    let Some(function) = sink.function(callee) else {
        return 0;
    };
    sink.instructions()
        .filter(|inst| matches!(inst, Instruction::Call { callee, .. } if *callee == function.value))
        .count()
}

/// Every recorded instruction with the value it produced.
fn values(sink: &RecordingSink) -> Vec<(ValueHandle, Instruction)> {
    (0..sink.block_count())
        .filter_map(|index| u32::try_from(index).ok())
        .flat_map(|index| sink.block(BlockId::new(index)).iter().cloned())
        .collect()
}

/// Values returned by `return` instructions.
fn returned(sink: &RecordingSink) -> Vec<ValueHandle> {
    values(sink)
        .into_iter()
        .filter_map(|(_, inst)| match inst {
            Instruction::Return { value } => value,
            _ => None,
        })
        .collect()
}

mod scope {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn redefinition_names_the_variable() {
        let source = "(def x (var intern int 1))
                      (def x (var intern int 2))";
        assert_eq!(codes(source), vec![ErrorCode::RedefinitionOfVariable]);
        let message = &messages(source)[0];
        assert!(message.contains('x'), "{message}");
    }

    #[test]
    fn locals_in_sibling_blocks() {
        let source = "(def f (fn intern int (void)
                        (do (def x (var auto int 1)) x)
                        (do (def x (var auto int 2)) x)))";
        assert!(codes(source).is_empty());
    }

    #[test]
    fn variable_not_in_scope() {
        assert_eq!(
            codes("(def f (fn intern int (void) y))"),
            vec![ErrorCode::VariableNotInScope]
        );
    }
}

mod overloads {
    use super::*;
    use pretty_assertions::assert_eq;

    const FOO: &str = "(def foo (fn intern int ((a int)) a))
                       (def foo (fn intern int ((a bool) (b bool)) 0))";

    #[test]
    fn picks_by_argument_types() {
        let source = format!(
            "{FOO}
             (def f (fn intern int ((n int)) (foo n)))
             (def g (fn intern int ((p bool) (q bool)) (foo p q)))"
        );
        let sink = compile(&source);
        assert_eq!(sink.functions().iter().filter(|f| f.name == "foo").count(), 2);
    }

    #[test]
    fn no_match_reports_closest() {
        let source = format!("{FOO} (def f (fn intern int ((a int) (b bool)) (foo a b)))");
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let _ = session.process_source("test.dt", &source);
        let diags: Vec<_> = session.diagnostics().peek().collect();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].code,
            ErrorCode::OverloadedFunctionOrMacroNotInScopeWithClosest
        );
        assert_eq!(
            diags[0].args,
            vec!["foo".to_owned(), "int bool".to_owned(), "bool bool".to_owned()]
        );
    }

    #[test]
    fn no_match_without_closest() {
        let source = format!("{FOO} (def f (fn intern int ((a int) (b int) (c int)) (foo a b c)))");
        assert_eq!(
            codes(&source),
            vec![ErrorCode::OverloadedFunctionOrMacroNotInScope]
        );
    }

    #[test]
    fn identical_signatures_clash() {
        let source = "(def foo (fn intern int ((a int)) a))
                      (def foo (fn intern int ((b int)) 0))";
        assert_eq!(codes(source), vec![ErrorCode::RedeclarationOfFunctionOrMacro]);
    }
}

mod control {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn if_branches_must_agree() {
        let source = "(def f (fn intern int ((c bool)) (if c 1 true)))";
        assert_eq!(codes(source), vec![ErrorCode::IfBranchesHaveDifferentTypes]);
        let message = &messages(source)[0];
        assert!(message.contains("int") && message.contains("bool"), "{message}");
    }

    #[test]
    fn if_condition_must_be_bool() {
        assert_eq!(
            codes("(def f (fn intern int ((c int)) (if c 1 2)))"),
            vec![ErrorCode::IncorrectArgType]
        );
    }

    #[test]
    fn branches_that_return() {
        let source = "(def f (fn intern int ((c bool)) (if c (return 1) (return 2))))";
        assert!(codes(source).is_empty());
    }
}

mod assignment {
    use super::*;
    use pretty_assertions::assert_eq;

    const POINT: &str = "(def point (struct intern ((x int) (y int))))";

    #[test]
    fn override_takes_over_setf() {
        let source = format!(
            "{POINT}
             (def setf-copy-assign (fn intern bool ((dst (p point)) (src point)) true))
             (def f (fn intern bool ((a (p point)) (b point)) (setf a b)))"
        );
        let sink = compile(&source);
        assert_eq!(calls(&sink, "setf-copy-assign"), 1);
        let Some(copy) = sink.function("setf-copy-assign").map(|f| f.value) else {
            panic!("override not declared");
        };
        let call = values(&sink).into_iter().find_map(|(value, inst)| match inst {
            Instruction::Call { callee, .. } if callee == copy => Some(value),
            _ => None,
        });
        let Some(call) = call else {
            panic!("override not called");
        };
        // `f` returns what the override returned.
        assert!(returned(&sink).contains(&call), "{:?}", returned(&sink));
    }

    #[test]
    fn macro_override_takes_over_setf() {
        let source = format!(
            "{POINT}
             (def setf-copy-assign (macro intern ((dst (p point)) (src point)) true))
             (def f (fn intern bool ((a (p point)) (b point)) (setf a b)))"
        );
        let sink = compile(&source);
        let truth = values(&sink).into_iter().find_map(|(value, inst)| match inst {
            Instruction::Const(Constant::Bool(true)) => Some(value),
            _ => None,
        });
        let Some(truth) = truth else {
            panic!("expansion not emitted");
        };
        assert!(returned(&sink).contains(&truth), "{:?}", returned(&sink));
    }

    #[test]
    fn macro_override_is_checked_at_first_use() {
        let definition = format!(
            "{POINT}
             (def setf-copy-assign (macro intern ((dst (p point)) (src point)) 0))"
        );
        assert!(codes(&definition).is_empty(), "{:?}", codes(&definition));
        let used = format!(
            "{definition}
             (def f (fn intern void ((a (p point)) (b point)) (setf a b)))"
        );
        assert_eq!(codes(&used), vec![ErrorCode::SetfOverridesMustReturnBool]);
    }

    #[test]
    fn core_setf_stores_directly() {
        let source = format!(
            "{POINT}
             (def setf-copy-assign (fn intern bool ((dst (p point)) (src point)) true))
             (def f (fn intern bool ((a (p point)) (b point)) (core setf a b)))"
        );
        let sink = compile(&source);
        assert_eq!(calls(&sink, "setf-copy-assign"), 0);
    }

    #[test]
    fn other_types_store_directly() {
        let source = format!(
            "{POINT}
             (def setf-copy-assign (fn intern bool ((dst (p point)) (src point)) true))
             (def f (fn intern bool ((a (p int))) (setf a 3)))"
        );
        let sink = compile(&source);
        assert_eq!(calls(&sink, "setf-copy-assign"), 0);
        assert!(sink.instructions().any(|inst| matches!(inst, Instruction::Store { .. })));
    }

    #[test]
    fn const_target_is_rejected_even_with_override() {
        let source = "(def setf-copy-assign (fn intern bool ((dst (p int)) (src int)) true))
                      (def f (fn intern void ((a (p (const int)))) (setf a 1)))";
        assert_eq!(codes(source), vec![ErrorCode::CannotModifyConstVariable]);
    }

    #[test]
    fn override_must_return_bool() {
        let source = "(def setf-copy-assign (fn intern int ((dst (p int)) (src int)) 1))";
        assert_eq!(codes(source), vec![ErrorCode::SetfOverridesMustReturnBool]);
    }
}

mod macros {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expansion_is_transparent() {
        let direct = compile("(def f (fn intern int ((n int)) (if true n 0)))");
        let expanded = compile(
            "(def pick (macro intern (c a b) (if c a b)))
             (def f (fn intern int ((n int)) (pick true n 0)))",
        );
        let direct: Vec<_> = direct.instructions().collect();
        let expanded: Vec<_> = expanded.instructions().collect();
        assert_eq!(direct, expanded);
    }

    #[test]
    fn null_expansion() {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let nothing = |_: &mut MacroContext<'_>, _: &[NodeId]| None;
        assert!(session
            .register_native_macro("nothing", Vec::new(), false, Box::new(nothing))
            .is_ok());
        let _ = session.process_source("test.dt", "(def f (fn intern void (void) (nothing)))");
        let codes: Vec<_> = session.diagnostics().peek().map(|d| d.code).collect();
        assert_eq!(codes, vec![ErrorCode::GotNullPointerFromMacroCall]);
    }

    #[test]
    fn runaway_expansion_aborts() {
        let mut sink = RecordingSink::new();
        let config = SessionConfig::default().with_max_expansion_depth(16);
        let mut session = Session::new(config, &mut sink);
        let source = "(def again (macro intern (x) (again x)))
                      (def f (fn intern void (void) (again 1)))";
        let result = session.process_source("test.dt", source);
        assert!(
            matches!(
                result,
                Err(SessionError::InternalFault {
                    code: ErrorCode::MacroExpansionTooDeep
                })
            ),
            "{result:?}"
        );
        let fatal = session
            .diagnostics()
            .peek()
            .find(|d| d.severity == Severity::Fatal)
            .map(|d| d.args.clone());
        assert_eq!(fatal, Some(vec!["again".to_owned(), "16".to_owned()]));
    }

    fn nested(head: &str, depth: usize) -> String {
        format!("{}1{}", format!("({head} ").repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn deeply_nested_untyped_macro_calls() {
        let source = format!(
            "(def id (macro intern (a) a))
             (def id (fn intern int ((a int) (b int)) a))
             (def f (fn intern int (void) {}))",
            nested("id", 64)
        );
        assert!(codes(&source).is_empty(), "{:?}", codes(&source));
    }

    #[test]
    fn deeply_nested_typed_macro_calls() {
        let source = format!(
            "(def id (macro intern ((a int)) a))
             (def id (fn intern int ((a int) (b int)) a))
             (def f (fn intern int (void) {}))",
            nested("id", 48)
        );
        assert!(codes(&source).is_empty(), "{:?}", codes(&source));
    }

    #[test]
    fn deeply_nested_calls_choosing_a_function() {
        let source = format!(
            "(def id (macro intern ((a float)) a))
             (def id (fn intern int ((a int)) a))
             (def f (fn intern int (void) {}))",
            nested("id", 48)
        );
        let sink = compile(&source);
        assert_eq!(calls(&sink, "id"), 48);
    }

    #[test]
    fn macro_and_function_overloads() {
        let source = "(def twice (fn intern int ((n int)) n))
                      (def twice (macro intern (a b) (do a b)))
                      (def f (fn intern int ((n int)) (twice n)))
                      (def g (fn intern int ((n int)) (twice n n)))";
        assert!(codes(source).is_empty());
    }
}

mod modules {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn imported_namespaces() {
        let loader = MemoryLoader::new().with_module(
            "maths",
            "(namespace maths (def square (fn intern int ((n int)) n)))
             (def pi (var intern int 3))",
        );
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink).with_loader(&loader);
        let source = "(import maths (pi))
                      (def f (fn intern int ((n int)) (maths.square n)))
                      (using-namespace maths (def g (fn intern int (void) (square pi))))";
        let _ = session.process_source("main.dt", source);
        let codes: Vec<_> = session.diagnostics().peek().map(|d| d.code).collect();
        assert!(codes.is_empty(), "{codes:?}");
        assert!(session.finish().is_ok());
        assert!(sink.function("maths.square").is_some());
    }

    #[test]
    fn include_guard() {
        let loader = MemoryLoader::new()
            .with_file("a.dt", "(once a) (def n (var intern int 1))")
            .with_file("b.dt", "(include \"a.dt\") (def m (var intern int 2))");
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink).with_loader(&loader);
        let _ = session.process_source("main.dt", "(include \"a.dt\") (include \"b.dt\")");
        assert!(session.finish().is_ok());
        assert_eq!(sink.globals().len(), 2);
    }
}
