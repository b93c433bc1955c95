//! `(def name (macro linkage (params...) [body]))`.
//!
//! Parameters are bare atoms (accepting any node) or `(name type)`, which
//! only matches arguments of that type and so lets macros be overloaded
//! like functions. A trailing `...` collects the surplus for `rest`.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{NodeId, ValueHandle};
use dale_scope::{CallableEntry, CallableFlags, CallableKind, Param};

use super::{linkage, Definition};
use crate::expand::{MacroBody, TemplateMacro};
use crate::forms::setf::OVERRIDE_NAME;
use crate::forms::{expect_atom, expect_list, unexpected};
use crate::Session;

pub(super) fn macro_def(session: &mut Session<'_>, def: &Definition) -> Result<(), ErrorGuaranteed> {
    let loc = session.loc(def.node);
    let name = session.interner.lookup(def.name);
    if session.registry.is_core_form(name) {
        return Err(session.error(ErrorCode::NoCoreFormNameInMacro, loc));
    }
    let (link, params, body) = match def.rest[..] {
        [link, params] => (link, params, None),
        [link, params, body] => (link, params, Some(body)),
        _ => {
            let got = def.rest.len().to_string();
            return Err(session.error_with(ErrorCode::IncorrectNumberOfArgs, loc, &["macro", "3", &got]));
        }
    };
    let linkage = linkage(session, link, "macro")?;
    let (params, variadic) = parameters(session, params)?;

    let id = session.macros.insert(MacroBody::Template(TemplateMacro {
        params: params.iter().map(|p| p.name).collect(),
        variadic,
        body,
    }));
    let mut flags = CallableFlags::empty();
    if name == OVERRIDE_NAME {
        flags |= CallableFlags::SETF_OVERRIDE;
    }
    let entry = CallableEntry {
        name: def.name,
        kind: CallableKind::Macro { id },
        params,
        variadic,
        linkage,
        flags,
        loc,
        value: ValueHandle::NONE,
    };
    session.add_callable(entry, loc)?;
    tracing::debug!(name, ?id, "macro");
    Ok(())
}

fn parameters(session: &mut Session<'_>, node: NodeId) -> Result<(Vec<Param>, bool), ErrorGuaranteed> {
    let items = expect_list(session, node, "macro parameters")?;
    let mut params = Vec::with_capacity(items.len());
    let mut variadic = false;
    for (i, &item) in items.iter().enumerate() {
        let loc = session.loc(item);
        match session.text(item) {
            Some("void") if items.len() == 1 => {}
            Some("void") => return Err(session.error(ErrorCode::VoidMustBeTheOnlyParameter, loc)),
            Some("...") if i + 1 == items.len() => variadic = true,
            Some("...") => return Err(session.error(ErrorCode::VarArgsMustBeLastParameter, loc)),
            Some(_) => {
                let name = expect_atom(session, item, "macro parameter")?;
                params.push(Param::untyped(name));
            }
            None => {
                let pair = expect_list(session, item, "macro parameter")?;
                let &[name, ty] = &pair[..] else {
                    return Err(unexpected(session, item, "(name type)", "macro parameter"));
                };
                let name = expect_atom(session, name, "macro parameter")?;
                let ty = session.parse_type(ty)?;
                params.push(Param::typed(name, ty));
            }
        }
    }
    Ok((params, variadic))
}

#[cfg(test)]
mod tests {
    use crate::{RecordingSink, Session, SessionConfig};
    use dale_diagnostic::ErrorCode;

    fn codes(source: &str) -> Vec<ErrorCode> {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let _ = session.process_source("macro.dt", source);
        session.diagnostics().peek().map(|d| d.code).collect()
    }

    #[test]
    fn core_form_names_rejected() {
        assert_eq!(
            codes("(def if (macro intern (a b c) a))"),
            vec![ErrorCode::NoCoreFormNameInMacro]
        );
    }

    #[test]
    fn macro_expands_in_body() {
        let codes = codes(
            "(def two (macro intern (void) 2))
             (def f (fn intern int (void) (two)))",
        );
        assert!(codes.is_empty(), "{codes:?}");
    }

    #[test]
    fn variadic_macro_splices_rest() {
        let codes = codes(
            "(def seq (macro intern (...) (do rest)))
             (def f (fn intern int (void) (seq 1 2 3)))",
        );
        assert!(codes.is_empty(), "{codes:?}");
    }

    #[test]
    fn same_params_as_function() {
        assert_eq!(
            codes(
                "(def g (fn intern int ((a int)) a))
                 (def g (macro intern ((a int)) a))"
            ),
            vec![ErrorCode::MacroHasSameParamsAsFunction]
        );
    }

    #[test]
    fn top_level_macro_call() {
        let codes = codes(
            "(def defint (macro intern (name) (def name (var intern int 0))))
             (defint counter)",
        );
        assert!(codes.is_empty(), "{codes:?}");
    }
}
