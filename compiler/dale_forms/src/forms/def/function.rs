//! `(def name (fn linkage return-type (params...) body...))`.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{Loc, NodeId, ValueHandle};
use dale_scope::{CallableEntry, CallableFlags, CallableKind, Linkage, Param, Registered, Variable};
use dale_types::{types_equal, Idx, TypeError};

use super::{linkage, Definition};
use crate::forms::control::{check_gotos, sequence};
use crate::forms::setf::OVERRIDE_NAME;
use crate::forms::{expect_atom, expect_list, unexpected};
use crate::sink::Instruction;
use crate::{FunctionContext, ParseResult, Session};

/// Parse a parameter list: `(void)`, `((name type) ...)`, optionally
/// ending in `...`.
fn parameters(session: &mut Session<'_>, node: NodeId) -> Result<(Vec<Param>, bool), ErrorGuaranteed> {
    let items = expect_list(session, node, "parameters")?;
    let mut params = Vec::with_capacity(items.len());
    let mut variadic = false;
    for (i, &item) in items.iter().enumerate() {
        let loc = session.loc(item);
        match session.text(item) {
            Some("void") if items.len() == 1 => {}
            Some("void") => return Err(session.error(ErrorCode::VoidMustBeTheOnlyParameter, loc)),
            Some("...") if i + 1 == items.len() => variadic = true,
            Some("...") => return Err(session.error(ErrorCode::VarArgsMustBeLastParameter, loc)),
            Some(_) => return Err(unexpected(session, item, "list", "parameter")),
            None => params.push(parameter(session, item)?),
        }
    }
    Ok((params, variadic))
}

/// `(name type)`.
fn parameter(session: &mut Session<'_>, node: NodeId) -> Result<Param, ErrorGuaranteed> {
    let pair = expect_list(session, node, "parameter")?;
    let &[name, ty] = &pair[..] else {
        return Err(unexpected(session, node, "(name type)", "parameter"));
    };
    let name = expect_atom(session, name, "parameter name")?;
    let ty = session.parse_type(ty)?;
    if session.pool.is_array(ty) {
        let loc = session.loc(node);
        return Err(session.error(ErrorCode::ArraysCannotBeFunctionParameters, loc));
    }
    Ok(Param::typed(name, ty))
}

pub(super) fn function(session: &mut Session<'_>, def: &Definition) -> Result<(), ErrorGuaranteed> {
    let loc = session.loc(def.node);
    let &[link, ret, params, ref body @ ..] = &def.rest[..] else {
        let got = def.rest.len().to_string();
        return Err(session.error_with(ErrorCode::IncorrectMinimumNumberOfArgs, loc, &["fn", "3", &got]));
    };
    let linkage = linkage(session, link, "fn")?;
    if !linkage.is_callable_linkage() {
        let text = linkage.as_str();
        return Err(session.error_with(ErrorCode::UnexpectedElement, loc, &["linkage", "fn", text]));
    }
    if linkage == Linkage::ExternC && session.scope.in_namespace() {
        return Err(session.error(ErrorCode::ExternCInNamespace, loc));
    }
    let name = session.interner.lookup(def.name);
    if session.registry.is_core_form(name) {
        return Err(session.error(ErrorCode::ThisCoreFormCannotBeOverridden, loc));
    }

    let ret = session.parse_type(ret)?;
    if session.pool.is_reference(ret) {
        return Err(session.error(ErrorCode::RefsNotPermittedHere, loc));
    }
    if session.pool.is_array(ret) {
        return Err(session.error(ErrorCode::ReturnTypesCannotBeArrays, loc));
    }
    let (params, variadic) = parameters(session, params)?;

    let mut flags = CallableFlags::empty();
    if name == OVERRIDE_NAME {
        if ret != Idx::BOOL {
            return Err(session.error(ErrorCode::SetfOverridesMustReturnBool, loc));
        }
        flags |= CallableFlags::SETF_OVERRIDE;
    }
    if body.is_empty() {
        flags |= CallableFlags::DECLARATION_ONLY;
    }

    let param_types: Vec<Idx> = params.iter().filter_map(|p| p.ty).collect();
    let fn_ty = session.pool.function(&param_types, variadic, ret);
    let entry = CallableEntry {
        name: def.name,
        kind: CallableKind::Function { ret },
        params: params.clone(),
        variadic,
        linkage,
        flags,
        loc,
        value: ValueHandle::NONE,
    };
    let registered = session.add_callable(entry, loc)?;
    let id = registered.id();
    let value = match registered {
        Registered::New(_) => {
            let symbol = match linkage {
                Linkage::ExternC => name.to_owned(),
                _ => session.scope.qualify(name),
            };
            let value = session.sink.declare_function(&symbol, fn_ty, linkage);
            if let Some(entry) = session.callables.get_mut(id) {
                entry.value = value;
            }
            value
        }
        Registered::Completed(_) | Registered::Existing(_) => session
            .callables
            .get(id)
            .map_or(ValueHandle::NONE, |e| e.value),
    };
    tracing::debug!(name, ?registered, declaration = body.is_empty(), "function");

    if body.is_empty() {
        return Ok(());
    }
    define_body(session, value, ret, &params, &param_types, body, loc)
}

/// Emit a function body.
fn define_body(
    session: &mut Session<'_>,
    function: ValueHandle,
    ret: Idx,
    params: &[Param],
    param_types: &[Idx],
    body: &[NodeId],
    loc: Loc,
) -> Result<(), ErrorGuaranteed> {
    let start = session.sink.begin_function(function, param_types);
    let mut ctx = FunctionContext::new(function, ret);
    session.speculated.clear();
    session.scope.push_frame();

    let mut failed = None;
    for ((param, &ty), &value) in params.iter().zip(param_types).zip(&start.params) {
        let address = if session.pool.is_reference(ty) {
            value
        } else {
            let slot = session.emit_inst(start.entry, Instruction::Alloca { ty });
            session.emit_inst(start.entry, Instruction::Store { ptr: slot, value });
            slot
        };
        let var = Variable {
            name: param.name,
            ty: session.pool.strip_reference(ty),
            is_const: false,
            linkage: Linkage::Auto,
            address,
            is_global: false,
            loc,
        };
        if let Err(err) = session.scope.define_variable(var) {
            failed.get_or_insert(session.scope_error(err, loc));
        }
    }

    let result = if failed.is_none() {
        sequence(session, &mut ctx, start.entry, body, Some(ret))
    } else {
        Ok(ParseResult::void(start.entry))
    };
    match result {
        Ok(last) if !last.terminates => {
            if let Err(err) = finish_body(session, &ctx, last, body, loc) {
                failed.get_or_insert(err);
            }
        }
        Ok(_) => {}
        Err(err) => {
            failed.get_or_insert(err);
        }
    }
    if let Err(err) = check_gotos(session, &ctx) {
        failed.get_or_insert(err);
    }

    session.scope.pop_frame();
    session.sink.end_function(function);
    failed.map_or(Ok(()), Err)
}

/// Return the value of the last statement when control falls off the end.
fn finish_body(
    session: &mut Session<'_>,
    ctx: &FunctionContext,
    last: ParseResult,
    body: &[NodeId],
    loc: Loc,
) -> Result<(), ErrorGuaranteed> {
    if ctx.ret.is_void() {
        session.emit_inst(last.block, Instruction::Return { value: None });
        return Ok(());
    }
    if last.terminates {
        return Ok(());
    }
    if !types_equal(last.ty, ctx.ret) {
        let loc = body.last().map_or(loc, |&node| session.loc(node));
        let err = TypeError::IncorrectReturnType {
            expected: ctx.ret,
            found: last.ty,
        };
        return Err(session.type_error(err, loc));
    }
    session.emit_inst(last.block, Instruction::Return { value: Some(last.value) });
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{RecordingSink, Session, SessionConfig};
    use dale_diagnostic::ErrorCode;

    fn codes(source: &str) -> Vec<ErrorCode> {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let _ = session.process_source("fn.dt", source);
        session.diagnostics().peek().map(|d| d.code).collect()
    }

    #[test]
    fn parameter_list_shape() {
        assert_eq!(
            codes("(def f (fn intern void ((a int) void) 0))"),
            vec![ErrorCode::VoidMustBeTheOnlyParameter]
        );
        assert_eq!(
            codes("(def f (fn intern void (... (a int))))"),
            vec![ErrorCode::VarArgsMustBeLastParameter]
        );
        assert_eq!(
            codes("(def f (fn intern void ((a (array-of 2 int)))))"),
            vec![ErrorCode::ArraysCannotBeFunctionParameters]
        );
    }

    #[test]
    fn return_type_restrictions() {
        assert_eq!(
            codes("(def f (fn intern (array-of 2 int) (void)))"),
            vec![ErrorCode::ReturnTypesCannotBeArrays]
        );
        assert_eq!(
            codes("(def f (fn intern (ref int) (void)))"),
            vec![ErrorCode::RefsNotPermittedHere]
        );
    }

    #[test]
    fn extern_c_not_in_namespace() {
        assert_eq!(
            codes("(namespace ns (def f (fn extern-c void (void))))"),
            vec![ErrorCode::ExternCInNamespace]
        );
    }

    #[test]
    fn core_forms_cannot_be_redefined() {
        assert_eq!(
            codes("(def setf (fn intern bool ((a int)) true))"),
            vec![ErrorCode::ThisCoreFormCannotBeOverridden]
        );
    }

    #[test]
    fn override_must_return_bool() {
        assert_eq!(
            codes("(def setf-copy-assign (fn intern int ((a (p int)) (b int)) 0))"),
            vec![ErrorCode::SetfOverridesMustReturnBool]
        );
    }

    #[test]
    fn declaration_then_definition() {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let source = "(def f (fn intern int ((a int))))
                      (def f (fn intern int ((a int)) a))";
        assert!(session.process_source("fn.dt", source).is_ok());
        assert!(session.finish().is_ok());
        let Some(symbol) = sink.function("f") else {
            panic!("f was not declared");
        };
        assert!(symbol.defined);
        assert_eq!(sink.functions().len(), 1);
    }

    #[test]
    fn falling_off_the_end_checks_type() {
        assert_eq!(
            codes("(def f (fn intern int (void) true))"),
            vec![ErrorCode::IncorrectReturnType]
        );
    }

    #[test]
    fn parameters_are_variables() {
        assert!(codes("(def add (fn intern int ((a int) (b int)) b))").is_empty());
    }
}
