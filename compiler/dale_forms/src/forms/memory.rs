//! Pointer forms: `@`, `#`, `:`, `$` and `null`.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::BlockId;
use dale_scope::{resolve_among, CallableKind, ResolveError};
use dale_types::{check_dereferenceable, Idx, TypeData};

use super::{eval, expect_args, expect_atom, expect_min_args, incorrect_arg_type, spill};
use crate::dispatch::handle_hinted;
use crate::sink::{Constant, Instruction};
use crate::{FormCall, FormFlags, FunctionContext, ParseResult, Session};

/// `(@ pointer)`: the pointee, as an lvalue.
pub(crate) fn deref(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 1)?;
    let ptr = eval(session, ctx, call.block, call.args[0], None)?;
    let pointee = match check_dereferenceable(&session.pool, ptr.ty) {
        Ok(pointee) => pointee,
        Err(err) => return Err(session.type_error(err, call.loc)),
    };
    if call.flags.contains(FormFlags::GET_ADDRESS) {
        return Ok(ParseResult::new(ptr.block, ptr.ty, ptr.value).with_address(ptr.value));
    }
    let value = session.emit_inst(
        ptr.block,
        Instruction::Load {
            ptr: ptr.value,
            ty: pointee,
        },
    );
    Ok(ParseResult::new(ptr.block, pointee, value).with_address(ptr.value))
}

/// `(# lvalue)` or `(# function [param-type...])`: an address.
pub(crate) fn address_of(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_min_args(session, call, 1)?;
    if let Some(result) = function_address(session, call)? {
        return Ok(result);
    }
    expect_args(session, call, 1)?;
    let result = handle_hinted(
        session,
        ctx,
        call.block,
        call.args[0],
        FormFlags::GET_ADDRESS,
        None,
    )?;
    if result.address.is_none() {
        return Err(session.error(ErrorCode::CannotTakeAddressOfNonLvalue, call.loc));
    }
    Ok(ParseResult::new(result.block, result.ty, result.value))
}

/// Address of a named function. `None` when the first argument is not
/// the name of a function (a variable shadows functions of the same name).
fn function_address(
    session: &mut Session<'_>,
    call: &FormCall,
) -> Result<Option<ParseResult>, ErrorGuaranteed> {
    let Some(name) = session.arena.atom(call.args[0]) else {
        return Ok(None);
    };
    if matches!(session.scope.lookup_variable(name, &session.interner), Ok(Some(_))) {
        return Ok(None);
    }
    let Ok(ids) = session.scope.lookup_callables(name, &session.interner) else {
        return Ok(None);
    };
    let functions: Vec<_> = ids
        .into_iter()
        .filter(|&id| session.callables.get(id).is_some_and(|e| e.is_function()))
        .collect();
    if functions.is_empty() {
        return Ok(None);
    }

    let chosen = if call.arg_count() == 1 {
        match functions.as_slice() {
            [only] => *only,
            _ => {
                return Err(session.error(ErrorCode::OverloadedFunctionAddressWithoutTypes, call.loc));
            }
        }
    } else {
        let mut types = Vec::with_capacity(call.arg_count() - 1);
        for &node in &call.args[1..] {
            types.push(Some(session.parse_type(node)?));
        }
        exact_overload(session, call, name, &functions, &types)?
    };

    let Some(entry) = session.callables.get(chosen).cloned() else {
        return Ok(None);
    };
    let CallableKind::Function { ret } = entry.kind else {
        return Ok(None);
    };
    let params: Vec<Idx> = entry.param_types().map(|t| t.unwrap_or(Idx::VOID)).collect();
    let fn_ty = session.pool.function(&params, entry.variadic, ret);
    let ty = session.pool.pointer(fn_ty);
    Ok(Some(ParseResult::new(call.block, ty, entry.value)))
}

/// The overload whose parameter types are exactly `types`.
fn exact_overload(
    session: &mut Session<'_>,
    call: &FormCall,
    name: dale_ir::Name,
    functions: &[dale_scope::CallableId],
    types: &[Option<Idx>],
) -> Result<dale_scope::CallableId, ErrorGuaranteed> {
    let exact = functions.iter().copied().find(|&id| {
        session
            .callables
            .get(id)
            .is_some_and(|e| e.param_types().eq(types.iter().copied()))
    });
    match exact {
        Some(id) => Ok(id),
        None => {
            let err = resolve_among(&session.callables, &session.pool, name, functions, types)
                .err()
                .unwrap_or_else(|| ResolveError::NoMatch {
                    name,
                    args: types.to_vec(),
                    closest: None,
                });
            Err(session.resolve_error(err, call.loc))
        }
    }
}

/// Pointer to the storage of a struct or array operand, spilling rvalues.
/// Returns the pointer, its pointee and whether the storage is const.
fn operand_storage(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<(BlockId, dale_ir::ValueHandle, Idx, bool), ErrorGuaranteed> {
    let result = handle_hinted(
        session,
        ctx,
        call.block,
        call.args[0],
        FormFlags::GET_ADDRESS,
        None,
    )?;
    if result.address.is_some() {
        if let Some((pointee, is_const)) = session.pool.pointee(result.ty) {
            return Ok((result.block, result.value, pointee, is_const));
        }
    }
    let spilled = spill(session, result.block, &result);
    let slot = spilled.address.unwrap_or(spilled.value);
    Ok((result.block, slot, result.ty, false))
}

/// `(: struct field)`: pointer to a struct member.
pub(crate) fn field(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 2)?;
    let field_name = expect_atom(session, call.args[1], "struct member")?;
    let (block, base, struct_ty, is_const) = operand_storage(session, ctx, call)?;

    let Some(def) = session.pool.struct_def_of(struct_ty) else {
        return Err(incorrect_arg_type(session, call, "a struct", 1, struct_ty));
    };
    let Some((index, member)) = def.field(field_name) else {
        let field_text = session.interner.lookup(field_name);
        let struct_text = session.fmt_type(struct_ty);
        return Err(session.error_with(
            ErrorCode::FieldDoesNotExistInStruct,
            call.loc,
            &[field_text, &struct_text],
        ));
    };
    let member_ty = member.ty;
    let index = u32::try_from(index).unwrap_or(u32::MAX);
    let ptr = session.emit_inst(
        block,
        Instruction::FieldPtr {
            base,
            ty: struct_ty,
            index,
        },
    );
    let ty = if is_const {
        session.pool.const_pointer(member_ty)
    } else {
        session.pool.pointer(member_ty)
    };
    Ok(ParseResult::new(block, ty, ptr))
}

/// `($ sequence index)`: pointer to an element of an array or of the
/// sequence a pointer points into.
pub(crate) fn element(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 2)?;
    let (mut block, storage, operand_ty, storage_const) = operand_storage(session, ctx, call)?;

    let (base, elem, is_const) = match *session.pool.data(operand_ty) {
        TypeData::Array { of, .. } => (storage, of, storage_const),
        TypeData::Pointer { to, is_const } => {
            let loaded = session.emit_inst(
                block,
                Instruction::Load {
                    ptr: storage,
                    ty: operand_ty,
                },
            );
            (loaded, to, is_const)
        }
        _ => {
            let ty = session.fmt_type(operand_ty);
            return Err(session.error_with(
                ErrorCode::CanOnlyIndexIntoPointersAndArrays,
                call.loc,
                &[&ty],
            ));
        }
    };

    let index = eval(session, ctx, block, call.args[1], Some(Idx::INT))?;
    if !session.pool.is_integer(index.ty) {
        return Err(incorrect_arg_type(session, call, "an integer", 2, index.ty));
    }
    block = index.block;
    let ptr = session.emit_inst(
        block,
        Instruction::ElementPtr {
            base,
            elem,
            index: index.value,
        },
    );
    let ty = if is_const {
        session.pool.const_pointer(elem)
    } else {
        session.pool.pointer(elem)
    };
    Ok(ParseResult::new(block, ty, ptr))
}

/// `(null T)`: a null `(p T)`.
pub(crate) fn null(
    session: &mut Session<'_>,
    _ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 1)?;
    let pointee = session.parse_type(call.args[0])?;
    let ty = session.pool.pointer(pointee);
    let value = session.emit_inst(call.block, Instruction::Const(Constant::Null { ty }));
    Ok(ParseResult::new(call.block, ty, value))
}

#[cfg(test)]
mod tests {
    use crate::{Instruction, RecordingSink, Session, SessionConfig};
    use dale_diagnostic::ErrorCode;

    const POINT: &str = "(def point (struct intern ((x int) (y int))))";

    fn codes(source: &str) -> Vec<ErrorCode> {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let _ = session.process_source("memory.dt", source);
        session.diagnostics().peek().map(|d| d.code).collect()
    }

    #[test]
    fn field_access() {
        let ok = format!("{POINT} (def f (fn intern int ((a (p point))) (@ (: (@ a) y))))");
        assert!(codes(&ok).is_empty());
        let local = format!(
            "{POINT} (def f (fn intern int (void) (def s (var auto point)) (@ (: s x))))"
        );
        assert!(codes(&local).is_empty());
        let missing = format!("{POINT} (def f (fn intern int ((a (p point))) (@ (: (@ a) z))))");
        assert_eq!(codes(&missing), vec![ErrorCode::FieldDoesNotExistInStruct]);
        assert_eq!(
            codes("(def f (fn intern int ((n int)) (@ (: n x))))"),
            vec![ErrorCode::IncorrectArgType]
        );
    }

    #[test]
    fn field_pointer_is_emitted() {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let source = format!("{POINT} (def f (fn intern int ((a (p point))) (@ (: (@ a) y))))");
        let _ = session.process_source("memory.dt", &source);
        assert!(session.finish().is_ok());
        assert!(sink
            .instructions()
            .any(|inst| matches!(inst, Instruction::FieldPtr { index: 1, .. })));
    }

    #[test]
    fn indexing() {
        assert!(codes("(def f (fn intern int ((a (p int))) (@ ($ a 2))))").is_empty());
        assert!(codes(
            "(def f (fn intern int (void)
               (def xs (var auto (array-of 3 int) (array 1 2 3)))
               (@ ($ xs 1))))"
        )
        .is_empty());
        assert_eq!(
            codes("(def f (fn intern int ((n int)) (@ ($ n 0))))"),
            vec![ErrorCode::CanOnlyIndexIntoPointersAndArrays]
        );
        assert_eq!(
            codes("(def f (fn intern int ((a (p int))) (@ ($ a 1.5))))"),
            vec![ErrorCode::IncorrectArgType]
        );
    }

    #[test]
    fn dereference() {
        assert_eq!(
            codes("(def f (fn intern int ((n int)) (@ n)))"),
            vec![ErrorCode::CannotDereferenceNonPointer]
        );
        assert_eq!(
            codes("(def f (fn intern void ((v (p void))) (@ v)))"),
            vec![ErrorCode::CannotDereferenceVoidPointer]
        );
    }

    #[test]
    fn addresses() {
        assert!(codes("(def f (fn intern (p int) ((n int)) (# n)))").is_empty());
        assert_eq!(
            codes("(def f (fn intern void (void) (# 1)))"),
            vec![ErrorCode::CannotTakeAddressOfNonLvalue]
        );
    }

    #[test]
    fn function_addresses() {
        let overloads = "(def g (fn intern int ((a int)) a))
                         (def g (fn intern int ((a bool)) 0))";
        assert_eq!(
            codes(&format!("{overloads} (def f (fn intern void (void) (# g)))")),
            vec![ErrorCode::OverloadedFunctionAddressWithoutTypes]
        );
        assert!(codes(&format!("{overloads} (def f (fn intern void (void) (# g int)))")).is_empty());
        assert!(codes("(def h (fn intern int (void) 1)) (def f (fn intern void (void) (# h)))").is_empty());
    }

    #[test]
    fn null_pointer() {
        assert!(codes("(def f (fn intern (p int) (void) (null int)))").is_empty());
        assert_eq!(
            codes("(def f (fn intern (p int) (void) (null char)))"),
            vec![ErrorCode::IncorrectReturnType]
        );
    }
}
