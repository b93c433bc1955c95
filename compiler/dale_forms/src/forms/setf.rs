//! `(setf target value)`: assignment through a pointer.
//!
//! # Design
//!
//! A user-defined `setf-copy-assign` (function or macro) takes over the
//! assignment when one accepts `((p T), value-type)`. Resolution needs both
//! operand types before anything is emitted, so they are learned
//! speculatively first; the const check runs on that target type and
//! applies whether or not an override exists. `(core setf ...)` always
//! stores directly.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_scope::{resolve_among, CallableEntry, CallableId, CallableKind, ResolveError};
use dale_types::{types_equal, Idx, TypeError};

use super::call::{emit_call, eval_args, expand_in_body, speculative_types};
use super::{eval, expect_args, incorrect_arg_type};
use crate::sink::{Constant, Instruction};
use crate::{FormCall, FormFlags, FunctionContext, ParseResult, Session};

/// Name under which assignment overrides are registered.
pub(crate) const OVERRIDE_NAME: &str = "setf-copy-assign";

pub(crate) fn setf(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 2)?;
    if !call.flags.contains(FormFlags::CORE) {
        let overrides = overrides(session);
        if !overrides.is_empty() {
            if let Some(result) = through_override(session, ctx, call, &overrides)? {
                return Ok(result);
            }
        }
    }
    direct(session, ctx, call)
}

fn overrides(session: &Session<'_>) -> Vec<CallableId> {
    let name = session.interner.intern(OVERRIDE_NAME);
    session
        .scope
        .lookup_callables(name, &session.interner)
        .unwrap_or_default()
}

/// Pointee of a setf target, rejecting non-pointers and const data.
fn assignable(session: &mut Session<'_>, call: &FormCall, target: Idx) -> Result<Idx, ErrorGuaranteed> {
    match session.pool.pointee(target) {
        Some((_, true)) => Err(session.error(ErrorCode::CannotModifyConstVariable, call.loc)),
        Some((pointee, false)) => Ok(pointee),
        None => Err(incorrect_arg_type(session, call, "a pointer", 1, target)),
    }
}

/// Assign through the matching override. `None` when no override accepts
/// the operand types.
fn through_override(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
    overrides: &[CallableId],
) -> Result<Option<ParseResult>, ErrorGuaranteed> {
    let types = speculative_types(session, ctx, call.block, &call.args);
    let Some(target_ty) = types[0] else {
        // The direct path reports why the target does not evaluate.
        return Ok(None);
    };
    assignable(session, call, target_ty)?;

    let name = session.interner.intern(OVERRIDE_NAME);
    let winner = match resolve_among(&session.callables, &session.pool, name, overrides, &types) {
        Ok(resolution) => resolution.callable(),
        Err(ResolveError::NoMatch { .. } | ResolveError::NotInScope { .. }) => return Ok(None),
        Err(err) => return Err(session.resolve_error(err, call.loc)),
    };
    let Some(entry) = session.callables.get(winner).cloned() else {
        return Ok(None);
    };
    tracing::debug!(?winner, macro_override = entry.is_macro(), "setf override");

    let result = match entry.kind {
        CallableKind::Function { ret } => {
            if ret != Idx::BOOL {
                return Err(session.error(ErrorCode::SetfOverridesMustReturnBool, call.loc));
            }
            let args = eval_args(session, ctx, call.block, &call.args, Some(&entry))?;
            let target = args[0].value;
            let result = emit_call(session, call.block, &entry, args);
            if call.flags.contains(FormFlags::GET_ADDRESS) {
                return Ok(Some(address_result(result.block, target_ty, target)));
            }
            result
        }
        CallableKind::Macro { id } => {
            let expansion = override_call(call, &entry);
            let result = expand_in_body(session, ctx, &expansion, id)?;
            if result.ty != Idx::BOOL {
                return Err(session.error(ErrorCode::SetfOverridesMustReturnBool, call.loc));
            }
            if call.flags.contains(FormFlags::GET_ADDRESS) {
                let target = eval(session, ctx, result.block, call.args[0], None)?;
                return Ok(Some(address_result(target.block, target.ty, target.value)));
            }
            result
        }
    };
    Ok(Some(result))
}

/// The override invocation standing in for `call`.
fn override_call(call: &FormCall, entry: &CallableEntry) -> FormCall {
    FormCall {
        head: entry.name,
        flags: FormFlags::empty(),
        hint: Some(Idx::BOOL),
        ..call.clone()
    }
}

fn address_result(block: dale_ir::BlockId, ty: Idx, ptr: dale_ir::ValueHandle) -> ParseResult {
    ParseResult::new(block, ty, ptr).with_address(ptr)
}

/// Store `value` through `target`.
fn direct(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    let target = eval(session, ctx, call.block, call.args[0], None)?;
    let pointee = assignable(session, call, target.ty)?;
    let value = eval(session, ctx, target.block, call.args[1], Some(pointee))?;
    if !types_equal(pointee, value.ty) {
        let loc = session.loc(call.args[1]);
        let err = TypeError::IncorrectType {
            expected: pointee,
            found: value.ty,
        };
        return Err(session.type_error(err, loc));
    }
    session.emit_inst(
        value.block,
        Instruction::Store {
            ptr: target.value,
            value: value.value,
        },
    );
    if call.flags.contains(FormFlags::GET_ADDRESS) {
        return Ok(address_result(value.block, target.ty, target.value));
    }
    let done = session.emit_inst(value.block, Instruction::Const(Constant::Bool(true)));
    Ok(ParseResult::new(value.block, Idx::BOOL, done))
}
