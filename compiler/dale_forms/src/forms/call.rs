//! Calls of functions and macros.
//!
//! # Design
//!
//! Arguments of a function call are evaluated before resolution, so their
//! types are known. A macro must see its arguments unevaluated: when any
//! candidate is a macro, argument types are first learned speculatively (an
//! evaluation whose output and diagnostics are discarded), and only the
//! winner decides whether the arguments are evaluated for real or handed
//! over as nodes.
//!
//! Speculative types are remembered per argument node, and macro-expanded
//! copies of an argument share its entry, so nested calls of an overloaded
//! macro type each argument once. When no candidate of the call's arity
//! has a typed parameter the types cannot change the outcome and nothing
//! is evaluated.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{BlockId, Loc, NodeId, ValueHandle};
use dale_scope::{resolve_among, CallableEntry, CallableId, CallableKind, MacroId};
use dale_stack::DepthExceeded;
use dale_types::{coercion_rank, CoercionRank, Idx, TypeData};

use super::{eval, spill};
use crate::dispatch::{self, handle_hinted};
use crate::expand::{expand, InvalidExpansion};
use crate::sink::Instruction;
use crate::{FormCall, FunctionContext, ParseResult, Session};

/// Callables visible under the head of `call`.
fn candidates(session: &mut Session<'_>, call: &FormCall) -> Result<Vec<CallableId>, ErrorGuaranteed> {
    match session.scope.lookup_callables(call.head, &session.interner) {
        Ok(ids) => Ok(ids),
        Err(err) => Err(session.scope_error(err, call.loc)),
    }
}

fn entry(session: &Session<'_>, id: CallableId) -> Option<CallableEntry> {
    session.callables.get(id).cloned()
}

/// A call in a procedure body.
#[tracing::instrument(level = "trace", skip_all, fields(name = session.interner.lookup(call.head)))]
pub(crate) fn call(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    let ids = candidates(session, call)?;
    if ids.is_empty() {
        let err = dale_scope::ResolveError::NotInScope { name: call.head };
        return Err(session.resolve_error(err, call.loc));
    }
    let any_macro = ids
        .iter()
        .any(|&id| session.callables.get(id).is_some_and(CallableEntry::is_macro));

    if any_macro {
        let types = if types_matter(session, &ids, call.arg_count()) {
            speculative_types(session, ctx, call.block, &call.args)
        } else {
            vec![None; call.arg_count()]
        };
        let winner = resolve(session, call, &ids, &types)?;
        let Some(entry) = entry(session, winner) else {
            return Err(session.error(ErrorCode::UnableToParseForm, call.loc));
        };
        return match entry.kind {
            CallableKind::Macro { id } => expand_in_body(session, ctx, call, id),
            CallableKind::Function { .. } => {
                let args = eval_args(session, ctx, call.block, &call.args, Some(&entry))?;
                Ok(emit_call(session, call.block, &entry, args))
            }
        };
    }

    let hints = single_candidate(session, &ids, call.arg_count());
    let args = eval_args(session, ctx, call.block, &call.args, hints.as_ref())?;
    let types: Vec<Option<Idx>> = args.iter().map(|a| Some(a.ty)).collect();
    let winner = resolve(session, call, &ids, &types)?;
    let Some(entry) = entry(session, winner) else {
        return Err(session.error(ErrorCode::UnableToParseForm, call.loc));
    };
    Ok(emit_call(session, call.block, &entry, args))
}

fn takes(entry: &CallableEntry, arity: usize) -> bool {
    entry.params.len() == arity || (entry.variadic && entry.params.len() <= arity)
}

/// The only arity-matching function, whose parameter types then type the
/// literal arguments.
fn single_candidate(session: &Session<'_>, ids: &[CallableId], arity: usize) -> Option<CallableEntry> {
    let mut matching = ids
        .iter()
        .filter_map(|&id| session.callables.get(id))
        .filter(|e| takes(e, arity));
    let first = matching.next()?;
    matching.next().is_none().then(|| first.clone())
}

/// Whether argument types can decide between the candidates. With no
/// candidate of this arity they still feed the no-match diagnostic.
fn types_matter(session: &Session<'_>, ids: &[CallableId], arity: usize) -> bool {
    let mut matching = ids
        .iter()
        .filter_map(|&id| session.callables.get(id))
        .filter(|e| takes(e, arity))
        .peekable();
    matching.peek().is_none() || matching.any(|e| e.params.iter().any(|p| p.ty.is_some()))
}

fn resolve(
    session: &mut Session<'_>,
    call: &FormCall,
    ids: &[CallableId],
    types: &[Option<Idx>],
) -> Result<CallableId, ErrorGuaranteed> {
    match resolve_among(&session.callables, &session.pool, call.head, ids, types) {
        Ok(resolution) => {
            tracing::debug!(
                name = session.interner.lookup(call.head),
                viable = resolution.viable,
                "resolved call"
            );
            Ok(resolution.callable())
        }
        Err(err) => Err(session.resolve_error(err, call.loc)),
    }
}

/// Types of argument nodes, learned without emitting anything. `None`
/// for an argument that does not evaluate.
pub(crate) fn speculative_types(
    session: &mut Session<'_>,
    ctx: &FunctionContext,
    block: BlockId,
    args: &[NodeId],
) -> Vec<Option<Idx>> {
    let origins: Vec<NodeId> = args.iter().map(|&arg| session.arena.origin(arg)).collect();
    let known: Option<Vec<Option<Idx>>> = origins
        .iter()
        .map(|origin| session.speculated.get(origin).copied())
        .collect();
    if let Some(types) = known {
        return types;
    }
    let mut scratch = ctx.clone();
    let types: Vec<Option<Idx>> = session.speculate(|session| {
        args.iter()
            .map(|&arg| eval(session, &mut scratch, block, arg, None).ok().map(|r| r.ty))
            .collect()
    });
    session.speculated.extend(origins.into_iter().zip(types.iter().copied()));
    types
}

/// Evaluate arguments left to right. Parameter types of `callee`, when
/// known, type the literals.
pub(crate) fn eval_args(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    block: BlockId,
    args: &[NodeId],
    callee: Option<&CallableEntry>,
) -> Result<Vec<ParseResult>, ErrorGuaranteed> {
    let mut block = block;
    let mut results = Vec::with_capacity(args.len());
    let mut failed = None;
    for (i, &arg) in args.iter().enumerate() {
        let hint = callee
            .and_then(|e| e.params.get(i))
            .and_then(|p| p.ty)
            .map(|ty| session.pool.strip_reference(ty));
        match eval(session, ctx, block, arg, hint) {
            Ok(result) => {
                block = result.block;
                results.push(result);
            }
            Err(err) => {
                failed.get_or_insert(err);
            }
        }
    }
    failed.map_or(Ok(results), Err)
}

/// Emit a call of a resolved function, converting each argument to its
/// parameter type.
pub(crate) fn emit_call(
    session: &mut Session<'_>,
    block: BlockId,
    callee: &CallableEntry,
    args: Vec<ParseResult>,
) -> ParseResult {
    let mut block = args.last().map_or(block, |a| a.block);
    let mut values = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let param = callee.params.get(i).and_then(|p| p.ty);
        let (value, next) = coerce_arg(session, block, arg, param);
        block = next;
        values.push(value);
    }
    let ret = callee.return_type().unwrap_or(Idx::VOID);
    let value = session.emit_inst(
        block,
        Instruction::Call {
            callee: callee.value,
            args: values,
            ret,
        },
    );
    ParseResult::new(block, ret, value)
}

/// Value passed for one argument: references get an address, coercible
/// values a cast, variadic surplus is passed as is.
fn coerce_arg(
    session: &mut Session<'_>,
    block: BlockId,
    arg: &ParseResult,
    param: Option<Idx>,
) -> (ValueHandle, BlockId) {
    let Some(param) = param else {
        return (arg.value, block);
    };
    if matches!(session.pool.data(param), TypeData::Reference { .. }) {
        let address = match arg.address {
            Some(address) => address,
            None => spill(session, block, arg).address.unwrap_or(arg.value),
        };
        return (address, block);
    }
    match coercion_rank(&session.pool, arg.ty, param) {
        Some(CoercionRank::Exact) | None => (arg.value, block),
        Some(_) => {
            let cast = session.emit_inst(
                block,
                Instruction::Cast {
                    value: arg.value,
                    from: arg.ty,
                    to: param,
                },
            );
            (cast, block)
        }
    }
}

/// Expand macro `id` for `call`, returning the replacement node.
///
/// The caller must dispatch the node and then leave the expansion budget.
fn expand_node(session: &mut Session<'_>, call: &FormCall, id: MacroId) -> Result<NodeId, ErrorGuaranteed> {
    let name = session.interner.lookup(call.head);
    if let Err(DepthExceeded { limit }) = session.expansion.try_enter() {
        return Err(session.fatal(
            ErrorCode::MacroExpansionTooDeep,
            call.loc,
            &[name, &limit.to_string()],
        ));
    }
    let expanded = match session.macros.get(id) {
        Some(body) => expand(body, &mut session.arena, &session.interner, &call.args, call.loc),
        None => Err(InvalidExpansion::Null),
    };
    let node = match expanded {
        Ok(node) => node,
        Err(invalid) => {
            session.expansion.exit();
            return Err(report_invalid(session, invalid, name, call.loc));
        }
    };
    tracing::debug!(
        name,
        depth = session.expansion.depth(),
        "expanded macro"
    );
    Ok(node)
}

#[cold]
fn report_invalid(session: &mut Session<'_>, invalid: InvalidExpansion, name: &str, loc: Loc) -> ErrorGuaranteed {
    match invalid {
        InvalidExpansion::Null => session.error_with(ErrorCode::GotNullPointerFromMacroCall, loc, &[name]),
        InvalidExpansion::NotANode => session.fatal(ErrorCode::DNodeIsNeitherTokenNorList, loc, &[]),
        InvalidExpansion::EmptyAtom => session.fatal(ErrorCode::DNodeHasNoString, loc, &[]),
    }
}

/// Expand a macro in a body and dispatch its result in place of the call.
pub(crate) fn expand_in_body(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
    id: MacroId,
) -> Result<ParseResult, ErrorGuaranteed> {
    let node = expand_node(session, call, id)?;
    let result = handle_hinted(session, ctx, call.block, node, call.flags, call.hint);
    session.expansion.exit();
    result
}

/// A macro call at top level. Arguments are untyped there, so only macros
/// with untyped parameters can match.
pub(crate) fn top_level_macro(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    let ids: Vec<CallableId> = candidates(session, call)?
        .into_iter()
        .filter(|&id| session.callables.get(id).is_some_and(CallableEntry::is_macro))
        .collect();
    let types = vec![None; call.arg_count()];
    let winner = resolve(session, call, &ids, &types)?;
    let Some(CallableKind::Macro { id }) = session.callables.get(winner).map(|e| e.kind) else {
        return Err(session.error(ErrorCode::UnableToParseForm, call.loc));
    };
    let node = expand_node(session, call, id)?;
    let result = dispatch::top_level(session, node);
    session.expansion.exit();
    result
}
