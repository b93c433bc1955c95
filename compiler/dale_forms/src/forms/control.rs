//! Control flow: `do`, `if`, `return`, `label` and `goto`.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{BlockId, NodeId};
use dale_scope::{Label, ScopeError};
use dale_types::{types_equal, unify_branches, Branch, Idx, TypeError};

use super::{eval, expect_arg_range, expect_args, expect_atom, incorrect_arg_type};
use crate::dispatch;
use crate::function::PendingGoto;
use crate::sink::Instruction;
use crate::{FormCall, FunctionContext, ParseResult, Session};

/// Top-level `(do form...)`: each form as if written at top level.
pub(crate) fn top_level_do(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    if call.args.is_empty() {
        return Err(session.error(ErrorCode::NoEmptyDo, call.loc));
    }
    let mut failed = None;
    for &form in &call.args {
        if let Err(err) = dispatch::top_level(session, form) {
            failed.get_or_insert(err);
        }
    }
    failed.map_or(Ok(()), Err)
}

/// Evaluate statements in order, threading the current block.
///
/// A failing statement does not stop the ones after it; the first error
/// is returned once all have been processed. The result is that of the
/// last statement.
pub(crate) fn sequence(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    block: BlockId,
    nodes: &[NodeId],
    hint: Option<Idx>,
) -> Result<ParseResult, ErrorGuaranteed> {
    let mut last = ParseResult::void(block);
    let mut failed = None;
    for (i, &node) in nodes.iter().enumerate() {
        let hint = if i + 1 == nodes.len() { hint } else { None };
        match eval(session, ctx, last.block, node, hint) {
            Ok(result) => last = result,
            Err(err) => {
                failed.get_or_insert(err);
            }
        }
    }
    failed.map_or(Ok(last), Err)
}

/// `(do statement...)`: statements in a new scope.
pub(crate) fn do_form(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    if call.args.is_empty() {
        return Err(session.error(ErrorCode::NoEmptyDo, call.loc));
    }
    session.scope.push_frame();
    let result = sequence(session, ctx, call.block, &call.args, call.hint);
    session.scope.pop_frame();
    result
}

/// `(if cond then else)`.
pub(crate) fn if_form(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 3)?;
    let cond = eval(session, ctx, call.block, call.args[0], Some(Idx::BOOL))?;
    if cond.ty != Idx::BOOL {
        return Err(incorrect_arg_type(session, call, "a bool", 1, cond.ty));
    }

    let then_block = session.new_block();
    let else_block = session.new_block();
    session.emit_inst(
        cond.block,
        Instruction::CondBranch {
            cond: cond.value,
            then_block,
            else_block,
        },
    );
    let then_result = eval(session, ctx, then_block, call.args[1], call.hint);
    let else_result = eval(session, ctx, else_block, call.args[2], call.hint);
    let (then_result, else_result) = (then_result?, else_result?);

    let merge = session.new_block();
    let mut incoming = Vec::with_capacity(2);
    for arm in [&then_result, &else_result] {
        if !arm.terminates {
            session.emit_inst(arm.block, Instruction::Branch { target: merge });
            incoming.push((arm.value, arm.block));
        }
    }

    let ty = unify_branches(
        Branch {
            ty: then_result.ty,
            terminates: then_result.terminates,
        },
        Branch {
            ty: else_result.ty,
            terminates: else_result.terminates,
        },
    );
    let ty = match ty {
        Ok(ty) => ty,
        Err(err) => return Err(session.type_error(err, call.loc)),
    };
    if incoming.is_empty() {
        return Ok(ParseResult::terminated(merge));
    }
    if ty.is_void() {
        return Ok(ParseResult::void(merge));
    }
    let value = session.emit_inst(merge, Instruction::Phi { ty, incoming });
    Ok(ParseResult::new(merge, ty, value))
}

/// `(return [value])`.
pub(crate) fn return_form(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_arg_range(session, call, 0, 1)?;
    let (block, value, ty) = match call.args.first() {
        Some(&node) => {
            let result = eval(session, ctx, call.block, node, Some(ctx.ret))?;
            (result.block, Some(result.value), result.ty)
        }
        None => (call.block, None, Idx::VOID),
    };
    if !types_equal(ty, ctx.ret) {
        let err = TypeError::IncorrectReturnType {
            expected: ctx.ret,
            found: ty,
        };
        return Err(session.type_error(err, call.loc));
    }
    session.emit_inst(block, Instruction::Return { value });
    let next = session.new_block();
    Ok(ParseResult::terminated(next))
}

/// `(label name)`: a jump target. Falls through into the label's block.
pub(crate) fn label(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 1)?;
    let name = expect_atom(session, call.args[0], "label")?;
    if ctx.labels.contains_key(&name) {
        return Err(session.scope_error(ScopeError::RedeclarationOfLabel(name), call.loc));
    }
    let target = ctx.label_block(name, &mut *session.sink);
    let label = Label {
        block: target,
        declarations: declarations(session),
        loc: call.loc,
    };
    if let Err(err) = session.scope.define_label(name, label) {
        return Err(session.scope_error(err, call.loc));
    }
    ctx.labels.insert(name, label);
    session.emit_inst(call.block, Instruction::Branch { target });
    Ok(ParseResult::void(target))
}

/// `(goto name)`. The label may appear later in the function; it is
/// checked when the function ends.
pub(crate) fn goto(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 1)?;
    let name = expect_atom(session, call.args[0], "goto")?;
    let target = ctx.label_block(name, &mut *session.sink);
    session.emit_inst(call.block, Instruction::Branch { target });
    ctx.gotos.push(PendingGoto {
        label: name,
        declarations: declarations(session),
        loc: call.loc,
    });
    let next = session.new_block();
    Ok(ParseResult::terminated(next))
}

fn declarations(session: &Session<'_>) -> u32 {
    u32::try_from(session.scope.lexical_variable_count()).unwrap_or(u32::MAX)
}

/// Check every `goto` of a finished function against its labels.
pub(crate) fn check_gotos(session: &mut Session<'_>, ctx: &FunctionContext) -> Result<(), ErrorGuaranteed> {
    let mut failed = None;
    for goto in &ctx.gotos {
        let err = match ctx.labels.get(&goto.label) {
            None => {
                let text = session.interner.lookup(goto.label);
                session.error_with(ErrorCode::LabelNotInScope, goto.loc, &[text])
            }
            Some(label) if label.declarations > goto.declarations => {
                session.error(ErrorCode::GotoWillCrossDeclaration, goto.loc)
            }
            Some(_) => continue,
        };
        failed.get_or_insert(err);
    }
    failed.map_or(Ok(()), Err)
}
