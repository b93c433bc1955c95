//! Routing of nodes to special forms, literals and calls.
//!
//! # Design
//!
//! Shape is checked before anything is looked up: a top-level node must be
//! a non-empty list headed by a symbol. The head then selects, in order:
//! 1. `core`, which re-dispatches the named form with [`FormFlags::CORE`]
//! 2. a registered special form
//! 3. an enum element reference `(EnumName element)`
//! 4. a call of a visible function or macro
//!
//! Atoms in a body are literals or variable references.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{BlockId, NodeId, NodeKind};
use dale_types::Idx;
use smallvec::SmallVec;

use crate::{forms, FormCall, FormFlags, FunctionContext, ParseResult, Session};

/// Process one top-level node.
pub(crate) fn top_level(session: &mut Session<'_>, node: NodeId) -> Result<(), ErrorGuaranteed> {
    dale_stack::ensure_sufficient_stack(|| {
        let loc = session.loc(node);
        match session.arena.try_kind(node) {
            None => return Err(session.fatal(ErrorCode::NodeIsNeitherTokenNorList, loc, &[])),
            Some(NodeKind::Atom(_)) => {
                return Err(session.error(ErrorCode::OnlyListsAtTopLevel, loc));
            }
            Some(NodeKind::List(_)) => {}
        }
        let call = form_call(session, node, BlockId::GLOBAL, FormFlags::empty(), None)?;
        let head = session.interner.lookup(call.head);
        tracing::trace!(head, line = loc.line, "top-level form");
        match session.registry.top_level(head) {
            Some(handler) => handler(session, &call),
            None => forms::call::top_level_macro(session, &call),
        }
    })
}

/// Process one node of a procedure body.
pub fn handle(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    block: BlockId,
    node: NodeId,
    flags: FormFlags,
) -> Result<ParseResult, ErrorGuaranteed> {
    handle_hinted(session, ctx, block, node, flags, None)
}

/// [`handle`] with the type the enclosing form expects, used to type
/// literals.
pub(crate) fn handle_hinted(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    block: BlockId,
    node: NodeId,
    flags: FormFlags,
    hint: Option<Idx>,
) -> Result<ParseResult, ErrorGuaranteed> {
    dale_stack::ensure_sufficient_stack(|| {
        let loc = session.loc(node);
        match session.arena.try_kind(node) {
            None => Err(session.fatal(ErrorCode::NodeIsNeitherTokenNorList, loc, &[])),
            Some(NodeKind::Atom(name)) => {
                forms::literal::atom(session, block, name, loc, flags, hint)
            }
            Some(NodeKind::List(_)) => {
                let call = form_call(session, node, block, flags, hint)?;
                body_form(session, ctx, &call)
            }
        }
    })
}

fn body_form(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    let head = session.interner.lookup(call.head);
    tracing::trace!(head, line = call.loc.line, "body form");
    if head == "core" {
        return core_form(session, ctx, call);
    }
    if let Some(handler) = session.registry.body(head) {
        return handler(session, ctx, call);
    }
    if let Some(result) = forms::literal::enum_element(session, call)? {
        return Ok(result);
    }
    forms::call::call(session, ctx, call)
}

/// `(core form args...)`: the named core form, bypassing overrides.
fn core_form(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    forms::expect_min_args(session, call, 1)?;
    let form = call.args[0];
    let handler = session
        .arena
        .atom(form)
        .and_then(|name| Some((name, session.registry.body(session.interner.lookup(name))?)));
    let Some((head, handler)) = handler else {
        return Err(forms::unexpected(session, form, "core form name", "core"));
    };
    let inner = FormCall {
        node: call.node,
        head,
        args: call.args[1..].iter().copied().collect(),
        loc: call.loc,
        block: call.block,
        flags: call.flags | FormFlags::CORE,
        hint: call.hint,
    };
    handler(session, ctx, &inner)
}

/// Split a list node into head symbol and arguments, rejecting malformed
/// heads.
fn form_call(
    session: &mut Session<'_>,
    node: NodeId,
    block: BlockId,
    flags: FormFlags,
    hint: Option<Idx>,
) -> Result<FormCall, ErrorGuaranteed> {
    let loc = session.loc(node);
    let items: SmallVec<[NodeId; 5]> = session.arena.children(node).iter().copied().collect();
    let Some((&first, rest)) = items.split_first() else {
        return Err(session.error(ErrorCode::NoEmptyLists, loc));
    };
    let Some(head) = session.arena.atom(first) else {
        let first_loc = session.loc(first);
        return Err(session.error(ErrorCode::FirstListElementMustBeAtom, first_loc));
    };
    if !is_symbol(session.interner.lookup(head)) {
        let first_loc = session.loc(first);
        return Err(session.error(ErrorCode::FirstListElementMustBeSymbol, first_loc));
    }
    Ok(FormCall {
        node,
        head,
        args: rest.iter().copied().collect(),
        loc,
        block,
        flags,
        hint,
    })
}

/// Whether an atom can name a form: not a string, char or number literal.
pub(crate) fn is_symbol(text: &str) -> bool {
    match text.as_bytes() {
        [] | [b'"', ..] | [b'#', b'\\', ..] => false,
        [c, ..] if c.is_ascii_digit() => false,
        [b'-' | b'+', c, ..] if c.is_ascii_digit() => false,
        _ => true,
    }
}
