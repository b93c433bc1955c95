//! Core special forms.
//!
//! Every handler follows the same order: check the shape of the raw nodes
//! (argument count, atom or list positions), then types and scope, then
//! emit. Shape helpers live here.

pub(crate) mod call;
mod cast;
mod control;
mod def;
pub(crate) mod literal;
mod memory;
mod module;
mod namespace;
mod setf;

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{BlockId, Name, NodeId};
use dale_types::Idx;
use smallvec::SmallVec;

use crate::dispatch::handle_hinted;
use crate::{FormCall, FormFlags, FormRegistry, FunctionContext, ParseResult, Session};

/// Install every core form.
pub(crate) fn register_core_forms(registry: &mut FormRegistry) {
    registry.register_top_level("def", def::top_level);
    registry.register_top_level("namespace", namespace::namespace);
    registry.register_top_level("using-namespace", namespace::using_namespace);
    registry.register_top_level("import", module::import);
    registry.register_top_level("include", module::include);
    registry.register_top_level("once", module::once);
    registry.register_top_level("do", control::top_level_do);

    registry.register_body("do", control::do_form);
    registry.register_body("if", control::if_form);
    registry.register_body("return", control::return_form);
    registry.register_body("label", control::label);
    registry.register_body("goto", control::goto);
    registry.register_body("setf", setf::setf);
    registry.register_body("def", def::body);
    registry.register_body("@", memory::deref);
    registry.register_body("#", memory::address_of);
    registry.register_body(":", memory::field);
    registry.register_body("$", memory::element);
    registry.register_body("null", memory::null);
    registry.register_body("cast", cast::cast);
    registry.register_body("array", literal::array);
}

/// Evaluate a sub-expression for its value.
pub(crate) fn eval(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    block: BlockId,
    node: NodeId,
    hint: Option<Idx>,
) -> Result<ParseResult, ErrorGuaranteed> {
    handle_hinted(session, ctx, block, node, FormFlags::empty(), hint)
}

/// Name a form is reported under.
pub(crate) fn form_name(session: &Session<'_>, call: &FormCall) -> &'static str {
    session.interner.lookup(call.head)
}

pub(crate) fn expect_args(
    session: &mut Session<'_>,
    call: &FormCall,
    count: usize,
) -> Result<(), ErrorGuaranteed> {
    if call.arg_count() == count {
        return Ok(());
    }
    let name = form_name(session, call);
    Err(session.error_with(
        ErrorCode::IncorrectNumberOfArgs,
        call.loc,
        &[name, &count.to_string(), &call.arg_count().to_string()],
    ))
}

pub(crate) fn expect_min_args(
    session: &mut Session<'_>,
    call: &FormCall,
    min: usize,
) -> Result<(), ErrorGuaranteed> {
    if call.arg_count() >= min {
        return Ok(());
    }
    let name = form_name(session, call);
    Err(session.error_with(
        ErrorCode::IncorrectMinimumNumberOfArgs,
        call.loc,
        &[name, &min.to_string(), &call.arg_count().to_string()],
    ))
}

pub(crate) fn expect_arg_range(
    session: &mut Session<'_>,
    call: &FormCall,
    min: usize,
    max: usize,
) -> Result<(), ErrorGuaranteed> {
    expect_min_args(session, call, min)?;
    if call.arg_count() <= max {
        return Ok(());
    }
    let name = form_name(session, call);
    Err(session.error_with(
        ErrorCode::IncorrectMaximumNumberOfArgs,
        call.loc,
        &[name, &max.to_string(), &call.arg_count().to_string()],
    ))
}

/// Report `UnexpectedElement` for `node`.
#[cold]
pub(crate) fn unexpected(
    session: &mut Session<'_>,
    node: NodeId,
    expected: &str,
    what_for: &str,
) -> ErrorGuaranteed {
    let got = if session.arena.is_list(node) { "list" } else { "atom" };
    let loc = session.loc(node);
    session.error_with(ErrorCode::UnexpectedElement, loc, &[expected, what_for, got])
}

pub(crate) fn expect_atom(
    session: &mut Session<'_>,
    node: NodeId,
    what_for: &str,
) -> Result<Name, ErrorGuaranteed> {
    match session.arena.atom(node) {
        Some(name) => Ok(name),
        None => Err(unexpected(session, node, "atom", what_for)),
    }
}

pub(crate) fn expect_list(
    session: &mut Session<'_>,
    node: NodeId,
    what_for: &str,
) -> Result<SmallVec<[NodeId; 8]>, ErrorGuaranteed> {
    match session.arena.list(node) {
        Some(items) => Ok(items.iter().copied().collect()),
        None => Err(unexpected(session, node, "list", what_for)),
    }
}

/// Report a value of the wrong type for argument `position` of a form.
#[cold]
pub(crate) fn incorrect_arg_type(
    session: &mut Session<'_>,
    call: &FormCall,
    expected: &str,
    position: usize,
    got: Idx,
) -> ErrorGuaranteed {
    let name = form_name(session, call);
    let got = session.fmt_type(got);
    session.error_with(
        ErrorCode::IncorrectArgType,
        call.loc,
        &[name, expected, &position.to_string(), &got],
    )
}

/// Store `value` in a fresh stack slot and return the slot.
pub(crate) fn spill(session: &mut Session<'_>, block: BlockId, value: &ParseResult) -> ParseResult {
    let slot = session.emit_inst(block, crate::Instruction::Alloca { ty: value.ty });
    session.emit_inst(
        block,
        crate::Instruction::Store {
            ptr: slot,
            value: value.value,
        },
    );
    ParseResult::new(block, value.ty, value.value).with_address(slot)
}

/// Unwrap a literal string atom (`"..."`) and resolve its escapes.
pub(crate) fn unquote(text: &str) -> Option<String> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => return None,
        }
    }
    Some(out)
}
