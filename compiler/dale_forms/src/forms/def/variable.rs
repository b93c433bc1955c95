//! `(def name (var linkage type [init]))`, at top level and in bodies.
//!
//! The type `\` is implied from the initialiser. `(const T)` variables must
//! be initialised and cannot be assigned afterwards.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{Loc, NodeId};
use dale_scope::{Linkage, ScopeError, Variable};
use dale_types::{check_first_class, types_equal, Idx, TypeData, TypeError};

use super::{linkage, Definition};
use crate::forms::eval;
use crate::forms::literal::{constant_type, global_initialiser};
use crate::sink::Instruction;
use crate::{FormCall, FunctionContext, ParseResult, Session};

/// Type markers asking for the type of the initialiser.
const IMPLIED: &[&str] = &["\\", "auto"];

struct VarForm {
    linkage: Linkage,
    /// `None` when implied; otherwise the type and whether it is const.
    declared: Option<(Idx, bool)>,
    init: Option<NodeId>,
    loc: Loc,
}

fn var_form(session: &mut Session<'_>, def: &Definition) -> Result<VarForm, ErrorGuaranteed> {
    let loc = session.loc(def.node);
    let (link, ty, init) = match def.rest[..] {
        [link, ty] => (link, ty, None),
        [link, ty, init] => (link, ty, Some(init)),
        _ => {
            let got = def.rest.len().to_string();
            return Err(session.error_with(ErrorCode::IncorrectNumberOfArgs, loc, &["var", "2 or 3", &got]));
        }
    };
    let linkage = linkage(session, link, "var")?;
    let declared = match session.text(ty) {
        Some(text) if IMPLIED.contains(&text) => None,
        _ => Some(session.parse_type_qualified(ty)?),
    };
    Ok(VarForm {
        linkage,
        declared,
        init,
        loc,
    })
}

/// Reject types no variable can have.
fn check_storable(session: &mut Session<'_>, ty: Idx, loc: Loc, global: bool) -> Result<(), ErrorGuaranteed> {
    if global && matches!(session.pool.data(ty), TypeData::Array { len: 0, .. }) {
        return Err(session.error(ErrorCode::ZeroLengthGlobalArraysAreUnsupported, loc));
    }
    if session.pool.is_opaque_struct(ty) {
        return Err(session.error(ErrorCode::CannotInstantiateOpaqueStruct, loc));
    }
    if let Err(err) = check_first_class(&session.pool, ty) {
        return Err(session.type_error(err, loc));
    }
    Ok(())
}

fn mismatch(session: &mut Session<'_>, node: NodeId, expected: Idx, found: Idx) -> ErrorGuaranteed {
    let loc = session.loc(node);
    session.type_error(TypeError::IncorrectType { expected, found }, loc)
}

/// Top-level variable. Initialisers must be compile-time constants.
pub(super) fn global(session: &mut Session<'_>, def: &Definition) -> Result<(), ErrorGuaranteed> {
    let var = var_form(session, def)?;
    let loc = var.loc;
    if var.linkage == Linkage::Auto {
        return Err(session.error_with(ErrorCode::UnexpectedElement, loc, &["linkage", "var", "auto"]));
    }
    if var.linkage == Linkage::Extern && var.init.is_some() {
        return Err(session.error(ErrorCode::CannotInitialiseExternVar, loc));
    }

    let (ty, is_const, init) = match (var.declared, var.init) {
        (None, None) => return Err(session.error(ErrorCode::MustHaveInitialiserForImpliedType, loc)),
        (None, Some(node)) => {
            let value = global_initialiser(session, node, None)?;
            (constant_type(session, &value), false, Some(value))
        }
        (Some((_, true)), None) => {
            return Err(session.error(ErrorCode::MustHaveInitialiserForConstType, loc));
        }
        (Some((ty, is_const)), node) => {
            let value = match node {
                Some(node) => {
                    let value = global_initialiser(session, node, Some(ty))?;
                    let found = constant_type(session, &value);
                    if !types_equal(ty, found) {
                        return Err(mismatch(session, node, ty, found));
                    }
                    Some(value)
                }
                None => None,
            };
            (ty, is_const, value)
        }
    };
    check_storable(session, ty, loc, true)?;

    let current = session.scope.current_namespace();
    let taken = session
        .scope
        .namespace_frame(current)
        .is_some_and(|frame| frame.variable(def.name).is_some());
    if taken {
        return Err(session.scope_error(ScopeError::RedefinitionOfVariable(def.name), loc));
    }

    let name = session.interner.lookup(def.name);
    let symbol = session.scope.qualify(name);
    let address = session.sink.declare_global(&symbol, ty, var.linkage, init);
    let variable = Variable {
        name: def.name,
        ty,
        is_const,
        linkage: var.linkage,
        address,
        is_global: true,
        loc,
    };
    if let Err(err) = session.scope.define_variable(variable) {
        return Err(session.scope_error(err, loc));
    }
    tracing::debug!(name, symbol, "global variable");
    Ok(())
}

/// Variable in a procedure body. The initialiser is evaluated before the
/// name is bound, so it sees any outer variable of the same name.
pub(super) fn local(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
    def: &Definition,
) -> Result<ParseResult, ErrorGuaranteed> {
    let var = var_form(session, def)?;
    let loc = var.loc;
    if var.linkage == Linkage::Extern && var.init.is_some() {
        return Err(session.error(ErrorCode::HasBothExternAndInitialiser, loc));
    }

    let mut block = call.block;
    let (ty, is_const, init) = match (var.declared, var.init) {
        (None, None) => return Err(session.error(ErrorCode::MustHaveInitialiserForImpliedType, loc)),
        (None, Some(node)) => {
            let value = eval(session, ctx, block, node, None)?;
            block = value.block;
            (value.ty, false, Some(value))
        }
        (Some((_, true)), None) => {
            return Err(session.error(ErrorCode::MustHaveInitialiserForConstType, loc));
        }
        (Some((ty, is_const)), node) => {
            let value = match node {
                Some(node) => {
                    let value = eval(session, ctx, block, node, Some(ty))?;
                    if !types_equal(ty, value.ty) {
                        return Err(mismatch(session, node, ty, value.ty));
                    }
                    block = value.block;
                    Some(value)
                }
                None => None,
            };
            (ty, is_const, value)
        }
    };
    check_storable(session, ty, loc, false)?;

    let name = session.interner.lookup(def.name);
    let (address, is_global) = if var.linkage == Linkage::Extern {
        let symbol = session.scope.qualify(name);
        (session.sink.declare_global(&symbol, ty, Linkage::Extern, None), true)
    } else {
        let slot = session.emit_inst(block, Instruction::Alloca { ty });
        if let Some(init) = init {
            session.emit_inst(block, Instruction::Store { ptr: slot, value: init.value });
        }
        (slot, false)
    };
    let variable = Variable {
        name: def.name,
        ty,
        is_const,
        linkage: var.linkage,
        address,
        is_global,
        loc,
    };
    if let Err(err) = session.scope.define_variable(variable) {
        return Err(session.scope_error(err, loc));
    }
    tracing::trace!(name, "local variable");
    Ok(ParseResult::void(block))
}
