//! `(def name (kind ...))`.
//!
//! At top level every kind is allowed; in a procedure body only `var` and
//! `struct`.

mod enumeration;
mod function;
mod macro_def;
mod structure;
mod variable;

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{Name, NodeId};
use dale_scope::Linkage;
use smallvec::SmallVec;

use super::{expect_args, expect_atom, expect_list, unexpected};
use crate::{FormCall, FunctionContext, ParseResult, Session};

/// A parsed `(def name (kind rest...))`.
struct Definition {
    name: Name,
    kind: &'static str,
    /// The `(kind ...)` list.
    node: NodeId,
    /// Elements after the kind keyword.
    rest: SmallVec<[NodeId; 8]>,
}

fn definition(session: &mut Session<'_>, call: &FormCall) -> Result<Definition, ErrorGuaranteed> {
    expect_args(session, call, 2)?;
    let name = expect_atom(session, call.args[0], "def")?;
    let node = call.args[1];
    let items = expect_list(session, node, "def")?;
    let Some((&head, rest)) = items.split_first() else {
        return Err(unexpected(session, node, "definition kind", "def"));
    };
    let kind = session.text(head);
    let Some(kind) = kind else {
        return Err(unexpected(session, head, "atom", "definition kind"));
    };
    Ok(Definition {
        name,
        kind,
        node,
        rest: rest.iter().copied().collect(),
    })
}

/// Linkage keyword at `node`.
fn linkage(session: &mut Session<'_>, node: NodeId, what_for: &str) -> Result<Linkage, ErrorGuaranteed> {
    let name = expect_atom(session, node, what_for)?;
    let text = session.interner.lookup(name);
    match Linkage::from_keyword(text) {
        Some(linkage) => Ok(linkage),
        None => {
            let loc = session.loc(node);
            Err(session.error_with(ErrorCode::UnexpectedElement, loc, &["linkage", what_for, text]))
        }
    }
}

/// Top-level `def`.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn top_level(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    let def = definition(session, call)?;
    tracing::debug!(name = session.interner.lookup(def.name), kind = def.kind, "def");
    match def.kind {
        "fn" => function::function(session, &def),
        "macro" => macro_def::macro_def(session, &def),
        "struct" => structure::structure(session, &def, false),
        "enum" => enumeration::enumeration(session, &def),
        "var" => variable::global(session, &def),
        other => {
            let loc = session.loc(def.node);
            Err(session.error_with(
                ErrorCode::UnexpectedElement,
                loc,
                &["fn, macro, struct, enum or var", "def", other],
            ))
        }
    }
}

/// `def` in a procedure body.
pub(crate) fn body(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    let def = definition(session, call)?;
    match def.kind {
        "var" => variable::local(session, ctx, call, &def),
        "struct" => {
            structure::structure(session, &def, true)?;
            Ok(ParseResult::void(call.block))
        }
        _ => Err(session.error(ErrorCode::OnlyVarPermitted, call.loc)),
    }
}
