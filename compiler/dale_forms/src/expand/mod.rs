//! Macro bodies and expansion.
//!
//! # Design
//!
//! A macro receives its argument nodes unevaluated and returns one node
//! (or nothing), which the caller re-dispatches as if it had been written at
//! the call site. Nodes are never mutated: template instantiation allocates
//! fresh nodes carrying the call site's location.
//!
//! Two kinds of body:
//! - [`TemplateMacro`]: defined in source with `(def name (macro ...))`;
//!   parameter atoms in the body are replaced by the argument nodes and a
//!   `rest` list element splices the variadic surplus
//! - [`NativeMacro`]: supplied by the embedder, building its result through
//!   a [`MacroContext`]
//!
//! Expansion depth is bounded by the session, not here.

use dale_ir::{Loc, Name, NodeArena, NodeId, NodeKind, StringInterner};
use dale_scope::MacroId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Atom that splices the variadic surplus of a template macro.
pub const REST: &str = "rest";

/// Node-building access for native macros.
pub struct MacroContext<'s> {
    arena: &'s mut NodeArena,
    interner: &'s StringInterner,
    loc: Loc,
}

impl<'s> MacroContext<'s> {
    pub fn new(arena: &'s mut NodeArena, interner: &'s StringInterner, loc: Loc) -> Self {
        MacroContext {
            arena,
            interner,
            loc,
        }
    }

    /// Location of the call being expanded.
    pub fn loc(&self) -> Loc {
        self.loc
    }

    /// Text of an atom node.
    pub fn text(&self, node: NodeId) -> Option<&'static str> {
        self.arena.atom(node).map(|name| self.interner.lookup(name))
    }

    /// Children of a list node (empty for atoms).
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.arena.children(node)
    }

    pub fn is_list(&self, node: NodeId) -> bool {
        self.arena.is_list(node)
    }

    /// New atom at the call site.
    pub fn atom(&mut self, text: &str) -> NodeId {
        let name = self.interner.intern(text);
        self.arena.alloc_atom(name, self.loc)
    }

    /// New list at the call site.
    pub fn list(&mut self, items: &[NodeId]) -> NodeId {
        self.arena.alloc_list(items, self.loc)
    }

    /// Copy of `node` relocated to the call site.
    pub fn relocate(&mut self, node: NodeId) -> NodeId {
        self.arena.copy_with_loc(node, self.loc)
    }
}

/// A macro implemented by the embedding application.
///
/// Returning `None` reports `GotNullPointerFromMacroCall`.
pub trait NativeMacro {
    fn expand(&self, cx: &mut MacroContext<'_>, args: &[NodeId]) -> Option<NodeId>;
}

impl<F> NativeMacro for F
where
    F: Fn(&mut MacroContext<'_>, &[NodeId]) -> Option<NodeId>,
{
    fn expand(&self, cx: &mut MacroContext<'_>, args: &[NodeId]) -> Option<NodeId> {
        self(cx, args)
    }
}

/// A macro defined in source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TemplateMacro {
    pub params: Vec<Name>,
    /// Surplus arguments are spliced at `rest`.
    pub variadic: bool,
    /// `None` for an empty body.
    pub body: Option<NodeId>,
}

impl TemplateMacro {
    /// Instantiate the body for one call.
    pub fn instantiate(
        &self,
        arena: &mut NodeArena,
        interner: &StringInterner,
        args: &[NodeId],
        loc: Loc,
    ) -> Option<NodeId> {
        let body = self.body?;
        let fixed = self.params.len().min(args.len());
        let bindings: FxHashMap<Name, NodeId> = self
            .params
            .iter()
            .copied()
            .zip(args[..fixed].iter().copied())
            .collect();
        let rest: &[NodeId] = if self.variadic { &args[fixed..] } else { &[] };
        let rest_name = self.variadic.then(|| interner.intern(REST));
        let mut subst = Substitution {
            bindings: &bindings,
            rest,
            rest_name,
            loc,
        };
        Some(subst.node(arena, body))
    }
}

struct Substitution<'b> {
    bindings: &'b FxHashMap<Name, NodeId>,
    rest: &'b [NodeId],
    rest_name: Option<Name>,
    loc: Loc,
}

impl Substitution<'_> {
    fn node(&mut self, arena: &mut NodeArena, node: NodeId) -> NodeId {
        dale_stack::ensure_sufficient_stack(|| match arena.try_kind(node) {
            Some(NodeKind::Atom(name)) => match self.bindings.get(&name) {
                Some(&arg) => arena.copy_with_loc(arg, self.loc),
                None => arena.alloc_atom(name, self.loc),
            },
            Some(NodeKind::List(_)) => {
                let children: SmallVec<[NodeId; 8]> =
                    arena.children(node).iter().copied().collect();
                let mut items: SmallVec<[NodeId; 8]> = SmallVec::new();
                for child in children {
                    if self.rest_name.is_some() && arena.atom(child) == self.rest_name {
                        for &arg in self.rest {
                            items.push(arena.copy_with_loc(arg, self.loc));
                        }
                    } else {
                        items.push(self.node(arena, child));
                    }
                }
                arena.alloc_list(&items, self.loc)
            }
            None => node,
        })
    }
}

/// Body of a registered macro.
pub enum MacroBody {
    Template(TemplateMacro),
    Native(Box<dyn NativeMacro>),
}

impl std::fmt::Debug for MacroBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MacroBody::Template(t) => f.debug_tuple("Template").field(t).finish(),
            MacroBody::Native(_) => f.write_str("Native(..)"),
        }
    }
}

/// Every macro body of a session, addressed by [`MacroId`].
#[derive(Debug, Default)]
pub struct MacroTable {
    bodies: Vec<MacroBody>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, body: MacroBody) -> MacroId {
        let id = MacroId::new(u32::try_from(self.bodies.len()).unwrap_or(u32::MAX));
        self.bodies.push(body);
        id
    }

    pub fn get(&self, id: MacroId) -> Option<&MacroBody> {
        self.bodies.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Why a macro result cannot be used.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InvalidExpansion {
    /// The macro produced no node.
    Null,
    /// A node id outside the arena.
    NotANode,
    /// An atom with empty text.
    EmptyAtom,
}

/// Run a macro body on its argument nodes.
pub fn expand(
    body: &MacroBody,
    arena: &mut NodeArena,
    interner: &StringInterner,
    args: &[NodeId],
    loc: Loc,
) -> Result<NodeId, InvalidExpansion> {
    let node = match body {
        MacroBody::Template(template) => template.instantiate(arena, interner, args, loc),
        MacroBody::Native(native) => {
            let mut cx = MacroContext::new(arena, interner, loc);
            native.expand(&mut cx, args)
        }
    };
    let node = node.ok_or(InvalidExpansion::Null)?;
    validate(arena, node)?;
    Ok(node)
}

/// Check that a returned node and everything below it is well formed.
pub fn validate(arena: &NodeArena, node: NodeId) -> Result<(), InvalidExpansion> {
    dale_stack::ensure_sufficient_stack(|| match arena.try_kind(node) {
        None => Err(InvalidExpansion::NotANode),
        Some(NodeKind::Atom(name)) if name.is_empty() => Err(InvalidExpansion::EmptyAtom),
        Some(NodeKind::Atom(_)) => Ok(()),
        Some(NodeKind::List(_)) => arena
            .children(node)
            .iter()
            .try_for_each(|&child| validate(arena, child)),
    })
}

#[cfg(test)]
mod tests;
