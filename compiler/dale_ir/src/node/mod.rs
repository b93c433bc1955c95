//! Symbolic-expression node arena.
//!
//! A node is either an atom (interned text) or a list of child nodes. All
//! nodes live in a [`NodeArena`]; lists store their children as a
//! contiguous [`NodeRange`] into a shared child buffer, so the tree holds
//! no `Box` and no back-pointers.
//!
//! # Design
//!
//! Nodes are immutable once allocated. Macro expansion and call rewriting
//! allocate fresh nodes; this keeps every `NodeId` handed out earlier valid
//! for the lifetime of the arena.

use std::fmt;

use crate::{Loc, Name, StringInterner};

/// Index of a node in a [`NodeArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

/// Contiguous slice of the arena's child buffer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct NodeRange {
    pub start: u32,
    pub len: u32,
}

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, len: 0 };

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.len as usize
    }
}

/// What a node is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    /// Atom token: identifier, number, string or character literal.
    Atom(Name),
    /// Parenthesised list.
    List(NodeRange),
}

/// Arena owning every node of a compile session.
#[derive(Default, Debug)]
pub struct NodeArena {
    kinds: Vec<NodeKind>,
    locs: Vec<Loc>,
    /// Node each node was copied from; itself for nodes that are not copies.
    origins: Vec<NodeId>,
    children: Vec<NodeId>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> NodeId {
        let index = u32::try_from(self.kinds.len()).unwrap_or(u32::MAX - 1);
        NodeId::new(index)
    }

    /// Allocate an atom node.
    pub fn alloc_atom(&mut self, text: Name, loc: Loc) -> NodeId {
        let id = self.next_id();
        self.kinds.push(NodeKind::Atom(text));
        self.locs.push(loc);
        self.origins.push(id);
        id
    }

    /// Allocate a list node with the given children.
    pub fn alloc_list(&mut self, items: &[NodeId], loc: Loc) -> NodeId {
        let start = u32::try_from(self.children.len()).unwrap_or(u32::MAX);
        let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
        self.children.extend_from_slice(items);
        let id = self.next_id();
        self.kinds.push(NodeKind::List(NodeRange { start, len }));
        self.locs.push(loc);
        self.origins.push(id);
        id
    }

    /// Number of nodes allocated.
    #[inline]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Whether `id` refers to a node in this arena.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.kinds.len()
    }

    /// Kind of a node, or `None` if `id` is not a node of this arena.
    #[inline]
    pub fn try_kind(&self, id: NodeId) -> Option<NodeKind> {
        self.kinds.get(id.index()).copied()
    }

    /// Location of a node; `Loc::DUMMY` for foreign ids.
    #[inline]
    pub fn loc(&self, id: NodeId) -> Loc {
        self.locs.get(id.index()).copied().unwrap_or(Loc::DUMMY)
    }

    /// Atom text, if the node is an atom.
    #[inline]
    pub fn atom(&self, id: NodeId) -> Option<Name> {
        match self.try_kind(id)? {
            NodeKind::Atom(name) => Some(name),
            NodeKind::List(_) => None,
        }
    }

    /// Whether the node is a list.
    #[inline]
    pub fn is_list(&self, id: NodeId) -> bool {
        matches!(self.try_kind(id), Some(NodeKind::List(_)))
    }

    /// Children of a list node; empty for atoms and foreign ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.try_kind(id) {
            Some(NodeKind::List(range)) => {
                let start = range.start as usize;
                &self.children[start..start + range.len()]
            }
            _ => &[],
        }
    }

    /// Children of a list node, or `None` if the node is an atom.
    pub fn list(&self, id: NodeId) -> Option<&[NodeId]> {
        if self.is_list(id) {
            Some(self.children(id))
        } else {
            None
        }
    }

    /// Head symbol of a list whose first element is an atom.
    pub fn head(&self, id: NodeId) -> Option<Name> {
        self.children(id).first().and_then(|&h| self.atom(h))
    }

    /// Structurally copy a subtree, stamping every copied node with `loc`.
    ///
    /// Used by macro expansion so that expanded code reports the call site.
    /// Copies remember their [`origin`](Self::origin).
    pub fn copy_with_loc(&mut self, id: NodeId, loc: Loc) -> NodeId {
        let copy = match self.try_kind(id) {
            Some(NodeKind::Atom(name)) => self.alloc_atom(name, loc),
            Some(NodeKind::List(_)) => {
                let items: Vec<NodeId> = self.children(id).to_vec();
                let copied: Vec<NodeId> = items
                    .into_iter()
                    .map(|child| self.copy_with_loc(child, loc))
                    .collect();
                self.alloc_list(&copied, loc)
            }
            None => return id,
        };
        self.origins[copy.index()] = self.origin(id);
        copy
    }

    /// The node `id` was ultimately copied from, or `id` itself.
    #[inline]
    pub fn origin(&self, id: NodeId) -> NodeId {
        self.origins.get(id.index()).copied().unwrap_or(id)
    }

    /// Structural equality of two subtrees (ignores locations).
    pub fn same_shape(&self, a: NodeId, b: NodeId) -> bool {
        match (self.try_kind(a), self.try_kind(b)) {
            (Some(NodeKind::Atom(x)), Some(NodeKind::Atom(y))) => x == y,
            (Some(NodeKind::List(_)), Some(NodeKind::List(_))) => {
                let (xs, ys) = (self.children(a), self.children(b));
                xs.len() == ys.len() && xs.iter().zip(ys).all(|(&x, &y)| self.same_shape(x, y))
            }
            _ => false,
        }
    }

    /// Render a node as source text.
    pub fn display<'a>(&'a self, id: NodeId, interner: &'a StringInterner) -> NodeDisplay<'a> {
        NodeDisplay {
            arena: self,
            interner,
            id,
        }
    }
}

/// Display adapter that prints a node as an s-expression.
pub struct NodeDisplay<'a> {
    arena: &'a NodeArena,
    interner: &'a StringInterner,
    id: NodeId,
}

impl fmt::Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.arena.try_kind(self.id) {
            Some(NodeKind::Atom(name)) => f.write_str(self.interner.lookup(name)),
            Some(NodeKind::List(_)) => {
                f.write_str("(")?;
                for (i, &child) in self.arena.children(self.id).iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", self.arena.display(child, self.interner))?;
                }
                f.write_str(")")
            }
            None => f.write_str("<invalid>"),
        }
    }
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{NodeId, NodeKind};
    crate::static_assert_size!(NodeId, 4);
    crate::static_assert_size!(NodeKind, 12);
}
