//! Head symbol → special-form handler table.
//!
//! Core forms are plain function pointers keyed by their head symbol, one
//! table for top-level forms and one for procedure-body forms. Handlers
//! share one contract: validate shape (arity, atom/list positions), then
//! semantics, then emit, reporting every failure through the session.

use bitflags::bitflags;
use dale_diagnostic::ErrorGuaranteed;
use dale_ir::{BlockId, Loc, Name, NodeId};
use dale_types::Idx;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::{forms, FunctionContext, ParseResult, Session};

bitflags! {
    /// How a form is being evaluated.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FormFlags: u8 {
        /// Produce the address of the result rather than its value.
        const GET_ADDRESS = 1 << 0;
        /// Written as `(core form ...)`: overrides and macros are bypassed.
        const CORE = 1 << 1;
    }
}

/// One invocation of a special form.
#[derive(Clone, Debug)]
pub struct FormCall {
    pub node: NodeId,
    pub head: Name,
    /// Elements after the head.
    pub args: SmallVec<[NodeId; 4]>,
    pub loc: Loc,
    pub block: BlockId,
    pub flags: FormFlags,
    /// Type the surrounding form expects, used to type literals.
    pub hint: Option<Idx>,
}

impl FormCall {
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// Handler of a procedure-body form.
pub type FormHandler =
    fn(&mut Session<'_>, &mut FunctionContext, &FormCall) -> Result<ParseResult, ErrorGuaranteed>;

/// Handler of a top-level form.
pub type TopLevelHandler = fn(&mut Session<'_>, &FormCall) -> Result<(), ErrorGuaranteed>;

/// Special forms by head symbol.
#[derive(Clone, Default)]
pub struct FormRegistry {
    top_level: FxHashMap<&'static str, TopLevelHandler>,
    body: FxHashMap<&'static str, FormHandler>,
}

impl FormRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every core form.
    pub fn with_core_forms() -> Self {
        let mut registry = Self::new();
        forms::register_core_forms(&mut registry);
        registry
    }

    pub fn register_top_level(&mut self, head: &'static str, handler: TopLevelHandler) {
        self.top_level.insert(head, handler);
    }

    pub fn register_body(&mut self, head: &'static str, handler: FormHandler) {
        self.body.insert(head, handler);
    }

    pub fn top_level(&self, head: &str) -> Option<TopLevelHandler> {
        self.top_level.get(head).copied()
    }

    pub fn body(&self, head: &str) -> Option<FormHandler> {
        self.body.get(head).copied()
    }

    /// Whether `name` is the head of any core form.
    pub fn is_core_form(&self, name: &str) -> bool {
        name == "core" || self.top_level.contains_key(name) || self.body.contains_key(name)
    }

    /// Heads of every registered form, sorted.
    pub fn heads(&self) -> Vec<&'static str> {
        let mut heads: Vec<&'static str> = self
            .top_level
            .keys()
            .chain(self.body.keys())
            .copied()
            .collect();
        heads.sort_unstable();
        heads.dedup();
        heads
    }
}

impl std::fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRegistry")
            .field("heads", &self.heads())
            .finish()
    }
}

#[cfg(test)]
mod tests;
