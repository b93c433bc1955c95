//! Per-function state threaded through procedure-body forms.

use dale_ir::{BlockId, Loc, Name, ValueHandle};
use dale_scope::Label;
use dale_types::Idx;
use rustc_hash::FxHashMap;

use crate::sink::CodeSink;

/// A `goto` whose target is checked when the function ends.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PendingGoto {
    pub label: Name,
    /// Variables visible at the `goto`.
    pub declarations: u32,
    pub loc: Loc,
}

/// State of the function whose body is being processed.
#[derive(Clone, Debug)]
pub struct FunctionContext {
    pub function: ValueHandle,
    pub ret: Idx,
    pub(crate) gotos: Vec<PendingGoto>,
    /// Labels defined anywhere in the body.
    pub(crate) labels: FxHashMap<Name, Label>,
    /// Blocks reserved for labels, possibly before the label is defined.
    pub(crate) label_blocks: FxHashMap<Name, BlockId>,
}

impl FunctionContext {
    pub fn new(function: ValueHandle, ret: Idx) -> Self {
        FunctionContext {
            function,
            ret,
            gotos: Vec::new(),
            labels: FxHashMap::default(),
            label_blocks: FxHashMap::default(),
        }
    }

    /// Block a label jumps to, allocated on first mention.
    pub(crate) fn label_block(&mut self, name: Name, sink: &mut dyn CodeSink) -> BlockId {
        *self
            .label_blocks
            .entry(name)
            .or_insert_with(|| sink.new_block())
    }

    pub fn label(&self, name: Name) -> Option<&Label> {
        self.labels.get(&name)
    }

    pub fn pending_gotos(&self) -> &[PendingGoto] {
        &self.gotos
    }
}
