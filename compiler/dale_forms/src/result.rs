//! Outcome of processing one expression form.

use dale_ir::{BlockId, ValueHandle};
use dale_types::Idx;

/// Value, type and position of a processed form.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParseResult {
    pub value: ValueHandle,
    pub ty: Idx,
    /// Block that code following this form continues in.
    pub block: BlockId,
    /// Storage the value was loaded from, for addressable lvalues.
    pub address: Option<ValueHandle>,
    /// Control flow left the block (`return`, `goto`); `value` is meaningless.
    pub terminates: bool,
}

impl ParseResult {
    pub fn new(block: BlockId, ty: Idx, value: ValueHandle) -> Self {
        ParseResult {
            value,
            ty,
            block,
            address: None,
            terminates: false,
        }
    }

    /// A form evaluated for its effect only.
    pub fn void(block: BlockId) -> Self {
        Self::new(block, Idx::VOID, ValueHandle::NONE)
    }

    /// A form after which control does not fall through.
    pub fn terminated(block: BlockId) -> Self {
        ParseResult {
            terminates: true,
            ..Self::void(block)
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: ValueHandle) -> Self {
        self.address = Some(address);
        self
    }
}
