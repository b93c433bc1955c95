//! Code-generation interface.
//!
//! The forms layer never builds machine code itself. It drives a
//! [`CodeSink`] with backend-neutral [`Instruction`]s whose operands are
//! opaque [`ValueHandle`]s and [`BlockId`]s handed out by the sink.
//! [`RecordingSink`] keeps everything in memory for tests and tools.

use dale_ir::{BlockId, ValueHandle};
use dale_scope::Linkage;
use dale_types::Idx;

/// A compile-time constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Bool(bool),
    Char(u8),
    Int { ty: Idx, value: i128 },
    Float { ty: Idx, value: f64 },
    /// NUL-terminated string data; the value is a `(p (const char))`.
    Str(String),
    /// Null pointer of a pointer type.
    Null { ty: Idx },
}

/// One backend-neutral instruction.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Const(Constant),
    /// Stack slot for a value of `ty`; yields a pointer.
    Alloca { ty: Idx },
    Load { ptr: ValueHandle, ty: Idx },
    Store { ptr: ValueHandle, value: ValueHandle },
    Call {
        callee: ValueHandle,
        args: Vec<ValueHandle>,
        ret: Idx,
    },
    Cast { value: ValueHandle, from: Idx, to: Idx },
    /// Pointer to field `index` of the struct `base` points to.
    FieldPtr { base: ValueHandle, ty: Idx, index: u32 },
    /// Pointer to element `index` of the sequence `base` points to.
    ElementPtr {
        base: ValueHandle,
        elem: Idx,
        index: ValueHandle,
    },
    Branch { target: BlockId },
    CondBranch {
        cond: ValueHandle,
        then_block: BlockId,
        else_block: BlockId,
    },
    Phi {
        ty: Idx,
        incoming: Vec<(ValueHandle, BlockId)>,
    },
    Return { value: Option<ValueHandle> },
}

impl Instruction {
    /// Whether the instruction ends its block.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Branch { .. } | Instruction::CondBranch { .. } | Instruction::Return { .. }
        )
    }
}

/// Entry block and parameter values of a function body.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionStart {
    pub entry: BlockId,
    pub params: Vec<ValueHandle>,
}

/// Receiver of generated code.
pub trait CodeSink {
    fn declare_function(&mut self, name: &str, ty: Idx, linkage: Linkage) -> ValueHandle;

    fn declare_global(
        &mut self,
        name: &str,
        ty: Idx,
        linkage: Linkage,
        init: Option<Constant>,
    ) -> ValueHandle;

    /// Start emitting the body of a declared function.
    fn begin_function(&mut self, function: ValueHandle, params: &[Idx]) -> FunctionStart;

    fn new_block(&mut self) -> BlockId;

    /// Append an instruction to `block`, returning the value it defines.
    fn emit(&mut self, block: BlockId, inst: Instruction) -> ValueHandle;

    fn end_function(&mut self, function: ValueHandle);
}

impl<S: CodeSink + ?Sized> CodeSink for &mut S {
    fn declare_function(&mut self, name: &str, ty: Idx, linkage: Linkage) -> ValueHandle {
        (**self).declare_function(name, ty, linkage)
    }

    fn declare_global(
        &mut self,
        name: &str,
        ty: Idx,
        linkage: Linkage,
        init: Option<Constant>,
    ) -> ValueHandle {
        (**self).declare_global(name, ty, linkage, init)
    }

    fn begin_function(&mut self, function: ValueHandle, params: &[Idx]) -> FunctionStart {
        (**self).begin_function(function, params)
    }

    fn new_block(&mut self) -> BlockId {
        (**self).new_block()
    }

    fn emit(&mut self, block: BlockId, inst: Instruction) -> ValueHandle {
        (**self).emit(block, inst)
    }

    fn end_function(&mut self, function: ValueHandle) {
        (**self).end_function(function);
    }
}

/// A declared function or global, as recorded by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub value: ValueHandle,
    pub ty: Idx,
    pub linkage: Linkage,
    pub init: Option<Constant>,
    /// Whether a body was emitted (functions only).
    pub defined: bool,
}

/// In-memory sink recording every declaration and instruction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSink {
    functions: Vec<Symbol>,
    globals: Vec<Symbol>,
    /// Instructions per block, in emission order.
    blocks: Vec<Vec<(ValueHandle, Instruction)>>,
    next_value: u32,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_value(&mut self) -> ValueHandle {
        let value = ValueHandle::new(self.next_value);
        self.next_value += 1;
        value
    }

    pub fn functions(&self) -> &[Symbol] {
        &self.functions
    }

    pub fn globals(&self) -> &[Symbol] {
        &self.globals
    }

    pub fn function(&self, name: &str) -> Option<&Symbol> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn global(&self, name: &str) -> Option<&Symbol> {
        self.globals.iter().find(|g| g.name == name)
    }

    /// Instructions of one block.
    pub fn block(&self, block: BlockId) -> &[(ValueHandle, Instruction)] {
        self.blocks
            .get(block.raw() as usize)
            .map_or(&[], Vec::as_slice)
    }

    /// Every instruction, block by block.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flatten().map(|(_, inst)| inst)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

impl CodeSink for RecordingSink {
    fn declare_function(&mut self, name: &str, ty: Idx, linkage: Linkage) -> ValueHandle {
        let value = self.fresh_value();
        self.functions.push(Symbol {
            name: name.to_owned(),
            value,
            ty,
            linkage,
            init: None,
            defined: false,
        });
        value
    }

    fn declare_global(
        &mut self,
        name: &str,
        ty: Idx,
        linkage: Linkage,
        init: Option<Constant>,
    ) -> ValueHandle {
        let value = self.fresh_value();
        self.globals.push(Symbol {
            name: name.to_owned(),
            value,
            ty,
            linkage,
            init,
            defined: true,
        });
        value
    }

    fn begin_function(&mut self, function: ValueHandle, params: &[Idx]) -> FunctionStart {
        if let Some(symbol) = self.functions.iter_mut().find(|f| f.value == function) {
            symbol.defined = true;
        }
        let entry = self.new_block();
        let params = params.iter().map(|_| self.fresh_value()).collect();
        FunctionStart { entry, params }
    }

    fn new_block(&mut self) -> BlockId {
        let id = BlockId::new(u32::try_from(self.blocks.len()).unwrap_or(u32::MAX));
        self.blocks.push(Vec::new());
        id
    }

    fn emit(&mut self, block: BlockId, inst: Instruction) -> ValueHandle {
        let value = self.fresh_value();
        if let Some(insts) = self.blocks.get_mut(block.raw() as usize) {
            insts.push((value, inst));
        }
        value
    }

    fn end_function(&mut self, _function: ValueHandle) {}
}

/// Sink that throws everything away. Used to type-check an expression
/// without emitting it.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiscardSink {
    next: u32,
}

impl CodeSink for DiscardSink {
    fn declare_function(&mut self, _name: &str, _ty: Idx, _linkage: Linkage) -> ValueHandle {
        self.emit(BlockId::GLOBAL, Instruction::Return { value: None })
    }

    fn declare_global(
        &mut self,
        _name: &str,
        _ty: Idx,
        _linkage: Linkage,
        _init: Option<Constant>,
    ) -> ValueHandle {
        self.emit(BlockId::GLOBAL, Instruction::Return { value: None })
    }

    fn begin_function(&mut self, _function: ValueHandle, params: &[Idx]) -> FunctionStart {
        FunctionStart {
            entry: self.new_block(),
            params: params.iter().map(|_| ValueHandle::NONE).collect(),
        }
    }

    fn new_block(&mut self) -> BlockId {
        self.next = self.next.wrapping_add(1);
        BlockId::new(self.next)
    }

    fn emit(&mut self, _block: BlockId, _inst: Instruction) -> ValueHandle {
        self.next = self.next.wrapping_add(1);
        ValueHandle::new(self.next)
    }

    fn end_function(&mut self, _function: ValueHandle) {}
}
