//! Compile session: the owner of all per-unit state.
//!
//! # Design
//!
//! A session is created per translation unit, fed one top-level form at a
//! time, and consumed by [`Session::finish`]. A form that fails leaves its
//! diagnostics in the queue and processing moves on to the next form; only
//! a fatal diagnostic or an exhausted error budget stops the session early.
//! `finish` refuses to hand out output once any error was recorded.

use dale_diagnostic::{
    Diagnostic, DiagnosticConfig, DiagnosticQueue, ErrorCode, ErrorGuaranteed, Severity,
};
use dale_ir::{
    read_forms, BlockId, Loc, Name, NodeArena, NodeId, ReadError, ReadErrorKind, StringInterner,
    ValueHandle,
};
use dale_scope::{
    CallableEntry, CallableFlags, CallableId, CallableKind, CallableTable, Linkage, Param,
    Registered, ResolveError, ScopeError, ScopeManager,
};
use dale_stack::DepthBudget;
use dale_types::{Idx, Pool, TypeError};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::expand::{MacroBody, MacroTable, NativeMacro};
use crate::loader::{ModuleLoader, NoModules};
use crate::sink::{CodeSink, DiscardSink, Instruction};
use crate::type_syntax::{TypeParser, TypeSyntaxError};
use crate::{dispatch, FormRegistry, SessionConfig};

static NO_MODULES: NoModules = NoModules;

/// Why a session stopped or refused to produce output.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("aborting after {errors} errors: error limit reached")]
    ErrorLimit { errors: usize },
    #[error("internal compiler fault: {code}")]
    InternalFault { code: ErrorCode },
    #[error("refusing to emit output: {errors} error(s) reported")]
    EmissionRefused {
        errors: usize,
        diagnostics: Vec<Diagnostic>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Abort {
    Limit,
    Fault(ErrorCode),
}

/// Result of a successful session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    /// Warnings and notes, in report order.
    pub diagnostics: Vec<Diagnostic>,
    /// Top-level forms processed.
    pub forms: usize,
}

/// State of one translation unit.
pub struct Session<'a> {
    config: SessionConfig,
    pub(crate) interner: StringInterner,
    pub(crate) arena: NodeArena,
    pub(crate) pool: Pool,
    pub(crate) scope: ScopeManager,
    pub(crate) callables: CallableTable,
    pub(crate) macros: MacroTable,
    pub(crate) diagnostics: DiagnosticQueue,
    pub(crate) registry: FormRegistry,
    /// Open files, innermost last.
    pub(crate) files: Vec<Name>,
    pub(crate) once_tags: FxHashSet<Name>,
    /// Set by `(once tag)` on a repeated tag: the rest of the file is skipped.
    pub(crate) skip_file: bool,
    /// Imported modules and the names each provided.
    pub(crate) modules: FxHashMap<Name, FxHashSet<Name>>,
    /// Modules whose forms are being processed, outermost first.
    pub(crate) importing: Vec<Name>,
    pub(crate) includes: DepthBudget,
    pub(crate) expansion: DepthBudget,
    /// Speculative argument types of the current function, by origin node.
    pub(crate) speculated: FxHashMap<NodeId, Option<Idx>>,
    /// Structs defined in procedure bodies so far; numbers their keys.
    pub(crate) local_structs: u32,
    pub(crate) sink: Box<dyn CodeSink + 'a>,
    pub(crate) loader: &'a dyn ModuleLoader,
    abort: Option<Abort>,
    forms: usize,
}

impl<'a> Session<'a> {
    pub fn new(config: SessionConfig, sink: impl CodeSink + 'a) -> Self {
        tracing::debug!(?config, "new session");
        Session {
            diagnostics: DiagnosticQueue::with_config(config.diagnostic_config()),
            expansion: DepthBudget::new(config.max_expansion_depth),
            includes: DepthBudget::new(config.max_include_depth),
            config,
            interner: StringInterner::new(),
            arena: NodeArena::new(),
            pool: Pool::new(),
            scope: ScopeManager::new(),
            callables: CallableTable::new(),
            macros: MacroTable::new(),
            registry: FormRegistry::with_core_forms(),
            files: Vec::new(),
            once_tags: FxHashSet::default(),
            skip_file: false,
            modules: FxHashMap::default(),
            importing: Vec::new(),
            speculated: FxHashMap::default(),
            local_structs: 0,
            sink: Box::new(sink),
            loader: &NO_MODULES,
            abort: None,
            forms: 0,
        }
    }

    /// Use `loader` for `import` and `include`.
    #[must_use]
    pub fn with_loader(mut self, loader: &'a dyn ModuleLoader) -> Self {
        self.loader = loader;
        self
    }

    // === Accessors ===

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn scope(&self) -> &ScopeManager {
        &self.scope
    }

    pub fn callables(&self) -> &CallableTable {
        &self.callables
    }

    pub fn diagnostics(&self) -> &DiagnosticQueue {
        &self.diagnostics
    }

    pub fn registry_mut(&mut self) -> &mut FormRegistry {
        &mut self.registry
    }

    // === Driving ===

    /// Read `source` into nodes, reporting reader failures.
    pub fn read(&mut self, file: &str, source: &str) -> Result<Vec<NodeId>, ErrorGuaranteed> {
        let file = self.interner.intern(file);
        read_forms(source, file, &self.interner, &mut self.arena)
            .map_err(|err| self.emit(read_error_diagnostic(&err)))
    }

    /// Read and process every form of a source file.
    #[tracing::instrument(level = "debug", skip(self, source))]
    pub fn process_source(&mut self, file: &str, source: &str) -> Result<(), SessionError> {
        let Ok(forms) = self.read(file, source) else {
            return self.check_abort();
        };
        let name = self.interner.intern(file);
        self.files.push(name);
        let result = self.process_forms(&forms);
        self.files.pop();
        self.skip_file = false;
        result
    }

    /// Process forms in order until one aborts the session or a `once`
    /// skips the rest of the file.
    pub(crate) fn process_forms(&mut self, forms: &[NodeId]) -> Result<(), SessionError> {
        for &form in forms {
            if self.skip_file {
                break;
            }
            self.process_form(form)?;
        }
        Ok(())
    }

    /// Process one top-level form.
    ///
    /// A failing form is not an error here: its diagnostics are queued and
    /// the caller moves on. `Err` means the session has stopped.
    #[tracing::instrument(level = "debug", skip(self), fields(line = self.arena.loc(node).line))]
    pub fn process_form(&mut self, node: NodeId) -> Result<(), SessionError> {
        if let Some(abort) = self.abort {
            return Err(self.abort_error(abort));
        }
        self.forms += 1;
        if dispatch::top_level(self, node).is_err() {
            tracing::debug!(errors = self.diagnostics.error_count(), "form failed");
        }
        self.check_abort()
    }

    fn check_abort(&mut self) -> Result<(), SessionError> {
        if self.abort.is_none() {
            if self.diagnostics.has_fatal() {
                let code = self
                    .diagnostics
                    .peek()
                    .find(|d| d.severity == Severity::Fatal)
                    .map_or(ErrorCode::NodeIsNeitherTokenNorList, |d| d.code);
                self.abort = Some(Abort::Fault(code));
            } else if self.diagnostics.limit_reached() {
                self.diagnostics
                    .add(dale_diagnostic::queue::too_many_errors(self.config.error_limit));
                self.abort = Some(Abort::Limit);
            }
        }
        match self.abort {
            Some(abort) => Err(self.abort_error(abort)),
            None => Ok(()),
        }
    }

    fn abort_error(&self, abort: Abort) -> SessionError {
        match abort {
            Abort::Limit => SessionError::ErrorLimit {
                errors: self.diagnostics.error_count(),
            },
            Abort::Fault(code) => SessionError::InternalFault { code },
        }
    }

    /// End the session.
    pub fn finish(mut self) -> Result<Output, SessionError> {
        let errors = self.diagnostics.error_count();
        let diagnostics = self.diagnostics.flush();
        if errors > 0 {
            tracing::debug!(errors, "emission refused");
            return Err(SessionError::EmissionRefused {
                errors,
                diagnostics,
            });
        }
        Ok(Output {
            diagnostics,
            forms: self.forms,
        })
    }

    /// Register a macro implemented in Rust.
    pub fn register_native_macro(
        &mut self,
        name: &str,
        params: Vec<Param>,
        variadic: bool,
        body: Box<dyn NativeMacro>,
    ) -> Result<CallableId, ErrorGuaranteed> {
        if self.registry.is_core_form(name) {
            return Err(self.error(ErrorCode::NoCoreFormNameInMacro, Loc::DUMMY));
        }
        let id = self.macros.insert(MacroBody::Native(body));
        let entry = CallableEntry {
            name: self.interner.intern(name),
            kind: CallableKind::Macro { id },
            params,
            variadic,
            linkage: Linkage::Extern,
            flags: CallableFlags::NATIVE_MACRO,
            loc: Loc::DUMMY,
            value: ValueHandle::NONE,
        };
        self.add_callable(entry, Loc::DUMMY).map(Registered::id)
    }

    // === Reporting ===

    pub(crate) fn emit(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        tracing::trace!(code = %diag.code, "diagnostic");
        self.diagnostics.emit_error(diag)
    }

    pub(crate) fn warn(&mut self, diag: Diagnostic) {
        self.diagnostics.warn(diag);
    }

    /// Report an error whose template takes no arguments.
    pub(crate) fn error(&mut self, code: ErrorCode, loc: Loc) -> ErrorGuaranteed {
        self.emit(Diagnostic::error(code).at(loc))
    }

    /// Report an error with positional template arguments.
    pub(crate) fn error_with(&mut self, code: ErrorCode, loc: Loc, args: &[&str]) -> ErrorGuaranteed {
        self.emit(Diagnostic::error(code).at(loc).with_args(args.iter().copied()))
    }

    /// Report an internal fault; the session stops after the current form.
    pub(crate) fn fatal(&mut self, code: ErrorCode, loc: Loc, args: &[&str]) -> ErrorGuaranteed {
        self.emit(Diagnostic::fatal(code).at(loc).with_args(args.iter().copied()))
    }

    pub(crate) fn type_error(&mut self, err: TypeError, loc: Loc) -> ErrorGuaranteed {
        let diag = err.into_diagnostic(loc, &self.pool, &self.interner);
        self.emit(diag)
    }

    pub(crate) fn scope_error(&mut self, err: ScopeError, loc: Loc) -> ErrorGuaranteed {
        let diag = err.into_diagnostic(loc, &self.interner);
        self.emit(diag)
    }

    pub(crate) fn resolve_error(&mut self, err: ResolveError, loc: Loc) -> ErrorGuaranteed {
        let diag = err.into_diagnostic(loc, &self.callables, &self.pool, &self.interner);
        self.emit(diag)
    }

    pub(crate) fn fmt_type(&self, ty: Idx) -> String {
        self.pool.format_type(ty, &self.interner)
    }

    // === Nodes and types ===

    /// Text of an atom node.
    pub(crate) fn text(&self, node: NodeId) -> Option<&'static str> {
        self.arena.atom(node).map(|name| self.interner.lookup(name))
    }

    pub(crate) fn loc(&self, node: NodeId) -> Loc {
        self.arena.loc(node)
    }

    fn type_parser(&mut self) -> TypeParser<'_> {
        TypeParser {
            pool: &mut self.pool,
            scope: &self.scope,
            interner: &self.interner,
            arena: &self.arena,
        }
    }

    pub(crate) fn parse_type(&mut self, node: NodeId) -> Result<Idx, ErrorGuaranteed> {
        let parsed = self.type_parser().parse(node);
        parsed.map_err(|err| self.syntax_error(err))
    }

    /// Parse a type, reporting whether it was written `(const T)`.
    pub(crate) fn parse_type_qualified(&mut self, node: NodeId) -> Result<(Idx, bool), ErrorGuaranteed> {
        let parsed = self.type_parser().parse_qualified(node);
        parsed.map_err(|err| self.syntax_error(err))
    }

    fn syntax_error(&mut self, err: TypeSyntaxError) -> ErrorGuaranteed {
        let diag = err.into_diagnostic(&self.interner);
        self.emit(diag)
    }

    // === Scope ===

    /// Register a callable, reporting clashes at `loc`.
    pub(crate) fn add_callable(
        &mut self,
        entry: CallableEntry,
        loc: Loc,
    ) -> Result<Registered, ErrorGuaranteed> {
        let name = entry.name;
        let registered = self.scope.add_callable(&mut self.callables, entry);
        match registered {
            Ok(registered) => {
                tracing::trace!(name = self.interner.lookup(name), ?registered, "callable");
                Ok(registered)
            }
            Err(err) => Err(self.scope_error(err, loc)),
        }
    }

    // === Emission ===

    pub(crate) fn emit_inst(&mut self, block: BlockId, inst: Instruction) -> ValueHandle {
        self.sink.emit(block, inst)
    }

    pub(crate) fn new_block(&mut self) -> BlockId {
        self.sink.new_block()
    }

    /// Run `f` with emission and diagnostics discarded, inside a scratch
    /// lexical frame. Used to learn the type of an expression without
    /// committing to it.
    pub(crate) fn speculate<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let sink = std::mem::replace(&mut self.sink, Box::new(DiscardSink::default()));
        let diagnostics = std::mem::replace(
            &mut self.diagnostics,
            DiagnosticQueue::with_config(DiagnosticConfig::unlimited()),
        );
        self.scope.push_frame();
        let result = f(self);
        self.scope.pop_frame();
        self.sink = sink;
        self.diagnostics = diagnostics;
        result
    }
}

/// Diagnostic for a reader failure.
pub(crate) fn read_error_diagnostic(err: &ReadError) -> Diagnostic {
    let code = match err.kind {
        ReadErrorKind::UnterminatedStringLiteral => ErrorCode::UnterminatedStringLiteral,
        ReadErrorKind::ExpectedLeftParen => ErrorCode::ExpectedLeftParen,
        ReadErrorKind::MissingRightParen => ErrorCode::MissingRightParen,
        ReadErrorKind::MissingLeftParen => ErrorCode::MissingLeftParen,
        ReadErrorKind::InvalidInteger => ErrorCode::InvalidInteger,
        ReadErrorKind::InvalidFloatingPointNumber => ErrorCode::InvalidFloatingPointNumber,
    };
    Diagnostic::error(code).at(err.loc)
}
