//! Scope and namespace manager.
//!
//! # Design
//!
//! Namespaces form a tree stored in a flat vector (`NamespaceId` indices,
//! root at 0), each owning one [`Frame`]. Function bodies push lexical
//! frames on top; a popped frame is discarded wholesale. Definitions go
//! into the innermost frame: the top lexical frame inside a function, the
//! current namespace's frame at top level.
//!
//! Activation (`using-namespace`) is a separate LIFO stack consulted after
//! the lexical frames and the current namespace chain.

use dale_ir::{Name, StringInterner};
use dale_types::Idx;
use rustc_hash::FxHashMap;

use crate::{
    CallableEntry, CallableFlags, CallableId, CallableTable, Frame, Label, Linkage, ScopeError,
    TypeDeclKind, Variable,
};

/// Index of a namespace in the tree.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct NamespaceId(u32);

impl NamespaceId {
    pub const ROOT: NamespaceId = NamespaceId(0);

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
struct Namespace {
    parent: Option<NamespaceId>,
    children: FxHashMap<Name, NamespaceId>,
    /// Dotted path from the root; empty for the root.
    path: String,
    frame: Frame,
}

/// Outcome of a successful [`ScopeManager::add_callable`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Registered {
    /// A new entry.
    New(CallableId),
    /// A definition completed an earlier declaration with the same signature.
    Completed(CallableId),
    /// A repeated declaration of an existing entry.
    Existing(CallableId),
}

impl Registered {
    pub fn id(self) -> CallableId {
        match self {
            Registered::New(id) | Registered::Completed(id) | Registered::Existing(id) => id,
        }
    }
}

/// Lexical frames over a namespace tree.
#[derive(Clone, Debug)]
pub struct ScopeManager {
    namespaces: Vec<Namespace>,
    current: NamespaceId,
    lexical: Vec<Frame>,
    active: Vec<NamespaceId>,
}

impl ScopeManager {
    pub fn new() -> Self {
        ScopeManager {
            namespaces: vec![Namespace {
                parent: None,
                children: FxHashMap::default(),
                path: String::new(),
                frame: Frame::new(),
            }],
            current: NamespaceId::ROOT,
            lexical: Vec::new(),
            active: Vec::new(),
        }
    }

    // === Lexical frames ===

    pub fn push_frame(&mut self) {
        self.lexical.push(Frame::new());
    }

    /// Discard the innermost lexical frame.
    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.lexical.pop()
    }

    /// Number of open lexical frames; zero at top level.
    pub fn lexical_depth(&self) -> usize {
        self.lexical.len()
    }

    fn innermost(&self) -> &Frame {
        match self.lexical.last() {
            Some(frame) => frame,
            None => &self.namespaces[self.current.index()].frame,
        }
    }

    fn innermost_mut(&mut self) -> &mut Frame {
        match self.lexical.last_mut() {
            Some(frame) => frame,
            None => &mut self.namespaces[self.current.index()].frame,
        }
    }

    // === Namespaces ===

    pub fn current_namespace(&self) -> NamespaceId {
        self.current
    }

    /// Whether definitions currently land in a named namespace.
    pub fn in_namespace(&self) -> bool {
        self.current != NamespaceId::ROOT
    }

    /// Dotted path of a namespace (`""` for the root).
    pub fn namespace_path(&self, id: NamespaceId) -> &str {
        self.namespaces
            .get(id.index())
            .map_or("", |ns| ns.path.as_str())
    }

    /// Fully qualified form of a name defined in the current namespace.
    pub fn qualify(&self, name: &str) -> String {
        let path = self.namespace_path(self.current);
        if path.is_empty() {
            name.to_owned()
        } else {
            format!("{path}.{name}")
        }
    }

    /// Names defined directly in a namespace's frame.
    pub fn namespace_frame(&self, id: NamespaceId) -> Option<&Frame> {
        self.namespaces.get(id.index()).map(|ns| &ns.frame)
    }

    /// Enter the child namespace `name` of the current one, creating it on
    /// first use.
    pub fn enter_namespace(&mut self, name: Name, interner: &StringInterner) -> NamespaceId {
        let parent = self.current;
        let existing = self.namespaces[parent.index()].children.get(&name).copied();
        let id = existing.unwrap_or_else(|| {
            let id = NamespaceId(u32::try_from(self.namespaces.len()).unwrap_or(u32::MAX));
            let parent_path = &self.namespaces[parent.index()].path;
            let short = interner.lookup(name);
            let path = if parent_path.is_empty() {
                short.to_owned()
            } else {
                format!("{parent_path}.{short}")
            };
            self.namespaces.push(Namespace {
                parent: Some(parent),
                children: FxHashMap::default(),
                path,
                frame: Frame::new(),
            });
            self.namespaces[parent.index()].children.insert(name, id);
            id
        });
        tracing::trace!(path = self.namespace_path(id), "enter namespace");
        self.current = id;
        id
    }

    /// Return to the parent namespace. False at the root.
    pub fn leave_namespace(&mut self) -> bool {
        match self.namespaces[self.current.index()].parent {
            Some(parent) => {
                self.current = parent;
                true
            }
            None => false,
        }
    }

    /// Current namespace, then its ancestors up to the root.
    fn namespace_chain(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        std::iter::successors(Some(self.current), |id| self.namespaces[id.index()].parent)
    }

    /// Resolve a dotted namespace path relative to the current namespace
    /// chain (innermost first).
    pub fn find_namespace(&self, path: &str, interner: &StringInterner) -> Option<NamespaceId> {
        let components: Option<Vec<Name>> = path.split('.').map(|c| interner.get(c)).collect();
        let components = components?;
        self.namespace_chain().find_map(|start| {
            components.iter().try_fold(start, |ns, component| {
                self.namespaces[ns.index()].children.get(component).copied()
            })
        })
    }

    /// Push a namespace onto the activation stack.
    pub fn activate_namespace(
        &mut self,
        name: Name,
        interner: &StringInterner,
    ) -> Result<NamespaceId, ScopeError> {
        let id = self
            .find_namespace(interner.lookup(name), interner)
            .ok_or(ScopeError::NamespaceNotInContext(name))?;
        self.active.push(id);
        tracing::trace!(path = self.namespace_path(id), "activate namespace");
        Ok(id)
    }

    /// Pop a namespace from the activation stack; only the most recently
    /// activated namespace may be deactivated.
    pub fn deactivate_namespace(
        &mut self,
        name: Name,
        interner: &StringInterner,
    ) -> Result<(), ScopeError> {
        let id = self
            .find_namespace(interner.lookup(name), interner)
            .filter(|id| self.active.contains(id))
            .ok_or(ScopeError::CannotDeactivateInactiveNamespace(name))?;
        if self.active.last() != Some(&id) {
            return Err(ScopeError::CannotDeactivateNonLastNamespace(name));
        }
        self.active.pop();
        Ok(())
    }

    /// Activated namespaces, oldest first.
    pub fn active_namespaces(&self) -> &[NamespaceId] {
        &self.active
    }

    // === Definitions ===

    /// Define a variable in the innermost frame.
    pub fn define_variable(&mut self, var: Variable) -> Result<(), ScopeError> {
        let frame = self.innermost_mut();
        if frame.vars.contains_key(&var.name) {
            return Err(ScopeError::RedefinitionOfVariable(var.name));
        }
        frame.vars.insert(var.name, var);
        Ok(())
    }

    /// Define a struct or enum name in the innermost frame.
    pub fn define_type(&mut self, name: Name, ty: Idx, kind: TypeDeclKind) -> Result<(), ScopeError> {
        let frame = self.innermost_mut();
        if frame.types.contains_key(&name) {
            return Err(match kind {
                TypeDeclKind::Struct => ScopeError::RedeclarationOfStruct(name),
                TypeDeclKind::Enum => ScopeError::RedeclarationOfEnum(name),
            });
        }
        frame.types.insert(name, ty);
        Ok(())
    }

    /// Replace the type bound to a name in the innermost frame, e.g. when an
    /// opaque struct declaration is followed by its definition.
    pub fn rebind_type(&mut self, name: Name, ty: Idx) {
        self.innermost_mut().types.insert(name, ty);
    }

    /// Define a label in the innermost frame.
    pub fn define_label(&mut self, name: Name, label: Label) -> Result<(), ScopeError> {
        let frame = self.innermost_mut();
        if frame.labels.contains_key(&name) {
            return Err(ScopeError::RedeclarationOfLabel(name));
        }
        frame.labels.insert(name, label);
        Ok(())
    }

    /// Register a function or macro in the innermost frame.
    ///
    /// Rejected when an entry of the same name in that frame:
    /// - mixes `extern-c` and non-`extern-c` function linkage
    /// - is an `extern-c` function with a different signature (C symbols
    ///   cannot be overloaded)
    /// - has an identical signature (function/function, macro/macro, or a
    ///   function/macro clash)
    ///
    /// A body-less declaration followed by a definition with the same
    /// signature and return type completes the declaration.
    pub fn add_callable(
        &mut self,
        table: &mut CallableTable,
        entry: CallableEntry,
    ) -> Result<Registered, ScopeError> {
        let name = entry.name;
        let existing: Vec<CallableId> = self.innermost().callables(name).to_vec();
        let is_c = |e: &CallableEntry| e.linkage == Linkage::ExternC;

        for &id in &existing {
            let Some(other) = table.get(id) else { continue };
            if entry.is_function() && other.is_function() {
                if is_c(&entry) != is_c(other) {
                    return Err(ScopeError::ExternCXorOtherLinkageForName(name));
                }
                if is_c(&entry) && !entry.same_signature(other) {
                    return Err(ScopeError::RedeclarationOfFunctionOrMacro(name));
                }
            }
        }

        for &id in &existing {
            let Some(other) = table.get(id) else { continue };
            if !entry.same_signature(other) {
                continue;
            }
            return match (entry.is_function(), other.is_function()) {
                (true, true) => Self::merge_declaration(table, id, &entry),
                (false, false) => Err(ScopeError::RedeclarationOfFunctionOrMacro(name)),
                (true, false) => Err(ScopeError::FunctionHasSameParamsAsMacro(name)),
                (false, true) => Err(ScopeError::MacroHasSameParamsAsFunction(name)),
            };
        }

        let id = table.insert(entry);
        self.innermost_mut()
            .callables
            .entry(name)
            .or_default()
            .push(id);
        Ok(Registered::New(id))
    }

    fn merge_declaration(
        table: &mut CallableTable,
        id: CallableId,
        entry: &CallableEntry,
    ) -> Result<Registered, ScopeError> {
        let redeclared = Err(ScopeError::RedeclarationOfFunctionOrMacro(entry.name));
        let Some(other) = table.get_mut(id) else {
            return redeclared;
        };
        if other.return_type() != entry.return_type() {
            return redeclared;
        }
        if entry.flags.contains(CallableFlags::DECLARATION_ONLY) {
            return Ok(Registered::Existing(id));
        }
        if other.flags.contains(CallableFlags::DECLARATION_ONLY) {
            other.flags.remove(CallableFlags::DECLARATION_ONLY);
            other.flags |= entry.flags;
            other.loc = entry.loc;
            return Ok(Registered::Completed(id));
        }
        redeclared
    }

    // === Lookup ===

    /// Frames in lookup order.
    fn visible_frames(&self) -> Vec<&Frame> {
        let mut frames: Vec<&Frame> = self.lexical.iter().rev().collect();
        frames.extend(self.namespace_chain().map(|id| &self.namespaces[id.index()].frame));
        frames.extend(
            self.active
                .iter()
                .rev()
                .map(|id| &self.namespaces[id.index()].frame),
        );
        frames
    }

    /// Frames a name resolves against: the qualifying namespace's frame for
    /// `a.b.name`, otherwise every visible frame. Also returns the
    /// unqualified name.
    fn frames_for(
        &self,
        name: Name,
        interner: &StringInterner,
    ) -> Result<(Vec<&Frame>, Name), ScopeError> {
        let text = interner.lookup(name);
        match split_qualified(text) {
            Some((path, short)) => {
                let ns = self
                    .find_namespace(path, interner)
                    .ok_or(ScopeError::NamespaceNotInScope(name))?;
                Ok((vec![&self.namespaces[ns.index()].frame], interner.intern(short)))
            }
            None => Ok((self.visible_frames(), name)),
        }
    }

    pub fn lookup_variable(
        &self,
        name: Name,
        interner: &StringInterner,
    ) -> Result<Option<&Variable>, ScopeError> {
        let (frames, short) = self.frames_for(name, interner)?;
        Ok(frames.into_iter().find_map(|f| f.variable(short)))
    }

    pub fn lookup_type(
        &self,
        name: Name,
        interner: &StringInterner,
    ) -> Result<Option<Idx>, ScopeError> {
        let (frames, short) = self.frames_for(name, interner)?;
        Ok(frames.into_iter().find_map(|f| f.type_named(short)))
    }

    /// Type bound to `name` in the innermost frame only.
    pub fn local_type(&self, name: Name) -> Option<Idx> {
        self.innermost().type_named(name)
    }

    /// Variables declared in the open lexical frames.
    pub fn lexical_variable_count(&self) -> usize {
        self.lexical.iter().map(|f| f.vars.len()).sum()
    }

    /// Labels are only visible through lexical frames.
    pub fn lookup_label(&self, name: Name) -> Option<&Label> {
        self.lexical.iter().rev().find_map(|f| f.label(name))
    }

    /// Every visible callable with this name, in lookup order, without
    /// duplicates.
    pub fn lookup_callables(
        &self,
        name: Name,
        interner: &StringInterner,
    ) -> Result<Vec<CallableId>, ScopeError> {
        let (frames, short) = self.frames_for(name, interner)?;
        let mut ids: Vec<CallableId> = Vec::new();
        for frame in frames {
            for &id in frame.callables(short) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `a.b.name` into (`a.b`, `name`). Atoms made only of dots (`...`)
/// and atoms with an empty side are not qualified.
fn split_qualified(text: &str) -> Option<(&str, &str)> {
    let (path, short) = text.rsplit_once('.')?;
    if path.is_empty() || short.is_empty() || path.ends_with('.') {
        return None;
    }
    Some((path, short))
}
