//! Module and file loading.
//!
//! `(import ...)` and `(include ...)` fetch their forms through a
//! [`ModuleLoader`]; how modules are located is up to the embedder.
//! [`MemoryLoader`] serves sources registered in memory.

use dale_ir::{read_forms, NodeArena, NodeId, ReadError, StringInterner};
use rustc_hash::FxHashMap;

/// Why a module or file could not be loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoadError {
    NotFound,
    /// The source exists but could not be read.
    Io(String),
    /// The source did not read as forms.
    Read(ReadError),
}

/// Source of imported modules and included files.
pub trait ModuleLoader {
    /// Top-level forms of module `name`.
    fn load_module(
        &self,
        name: &str,
        interner: &StringInterner,
        arena: &mut NodeArena,
    ) -> Result<Vec<NodeId>, LoadError>;

    /// Top-level forms of the file at `path`.
    fn read_file(
        &self,
        path: &str,
        interner: &StringInterner,
        arena: &mut NodeArena,
    ) -> Result<Vec<NodeId>, LoadError>;
}

/// Loader that knows no modules and no files.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoModules;

impl ModuleLoader for NoModules {
    fn load_module(
        &self,
        _name: &str,
        _interner: &StringInterner,
        _arena: &mut NodeArena,
    ) -> Result<Vec<NodeId>, LoadError> {
        Err(LoadError::NotFound)
    }

    fn read_file(
        &self,
        _path: &str,
        _interner: &StringInterner,
        _arena: &mut NodeArena,
    ) -> Result<Vec<NodeId>, LoadError> {
        Err(LoadError::NotFound)
    }
}

/// Loader over sources held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    modules: FxHashMap<String, String>,
    files: FxHashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_module(mut self, name: &str, source: &str) -> Self {
        self.modules.insert(name.to_owned(), source.to_owned());
        self
    }

    #[must_use]
    pub fn with_file(mut self, path: &str, source: &str) -> Self {
        self.files.insert(path.to_owned(), source.to_owned());
        self
    }
}

fn read_source(
    source: Option<&String>,
    file: &str,
    interner: &StringInterner,
    arena: &mut NodeArena,
) -> Result<Vec<NodeId>, LoadError> {
    let source = source.ok_or(LoadError::NotFound)?;
    read_forms(source, interner.intern(file), interner, arena).map_err(LoadError::Read)
}

impl ModuleLoader for MemoryLoader {
    fn load_module(
        &self,
        name: &str,
        interner: &StringInterner,
        arena: &mut NodeArena,
    ) -> Result<Vec<NodeId>, LoadError> {
        read_source(self.modules.get(name), name, interner, arena)
    }

    fn read_file(
        &self,
        path: &str,
        interner: &StringInterner,
        arena: &mut NodeArena,
    ) -> Result<Vec<NodeId>, LoadError> {
        read_source(self.files.get(path), path, interner, arena)
    }
}

/// Module names comprise alphanumerics, periods, hyphens and underscores.
pub fn is_valid_module_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

#[cfg(test)]
mod tests;
