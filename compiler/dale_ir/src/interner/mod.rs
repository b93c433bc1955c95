//! String interner for atom text and identifiers.
//!
//! Strings are leaked to `'static` once interned; a compile session interns
//! a bounded vocabulary (identifiers, literals, file names), so the leak is
//! bounded by the size of the translation unit.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "interner exceeded capacity: {} strings, max is {}",
                count,
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

struct InternerInner {
    /// Map from string content to its name.
    map: FxHashMap<&'static str, Name>,
    /// Storage for string contents, indexed by `Name::index`.
    strings: Vec<&'static str>,
}

/// String interner.
///
/// Interning goes through `&self` so that the interner can be shared by
/// the arena, the scope manager and diagnostics rendering without threading
/// `&mut` through every phase.
pub struct StringInterner {
    inner: RwLock<InternerInner>,
}

impl StringInterner {
    /// Create a new interner with the empty string pre-interned as `Name::EMPTY`.
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, Name::EMPTY);
        Self {
            inner: RwLock::new(InternerInner {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        if let Some(&name) = self.inner.read().map.get(s) {
            return Ok(name);
        }

        let mut guard = self.inner.write();
        if let Some(&name) = guard.map.get(s) {
            return Ok(name);
        }

        let raw = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let name = Name::from_raw(raw);
        guard.strings.push(leaked);
        guard.map.insert(leaked, name);
        Ok(name)
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if the interner exceeds `u32::MAX` strings.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the string for a name.
    ///
    /// Names from a different interner that are out of range resolve to `""`.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.inner
            .read()
            .strings
            .get(name.index())
            .copied()
            .unwrap_or("")
    }

    /// Find the name of an already-interned string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.inner.read().map.get(s).copied()
    }

    /// Number of interned strings (including the empty string).
    pub fn len(&self) -> usize {
        self.inner.read().strings.len()
    }

    /// Always false: the empty string is pre-interned.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
