//! Source locations.
//!
//! Every node carries the file, line and column it came from. Diagnostics
//! print these verbatim, so nodes produced by macro expansion inherit the
//! location of the macro call site.

use std::fmt;

use crate::{Name, StringInterner};

/// Source location of a node.
///
/// Lines and columns are 1-based; `Loc::DUMMY` (all zero) marks nodes that
/// have no meaningful origin, e.g. nodes built programmatically in tests.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Loc {
    /// Interned file name.
    pub file: Name,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl Loc {
    /// Location for generated nodes.
    pub const DUMMY: Loc = Loc {
        file: Name::EMPTY,
        line: 0,
        column: 0,
    };

    /// Create a new location.
    #[inline]
    pub const fn new(file: Name, line: u32, column: u32) -> Self {
        Loc { file, line, column }
    }

    /// Check if this is the dummy location.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.line == 0 && self.column == 0
    }

    /// Render as `file:line:column` using the interner for the file name.
    pub fn display<'a>(&self, interner: &'a StringInterner) -> LocDisplay<'a> {
        LocDisplay {
            loc: *self,
            interner,
        }
    }
}

impl fmt::Debug for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.raw(), self.line, self.column)
    }
}

/// Display adapter returned by [`Loc::display`].
pub struct LocDisplay<'a> {
    loc: Loc,
    interner: &'a StringInterner,
}

impl fmt::Display for LocDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.interner.lookup(self.loc.file);
        let file = if file.is_empty() { "<unknown>" } else { file };
        write!(f, "{}:{}:{}", file, self.loc.line, self.loc.column)
    }
}
