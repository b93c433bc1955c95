//! Linkage specifiers.

use std::fmt;

/// Visibility and symbol-naming of a definition.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Linkage {
    /// Visible to other units, name-mangled.
    Extern,
    /// Local to the unit.
    Intern,
    /// Visible to other units with an unmangled C symbol; cannot be overloaded.
    ExternC,
    /// Function-local storage (variables only).
    Auto,
}

impl Linkage {
    /// Parse a linkage keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "extern" => Some(Linkage::Extern),
            "intern" => Some(Linkage::Intern),
            "extern-c" => Some(Linkage::ExternC),
            "auto" => Some(Linkage::Auto),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Linkage::Extern => "extern",
            Linkage::Intern => "intern",
            Linkage::ExternC => "extern-c",
            Linkage::Auto => "auto",
        }
    }

    /// Valid for functions and macros.
    pub const fn is_callable_linkage(self) -> bool {
        !matches!(self, Linkage::Auto)
    }
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
