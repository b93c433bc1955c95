//! Type expressions in source syntax.
//!
//! ```text
//! int  uint8  double  point        ; primitive or named type
//! (p T)  (p (const T))             ; pointer, pointer to const
//! (ref T)                          ; reference (parameters only)
//! (array-of N T)
//! (fn RET (T1 T2 ...))             ; function type; (void) for no params
//! ```

use dale_diagnostic::{Diagnostic, ErrorCode};
use dale_ir::{Loc, Name, NodeArena, NodeId, StringInterner};
use dale_scope::{ScopeError, ScopeManager};
use dale_types::{Idx, Pool};
use smallvec::SmallVec;

/// Primitive type keywords.
const PRIMITIVES: &[(&str, Idx)] = &[
    ("void", Idx::VOID),
    ("bool", Idx::BOOL),
    ("char", Idx::CHAR),
    ("int", Idx::INT),
    ("uint", Idx::UINT),
    ("int8", Idx::INT8),
    ("int16", Idx::INT16),
    ("int32", Idx::INT32),
    ("int64", Idx::INT64),
    ("int128", Idx::INT128),
    ("uint8", Idx::UINT8),
    ("uint16", Idx::UINT16),
    ("uint32", Idx::UINT32),
    ("uint64", Idx::UINT64),
    ("uint128", Idx::UINT128),
    ("size", Idx::SIZE),
    ("ptrdiff", Idx::INT64),
    ("float", Idx::FLOAT),
    ("double", Idx::DOUBLE),
];

pub(crate) fn primitive(text: &str) -> Option<Idx> {
    PRIMITIVES
        .iter()
        .find(|(name, _)| *name == text)
        .map(|&(_, idx)| idx)
}

/// A malformed or unresolvable type expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeSyntaxError {
    NotInScope { name: Name, loc: Loc },
    Invalid { loc: Loc },
    Arity { expected: usize, got: usize, loc: Loc },
    VoidNotOnly { loc: Loc },
    VarArgsNotLast { loc: Loc },
    Scope { err: ScopeError, loc: Loc },
}

impl TypeSyntaxError {
    #[cold]
    pub fn into_diagnostic(self, interner: &StringInterner) -> Diagnostic {
        match self {
            TypeSyntaxError::NotInScope { name, loc } => Diagnostic::error(ErrorCode::TypeNotInScope)
                .at(loc)
                .with_arg(interner.lookup(name)),
            TypeSyntaxError::Invalid { loc } => Diagnostic::error(ErrorCode::InvalidType).at(loc),
            TypeSyntaxError::Arity { expected, got, loc } => {
                Diagnostic::error(ErrorCode::IncorrectParameterTypeNumberOfArgs)
                    .at(loc)
                    .with_arg(expected.to_string())
                    .with_arg(got.to_string())
            }
            TypeSyntaxError::VoidNotOnly { loc } => {
                Diagnostic::error(ErrorCode::VoidMustBeTheOnlyParameter).at(loc)
            }
            TypeSyntaxError::VarArgsNotLast { loc } => {
                Diagnostic::error(ErrorCode::VarArgsMustBeLastParameter).at(loc)
            }
            TypeSyntaxError::Scope { err, loc } => err.into_diagnostic(loc, interner),
        }
    }
}

/// Borrowed view of the session state a type expression resolves against.
pub(crate) struct TypeParser<'a> {
    pub pool: &'a mut Pool,
    pub scope: &'a ScopeManager,
    pub interner: &'a StringInterner,
    pub arena: &'a NodeArena,
}

impl TypeParser<'_> {
    /// Parse a type, reading `(const T)` as `T`.
    pub fn parse(&mut self, node: NodeId) -> Result<Idx, TypeSyntaxError> {
        self.parse_qualified(node).map(|(ty, _)| ty)
    }

    /// Parse a type and report whether it was wrapped in `(const ...)`.
    pub fn parse_qualified(&mut self, node: NodeId) -> Result<(Idx, bool), TypeSyntaxError> {
        let loc = self.arena.loc(node);
        if let Some(name) = self.arena.atom(node) {
            return self.named(name, loc).map(|ty| (ty, false));
        }
        let Some(items) = self.arena.list(node) else {
            return Err(TypeSyntaxError::Invalid { loc });
        };
        let Some((&head, rest)) = items.split_first() else {
            return Err(TypeSyntaxError::Invalid { loc });
        };
        let Some(head) = self.arena.atom(head) else {
            return Err(TypeSyntaxError::Invalid { loc });
        };
        let rest: SmallVec<[NodeId; 4]> = rest.iter().copied().collect();
        let arity = |expected: usize| {
            if rest.len() == expected {
                Ok(())
            } else {
                Err(TypeSyntaxError::Arity {
                    expected,
                    got: rest.len(),
                    loc,
                })
            }
        };

        match self.interner.lookup(head) {
            "const" => {
                arity(1)?;
                let (ty, _) = self.parse_qualified(rest[0])?;
                Ok((ty, true))
            }
            "p" => {
                arity(1)?;
                let (to, is_const) = self.parse_qualified(rest[0])?;
                let ty = if is_const {
                    self.pool.const_pointer(to)
                } else {
                    self.pool.pointer(to)
                };
                Ok((ty, false))
            }
            "ref" => {
                arity(1)?;
                let to = self.parse(rest[0])?;
                Ok((self.pool.reference(to), false))
            }
            "array-of" => {
                arity(2)?;
                let len = self
                    .arena
                    .atom(rest[0])
                    .and_then(|n| self.interner.lookup(n).parse::<u64>().ok())
                    .ok_or(TypeSyntaxError::Invalid {
                        loc: self.arena.loc(rest[0]),
                    })?;
                let of = self.parse(rest[1])?;
                Ok((self.pool.array(of, len), false))
            }
            "fn" => {
                arity(2)?;
                let ret = self.parse(rest[0])?;
                let (params, variadic) = self.parse_param_types(rest[1])?;
                Ok((self.pool.function(&params, variadic, ret), false))
            }
            _ => Err(TypeSyntaxError::Invalid { loc }),
        }
    }

    /// Parameter types of `(fn RET (params))`.
    fn parse_param_types(
        &mut self,
        node: NodeId,
    ) -> Result<(SmallVec<[Idx; 4]>, bool), TypeSyntaxError> {
        let loc = self.arena.loc(node);
        let items: SmallVec<[NodeId; 4]> = self
            .arena
            .list(node)
            .ok_or(TypeSyntaxError::Invalid { loc })?
            .iter()
            .copied()
            .collect();
        let mut params = SmallVec::new();
        let mut variadic = false;
        for (i, &item) in items.iter().enumerate() {
            let text = self.arena.atom(item).map(|n| self.interner.lookup(n));
            let item_loc = self.arena.loc(item);
            match text {
                Some("...") if i + 1 == items.len() => variadic = true,
                Some("...") => return Err(TypeSyntaxError::VarArgsNotLast { loc: item_loc }),
                Some("void") if items.len() == 1 => {}
                Some("void") => return Err(TypeSyntaxError::VoidNotOnly { loc: item_loc }),
                _ => params.push(self.parse(item)?),
            }
        }
        Ok((params, variadic))
    }

    fn named(&mut self, name: Name, loc: Loc) -> Result<Idx, TypeSyntaxError> {
        if let Some(ty) = primitive(self.interner.lookup(name)) {
            return Ok(ty);
        }
        match self.scope.lookup_type(name, self.interner) {
            Ok(Some(ty)) => Ok(ty),
            Ok(None) => Err(TypeSyntaxError::NotInScope { name, loc }),
            Err(err) => Err(TypeSyntaxError::Scope { err, loc }),
        }
    }
}

#[cfg(test)]
mod tests;
