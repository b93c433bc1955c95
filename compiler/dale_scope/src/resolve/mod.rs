//! Overload resolution.
//!
//! # Design
//!
//! Every visible callable with the called name is scored position by
//! position with [`coercion_rank`]. Untyped macro parameters score
//! [`CoercionRank::Generic`], and arguments absorbed by a variadic tail
//! score [`CoercionRank::Variadic`]. A candidate's key is
//! `(sum of ranks, is variadic)`; the unique smallest key wins.
//!
//! Selection depends only on the candidate set, never on the order the
//! candidates were gathered in: ties and "closest candidate" choices fall
//! back to registration order ([`CallableId`] order).

use dale_diagnostic::{Diagnostic, ErrorCode};
use dale_ir::{Loc, Name, StringInterner};
use dale_types::{coercion_rank, CoercionRank, Idx, Pool};

use crate::{CallableEntry, CallableId, CallableTable, ScopeError, ScopeManager};

/// A candidate that accepts every argument.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScoredCandidate {
    pub id: CallableId,
    /// One rank per argument.
    pub ranks: Vec<CoercionRank>,
    pub total: u32,
    pub variadic: bool,
}

impl ScoredCandidate {
    /// Ordering key; smaller is a better match.
    pub fn key(&self) -> (u32, bool) {
        (self.total, self.variadic)
    }
}

/// The winning candidate of a call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resolution {
    pub winner: ScoredCandidate,
    /// Number of candidates that accepted the arguments.
    pub viable: usize,
}

impl Resolution {
    #[inline]
    pub fn callable(&self) -> CallableId {
        self.winner.id
    }
}

/// Why a call did not resolve.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResolveError {
    /// The name prefix of a qualified call did not resolve.
    Scope(ScopeError),
    /// No callable of that name is visible.
    NotInScope { name: Name },
    /// Callables exist but none accepts the arguments.
    NoMatch {
        name: Name,
        args: Vec<Option<Idx>>,
        closest: Option<CallableId>,
    },
    /// Two candidates share the best key.
    Ambiguous {
        name: Name,
        args: Vec<Option<Idx>>,
        first: CallableId,
        second: CallableId,
    },
}

impl From<ScopeError> for ResolveError {
    fn from(err: ScopeError) -> Self {
        ResolveError::Scope(err)
    }
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::Scope(err) => err.code(),
            ResolveError::NotInScope { .. } => ErrorCode::NotInScope,
            ResolveError::NoMatch { closest: None, .. } => {
                ErrorCode::OverloadedFunctionOrMacroNotInScope
            }
            ResolveError::NoMatch {
                closest: Some(_), ..
            } => ErrorCode::OverloadedFunctionOrMacroNotInScopeWithClosest,
            ResolveError::Ambiguous { .. } => ErrorCode::AmbiguousOverload,
        }
    }

    #[cold]
    pub fn into_diagnostic(
        self,
        loc: Loc,
        table: &CallableTable,
        pool: &Pool,
        interner: &StringInterner,
    ) -> Diagnostic {
        let code = self.code();
        let expects = |id: CallableId| {
            table
                .get(id)
                .map_or_else(String::new, |e| format_expected(e, pool, interner))
        };
        match self {
            ResolveError::Scope(err) => err.into_diagnostic(loc, interner),
            ResolveError::NotInScope { name } => Diagnostic::error(code)
                .at(loc)
                .with_arg(interner.lookup(name)),
            ResolveError::NoMatch {
                name,
                args,
                closest,
            } => {
                let diag = Diagnostic::error(code)
                    .at(loc)
                    .with_arg(interner.lookup(name))
                    .with_arg(format_args_list(&args, pool, interner));
                match closest {
                    Some(id) => diag.with_arg(expects(id)),
                    None => diag,
                }
            }
            ResolveError::Ambiguous {
                name,
                args,
                first,
                second,
            } => Diagnostic::error(code)
                .at(loc)
                .with_arg(interner.lookup(name))
                .with_arg(format_args_list(&args, pool, interner))
                .with_arg(expects(first))
                .with_arg(expects(second)),
        }
    }
}

/// Resolve a call of `name` against every visible callable.
///
/// `args` holds the argument types; `None` marks an argument without a
/// type (an arbitrary form handed to a macro), which only untyped macro
/// parameters and variadic tails accept.
#[tracing::instrument(level = "trace", skip_all, fields(name = interner.lookup(name)))]
pub fn resolve_call(
    scope: &ScopeManager,
    table: &CallableTable,
    pool: &Pool,
    interner: &StringInterner,
    name: Name,
    args: &[Option<Idx>],
) -> Result<Resolution, ResolveError> {
    let candidates = scope.lookup_callables(name, interner)?;
    resolve_among(table, pool, name, &candidates, args)
}

/// Resolve a call against an explicit candidate set.
pub fn resolve_among(
    table: &CallableTable,
    pool: &Pool,
    name: Name,
    candidates: &[CallableId],
    args: &[Option<Idx>],
) -> Result<Resolution, ResolveError> {
    let mut entries: Vec<(CallableId, &CallableEntry)> = candidates
        .iter()
        .filter_map(|&id| table.get(id).map(|e| (id, e)))
        .collect();
    if entries.is_empty() {
        return Err(ResolveError::NotInScope { name });
    }
    entries.sort_by_key(|&(id, _)| id);
    entries.dedup_by_key(|&mut (id, _)| id);

    let mut viable: Vec<ScoredCandidate> = entries
        .iter()
        .filter_map(|&(id, entry)| score(pool, id, entry, args))
        .collect();
    viable.sort_by_key(|c| (c.key(), c.id));

    let Some(best) = viable.first() else {
        let closest = closest_candidate(pool, &entries, args);
        tracing::debug!(candidates = entries.len(), ?closest, "no viable overload");
        return Err(ResolveError::NoMatch {
            name,
            args: args.to_vec(),
            closest,
        });
    };

    if let Some(runner_up) = viable.get(1).filter(|c| c.key() == best.key()) {
        return Err(ResolveError::Ambiguous {
            name,
            args: args.to_vec(),
            first: best.id,
            second: runner_up.id,
        });
    }

    tracing::trace!(winner = ?best.id, total = best.total, viable = viable.len(), "resolved");
    let count = viable.len();
    let winner = viable.swap_remove(0);
    Ok(Resolution {
        winner,
        viable: count,
    })
}

/// Rank of one argument against one declared parameter.
fn rank_param(pool: &Pool, param: Option<Idx>, arg: Option<Idx>) -> Option<CoercionRank> {
    match (param, arg) {
        (None, _) => Some(CoercionRank::Generic),
        (Some(_), None) => None,
        (Some(param), Some(arg)) => coercion_rank(pool, arg, param),
    }
}

fn arity_matches(entry: &CallableEntry, args: usize) -> bool {
    if entry.variadic {
        args >= entry.params.len()
    } else {
        args == entry.params.len()
    }
}

fn score(
    pool: &Pool,
    id: CallableId,
    entry: &CallableEntry,
    args: &[Option<Idx>],
) -> Option<ScoredCandidate> {
    if !arity_matches(entry, args.len()) {
        return None;
    }
    let mut ranks = Vec::with_capacity(args.len());
    for (param, &arg) in entry.param_types().zip(args) {
        ranks.push(rank_param(pool, param, arg)?);
    }
    ranks.resize(args.len(), CoercionRank::Variadic);
    let total = ranks.iter().map(|r| r.cost()).sum();
    Some(ScoredCandidate {
        id,
        ranks,
        total,
        variadic: entry.variadic,
    })
}

/// The arity-matching candidate accepting the most argument positions,
/// earliest registered on ties. `entries` is sorted by id.
fn closest_candidate(
    pool: &Pool,
    entries: &[(CallableId, &CallableEntry)],
    args: &[Option<Idx>],
) -> Option<CallableId> {
    let mut best: Option<(usize, CallableId)> = None;
    for &(id, entry) in entries {
        if !arity_matches(entry, args.len()) {
            continue;
        }
        let compatible = entry
            .param_types()
            .zip(args)
            .filter(|&(param, &arg)| rank_param(pool, param, arg).is_some())
            .count();
        if best.map_or(true, |(count, _)| compatible > count) {
            best = Some((compatible, id));
        }
    }
    best.map(|(_, id)| id)
}

fn format_slot(ty: Option<Idx>, pool: &Pool, interner: &StringInterner) -> String {
    ty.map_or_else(|| "(untyped)".to_owned(), |ty| pool.format_type(ty, interner))
}

/// Argument types as they appear in "parameters are ..." messages.
fn format_args_list(args: &[Option<Idx>], pool: &Pool, interner: &StringInterner) -> String {
    if args.is_empty() {
        return "void".to_owned();
    }
    args.iter()
        .map(|&ty| format_slot(ty, pool, interner))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parameter types a candidate expects, with a trailing `...` when variadic.
fn format_expected(entry: &CallableEntry, pool: &Pool, interner: &StringInterner) -> String {
    let mut parts: Vec<String> = entry
        .param_types()
        .map(|ty| format_slot(ty, pool, interner))
        .collect();
    if entry.variadic {
        parts.push("...".to_owned());
    }
    if parts.is_empty() {
        "void".to_owned()
    } else {
        parts.join(" ")
    }
}
