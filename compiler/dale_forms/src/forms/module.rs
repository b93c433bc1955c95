//! `(import module [(form...)])`, `(include "path")` and `(once tag)`.
//!
//! # Design
//!
//! Imported and included forms are processed in the current namespace as
//! if written in place, inside their own entry on the open-file stack. A
//! module is processed once per session; what it provides is the set of
//! names it added to the current namespace, recorded for later imports
//! that ask for specific forms. A module that imports itself, directly or
//! through other modules, is reported instead of processed again; include
//! nesting is bounded by the session's include budget.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{Loc, Name, NodeId};
use dale_stack::DepthExceeded;
use rustc_hash::FxHashSet;

use super::{expect_arg_range, expect_args, expect_atom, expect_list, unquote};
use crate::loader::{is_valid_module_name, LoadError};
use crate::session::read_error_diagnostic;
use crate::{dispatch, FormCall, Session};

/// Process the forms of another file, stopping early at a `once` that has
/// been seen before.
fn process_file(session: &mut Session<'_>, file: Name, forms: &[NodeId]) -> Result<(), ErrorGuaranteed> {
    session.files.push(file);
    let mut failed = None;
    for &form in forms {
        if session.skip_file || session.diagnostics.has_fatal() {
            break;
        }
        if let Err(err) = dispatch::top_level(session, form) {
            failed.get_or_insert(err);
        }
    }
    session.files.pop();
    session.skip_file = false;
    failed.map_or(Ok(()), Err)
}

#[cold]
fn load_error(session: &mut Session<'_>, err: LoadError, what: &str, loc: Loc, missing: ErrorCode) -> ErrorGuaranteed {
    match err {
        LoadError::NotFound => session.error_with(missing, loc, &[what]),
        LoadError::Io(msg) => session.error_with(ErrorCode::FileError, loc, &[what, &msg]),
        LoadError::Read(err) => session.emit(read_error_diagnostic(&err)),
    }
}

fn namespace_names(session: &Session<'_>) -> FxHashSet<Name> {
    let current = session.scope.current_namespace();
    session
        .scope
        .namespace_frame(current)
        .map(|frame| frame.defined_names().collect())
        .unwrap_or_default()
}

pub(crate) fn import(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    expect_arg_range(session, call, 1, 2)?;
    let module = expect_atom(session, call.args[0], "import")?;
    let text = session.interner.lookup(module);
    if !is_valid_module_name(text) {
        return Err(session.error_with(ErrorCode::InvalidModuleName, call.loc, &[text]));
    }
    let requested = match call.args.get(1) {
        Some(&forms) => {
            let items = expect_list(session, forms, "import")?;
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                names.push(expect_atom(session, item, "import")?);
            }
            names
        }
        None => Vec::new(),
    };

    if session.importing.contains(&module) {
        let cycle = import_cycle(session, module);
        return Err(session.error_with(ErrorCode::CannotLinkModules, call.loc, &[&cycle]));
    }
    if !session.modules.contains_key(&module) {
        let loader = session.loader;
        let forms = match loader.load_module(text, &session.interner, &mut session.arena) {
            Ok(forms) => forms,
            Err(err) => return Err(load_error(session, err, text, call.loc, ErrorCode::UnableToLoadModule)),
        };
        let before = namespace_names(session);
        session.importing.push(module);
        let result = process_file(session, module, &forms);
        session.importing.pop();
        let provided: FxHashSet<Name> = namespace_names(session)
            .into_iter()
            .filter(|name| !before.contains(name))
            .collect();
        tracing::debug!(module = text, forms = forms.len(), provided = provided.len(), "imported");
        session.modules.insert(module, provided);
        result?;
    }

    let missing: Vec<&str> = match session.modules.get(&module) {
        Some(provided) => requested
            .iter()
            .filter(|name| !provided.contains(name))
            .map(|&name| session.interner.lookup(name))
            .collect(),
        None => Vec::new(),
    };
    if !missing.is_empty() {
        let missing = missing.join(", ");
        return Err(session.error_with(ErrorCode::ModuleDoesNotProvideForms, call.loc, &[text, &missing]));
    }
    Ok(())
}

/// `a -> b -> a` for a module that imports itself through the open imports.
fn import_cycle(session: &Session<'_>, module: Name) -> String {
    let start = session.importing.iter().position(|&open| open == module).unwrap_or(0);
    let mut chain: Vec<&str> = session.importing[start..]
        .iter()
        .map(|&open| session.interner.lookup(open))
        .collect();
    chain.push(session.interner.lookup(module));
    format!("import cycle {}", chain.join(" -> "))
}

pub(crate) fn include(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    expect_args(session, call, 1)?;
    let Some(path) = session.text(call.args[0]).and_then(unquote) else {
        return Err(super::unexpected(session, call.args[0], "string", "include"));
    };
    let loader = session.loader;
    let forms = match loader.read_file(&path, &session.interner, &mut session.arena) {
        Ok(forms) => forms,
        Err(err) => return Err(load_error(session, err, &path, call.loc, ErrorCode::NoSuchFileOrDirectory)),
    };
    if let Err(DepthExceeded { limit }) = session.includes.try_enter() {
        let reason = format!("includes nested more than {limit} deep");
        return Err(session.error_with(ErrorCode::FileError, call.loc, &[&path, &reason]));
    }
    tracing::debug!(path, forms = forms.len(), depth = session.includes.depth(), "include");
    let file = session.interner.intern(&path);
    let result = process_file(session, file, &forms);
    session.includes.exit();
    result
}

pub(crate) fn once(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    expect_args(session, call, 1)?;
    let tag = expect_atom(session, call.args[0], "once")?;
    if session.files.len() <= 1 {
        return Err(session.error(ErrorCode::CannotOnceTheLastOpenFile, call.loc));
    }
    if !session.once_tags.insert(tag) {
        tracing::trace!(tag = session.interner.lookup(tag), "skipping file");
        session.skip_file = true;
    }
    Ok(())
}
