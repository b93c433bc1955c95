//! `(namespace name form...)` and `(using-namespace name form...)`.

use dale_diagnostic::ErrorGuaranteed;
use dale_ir::NodeId;

use super::{expect_atom, expect_min_args};
use crate::{dispatch, FormCall, Session};

/// Process top-level forms in order; the first error is returned after
/// all of them have run.
fn each(session: &mut Session<'_>, forms: &[NodeId]) -> Result<(), ErrorGuaranteed> {
    let mut failed = None;
    for &form in forms {
        if let Err(err) = dispatch::top_level(session, form) {
            failed.get_or_insert(err);
        }
    }
    failed.map_or(Ok(()), Err)
}

/// Define the forms inside namespace `name`, creating it on first use.
pub(crate) fn namespace(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    expect_min_args(session, call, 1)?;
    let name = expect_atom(session, call.args[0], "namespace")?;
    session.scope.enter_namespace(name, &session.interner);
    let result = each(session, &call.args[1..]);
    session.scope.leave_namespace();
    result
}

/// Process the forms with namespace `name` searched first.
pub(crate) fn using_namespace(session: &mut Session<'_>, call: &FormCall) -> Result<(), ErrorGuaranteed> {
    expect_min_args(session, call, 1)?;
    let name = expect_atom(session, call.args[0], "using-namespace")?;
    if let Err(err) = session.scope.activate_namespace(name, &session.interner) {
        return Err(session.scope_error(err, call.loc));
    }
    let result = each(session, &call.args[1..]);
    if let Err(err) = session.scope.deactivate_namespace(name, &session.interner) {
        let err = session.scope_error(err, call.loc);
        return result.and(Err(err));
    }
    result
}
