//! `(def name (enum linkage type (element (element value) ...)))`.
//!
//! Elements without an explicit value take the previous value plus one,
//! starting from zero.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::Name;
use dale_scope::TypeDeclKind;
use dale_types::{EnumDef, TypeError};

use super::{linkage, Definition};
use crate::forms::literal::constant;
use crate::forms::{expect_atom, expect_list, unexpected};
use crate::sink::Constant;
use crate::Session;

pub(super) fn enumeration(session: &mut Session<'_>, def: &Definition) -> Result<(), ErrorGuaranteed> {
    let loc = session.loc(def.node);
    let &[link, underlying, elements] = &def.rest[..] else {
        let got = def.rest.len().to_string();
        return Err(session.error_with(ErrorCode::IncorrectNumberOfArgs, loc, &["enum", "3", &got]));
    };
    linkage(session, link, "enum")?;
    let underlying = session.parse_type(underlying)?;
    if !session.pool.is_integer(underlying) {
        return Err(session.type_error(TypeError::EnumTypeMustBeInteger, loc));
    }

    let items = expect_list(session, elements, "enum elements")?;
    let mut values: Vec<(Name, i64)> = Vec::with_capacity(items.len());
    let mut next = 0i64;
    for &item in &items {
        let (element, value) = match session.arena.atom(item) {
            Some(element) => (element, next),
            None => {
                let pair = expect_list(session, item, "enum element")?;
                let &[element, value] = &pair[..] else {
                    return Err(unexpected(session, item, "(element value)", "enum element"));
                };
                let element = expect_atom(session, element, "enum element")?;
                let atom = expect_atom(session, value, "enum value")?;
                let text = session.interner.lookup(atom);
                let value_loc = session.loc(value);
                let Constant::Int { value, .. } = constant(session, text, value_loc, Some(underlying))? else {
                    return Err(session.error_with(ErrorCode::UnableToParseInteger, value_loc, &[text]));
                };
                let Ok(value) = i64::try_from(value) else {
                    return Err(session.error_with(ErrorCode::UnableToParseInteger, value_loc, &[text]));
                };
                (element, value)
            }
        };
        if values.iter().any(|&(seen, _)| seen == element) {
            let text = session.interner.lookup(element);
            let item_loc = session.loc(item);
            return Err(session.error_with(ErrorCode::RedeclarationOfEnumElement, item_loc, &[text]));
        }
        values.push((element, value));
        next = value.saturating_add(1);
    }

    let name = session.interner.lookup(def.name);
    let qualified = session.interner.intern(&session.scope.qualify(name));
    let ty = session.pool.enum_type(qualified);
    if let Err(err) = session.scope.define_type(def.name, ty, TypeDeclKind::Enum) {
        return Err(session.scope_error(err, loc));
    }
    session.pool.define_enum(
        qualified,
        EnumDef {
            underlying,
            elements: values,
        },
    );
    tracing::debug!(name, elements = items.len(), "enum");
    Ok(())
}
