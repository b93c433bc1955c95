//! `(def name (struct linkage [((field type) ...)]))`.
//!
//! Without a field list, or with the linkage `opaque`, the struct is opaque:
//! it can be pointed to but not instantiated. A later definition with
//! fields completes it. The name is bound before the fields are parsed, so
//! a struct may contain pointers to itself. A struct defined in a procedure
//! body shadows any global of the same name for the rest of that body only.

use dale_diagnostic::{Diagnostic, ErrorCode, ErrorGuaranteed};
use dale_ir::{Name, NodeId};
use dale_scope::{ScopeError, TypeDeclKind};
use dale_types::{check_first_class, struct_has_padding, Field, Idx, StructDef, TypeData, TypeError};

use super::{linkage, Definition};
use crate::forms::{expect_atom, expect_list, unexpected};
use crate::Session;

pub(super) fn structure(
    session: &mut Session<'_>,
    def: &Definition,
    local: bool,
) -> Result<(), ErrorGuaranteed> {
    let loc = session.loc(def.node);
    let (link, fields) = match def.rest[..] {
        [link] => (link, None),
        [link, fields] => (link, Some(fields)),
        _ => {
            let got = def.rest.len().to_string();
            return Err(session.error_with(ErrorCode::IncorrectMaximumNumberOfArgs, loc, &["struct", "2", &got]));
        }
    };
    if session.text(link) != Some("opaque") {
        linkage(session, link, "struct")?;
    }
    let fields = fields.filter(|_| session.text(link) != Some("opaque"));

    let name = session.interner.lookup(def.name);
    let existing = session.scope.local_type(def.name);
    let opaque = existing.and_then(|ty| match *session.pool.data(ty) {
        TypeData::Struct { name: key } if session.pool.is_opaque_struct(ty) => Some((ty, key)),
        _ => None,
    });
    let (ty, key) = match (existing, opaque) {
        (_, Some(found)) => found,
        (Some(_), None) => {
            return Err(session.scope_error(ScopeError::RedeclarationOfStruct(def.name), loc));
        }
        (None, None) => {
            let key = struct_key(session, name, local);
            let ty = session.pool.struct_type(key);
            if let Err(err) = session.scope.define_type(def.name, ty, TypeDeclKind::Struct) {
                return Err(session.scope_error(err, loc));
            }
            (ty, key)
        }
    };

    let Some(fields) = fields else {
        if session.pool.struct_def_of(ty).is_none() {
            session.pool.define_struct(key, StructDef { fields: Vec::new(), opaque: true });
        }
        tracing::debug!(name, "opaque struct");
        return Ok(());
    };

    let items = expect_list(session, fields, "struct fields")?;
    let mut members: Vec<Field> = Vec::with_capacity(items.len());
    for &item in &items {
        let pair = expect_list(session, item, "struct field")?;
        let &[field_name, field_ty] = &pair[..] else {
            return Err(unexpected(session, item, "(name type)", "struct field"));
        };
        let field_name = expect_atom(session, field_name, "struct field")?;
        members.push(field(session, field_name, field_ty)?);
    }
    session.pool.define_struct(
        key,
        StructDef {
            fields: members,
            opaque: false,
        },
    );
    tracing::debug!(name, fields = items.len(), "struct");

    if session.config().warn_on_padding && struct_has_padding(&session.pool, ty) {
        session.warn(Diagnostic::warning(ErrorCode::StructContainsPadding).at(loc));
    }
    Ok(())
}

/// Type-table key for a new struct. Structs defined in a procedure body get
/// a numbered key so they never replace a global struct of the same name.
fn struct_key(session: &mut Session<'_>, name: &str, local: bool) -> Name {
    let qualified = session.scope.qualify(name);
    if !local {
        return session.interner.intern(&qualified);
    }
    session.local_structs += 1;
    let key = format!("{qualified}#{}", session.local_structs);
    session.interner.intern(&key)
}

/// One member: `type` or `(bf type width)`.
fn field(session: &mut Session<'_>, name: Name, node: NodeId) -> Result<Field, ErrorGuaranteed> {
    let loc = session.loc(node);
    if let Some(bitfield) = bitfield(session, node)? {
        let (ty, width) = bitfield;
        return Ok(Field {
            name,
            ty,
            bitfield: Some(width),
        });
    }
    let ty = session.parse_type(node)?;
    let disallowed = match session.pool.data(ty) {
        TypeData::Reference { .. } => Some("reference"),
        TypeData::Function { .. } => Some("function"),
        _ => None,
    };
    if let Some(kind) = disallowed {
        return Err(session.error_with(ErrorCode::TypeNotAllowedInStruct, loc, &[kind]));
    }
    if let Err(err) = check_first_class(&session.pool, ty) {
        return Err(session.type_error(err, loc));
    }
    Ok(Field {
        name,
        ty,
        bitfield: None,
    })
}

/// `(bf type width)`, if `node` is written that way.
fn bitfield(session: &mut Session<'_>, node: NodeId) -> Result<Option<(Idx, u8)>, ErrorGuaranteed> {
    let Some(items) = session.arena.list(node) else {
        return Ok(None);
    };
    let items: Vec<NodeId> = items.to_vec();
    if items.first().and_then(|&head| session.text(head)) != Some("bf") {
        return Ok(None);
    }
    let loc = session.loc(node);
    let &[_, ty, width] = &items[..] else {
        let got = (items.len() - 1).to_string();
        return Err(session.error_with(ErrorCode::IncorrectNumberOfArgs, loc, &["bf", "2", &got]));
    };
    let ty = session.parse_type(ty)?;
    if !session.pool.is_integer(ty) {
        return Err(session.type_error(TypeError::BitfieldMustHaveIntegerType, loc));
    }
    let Some(width) = session.text(width).and_then(|text| text.parse::<u8>().ok()) else {
        return Err(unexpected(session, width, "bit width", "bf"));
    };
    Ok(Some((ty, width)))
}

#[cfg(test)]
mod tests {
    use crate::{RecordingSink, Session, SessionConfig};
    use dale_diagnostic::{ErrorCode, Severity};

    fn session_codes(config: SessionConfig, source: &str) -> Vec<(ErrorCode, Severity)> {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(config, &mut sink);
        let _ = session.process_source("struct.dt", source);
        session.diagnostics().peek().map(|d| (d.code, d.severity)).collect()
    }

    fn codes(source: &str) -> Vec<ErrorCode> {
        session_codes(SessionConfig::default(), source)
            .into_iter()
            .map(|(code, _)| code)
            .collect()
    }

    #[test]
    fn self_referential_pointer() {
        assert!(codes("(def node (struct intern ((next (p node)) (value int))))").is_empty());
    }

    #[test]
    fn self_by_value_is_not_first_class() {
        assert_eq!(
            codes("(def node (struct intern ((inner node))))"),
            vec![ErrorCode::TypeIsNotFirstClass]
        );
    }

    #[test]
    fn opaque_then_defined() {
        let source = "(def handle (struct opaque))
                      (def handle (struct intern ((fd int))))";
        assert!(codes(source).is_empty());
    }

    #[test]
    fn redeclaration() {
        let source = "(def pt (struct intern ((x int))))
                      (def pt (struct intern ((y int))))";
        assert_eq!(codes(source), vec![ErrorCode::RedeclarationOfStruct]);
    }

    #[test]
    fn local_struct_leaves_global_intact() {
        let source = "(def s (struct intern ((a int))))
                      (def f (fn intern double (void)
                        (def s (struct intern ((b double))))
                        (def v (var auto s))
                        (@ (: v b))))
                      (def g (fn intern int ((v (p s)))
                        (@ (: (@ v) a))))";
        assert!(codes(source).is_empty(), "{:?}", codes(source));
    }

    #[test]
    fn local_struct_is_checked_in_its_own_frame() {
        let source = "(def f (fn intern void (void)
                        (def t (struct intern ((a int))))
                        (def t (struct intern ((b int))))))";
        assert_eq!(codes(source), vec![ErrorCode::RedeclarationOfStruct]);
        let completed = "(def f (fn intern void (void)
                           (def t (struct opaque))
                           (def t (struct intern ((b int))))
                           (def v (var auto t))))";
        assert!(codes(completed).is_empty(), "{:?}", codes(completed));
    }

    #[test]
    fn disallowed_members() {
        assert_eq!(
            codes("(def s (struct intern ((r (ref int)))))"),
            vec![ErrorCode::TypeNotAllowedInStruct]
        );
        assert_eq!(
            codes("(def s (struct intern ((b (bf float 3)))))"),
            vec![ErrorCode::BitfieldMustHaveIntegerType]
        );
    }

    #[test]
    fn padding_is_a_warning() {
        let source = "(def s (struct intern ((a char) (b int64))))";
        let found = session_codes(SessionConfig::default(), source);
        assert_eq!(found, vec![(ErrorCode::StructContainsPadding, Severity::Warning)]);
        let quiet = SessionConfig::default().with_warn_on_padding(false);
        assert!(session_codes(quiet, source).is_empty());
    }
}
