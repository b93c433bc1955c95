//! Literals, variable references, enum elements and `array`.

use dale_diagnostic::{ErrorCode, ErrorGuaranteed};
use dale_ir::{BlockId, Loc, Name, NodeId, ValueHandle};
use dale_types::{Idx, TypeError};

use super::{eval, expect_min_args, unquote};
use crate::sink::{Constant, Instruction};
use crate::{FormCall, FormFlags, FunctionContext, ParseResult, Session};

/// Named characters accepted after `#\`.
const CHAR_NAMES: &[(&str, u8)] = &[("SPACE", b' '), ("NEWLINE", b'\n'), ("TAB", b'\t'), ("NULL", 0)];

/// An atom in a body: a literal or a variable reference.
pub(crate) fn atom(
    session: &mut Session<'_>,
    block: BlockId,
    name: Name,
    loc: Loc,
    flags: FormFlags,
    hint: Option<Idx>,
) -> Result<ParseResult, ErrorGuaranteed> {
    let text = session.interner.lookup(name);
    if is_literal(text) {
        let constant = constant(session, text, loc, hint)?;
        let ty = constant_type(session, &constant);
        let value = session.emit_inst(block, Instruction::Const(constant));
        return Ok(ParseResult::new(block, ty, value));
    }
    variable(session, block, name, loc, flags)
}

/// Whether an atom is written as a literal rather than a name.
fn is_literal(text: &str) -> bool {
    matches!(text, "true" | "false")
        || text.starts_with('"')
        || text.starts_with("#\\")
        || text
            .strip_prefix('-')
            .unwrap_or(text)
            .starts_with(|c: char| c.is_ascii_digit())
}

fn variable(
    session: &mut Session<'_>,
    block: BlockId,
    name: Name,
    loc: Loc,
    flags: FormFlags,
) -> Result<ParseResult, ErrorGuaranteed> {
    let found = session.scope.lookup_variable(name, &session.interner).map(|v| v.copied());
    let var = match found {
        Ok(Some(var)) => var,
        Ok(None) => {
            let text = session.interner.lookup(name);
            return Err(session.error_with(ErrorCode::VariableNotInScope, loc, &[text]));
        }
        Err(err) => return Err(session.scope_error(err, loc)),
    };
    if flags.contains(FormFlags::GET_ADDRESS) {
        let ptr = if var.is_const {
            session.pool.const_pointer(var.ty)
        } else {
            session.pool.pointer(var.ty)
        };
        return Ok(ParseResult::new(block, ptr, var.address).with_address(var.address));
    }
    let value = session.emit_inst(
        block,
        Instruction::Load {
            ptr: var.address,
            ty: var.ty,
        },
    );
    Ok(ParseResult::new(block, var.ty, value).with_address(var.address))
}

pub(crate) fn constant_type(session: &mut Session<'_>, constant: &Constant) -> Idx {
    match *constant {
        Constant::Bool(_) => Idx::BOOL,
        Constant::Char(_) => Idx::CHAR,
        Constant::Int { ty, .. } | Constant::Float { ty, .. } | Constant::Null { ty } => ty,
        Constant::Str(_) => session.pool.const_pointer(Idx::CHAR),
    }
}

/// Value of a literal atom. Numbers take their type from `hint` when it
/// is of the right kind.
pub(crate) fn constant(
    session: &mut Session<'_>,
    text: &str,
    loc: Loc,
    hint: Option<Idx>,
) -> Result<Constant, ErrorGuaranteed> {
    match text {
        "true" => return Ok(Constant::Bool(true)),
        "false" => return Ok(Constant::Bool(false)),
        _ => {}
    }
    if text.starts_with('"') {
        return match unquote(text) {
            Some(s) => Ok(Constant::Str(s)),
            None => Err(session.error(ErrorCode::UnterminatedStringLiteral, loc)),
        };
    }
    if let Some(spelled) = text.strip_prefix("#\\") {
        return char_literal(spelled)
            .map(Constant::Char)
            .ok_or_else(|| session.error_with(ErrorCode::InvalidChar, loc, &[text]));
    }
    if text.contains('.') {
        let ty = hint.filter(|&h| session.pool.is_float(h)).unwrap_or(Idx::FLOAT);
        return match text.parse::<f64>() {
            Ok(value) => Ok(Constant::Float { ty, value }),
            Err(_) => Err(session.error(ErrorCode::InvalidFloatingPointNumber, loc)),
        };
    }
    let ty = hint
        .filter(|&h| session.pool.is_integer(h) && h != Idx::BOOL)
        .unwrap_or(Idx::INT);
    match parse_integer(text) {
        Some(value) if fits(session, ty, value) => Ok(Constant::Int { ty, value }),
        _ => Err(session.error_with(ErrorCode::UnableToParseInteger, loc, &[text])),
    }
}

fn char_literal(spelled: &str) -> Option<u8> {
    if let Some(&(_, byte)) = CHAR_NAMES.iter().find(|(name, _)| *name == spelled) {
        return Some(byte);
    }
    match spelled.as_bytes() {
        [byte] if byte.is_ascii() => Some(*byte),
        _ => None,
    }
}

fn parse_integer(text: &str) -> Option<i128> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits.strip_prefix("0x") {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Whether `value` is representable in the integer type `ty`.
fn fits(session: &Session<'_>, ty: Idx, value: i128) -> bool {
    let Some((bits, signed)) = session.pool.int_info(ty) else {
        return false;
    };
    if bits >= 128 {
        return signed || value >= 0;
    }
    let bits = u32::from(bits);
    if signed {
        let max = (1i128 << (bits - 1)) - 1;
        (-max - 1..=max).contains(&value)
    } else {
        (0..(1i128 << bits)).contains(&value)
    }
}

/// `(EnumName element)`, if the head names an enum type.
pub(crate) fn enum_element(
    session: &mut Session<'_>,
    call: &FormCall,
) -> Result<Option<ParseResult>, ErrorGuaranteed> {
    let Some(ty) = enum_type(session, call.head) else {
        return Ok(None);
    };
    let value = enum_value(session, ty, call)?;
    let inst = Instruction::Const(Constant::Int { ty, value: i128::from(value) });
    let handle = session.emit_inst(call.block, inst);
    Ok(Some(ParseResult::new(call.block, ty, handle)))
}

/// Enum type bound to `name`, if any.
pub(crate) fn enum_type(session: &Session<'_>, name: Name) -> Option<Idx> {
    let ty = session.scope.lookup_type(name, &session.interner).ok()??;
    session.pool.enum_def_of(ty).map(|_| ty)
}

/// Value of the element named by `(EnumName element)`.
pub(crate) fn enum_value(
    session: &mut Session<'_>,
    ty: Idx,
    call: &FormCall,
) -> Result<i64, ErrorGuaranteed> {
    super::expect_args(session, call, 1)?;
    let element = super::expect_atom(session, call.args[0], "enum element")?;
    let value = session
        .pool
        .enum_def_of(ty)
        .and_then(|def| def.value(element));
    match value {
        Some(value) => Ok(value),
        None => {
            let loc = session.loc(call.args[0]);
            Err(session.type_error(TypeError::EnumValueDoesNotExist { element }, loc))
        }
    }
}

/// `(array v1 v2 ...)`: an array value. With an array type expected, the
/// element count must match it.
pub(crate) fn array(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_min_args(session, call, 1)?;
    let expected = call.hint.and_then(|hint| match *session.pool.data(hint) {
        dale_types::TypeData::Array { of, len } => Some((of, len)),
        _ => None,
    });
    if let Some((_, len)) = expected {
        let got = call.arg_count() as u64;
        if got != len {
            return Err(session.error_with(
                ErrorCode::IncorrectNumberOfArrayElements,
                call.loc,
                &[&got.to_string(), &len.to_string()],
            ));
        }
    }

    let mut block = call.block;
    let mut elem = expected.map(|(of, _)| of);
    let mut values: Vec<ValueHandle> = Vec::with_capacity(call.arg_count());
    for &arg in &call.args {
        let result = eval(session, ctx, block, arg, elem)?;
        block = result.block;
        match elem {
            Some(ty) if !dale_types::types_equal(ty, result.ty) => {
                let loc = session.loc(arg);
                let err = TypeError::IncorrectType { expected: ty, found: result.ty };
                return Err(session.type_error(err, loc));
            }
            Some(_) => {}
            None => elem = Some(result.ty),
        }
        values.push(result.value);
    }

    let elem = elem.unwrap_or(Idx::INT);
    let ty = session.pool.array(elem, values.len() as u64);
    let slot = session.emit_inst(block, Instruction::Alloca { ty });
    for (i, value) in values.into_iter().enumerate() {
        let index = session.emit_inst(
            block,
            Instruction::Const(Constant::Int {
                ty: Idx::SIZE,
                value: i as i128,
            }),
        );
        let ptr = session.emit_inst(block, Instruction::ElementPtr { base: slot, elem, index });
        session.emit_inst(block, Instruction::Store { ptr, value });
    }
    let value = session.emit_inst(block, Instruction::Load { ptr: slot, ty });
    Ok(ParseResult::new(block, ty, value))
}

/// Compile-time value of a global initialiser.
///
/// Literal atoms and enum elements only; anything else is reported as a
/// literal of type `expected` that cannot be parsed.
pub(crate) fn global_initialiser(
    session: &mut Session<'_>,
    node: NodeId,
    expected: Option<Idx>,
) -> Result<Constant, ErrorGuaranteed> {
    let loc = session.loc(node);
    let cannot_parse = |session: &mut Session<'_>| {
        let ty = expected.map_or_else(|| "\\".to_owned(), |ty| session.fmt_type(ty));
        session.error_with(ErrorCode::CannotParseLiteral, loc, &[&ty])
    };
    if let Some(text) = session.text(node) {
        if !is_literal(text) {
            return Err(cannot_parse(session));
        }
        return constant(session, text, loc, expected);
    }
    let head = session.arena.head(node);
    let ty = head.and_then(|head| enum_type(session, head));
    let (Some(head), Some(ty)) = (head, ty) else {
        return Err(cannot_parse(session));
    };
    let call = FormCall {
        node,
        head,
        args: session.arena.children(node)[1..].iter().copied().collect(),
        loc,
        block: BlockId::GLOBAL,
        flags: FormFlags::empty(),
        hint: expected,
    };
    let value = enum_value(session, ty, &call)?;
    Ok(Constant::Int { ty, value: i128::from(value) })
}

#[cfg(test)]
mod tests {
    use crate::{RecordingSink, Session, SessionConfig};
    use dale_diagnostic::ErrorCode;

    fn codes(source: &str) -> Vec<ErrorCode> {
        let mut sink = RecordingSink::new();
        let mut session = Session::new(SessionConfig::default(), &mut sink);
        let _ = session.process_source("literal.dt", source);
        session.diagnostics().peek().map(|d| d.code).collect()
    }

    #[test]
    fn literals_take_the_expected_type() {
        assert!(codes("(def f (fn intern uint8 (void) 200))").is_empty());
        assert!(codes("(def f (fn intern double (void) 1.5))").is_empty());
        assert!(codes("(def f (fn intern int64 (void) 0x7f))").is_empty());
        assert_eq!(
            codes("(def f (fn intern uint8 (void) 300))"),
            vec![ErrorCode::UnableToParseInteger]
        );
    }

    #[test]
    fn characters_and_strings() {
        assert!(codes("(def f (fn intern char (void) #\\a))").is_empty());
        assert!(codes("(def f (fn intern char (void) #\\NEWLINE))").is_empty());
        assert!(codes("(def f (fn intern (p (const char)) (void) \"hi\"))").is_empty());
        assert_eq!(
            codes("(def f (fn intern char (void) #\\bogus))"),
            vec![ErrorCode::InvalidChar]
        );
    }

    #[test]
    fn global_initialisers_are_constants() {
        assert_eq!(
            codes("(def y (var intern int 1)) (def x (var intern int y))"),
            vec![ErrorCode::CannotParseLiteral]
        );
        assert!(codes(
            "(def e (enum intern int (a b))) (def x (var intern e (e b)))"
        )
        .is_empty());
    }

    #[test]
    fn enum_elements() {
        assert_eq!(
            codes("(def e (enum intern int (a b))) (def f (fn intern e (void) (e c)))"),
            vec![ErrorCode::EnumValueDoesNotExist]
        );
    }

    #[test]
    fn array_literals() {
        assert_eq!(
            codes(
                "(def f (fn intern void (void)
                   (def xs (var auto (array-of 3 int) (array 1 2)))))"
            ),
            vec![ErrorCode::IncorrectNumberOfArrayElements]
        );
        assert_eq!(
            codes("(def f (fn intern void (void) (def xs (var auto \\ (array 1 true)))))"),
            vec![ErrorCode::IncorrectType]
        );
    }
}
