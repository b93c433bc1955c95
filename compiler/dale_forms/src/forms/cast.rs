//! `(cast value type)`.

use dale_diagnostic::ErrorGuaranteed;
use dale_types::check_cast;

use super::{eval, expect_args};
use crate::sink::Instruction;
use crate::{FormCall, FunctionContext, ParseResult, Session};

pub(crate) fn cast(
    session: &mut Session<'_>,
    ctx: &mut FunctionContext,
    call: &FormCall,
) -> Result<ParseResult, ErrorGuaranteed> {
    expect_args(session, call, 2)?;
    let to = session.parse_type(call.args[1])?;
    let value = eval(session, ctx, call.block, call.args[0], None)?;
    if let Err(err) = check_cast(&session.pool, value.ty, to) {
        return Err(session.type_error(err, call.loc));
    }
    if value.ty == to {
        return Ok(ParseResult::new(value.block, to, value.value));
    }
    let cast = session.emit_inst(
        value.block,
        Instruction::Cast {
            value: value.value,
            from: value.ty,
            to,
        },
    );
    Ok(ParseResult::new(value.block, to, cast))
}
