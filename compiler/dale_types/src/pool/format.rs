//! Type formatting in source syntax, for diagnostics.

use dale_ir::StringInterner;

use crate::{Idx, Pool, TypeData};

impl Pool {
    /// Format a type the way it would be written in source.
    pub fn format_type(&self, idx: Idx, interner: &StringInterner) -> String {
        let mut buf = String::new();
        self.format_type_into(idx, interner, &mut buf);
        buf
    }

    /// Format a parameter list as space-separated types (`"int bool"`).
    pub fn format_params(&self, params: &[Idx], interner: &StringInterner) -> String {
        if params.is_empty() {
            return "void".to_owned();
        }
        let mut buf = String::new();
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                buf.push(' ');
            }
            self.format_type_into(param, interner, &mut buf);
        }
        buf
    }

    pub fn format_type_into(&self, idx: Idx, interner: &StringInterner, buf: &mut String) {
        if idx.is_none() {
            buf.push_str("<none>");
            return;
        }
        match self.data(idx) {
            TypeData::Void => buf.push_str("void"),
            TypeData::Bool => buf.push_str("bool"),
            TypeData::Char => buf.push_str("char"),
            TypeData::Int { bits: 32, signed } => buf.push_str(if *signed { "int" } else { "uint" }),
            TypeData::Int { bits, signed } => {
                buf.push_str(if *signed { "int" } else { "uint" });
                buf.push_str(&bits.to_string());
            }
            TypeData::Float { bits: 32 } => buf.push_str("float"),
            TypeData::Float { bits: 64 } => buf.push_str("double"),
            TypeData::Float { bits } => {
                buf.push_str("float");
                buf.push_str(&bits.to_string());
            }
            TypeData::Pointer { to, is_const } => {
                buf.push_str("(p ");
                if *is_const {
                    buf.push_str("(const ");
                    self.format_type_into(*to, interner, buf);
                    buf.push(')');
                } else {
                    self.format_type_into(*to, interner, buf);
                }
                buf.push(')');
            }
            TypeData::Reference { to } => {
                buf.push_str("(ref ");
                self.format_type_into(*to, interner, buf);
                buf.push(')');
            }
            TypeData::Array { of, len } => {
                buf.push_str("(array-of ");
                buf.push_str(&len.to_string());
                buf.push(' ');
                self.format_type_into(*of, interner, buf);
                buf.push(')');
            }
            TypeData::Struct { name } | TypeData::Enum { name } => {
                buf.push_str(interner.lookup(*name));
            }
            TypeData::Function {
                params,
                variadic,
                ret,
            } => {
                buf.push_str("(fn ");
                self.format_type_into(*ret, interner, buf);
                buf.push_str(" (");
                buf.push_str(&self.format_params(params, interner));
                if *variadic {
                    buf.push_str(" ...");
                }
                buf.push_str("))");
            }
        }
    }
}
