//! Argument-to-parameter coercion ranks for overload resolution.
//!
//! Lower is better. A call's candidate score is the sum of its per-argument
//! ranks; `Generic` and `Variadic` are assigned by the resolver itself
//! (untyped macro parameters and variadic tails), never by
//! [`coercion_rank`].

use crate::{Idx, Pool, TypeData};

/// How well an argument type fits a parameter type.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(u8)]
pub enum CoercionRank {
    /// Identical types.
    Exact = 0,
    /// `(p T)` → `(p (const T))`, `T` bound to `(ref T)`, any pointer → `(p void)`.
    Qualification = 1,
    /// Integer widening with the same signedness, float widening, `bool` → integer.
    Promotion = 2,
    /// Unsigned → strictly wider signed integer.
    SignChange = 3,
    /// Integer → float wide enough to represent it exactly.
    IntToFloat = 4,
    /// Untyped macro parameter.
    Generic = 5,
    /// Argument absorbed by a variadic tail.
    Variadic = 6,
}

impl CoercionRank {
    #[inline]
    pub const fn cost(self) -> u32 {
        self as u32
    }
}

/// Significand bits (implicit bit included) of a float width.
const fn exact_int_bits(float_bits: u8) -> u8 {
    match float_bits {
        32 => 24,
        64 => 53,
        _ => 113,
    }
}

/// Rank of passing a `from` argument to a `to` parameter, or `None` if the
/// argument is not accepted.
pub fn coercion_rank(pool: &Pool, from: Idx, to: Idx) -> Option<CoercionRank> {
    if from == to {
        return Some(CoercionRank::Exact);
    }

    match (pool.data(from), pool.data(to)) {
        // Binding a value to a reference parameter.
        (_, TypeData::Reference { to: target }) if *target == from => {
            Some(CoercionRank::Qualification)
        }
        (
            TypeData::Pointer {
                to: from_pointee,
                is_const: from_const,
            },
            TypeData::Pointer {
                to: to_pointee,
                is_const: to_const,
            },
        ) => {
            let keeps_const = !*from_const || *to_const;
            let adds_const = from_pointee == to_pointee && keeps_const;
            let to_void = to_pointee.is_void() && keeps_const;
            (adds_const || to_void).then_some(CoercionRank::Qualification)
        }
        (TypeData::Bool, _) if pool.is_integer(to) => Some(CoercionRank::Promotion),
        (TypeData::Float { bits: from_bits }, TypeData::Float { bits: to_bits })
            if to_bits > from_bits =>
        {
            Some(CoercionRank::Promotion)
        }
        (_, TypeData::Float { bits: to_bits }) => {
            let (bits, _) = pool.int_info(from)?;
            (bits <= exact_int_bits(*to_bits)).then_some(CoercionRank::IntToFloat)
        }
        _ => {
            let (from_bits, from_signed) = pool.int_info(from)?;
            let (to_bits, to_signed) = pool.int_info(to)?;
            if to_bits <= from_bits {
                None
            } else if from_signed == to_signed {
                Some(CoercionRank::Promotion)
            } else if !from_signed && to_signed {
                Some(CoercionRank::SignChange)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests;
