//! Conversion between caller literals and the engine's packed literals.
//!
//! Callers speak DIMACS-style literals: `var + 1` for the variable, its
//! negation for the complement. The engine packs the sign into the lowest
//! bit, so `2 * var` is positive and `2 * var + 1` negative.

use crate::{
    error::{Error, Result},
    solver,
    types::Lit,
};

pub fn encode(var: solver::Var, positive: bool) -> solver::Lit {
    solver::Lit::new(var, positive)
}

/// Splits a caller literal into its variable and sign.
///
/// `0` is not a literal, and neither is `i32::MIN`, which has no negation.
pub fn decode(lit: Lit) -> Result<(solver::Var, bool)> {
    if lit == 0 || lit == Lit::MIN {
        return Err(Error::InvalidLiteral(lit));
    }
    Ok((lit.unsigned_abs() - 1, lit > 0))
}

pub fn to_engine_lit(lit: Lit) -> Result<solver::Lit> {
    let (var, positive) = decode(lit)?;
    Ok(encode(var, positive))
}

pub fn from_engine_lit(lit: solver::Lit) -> Lit {
    let magnitude = lit.var() as Lit + 1;
    if lit.is_positive() {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{decode, encode, from_engine_lit, to_engine_lit};
    use crate::error::Error;

    #[test]
    fn packing() {
        assert_eq!(encode(0, true).code(), 0);
        assert_eq!(encode(0, false).code(), 1);
        assert_eq!(encode(5, true).code(), 10);
        assert_eq!(encode(5, false).code(), 11);

        assert_eq!(decode(1), Ok((0, true)));
        assert_eq!(decode(-1), Ok((0, false)));
        assert_eq!(decode(6), Ok((5, true)));
        assert_eq!(to_engine_lit(-6).map(|lit| lit.code()), Ok(11));
    }

    #[test]
    fn zero_is_rejected() {
        assert_eq!(decode(0), Err(Error::InvalidLiteral(0)));
        assert_eq!(to_engine_lit(0), Err(Error::InvalidLiteral(0)));
        assert_eq!(decode(i32::MIN), Err(Error::InvalidLiteral(i32::MIN)));
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(var in 0u32..(i32::MAX as u32), positive in any::<bool>()) {
            let lit = from_engine_lit(encode(var, positive));
            prop_assert_eq!(decode(lit), Ok((var, positive)));
        }

        #[test]
        fn caller_literals_survive_the_engine(
            lit in any::<i32>().prop_filter("nonzero", |&l| l != 0 && l != i32::MIN),
        ) {
            let packed = to_engine_lit(lit).unwrap();
            prop_assert_eq!(packed.code(), 2 * (lit.unsigned_abs() - 1) + (lit < 0) as u32);
            prop_assert_eq!(from_engine_lit(packed), lit);
        }
    }
}
