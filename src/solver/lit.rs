use std::{fmt, ops::Not};

/// Zero-based variable index.
pub type Var = u32;

/// Packed literal: the variable in the upper bits, the sign in the lowest one.
///
/// `2 * var` is the positive literal, `2 * var + 1` its negation.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn new(var: Var, positive: bool) -> Self {
        Self(var << 1 | (!positive) as u32)
    }

    pub fn from_code(code: u32) -> Self {
        Self(code)
    }

    pub fn code(self) -> u32 {
        self.0
    }

    pub fn var(self) -> Var {
        self.0 >> 1
    }

    pub fn is_positive(self) -> bool {
        self.0 & 1 == 0
    }

    pub(super) fn index(self) -> usize {
        self.0 as usize
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Self::Output {
        Self(self.0 ^ 1)
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_positive() {
            write!(f, "x{}", self.var())
        } else {
            write!(f, "!x{}", self.var())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Lit;

    #[test]
    fn packing() {
        let lit = Lit::new(3, true);
        assert_eq!(lit.code(), 6);
        assert_eq!((!lit).code(), 7);
        assert_eq!((!lit).var(), 3);
        assert!(!(!lit).is_positive());
        assert_eq!(!!lit, lit);
    }
}
