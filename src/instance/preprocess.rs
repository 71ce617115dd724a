use crate::{error::Result, types::Lit};

use super::Instance;

impl Instance {
    /// Level-0 cleanup without search. Returns false iff it proves the
    /// instance unsatisfiable.
    pub fn simplify(&mut self) -> bool {
        self.solver.simplify()
    }

    /// Variable elimination. Frozen variables are kept; `turn_off_simp`
    /// switches preprocessing off for good.
    pub fn eliminate(&mut self, turn_off_simp: bool) -> bool {
        self.solver.eliminate(turn_off_simp)
    }

    pub fn set_frozen(&mut self, lit: Lit, frozen: bool) -> Result<()> {
        let var = self.engine_var(lit)?;
        self.solver.set_frozen(var, frozen);
        Ok(())
    }

    /// Protects the variable from elimination until [`Instance::thaw`].
    pub fn freeze(&mut self, lit: Lit) -> Result<()> {
        self.set_frozen(lit, true)
    }

    /// Unfreezes every frozen variable.
    pub fn thaw(&mut self) {
        self.solver.thaw();
    }

    pub fn is_frozen(&self, lit: Lit) -> Result<bool> {
        Ok(self.solver.is_frozen(self.engine_var(lit)?))
    }

    pub fn is_eliminated(&self, lit: Lit) -> Result<bool> {
        Ok(self.solver.is_eliminated(self.engine_var(lit)?))
    }
}

#[cfg(test)]
mod tests {
    use crate::{instance::Instance, types::LBool};

    fn chain() -> Instance {
        let mut instance = Instance::new();
        for _ in 0..4 {
            instance.new_var(LBool::Undef, true);
        }
        for clause in [[1, 2], [-2, 3], [-3, 4]] {
            instance.add_clause(&clause).unwrap();
        }
        instance
    }

    #[test]
    fn frozen_variables_survive() {
        let mut instance = chain();
        instance.freeze(-2).unwrap();
        assert_eq!(instance.is_frozen(2), Ok(true));
        assert!(instance.eliminate(false));
        assert_eq!(instance.is_eliminated(2), Ok(false));
        assert!(instance.solve(false, false));
    }

    #[test]
    fn thaw_reenables_elimination() {
        let mut instance = chain();
        for lit in 1..=4 {
            instance.freeze(lit).unwrap();
        }
        assert!(instance.eliminate(false));
        assert!((1..=4).all(|lit| instance.is_eliminated(lit) == Ok(false)));

        instance.thaw();
        assert_eq!(instance.is_frozen(3), Ok(false));
        assert!(instance.eliminate(false));
        assert!((1..=4).any(|lit| instance.is_eliminated(lit) == Ok(true)));
        assert!(instance.solve(false, false));
    }

    #[test]
    fn simplify_detects_contradiction() {
        let mut instance = chain();
        assert!(instance.simplify());
        // -4 propagates back to 1
        assert_eq!(instance.add_unit(-4), Ok(true));
        assert_eq!(instance.add_unit(-1), Ok(false));
        assert!(!instance.okay());
        assert!(!instance.simplify());
        assert!(!instance.eliminate(false));
    }
}
