use crate::{
    codec,
    error::Result,
    types::{LBool, Lit},
};

use super::Instance;

impl Instance {
    /// Allocates the next variable and returns its positive literal.
    ///
    /// `polarity` is only a branching hint; `decision` controls whether the
    /// search may branch on the variable at all.
    pub fn new_var(&mut self, polarity: LBool, decision: bool) -> Lit {
        self.model_ready = false;
        let var = self.solver.new_var(polarity, decision);
        codec::from_engine_lit(codec::encode(var, true))
    }

    pub fn set_polarity(&mut self, lit: Lit, polarity: LBool) -> Result<()> {
        let var = self.engine_var(lit)?;
        self.solver.set_polarity(var, polarity);
        Ok(())
    }

    pub fn set_decision_var(&mut self, lit: Lit, decision: bool) -> Result<()> {
        let var = self.engine_var(lit)?;
        self.solver.set_decision_var(var, decision);
        Ok(())
    }

    /// Adds a clause. `Ok(false)` means the instance is now contradictory;
    /// `Ok(true)` only means no contradiction was found yet.
    ///
    /// The clause is rejected unchanged if any literal is invalid.
    pub fn add_clause(&mut self, lits: &[Lit]) -> Result<bool> {
        self.load_buffer(lits)?;
        self.model_ready = false;
        Ok(self.solver.add_clause(&self.buffer))
    }

    pub fn add_unit(&mut self, lit: Lit) -> Result<bool> {
        self.add_clause(&[lit])
    }

    pub fn add_binary(&mut self, lit1: Lit, lit2: Lit) -> Result<bool> {
        self.add_clause(&[lit1, lit2])
    }

    pub fn add_ternary(&mut self, lit1: Lit, lit2: Lit, lit3: Lit) -> Result<bool> {
        self.add_clause(&[lit1, lit2, lit3])
    }
}
