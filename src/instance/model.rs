use crate::{
    codec,
    error::{Error, Result},
    types::{LBool, Lit},
};

use super::Instance;

impl Instance {
    fn check_model(&self) -> Result<()> {
        if self.model_ready {
            Ok(())
        } else {
            Err(Error::InvalidState(
                "no model: the last solve was not satisfiable or the instance changed since",
            ))
        }
    }

    /// Value of `lit` (not just its variable) in the current model.
    pub fn model_value(&self, lit: Lit) -> Result<LBool> {
        self.check_model()?;
        let lit = self.engine_lit(lit)?;
        Ok(self.solver.model_value(lit))
    }

    /// Like [`Instance::model_value`], but an unassigned literal is an error.
    pub fn value(&self, lit: Lit) -> Result<bool> {
        match self.model_value(lit)? {
            LBool::True => Ok(true),
            LBool::False => Ok(false),
            LBool::Undef => Err(Error::InvalidState("literal is unassigned in the model")),
        }
    }

    /// The whole model, 1-based: entry `i` holds variable `i - 1`, entry `0`
    /// is unused. Unassigned variables read as false.
    pub fn get_model(&self) -> Result<Vec<bool>> {
        self.check_model()?;
        let size = self.n_vars() + 1;
        let mut model = Vec::new();
        model.try_reserve_exact(size)?;
        model.push(false);
        model.extend(
            (0..self.n_vars() as u32)
                .map(|var| self.solver.model_value(codec::encode(var, true)).is_true()),
        );
        Ok(model)
    }
}
