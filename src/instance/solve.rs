use crate::{config::SimpStrategy, error::Result, types::Lit};

use super::Instance;

impl Instance {
    /// Solves without assumptions. See [`Instance::solve_assuming`].
    pub fn solve(&mut self, do_simp: bool, turn_off_simp: bool) -> bool {
        self.model_ready = false;
        self.buffer.clear();
        self.finish_solve(do_simp, turn_off_simp)
    }

    /// Solves with every literal in `assumptions` forced true for this call
    /// only. Returns true iff a model was found; it stays readable until the
    /// next variable, clause or solve.
    ///
    /// `do_simp` runs preprocessing first. `turn_off_simp` switches
    /// preprocessing off for every later call, whatever their flags say.
    pub fn solve_assuming(
        &mut self,
        assumptions: &[Lit],
        do_simp: bool,
        turn_off_simp: bool,
    ) -> Result<bool> {
        self.model_ready = false;
        self.load_buffer(assumptions)?;
        Ok(self.finish_solve(do_simp, turn_off_simp))
    }

    fn finish_solve(&mut self, do_simp: bool, turn_off_simp: bool) -> bool {
        let sat = self.solver.solve(&self.buffer, do_simp, turn_off_simp);
        self.model_ready = sat;
        sat
    }

    /// Solves under `assumptions`, choosing the preprocessing flags from the
    /// configured [`SimpStrategy`].
    pub fn solve_with_strategy(&mut self, assumptions: &[Lit]) -> Result<bool> {
        let (do_simp, turn_off_simp) = match self.strategy {
            SimpStrategy::Never => (false, false),
            SimpStrategy::Once => (!self.simplified, !self.simplified),
            SimpStrategy::Always => (true, false),
        };
        let sat = self.solve_assuming(assumptions, do_simp, turn_off_simp)?;
        self.simplified = true;
        Ok(sat)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::{SimpStrategy, SolverConfig},
        error::Error,
        instance::Instance,
        types::LBool,
    };

    fn instance(var_count: usize, clauses: &[&[i32]]) -> Instance {
        let mut instance = Instance::new();
        for _ in 0..var_count {
            instance.new_var(LBool::Undef, true);
        }
        for clause in clauses {
            instance.add_clause(clause).unwrap();
        }
        instance
    }

    #[test]
    fn empty_instance_is_sat() {
        let mut instance = Instance::new();
        assert!(instance.solve(true, false));
        assert_eq!(instance.get_model(), Ok(vec![false]));
    }

    #[test]
    fn forced_variable() {
        let mut instance = instance(3, &[&[1, 2, 3], &[-1], &[-2]]);
        assert!(instance.solve(true, false));
        assert_eq!(instance.model_value(3), Ok(LBool::True));
        assert_eq!(instance.model_value(-3), Ok(LBool::False));
        assert_eq!(instance.get_model(), Ok(vec![false, false, false, true]));
    }

    #[test]
    fn assumptions_do_not_persist() {
        let mut instance = instance(2, &[&[1, 2]]);

        assert_eq!(instance.solve_assuming(&[-1], false, false), Ok(true));
        assert_eq!(instance.model_value(2), Ok(LBool::True));
        assert_eq!(instance.model_value(1), Ok(LBool::False));

        assert_eq!(instance.solve_assuming(&[-1, -2], false, false), Ok(false));
        assert!(instance.okay());

        assert_eq!(instance.solve_assuming(&[-2], false, false), Ok(true));
        assert_eq!(instance.model_value(1), Ok(LBool::True));
        assert!(instance.solve(false, false));
        assert_eq!(instance.n_clauses(), 1);
    }

    #[test]
    fn eliminated_assumptions_are_refused() {
        let mut instance = instance(3, &[&[1, 2], &[-1, 3]]);
        instance.freeze(2).unwrap();
        instance.freeze(3).unwrap();
        assert!(instance.eliminate(false));
        assert_eq!(instance.is_eliminated(1), Ok(true));
        assert_eq!(
            instance.solve_assuming(&[1], false, false),
            Err(Error::InvalidState("literal refers to an eliminated variable"))
        );
        assert_eq!(instance.solve_assuming(&[-2], true, false), Ok(true));
        assert_eq!(instance.model_value(3), Ok(LBool::True));
    }

    #[test]
    fn assumptions_survive_preprocessing() {
        // x2 only occurs positively and would be eliminated without the assumption
        let mut instance = instance(3, &[&[1, 2], &[-1, 3], &[2, 3]]);
        assert_eq!(instance.solve_assuming(&[-2], true, false), Ok(true));
        assert_eq!(instance.is_eliminated(2), Ok(false));
        assert_eq!(instance.model_value(2), Ok(LBool::False));
        assert_eq!(instance.is_frozen(2), Ok(false));
    }

    #[test]
    fn turning_simplification_off_is_sticky() {
        let mut instance = instance(3, &[&[1, 2], &[-2, 3]]);
        instance.freeze(1).unwrap();
        instance.freeze(2).unwrap();
        instance.freeze(3).unwrap();
        assert!(instance.solve(false, true));

        instance.thaw();
        assert!(instance.solve(true, false));
        assert!(instance.eliminate(false));
        for lit in 1..=3 {
            assert_eq!(instance.is_eliminated(lit), Ok(false));
        }
    }

    #[test]
    fn strategies() {
        for strategy in [SimpStrategy::Never, SimpStrategy::Once, SimpStrategy::Always] {
            let config = SolverConfig {
                simp_strategy: strategy,
                ..Default::default()
            };
            let mut instance = Instance::with_config(config);
            for _ in 0..4 {
                instance.new_var(LBool::Undef, true);
            }
            instance.freeze(4).unwrap();
            instance.add_clause(&[1, 2]).unwrap();
            instance.add_clause(&[-2, 3]).unwrap();
            instance.add_clause(&[-3, 4]).unwrap();

            assert_eq!(instance.solve_with_strategy(&[]), Ok(true));
            let eliminated = (1..=3).any(|lit| instance.is_eliminated(lit) == Ok(true));
            assert_eq!(eliminated, strategy != SimpStrategy::Never);

            assert_eq!(instance.solve_with_strategy(&[-4]), Ok(true));
            assert_eq!(instance.model_value(4), Ok(LBool::False));
        }
    }
}
