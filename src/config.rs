/// When [`Instance::solve_with_strategy`](crate::Instance::solve_with_strategy)
/// runs preprocessing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimpStrategy {
    /// Simplification is switched off as soon as the instance is created.
    Never,
    /// The first solve simplifies, then simplification is switched off.
    #[default]
    Once,
    /// Every solve simplifies.
    Always,
}

/// Tuning knobs for one solver instance.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Base of the Luby restart sequence, in conflicts.
    pub restart_base: usize,
    /// Variable activity decay; the bump grows by `1 / var_decay` per conflict.
    pub var_decay: f64,
    /// Clause activity decay, same convention as `var_decay`.
    pub clause_decay: f64,
    /// Initial learnt clause limit as a fraction of the original clauses.
    pub learnt_ratio: f64,
    /// Longest resolvent variable elimination may produce.
    pub elim_resolvent_limit: usize,
    /// Variables occurring in more clauses than this are not eliminated.
    pub elim_occurrence_limit: usize,
    pub simp_strategy: SimpStrategy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            restart_base: 100,
            var_decay: 0.95,
            clause_decay: 0.999,
            learnt_ratio: 1.0 / 3.0,
            elim_resolvent_limit: 20,
            elim_occurrence_limit: 64,
            simp_strategy: SimpStrategy::Once,
        }
    }
}
