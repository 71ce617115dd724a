//! One solver instance as seen by callers: literals are `±(var + 1)`,
//! every input is checked, and the model is only readable while it is
//! current.

mod build;
mod model;
mod preprocess;
mod solve;

use std::io::{self, BufWriter, Write};

use crate::{
    codec,
    config::{SimpStrategy, SolverConfig},
    error::{Error, Result},
    solver::{self, Solver, Stats},
    types::Lit,
};

pub struct Instance {
    solver: Solver,
    config: SolverConfig,
    strategy: SimpStrategy,
    simplified: bool,
    model_ready: bool,
    // converted literals of the current bulk call
    buffer: Vec<solver::Lit>,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl Instance {
    pub fn new() -> Self {
        Self::with_config(SolverConfig::default())
    }

    pub fn with_config(config: SolverConfig) -> Self {
        let strategy = config.simp_strategy;
        let mut solver = Solver::new(config.clone());
        if strategy == SimpStrategy::Never {
            solver.disable_simplification();
        }
        Self {
            solver,
            config,
            strategy,
            simplified: false,
            model_ready: false,
            buffer: vec![],
        }
    }

    /// Drops every variable, clause and statistic and starts over with the
    /// configuration the instance was created with.
    pub fn reset(&mut self) {
        *self = Self::with_config(self.config.clone());
    }

    pub fn n_vars(&self) -> usize {
        self.solver.num_vars()
    }

    pub fn n_clauses(&self) -> usize {
        self.solver.num_clauses()
    }

    pub fn n_learnts(&self) -> usize {
        self.solver.num_learnts()
    }

    /// False once the instance is known to be unsatisfiable regardless of
    /// assumptions. Never becomes true again.
    pub fn okay(&self) -> bool {
        self.solver.okay()
    }

    pub fn stats(&self) -> Stats {
        self.solver.stats()
    }

    pub fn decisions(&self) -> u64 {
        self.stats().decisions
    }

    pub fn propagations(&self) -> u64 {
        self.stats().propagations
    }

    pub fn conflicts(&self) -> u64 {
        self.stats().conflicts
    }

    /// Engine literal for an allocated variable.
    fn engine_lit(&self, lit: Lit) -> Result<solver::Lit> {
        let lit = codec::to_engine_lit(lit)?;
        if lit.var() as usize >= self.n_vars() {
            return Err(Error::InvalidArgument {
                literal: codec::from_engine_lit(lit),
                var_count: self.n_vars(),
            });
        }
        Ok(lit)
    }

    /// Engine variable behind a literal; the sign is ignored.
    fn engine_var(&self, lit: Lit) -> Result<solver::Var> {
        self.engine_lit(lit).map(|lit| lit.var())
    }

    /// Converts `lits` into `self.buffer` in one pass. Eliminated variables
    /// are refused since the engine no longer knows their clauses.
    fn load_buffer(&mut self, lits: &[Lit]) -> Result<()> {
        self.buffer.clear();
        self.buffer.try_reserve(lits.len())?;
        for &lit in lits {
            let lit = self.engine_lit(lit)?;
            if self.solver.is_eliminated(lit.var()) {
                return Err(Error::InvalidState("literal refers to an eliminated variable"));
            }
            self.buffer.push(lit);
        }
        Ok(())
    }

    /// Writes the problem clauses and fixed literals in DIMACS CNF.
    pub fn write_dimacs(&self, writer: &mut impl Write) -> io::Result<()> {
        let mut writer = BufWriter::new(writer);

        let fixed = self.solver.fixed();
        let clause_count = self.solver.clauses().count() + fixed.len();
        writeln!(writer, "p cnf {} {}", self.n_vars(), clause_count)?;

        for &lit in fixed {
            writeln!(writer, "{} 0", codec::from_engine_lit(lit))?;
        }
        for clause in self.solver.clauses() {
            for &lit in clause {
                write!(writer, "{} ", codec::from_engine_lit(lit))?;
            }
            writeln!(writer, "0")?;
        }
        writer.flush()
    }
}
