//! Incremental CDCL engine driven by [`Instance`](crate::Instance).
//!
//! Variables and clauses can be added between calls to [`Solver::solve`];
//! the engine always returns to decision level 0 before handing control
//! back, so every public method may assume level 0 on entry.

mod assignment;
mod branching;
mod clause;
mod elim;
mod lit;
mod map;
mod restart;

use tracing::{debug, trace};

use crate::{config::SolverConfig, types::LBool};

use self::{
    assignment::{Assignment, Reason},
    branching::Evsids,
    clause::ClauseDb,
    elim::ElimEntry,
    map::{LitMap, VarMap},
    restart::Restarts,
};

pub use self::lit::{Lit, Var};

const MIN_LEARNT: f64 = 100.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
    pub restarts: u64,
}

enum SearchResult {
    Sat,
    Unsat,
    /// An assumption was falsified; the instance itself is still fine.
    Failed,
}

pub struct Solver {
    config: SolverConfig,

    clauses: ClauseDb,
    max_learnt: f64,

    assignment: Assignment,

    watched: LitMap<Vec<usize>>,
    prop_head: usize,

    evsids: Evsids,
    restarts: Restarts,

    polarity: VarMap<LBool>,
    decision: VarMap<bool>,
    frozen: VarMap<bool>,
    eliminated: VarMap<bool>,
    elim_stack: Vec<ElimEntry>,
    use_simplification: bool,

    seen: VarMap<bool>,
    ok: bool,
    model: Vec<LBool>,
    stats: Stats,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Solver {
            clauses: ClauseDb::new(config.clause_decay),
            max_learnt: MIN_LEARNT,
            assignment: Assignment::new(),
            watched: LitMap::new(0),
            prop_head: 0,
            evsids: Evsids::new(config.var_decay),
            restarts: Restarts::new(config.restart_base),
            polarity: VarMap::new(),
            decision: VarMap::new(),
            frozen: VarMap::new(),
            eliminated: VarMap::new(),
            elim_stack: vec![],
            use_simplification: true,
            seen: VarMap::new(),
            ok: true,
            model: vec![],
            stats: Stats::default(),
            config,
        }
    }

    pub fn num_vars(&self) -> usize {
        self.decision.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.original_count()
    }

    pub fn num_learnts(&self) -> usize {
        self.clauses.learnt_count()
    }

    pub fn okay(&self) -> bool {
        self.ok
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn new_var(&mut self, polarity: LBool, decision: bool) -> Var {
        let var = self.evsids.grow();
        self.assignment.grow();
        self.watched.grow();
        self.polarity.push(polarity);
        self.decision.push(decision);
        self.frozen.push(false);
        self.eliminated.push(false);
        self.seen.push(false);
        var
    }

    pub fn set_polarity(&mut self, var: Var, polarity: LBool) {
        self.polarity[var] = polarity;
    }

    pub fn set_decision_var(&mut self, var: Var, decision: bool) {
        self.decision[var] = decision;
    }

    pub fn set_frozen(&mut self, var: Var, frozen: bool) {
        self.frozen[var] = frozen;
    }

    pub fn is_frozen(&self, var: Var) -> bool {
        self.frozen[var]
    }

    /// Unfreezes every variable.
    pub fn thaw(&mut self) {
        for frozen in self.frozen.iter_mut() {
            *frozen = false;
        }
    }

    pub fn is_eliminated(&self, var: Var) -> bool {
        self.eliminated[var]
    }

    pub fn simplification_enabled(&self) -> bool {
        self.use_simplification
    }

    /// Turns preprocessing off for good.
    pub fn disable_simplification(&mut self) {
        self.use_simplification = false;
    }

    /// Adds a problem clause. Returns false if the instance became
    /// contradictory.
    pub fn add_clause(&mut self, lits: &[Lit]) -> bool {
        debug_assert_eq!(self.assignment.last_level(), 0);
        if !self.ok {
            return false;
        }

        let mut clause = lits.to_vec();
        clause.sort();
        clause.dedup();
        // x and !x end up next to each other
        if clause.windows(2).any(|pair| pair[0] == !pair[1]) {
            return true;
        }

        let mut kept = Vec::with_capacity(clause.len());
        for lit in clause {
            match self.assignment.eval(lit) {
                Some(true) => return true,
                Some(false) => (),
                None => kept.push(lit),
            }
        }

        match kept[..] {
            [] => self.ok = false,
            [lit] => {
                self.assignment.set(lit, Reason::Root);
                self.ok = self.propagate().is_none();
            }
            _ => {
                self.attach(kept, false);
            }
        }
        self.ok
    }

    fn attach(&mut self, clause: Vec<Lit>, learnt: bool) -> usize {
        let (lit0, lit1) = (clause[0], clause[1]);
        let i = self.clauses.push(clause, learnt);
        self.watched[lit0].push(i);
        self.watched[lit1].push(i);
        i
    }

    fn backtrack(&mut self, level: usize) {
        self.assignment.backtrack(level);
        self.prop_head = std::cmp::min(self.prop_head, self.assignment.trail().len());
    }

    fn propagate(&mut self) -> Option<usize> {
        while let Some(lit) = self.assignment.trail().get(self.prop_head) {
            let lit = !*lit;
            self.stats.propagations += 1;

            let mut i = 0;
            'clause: while i < self.watched[lit].len() {
                let c = self.watched[lit][i];
                if self.clauses[c].removed {
                    self.watched[lit].swap_remove(i);
                    continue;
                }
                let clause = &mut self.clauses[c].lits;

                // Uses "implicit" watches, i.e., the two watched literals
                // are always stored at index 0 and 1. (Borrowed from minisat.)

                if clause[1] != lit {
                    clause.swap(0, 1);
                }
                debug_assert_eq!(clause[1], lit);

                for j in 0..clause.len() {
                    match self.assignment.eval(clause[j]) {
                        Some(true) => {
                            i += 1;
                            continue 'clause;
                        }
                        None if j != 0 => {
                            clause.swap(1, j);
                            debug_assert_ne!(clause[0], clause[1]);

                            self.watched[lit].swap_remove(i);
                            debug_assert!(!self.watched[clause[1]].contains(&c));
                            self.watched[clause[1]].push(c);

                            continue 'clause;
                        }
                        _ => (),
                    }
                }

                if self.assignment.eval(clause[0]).is_none() {
                    // unit clause
                    let unit_lit = clause[0];
                    self.assignment
                        .set(unit_lit, Reason::Propagation { i_clause: c });
                } else {
                    // conflict
                    return Some(c);
                }

                i += 1;
            }

            self.prop_head += 1;
        }

        None
    }

    // based on minisat's basic clause minimization
    fn minimize(&self, learnt: &mut Vec<Lit>) {
        let mut i = 1;
        while i < learnt.len() {
            let var = learnt[i].var();
            if let Some(Reason::Propagation { i_clause }) = self.assignment.reason(var) {
                let remove = self.clauses[i_clause].lits.iter().all(|&lit| {
                    lit.var() == var
                        || self.seen[lit.var()]
                        || self.assignment.level(lit.var()) == Some(0)
                });
                if remove {
                    learnt.swap_remove(i);
                    continue;
                }
            }
            i += 1;
        }
    }

    /// First-UIP analysis. Returns the learnt clause, asserting literal first
    /// and the highest remaining level second, with the level to jump back to.
    fn analyze(&mut self, i_conflict: usize) -> (Vec<Lit>, usize) {
        let last_level = self.assignment.last_level();
        // slot 0 is filled with the asserting literal at the end
        let mut learnt = vec![Lit::from_code(0)];
        let mut pending = 0usize;
        let mut i_trail = self.assignment.trail().len();
        let mut i_clause = i_conflict;
        let mut on_lit: Option<Lit> = None;

        loop {
            self.clauses.touch(i_clause);

            for &lit in &self.clauses[i_clause].lits {
                if Some(lit) == on_lit {
                    continue;
                }
                let var = lit.var();
                let level = self.assignment.level(var).unwrap_or(0);
                if !self.seen[var] && level > 0 {
                    self.seen[var] = true;
                    self.evsids.touch(var);
                    if level >= last_level {
                        pending += 1;
                    } else {
                        learnt.push(lit);
                    }
                }
            }

            let lit = loop {
                i_trail -= 1;
                let lit = self.assignment.trail()[i_trail];
                if self.seen[lit.var()] {
                    break lit;
                }
            };
            self.seen[lit.var()] = false;
            pending -= 1;
            on_lit = Some(lit);

            if pending == 0 {
                learnt[0] = !lit;
                break;
            }

            i_clause = match self.assignment.reason(lit.var()) {
                Some(Reason::Propagation { i_clause }) => i_clause,
                reason => unreachable!("{lit:?} on the conflict side with reason {reason:?}"),
            };
        }

        let marked = learnt.clone();
        self.minimize(&mut learnt);
        for lit in &marked[1..] {
            self.seen[lit.var()] = false;
        }

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            let i_max = learnt[1..]
                .iter()
                .enumerate()
                .max_by_key(|(_, lit)| self.assignment.level(lit.var()))
                .map_or(1, |(i, _)| i + 1);
            learnt.swap(1, i_max);
            self.assignment.level(learnt[1].var()).unwrap_or(0)
        };

        self.evsids.rescale();
        self.clauses.rescale();

        (learnt, backtrack_level)
    }

    fn locked(&self, i_clause: usize) -> bool {
        let lit = self.clauses[i_clause].lits[0];
        self.assignment.eval(lit) == Some(true)
            && self.assignment.reason(lit.var()) == Some(Reason::Propagation { i_clause })
    }

    /// Drops the less active half of the removable learnt clauses.
    fn reduce_learnts(&mut self) {
        let mut candidates: Vec<usize> = self
            .clauses
            .iter()
            .filter(|(_, clause)| clause.learnt && clause.lits.len() > 2)
            .map(|(i, _)| i)
            .filter(|&i| !self.locked(i))
            .collect();
        candidates.sort_by(|&a, &b| {
            self.clauses[a]
                .activity
                .total_cmp(&self.clauses[b].activity)
        });

        let count = candidates.len() / 2;
        for &i in &candidates[..count] {
            self.clauses.remove(i);
        }
        trace!(removed = count, kept = self.clauses.learnt_count(), "reduced learnt clauses");
    }

    /// Compacts the clause database once enough clauses were removed.
    /// Only valid at level 0, where no reason refers to a clause.
    fn collect_garbage(&mut self) {
        debug_assert_eq!(self.assignment.last_level(), 0);
        if self.clauses.wasted() * 2 <= self.clauses.len() {
            return;
        }

        let wasted = self.clauses.wasted();
        self.clauses.compact();
        self.watched.clear();
        for i in 0..self.clauses.len() {
            let lits = &self.clauses[i].lits;
            let (lit0, lit1) = (lits[0], lits[1]);
            self.watched[lit0].push(i);
            self.watched[lit1].push(i);
        }
        trace!(wasted, live = self.clauses.len(), "collected clause garbage");
    }

    fn pick_branch_lit(&mut self) -> Option<Lit> {
        let var = self.evsids.choose(&self.assignment, &self.decision)?;
        let positive = match self.polarity[var] {
            LBool::True => true,
            LBool::False => false,
            LBool::Undef => self.assignment.saved_phase(var),
        };
        Some(Lit::new(var, positive))
    }

    fn search(&mut self, assumptions: &[Lit]) -> SearchResult {
        let mut restart = false;

        loop {
            if let Some(i_conflict) = self.propagate() {
                self.stats.conflicts += 1;
                self.restarts.on_conflict();

                if self.assignment.last_level() == 0 {
                    self.ok = false;
                    return SearchResult::Unsat;
                }

                let (learnt, level) = self.analyze(i_conflict);
                self.backtrack(level);

                let lit_assert = learnt[0];
                if learnt.len() == 1 {
                    self.assignment.set(lit_assert, Reason::Root);
                } else {
                    let i_clause = self.attach(learnt, true);
                    self.clauses.touch(i_clause);
                    self.assignment
                        .set(lit_assert, Reason::Propagation { i_clause });
                }

                restart |= self.restarts.due();
                continue;
            }

            if restart {
                restart = false;
                self.stats.restarts += 1;
                self.backtrack(0);
                trace!(
                    restarts = self.stats.restarts,
                    conflicts = self.stats.conflicts,
                    "restart"
                );
                continue;
            }

            let learnt_count = self.clauses.learnt_count() as f64;
            if learnt_count - self.assignment.trail().len() as f64 >= self.max_learnt {
                self.reduce_learnts();
                self.max_learnt *= 1.1;
            }

            let mut next = None;
            while self.assignment.last_level() < assumptions.len() {
                let lit = assumptions[self.assignment.last_level()];
                match self.assignment.eval(lit) {
                    Some(true) => self.assignment.new_level(),
                    Some(false) => return SearchResult::Failed,
                    None => {
                        next = Some(lit);
                        break;
                    }
                }
            }

            let lit = match next.or_else(|| self.pick_branch_lit()) {
                Some(lit) => lit,
                None => return SearchResult::Sat,
            };
            self.stats.decisions += 1;
            self.assignment.decide(lit);
        }
    }

    /// Searches for a model under `assumptions`.
    ///
    /// With `do_simp` the instance is preprocessed first, assumption variables
    /// frozen for the duration. `turn_off_simp` disables preprocessing for
    /// all later calls.
    pub fn solve(&mut self, assumptions: &[Lit], do_simp: bool, turn_off_simp: bool) -> bool {
        self.model.clear();
        if !self.ok {
            return false;
        }

        let mut ready = true;
        if do_simp {
            let mut thawed = vec![];
            for lit in assumptions {
                if !self.frozen[lit.var()] {
                    self.frozen[lit.var()] = true;
                    thawed.push(lit.var());
                }
            }
            ready = self.eliminate(turn_off_simp);
            for var in thawed {
                self.frozen[var] = false;
            }
        }
        if turn_off_simp {
            self.disable_simplification();
        }
        if !ready {
            return false;
        }

        self.collect_garbage();
        self.max_learnt =
            (self.clauses.original_count() as f64 * self.config.learnt_ratio).max(MIN_LEARNT);

        debug!(
            vars = self.num_vars(),
            clauses = self.num_clauses(),
            assumptions = assumptions.len(),
            "search started"
        );
        let result = self.search(assumptions);

        let sat = match result {
            SearchResult::Sat => {
                let model = (0..self.num_vars() as Var)
                    .map(|var| LBool::from(self.assignment.value(var)))
                    .collect();
                self.model = model;
                self.extend_model();
                true
            }
            SearchResult::Unsat | SearchResult::Failed => false,
        };
        self.backtrack(0);

        debug!(
            sat,
            okay = self.ok,
            decisions = self.stats.decisions,
            conflicts = self.stats.conflicts,
            learnts = self.num_learnts(),
            "search finished"
        );
        sat
    }

    /// Level-0 cleanup: propagates, removes satisfied clauses and strips
    /// false literals. Returns false if the instance is contradictory.
    pub fn simplify(&mut self) -> bool {
        debug_assert_eq!(self.assignment.last_level(), 0);
        if !self.ok {
            return false;
        }
        if self.propagate().is_some() {
            self.ok = false;
            return false;
        }

        for i in 0..self.clauses.len() {
            if self.clauses[i].removed {
                continue;
            }
            let lits = &self.clauses[i].lits;
            if lits.iter().any(|&lit| self.assignment.eval(lit) == Some(true)) {
                self.clauses.remove(i);
            } else if lits[2..]
                .iter()
                .any(|&lit| self.assignment.eval(lit) == Some(false))
            {
                // watched literals of a propagated, unsatisfied clause are unassigned
                let assignment = &self.assignment;
                self.clauses[i]
                    .lits
                    .retain(|&lit| assignment.eval(lit) != Some(false));
            }
        }

        self.collect_garbage();
        true
    }

    pub fn model(&self) -> &[LBool] {
        &self.model
    }

    pub fn model_value(&self, lit: Lit) -> LBool {
        match self.model.get(lit.var() as usize) {
            Some(&value) if lit.is_positive() => value,
            Some(&value) => !value,
            None => LBool::Undef,
        }
    }

    /// Live problem clauses.
    pub fn clauses(&self) -> impl Iterator<Item = &[Lit]> {
        self.clauses
            .iter()
            .filter(|(_, clause)| !clause.learnt)
            .map(|(_, clause)| clause.lits.as_slice())
    }

    /// Literals fixed at level 0.
    pub fn fixed(&self) -> &[Lit] {
        self.assignment.trail()
    }
}

pub fn verify(clauses: &[Vec<Lit>], model: &[LBool]) -> bool {
    clauses.iter().all(|clause| {
        clause.iter().any(|&lit| {
            let value = model.get(lit.var() as usize).copied().unwrap_or_default();
            if lit.is_positive() {
                value == LBool::True
            } else {
                value == LBool::False
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::{verify, Lit, Solver};
    use crate::{config::SolverConfig, types::LBool};

    fn lit(dimacs: i32) -> Lit {
        Lit::new(dimacs.unsigned_abs() - 1, dimacs > 0)
    }

    fn load(clauses: &[Vec<i32>]) -> (Solver, Vec<Vec<Lit>>) {
        let var_count = clauses.iter().flatten().map(|l| l.unsigned_abs()).max().unwrap_or(0);
        let mut solver = Solver::new(SolverConfig::default());
        for _ in 0..var_count {
            solver.new_var(LBool::Undef, true);
        }
        let clauses: Vec<Vec<Lit>> = clauses
            .iter()
            .map(|clause| clause.iter().map(|&l| lit(l)).collect())
            .collect();
        for clause in &clauses {
            solver.add_clause(clause);
        }
        (solver, clauses)
    }

    fn check(clauses: Vec<Vec<i32>>, sat: bool) {
        for do_simp in [false, true] {
            let (mut solver, lits) = load(&clauses);
            assert_eq!(solver.solve(&[], do_simp, false), sat);
            if sat {
                assert!(verify(&lits, solver.model()));
            }
        }
    }

    #[test]
    /// Formulas from the lecture.
    fn basic_sat() {
        let clauses = vec![vec![1, 2], vec![-1, 2], vec![-1, -2, 3], vec![-1, -2, -3]];
        check(clauses, true);

        let clauses = vec![
            vec![-1, -2, 3],
            vec![2, -1, 3],
            vec![1, -2, 3],
            vec![-3, 4, 5],
            vec![-3, 4, -5],
            vec![-3, -4, 5],
            vec![-3, -4, -5],
        ];
        check(clauses, true);
    }

    #[test]
    fn basic_unsat() {
        let clauses = vec![
            vec![1, 2],
            vec![-2, 3],
            vec![-2, -3],
            vec![-1, -2, -4],
            vec![-1, 2, -4],
            vec![-1, 2, 4],
        ];

        check(clauses, false);
    }

    #[test]
    /// Formulas with non-trivial propagation before the first decision.
    fn kickstart() {
        let (solver, _) = load(&[vec![1], vec![-1, 2], vec![-1, -2]]);
        assert!(!solver.okay());
    }

    #[test]
    fn pigeonhole_is_unsat() {
        // 4 pigeons, 3 holes; p(i, h) = 3 * i + h + 1
        let p = |i: i32, h: i32| 3 * i + h + 1;
        let mut clauses = vec![];
        for i in 0..4 {
            clauses.push((0..3).map(|h| p(i, h)).collect());
        }
        for h in 0..3 {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    clauses.push(vec![-p(i, h), -p(j, h)]);
                }
            }
        }
        check(clauses, false);
    }

    #[test]
    fn assumptions_are_transient() {
        let (mut solver, _) = load(&[vec![1, 2], vec![-1, 3]]);

        assert!(!solver.solve(&[lit(-2), lit(-3)], false, false));
        assert!(solver.okay());
        assert!(solver.solve(&[lit(-2)], false, false));
        assert_eq!(solver.model_value(lit(1)), LBool::True);
        assert_eq!(solver.model_value(lit(3)), LBool::True);
        assert!(solver.solve(&[], false, false));
    }

    #[test]
    fn contradictory_assumptions() {
        let (mut solver, _) = load(&[vec![1, 2]]);
        assert!(!solver.solve(&[lit(1), lit(-1)], false, false));
        assert!(solver.okay());
    }

    #[test]
    fn polarity_hint_steers_free_variables() {
        let mut solver = Solver::new(SolverConfig::default());
        let a = solver.new_var(LBool::True, true);
        let b = solver.new_var(LBool::False, true);
        assert!(solver.solve(&[], false, false));
        assert_eq!(solver.model_value(Lit::new(a, true)), LBool::True);
        assert_eq!(solver.model_value(Lit::new(b, true)), LBool::False);
    }

    #[test]
    fn non_decision_variables_stay_unassigned() {
        let mut solver = Solver::new(SolverConfig::default());
        let a = solver.new_var(LBool::Undef, false);
        assert!(solver.solve(&[], false, false));
        assert_eq!(solver.model_value(Lit::new(a, true)), LBool::Undef);
    }

    #[test]
    fn simplify_removes_satisfied_clauses() {
        let (mut solver, _) = load(&[vec![1, 2], vec![-1, 2, 3], vec![2, 3, 4]]);
        assert!(solver.add_clause(&[lit(1)]));
        assert_eq!(solver.num_clauses(), 3);
        assert!(solver.simplify());
        assert_eq!(solver.num_clauses(), 2);
        let stripped: Vec<usize> = solver.clauses().map(|clause| clause.len()).collect();
        assert_eq!(stripped, vec![2, 3]);
        assert!(solver.solve(&[], false, false));
    }

    #[test]
    fn elimination_respects_frozen_variables() {
        let (mut solver, lits) = load(&[vec![1, 2], vec![-2, 3], vec![-3, 4], vec![-4, 1, 5]]);
        solver.set_frozen(1, true);
        assert!(solver.eliminate(false));
        assert!(!solver.is_eliminated(1));
        assert!((0..5).any(|var| solver.is_eliminated(var)));

        assert!(solver.solve(&[], false, false));
        assert!(verify(&lits, solver.model()));
    }

    #[test]
    fn elimination_can_be_turned_off() {
        let (mut solver, _) = load(&[vec![1, 2], vec![-2, 3]]);
        assert!(solver.eliminate(true));
        assert!(!solver.simplification_enabled());
        let before: Vec<bool> = (0..3).map(|var| solver.is_eliminated(var)).collect();
        assert!(solver.solve(&[], true, false));
        let after: Vec<bool> = (0..3).map(|var| solver.is_eliminated(var)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn many_conflicts() {
        // chain of xors forcing conflicts during search, small enough to stay fast
        let mut clauses = vec![];
        let n = 12;
        for i in 1..n {
            let (a, b, c) = (i, i + 1, n + i);
            clauses.push(vec![-a, -b, -c]);
            clauses.push(vec![a, b, -c]);
            clauses.push(vec![a, -b, c]);
            clauses.push(vec![-a, b, c]);
        }
        clauses.push(vec![1]);
        clauses.push(vec![-n]);
        check(clauses, true);
    }
}
