//! Bounded variable elimination.
//!
//! A variable is eliminated by replacing every clause it occurs in with all
//! non-tautological resolvents on it, as long as that does not grow the
//! clause database. The removed clauses are kept so that models can be
//! extended to the eliminated variables afterwards.

use tracing::debug;

use crate::types::LBool;

use super::{
    lit::{Lit, Var},
    map::LitMap,
    Solver,
};

pub struct ElimEntry {
    var: Var,
    clauses: Vec<Vec<Lit>>,
}

/// Resolvent of `a` and `b` on `var`, or `None` if it is a tautology.
fn resolve(a: &[Lit], b: &[Lit], var: Var) -> Option<Vec<Lit>> {
    let mut resolvent: Vec<Lit> = a.iter().copied().filter(|lit| lit.var() != var).collect();
    for &lit in b {
        if lit.var() == var || resolvent.contains(&lit) {
            continue;
        }
        if resolvent.contains(&!lit) {
            return None;
        }
        resolvent.push(lit);
    }
    Some(resolvent)
}

impl Solver {
    /// Simplifies and, unless preprocessing was turned off, eliminates
    /// variables. `turn_off` disables preprocessing afterwards.
    pub fn eliminate(&mut self, turn_off: bool) -> bool {
        if !self.simplify() {
            return false;
        }
        if !self.use_simplification {
            return true;
        }

        let ok = self.eliminate_vars();
        if turn_off {
            self.disable_simplification();
        }
        ok
    }

    fn eliminate_vars(&mut self) -> bool {
        let mut occurs: LitMap<Vec<usize>> = LitMap::new(self.num_vars());
        let mut learnt_occurs: LitMap<Vec<usize>> = LitMap::new(self.num_vars());
        for (i, clause) in self.clauses.iter() {
            let target = if clause.learnt {
                &mut learnt_occurs
            } else {
                &mut occurs
            };
            for &lit in &clause.lits {
                target[lit].push(i);
            }
        }

        let mut candidates: Vec<Var> = (0..self.num_vars() as Var)
            .filter(|&var| !self.frozen[var] && !self.eliminated[var])
            .filter(|&var| self.assignment.value(var).is_none())
            .collect();
        candidates.sort_by_key(|&var| {
            occurs[Lit::new(var, true)].len() * occurs[Lit::new(var, false)].len()
        });

        let clauses_before = self.num_clauses();
        let mut eliminated = 0;
        for var in candidates {
            if self.assignment.value(var).is_some() {
                continue;
            }

            let live = |lit: Lit| -> Vec<usize> {
                occurs[lit]
                    .iter()
                    .copied()
                    .filter(|&i| !self.clauses[i].removed)
                    .collect()
            };
            let pos = live(Lit::new(var, true));
            let neg = live(Lit::new(var, false));
            let occurrences = pos.len() + neg.len();
            if occurrences == 0 || occurrences > self.config.elim_occurrence_limit {
                continue;
            }

            let mut resolvents = vec![];
            let mut fits = true;
            'outer: for &p in &pos {
                for &n in &neg {
                    let resolvent = resolve(&self.clauses[p].lits, &self.clauses[n].lits, var);
                    if let Some(resolvent) = resolvent {
                        if resolvents.len() == occurrences
                            || resolvent.len() > self.config.elim_resolvent_limit
                        {
                            fits = false;
                            break 'outer;
                        }
                        resolvents.push(resolvent);
                    }
                }
            }
            if !fits {
                continue;
            }

            let removed = pos
                .into_iter()
                .chain(neg)
                .map(|i| self.clauses.remove(i))
                .collect();
            self.elim_stack.push(ElimEntry {
                var,
                clauses: removed,
            });
            self.eliminated[var] = true;
            self.decision[var] = false;
            eliminated += 1;

            // learnts on `var` must not propagate once its clauses are gone
            let pos = Lit::new(var, true);
            for i in learnt_occurs[pos].iter().chain(&learnt_occurs[!pos]) {
                if !self.clauses[*i].removed {
                    self.clauses.remove(*i);
                }
            }

            for resolvent in resolvents {
                let first = self.clauses.len();
                if !self.add_clause(&resolvent) {
                    debug!(var, "elimination derived a contradiction");
                    return false;
                }
                if self.clauses.len() > first {
                    for &lit in &self.clauses[first].lits {
                        occurs[lit].push(first);
                    }
                }
            }
        }

        debug!(
            eliminated,
            clauses_before,
            clauses_after = self.num_clauses(),
            "variable elimination finished"
        );
        true
    }

    /// Assigns the eliminated variables so that their removed clauses hold.
    /// Later eliminations are undone first.
    pub(super) fn extend_model(&mut self) {
        for entry in self.elim_stack.iter().rev() {
            let var = entry.var;
            let positive = Lit::new(var, true);
            let needs_true = entry.clauses.iter().any(|clause| {
                clause.contains(&positive)
                    && !clause
                        .iter()
                        .any(|&lit| lit.var() != var && model_eval(&self.model, lit))
            });
            self.model[var as usize] = LBool::from(needs_true);
        }
    }
}

fn model_eval(model: &[LBool], lit: Lit) -> bool {
    let value = model[lit.var() as usize];
    if lit.is_positive() {
        value == LBool::True
    } else {
        value == LBool::False
    }
}
