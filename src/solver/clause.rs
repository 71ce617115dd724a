use std::ops::{Index, IndexMut};

use super::lit::Lit;

pub struct ClauseData {
    pub lits: Vec<Lit>,
    pub learnt: bool,
    pub removed: bool,
    pub activity: f64,
}

/// Clause storage addressed by stable indices.
///
/// Removal only marks a clause; indices stay valid until [`ClauseDb::compact`].
pub struct ClauseDb {
    clauses: Vec<ClauseData>,
    original: usize,
    learnt: usize,
    removed: usize,
    bump: f64,
    growth: f64,
}

impl ClauseDb {
    pub fn new(decay: f64) -> Self {
        Self {
            clauses: vec![],
            original: 0,
            learnt: 0,
            removed: 0,
            bump: 1.0,
            growth: 1.0 / decay,
        }
    }

    pub fn push(&mut self, lits: Vec<Lit>, learnt: bool) -> usize {
        debug_assert!(lits.len() >= 2);
        if learnt {
            self.learnt += 1;
        } else {
            self.original += 1;
        }
        let i = self.clauses.len();
        self.clauses.push(ClauseData {
            lits,
            learnt,
            removed: false,
            activity: 0.0,
        });
        i
    }

    /// Marks the clause removed and hands back its literals.
    pub fn remove(&mut self, i_clause: usize) -> Vec<Lit> {
        let clause = &mut self.clauses[i_clause];
        debug_assert!(!clause.removed);
        clause.removed = true;
        if clause.learnt {
            self.learnt -= 1;
        } else {
            self.original -= 1;
        }
        self.removed += 1;
        std::mem::take(&mut clause.lits)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn original_count(&self) -> usize {
        self.original
    }

    pub fn learnt_count(&self) -> usize {
        self.learnt
    }

    /// Live clauses with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ClauseData)> {
        self.clauses
            .iter()
            .enumerate()
            .filter(|(_, clause)| !clause.removed)
    }

    pub fn touch(&mut self, i_clause: usize) {
        let clause = &mut self.clauses[i_clause];
        if !clause.learnt {
            return;
        }
        clause.activity += self.bump;

        const THRESHOLD: f64 = 1e20;
        if clause.activity > THRESHOLD {
            for clause in &mut self.clauses {
                clause.activity /= THRESHOLD;
            }
            self.bump /= THRESHOLD;
        }
    }

    pub fn rescale(&mut self) {
        self.bump *= self.growth;
    }

    pub fn wasted(&self) -> usize {
        self.removed
    }

    /// Drops removed clauses. Every index handed out before is invalidated.
    pub fn compact(&mut self) {
        self.clauses.retain(|clause| !clause.removed);
        self.removed = 0;
    }
}

impl Index<usize> for ClauseDb {
    type Output = ClauseData;

    fn index(&self, index: usize) -> &Self::Output {
        &self.clauses[index]
    }
}

impl IndexMut<usize> for ClauseDb {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.clauses[index]
    }
}
