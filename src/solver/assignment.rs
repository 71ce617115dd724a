use super::{
    lit::{Lit, Var},
    map::VarMap,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    Decision,
    /// Fixed at level 0; no clause needs to be kept as its explanation.
    Root,
    Propagation { i_clause: usize },
}

#[derive(Clone)]
struct VarData {
    value: bool,
    level: usize,
    reason: Reason,
}

pub struct Assignment {
    data: VarMap<Option<VarData>>,
    phase: VarMap<bool>,
    trail: Vec<Lit>,
    levels: Vec<usize>,
}

impl Assignment {
    pub fn new() -> Self {
        Self {
            data: VarMap::new(),
            phase: VarMap::new(),
            trail: vec![],
            levels: vec![],
        }
    }

    /// Makes room for one more variable.
    pub fn grow(&mut self) {
        self.data.push(None);
        self.phase.push(false);
    }

    pub fn eval(&self, lit: Lit) -> Option<bool> {
        self.data[lit.var()]
            .as_ref()
            .map(|data| data.value == lit.is_positive())
    }

    pub fn value(&self, var: Var) -> Option<bool> {
        self.data[var].as_ref().map(|data| data.value)
    }

    pub fn set(&mut self, lit: Lit, reason: Reason) {
        self.trail.push(lit);

        if let Reason::Decision = reason {
            self.levels.push(self.trail.len() - 1);
        }

        let level = self.last_level();
        let data = VarData {
            value: lit.is_positive(),
            level,
            reason: if level == 0 { Reason::Root } else { reason },
        };
        self.data[lit.var()] = Some(data);
    }

    pub fn decide(&mut self, lit: Lit) {
        self.set(lit, Reason::Decision);
    }

    /// Opens a decision level without a decision, used for assumptions
    /// that already hold.
    pub fn new_level(&mut self) {
        self.levels.push(self.trail.len());
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    pub fn level(&self, var: Var) -> Option<usize> {
        self.data[var].as_ref().map(|data| data.level)
    }

    pub fn reason(&self, var: Var) -> Option<Reason> {
        self.data[var].as_ref().map(|data| data.reason)
    }

    pub fn last_level(&self) -> usize {
        self.levels.len()
    }

    /// Last value the variable had before it was unassigned.
    pub fn saved_phase(&self, var: Var) -> bool {
        self.phase[var]
    }

    /// Revert all changes above `level`; `level` itself is kept.
    pub fn backtrack(&mut self, level: usize) {
        if level >= self.levels.len() {
            return;
        }
        let i = self.levels[level];
        self.levels.truncate(level);
        for lit in self.trail.drain(i..) {
            self.phase[lit.var()] = lit.is_positive();
            self.data[lit.var()] = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Assignment, Lit, Reason};

    fn assignment(var_count: usize) -> Assignment {
        let mut ass = Assignment::new();
        for _ in 0..var_count {
            ass.grow();
        }
        ass
    }

    #[test]
    fn basic() {
        let mut ass = assignment(2);

        assert_eq!(ass.last_level(), 0);

        ass.decide(Lit::new(0, true));
        ass.set(Lit::new(1, false), Reason::Propagation { i_clause: 0 });

        assert_eq!(ass.last_level(), 1);
        assert_eq!(ass.level(0), Some(1));
        assert_eq!(ass.level(1), Some(1));
        assert_eq!(ass.eval(Lit::new(1, true)), Some(false));
        assert_eq!(ass.reason(1), Some(Reason::Propagation { i_clause: 0 }));

        ass.backtrack(0);
        assert_eq!(ass.eval(Lit::new(1, true)), None);
        assert_eq!(ass.eval(Lit::new(0, true)), None);
        assert!(ass.saved_phase(0));
        assert!(!ass.saved_phase(1));
    }

    #[test]
    fn root_facts_drop_their_reason() {
        let mut ass = assignment(1);
        ass.set(Lit::new(0, true), Reason::Propagation { i_clause: 7 });
        assert_eq!(ass.reason(0), Some(Reason::Root));
        assert_eq!(ass.level(0), Some(0));
    }

    #[test]
    fn empty_levels() {
        let mut ass = assignment(3);

        ass.new_level();
        ass.decide(Lit::new(0, true));
        ass.new_level();
        ass.decide(Lit::new(1, false));
        assert_eq!(ass.last_level(), 4);
        assert_eq!(ass.level(1), Some(4));

        ass.backtrack(2);
        assert_eq!(ass.last_level(), 2);
        assert_eq!(ass.value(0), Some(true));
        assert_eq!(ass.value(1), None);

        ass.backtrack(5);
        assert_eq!(ass.last_level(), 2);
    }
}
