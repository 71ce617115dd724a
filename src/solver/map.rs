use std::ops::{Index, IndexMut};

use super::lit::{Lit, Var};

/// Dense per-variable storage, grown one variable at a time.
pub struct VarMap<T>(Vec<T>);

impl<T> VarMap<T> {
    pub fn new() -> Self {
        Self(vec![])
    }

    pub fn push(&mut self, value: T) {
        self.0.push(value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.0.iter_mut()
    }
}

impl<T> Index<Var> for VarMap<T> {
    type Output = T;

    fn index(&self, index: Var) -> &Self::Output {
        &self.0[index as usize]
    }
}

impl<T> IndexMut<Var> for VarMap<T> {
    fn index_mut(&mut self, index: Var) -> &mut Self::Output {
        &mut self.0[index as usize]
    }
}

/// Dense per-literal storage; both polarities of a variable are adjacent.
pub struct LitMap<T>(Vec<T>);

impl<T: Default> LitMap<T> {
    pub fn new(var_count: usize) -> Self {
        let mut map = Self(vec![]);
        for _ in 0..var_count {
            map.grow();
        }
        map
    }

    /// Adds the slots of one more variable.
    pub fn grow(&mut self) {
        self.0.push(T::default());
        self.0.push(T::default());
    }

    pub fn clear(&mut self) {
        for slot in &mut self.0 {
            *slot = T::default();
        }
    }
}

impl<T> Index<Lit> for LitMap<T> {
    type Output = T;

    fn index(&self, index: Lit) -> &Self::Output {
        &self.0[index.index()]
    }
}

impl<T> IndexMut<Lit> for LitMap<T> {
    fn index_mut(&mut self, index: Lit) -> &mut Self::Output {
        &mut self.0[index.index()]
    }
}
