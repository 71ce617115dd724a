use std::cmp::Ordering;

use super::{assignment::Assignment, lit::Var, map::VarMap};

#[derive(Clone, Copy, PartialEq)]
struct OrdF64(f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

struct VarHeap<T> {
    heap: Vec<(T, Var)>,
    index: Vec<usize>,
    size: usize,
}

impl<T: Ord + Copy> VarHeap<T> {
    fn new() -> Self {
        Self {
            heap: vec![],
            index: vec![],
            size: 0,
        }
    }

    /// Inserts the next variable; callers keep the heap fully restored.
    fn push(&mut self, val: T) -> Var {
        debug_assert_eq!(self.size, self.heap.len());
        let var = self.index.len() as Var;
        self.index.push(self.heap.len());
        self.heap.push((val, var));
        self.size += 1;
        self.sift_up(self.size - 1);
        var
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.index.swap(self.heap[i].1 as usize, self.heap[j].1 as usize);
    }

    fn sift_up(&mut self, mut pos: usize) {
        while pos > 0 {
            let parent = (pos - 1) / 2;
            if self.heap[pos].0 <= self.heap[parent].0 {
                break;
            }
            self.swap(pos, parent);
            pos = parent;
        }
    }

    fn sift_down(&mut self, mut pos: usize) {
        loop {
            let mut max = pos;
            let left = 2 * pos + 1;
            if left < self.size && self.heap[left].0 > self.heap[max].0 {
                max = left;
            }
            let right = left + 1;
            if right < self.size && self.heap[right].0 > self.heap[max].0 {
                max = right;
            }

            if max != pos {
                self.swap(pos, max);
                pos = max;
            } else {
                break;
            }
        }
    }

    fn set(&mut self, var: Var, val: T) {
        let pos = self.index[var as usize];
        self.heap[pos] = (val, var);

        if pos < self.size {
            self.sift_up(pos);
            self.sift_down(pos);
        }
    }

    fn get(&self, var: Var) -> T {
        self.heap[self.index[var as usize]].0
    }

    /// Applies `f` to every value in the heap.
    /// The supplied function must preserve the ordering of the items!
    fn transform(&mut self, mut f: impl FnMut(T) -> T) {
        for (val, _) in &mut self.heap {
            *val = f(*val);
        }
    }

    fn max(&self) -> Option<Var> {
        if self.size != 0 {
            Some(self.heap[0].1)
        } else {
            None
        }
    }

    fn extract(&mut self) -> Option<Var> {
        if self.size != 0 {
            let var = self.heap[0].1;
            self.swap(0, self.size - 1);
            self.size -= 1;
            self.sift_down(0);
            Some(var)
        } else {
            None
        }
    }

    fn restore(&mut self) -> Option<Var> {
        if self.size != self.heap.len() {
            self.size += 1;
            let var = self.heap[self.size - 1].1;
            self.sift_up(self.size - 1);
            Some(var)
        } else {
            None
        }
    }
}

/// Exponential VSIDS: bumped variables gain `bump`, which grows after every
/// conflict instead of decaying all activities.
pub struct Evsids {
    bump: f64,
    growth: f64,
    heap: VarHeap<OrdF64>,
}

impl Evsids {
    pub fn new(decay: f64) -> Self {
        Self {
            bump: 1.0,
            growth: 1.0 / decay,
            heap: VarHeap::new(),
        }
    }

    pub fn grow(&mut self) -> Var {
        self.heap.push(OrdF64(0.0))
    }

    #[cfg(test)]
    pub fn activity(&self, var: Var) -> f64 {
        self.heap.get(var).0
    }

    pub fn touch(&mut self, var: Var) {
        let val = self.heap.get(var);
        self.heap.set(var, OrdF64(val.0 + self.bump));
    }

    pub fn rescale(&mut self) {
        self.bump *= self.growth;

        const THRESHOLD: f64 = 1e100;
        if self.bump > THRESHOLD {
            self.heap
                .transform(|OrdF64(val)| OrdF64(val / THRESHOLD));
            self.bump /= THRESHOLD;
        }
    }

    /// Most active unassigned variable that may be branched on.
    pub fn choose(&mut self, assignment: &Assignment, decision: &VarMap<bool>) -> Option<Var> {
        let mut res = None;

        while let Some(var) = self.heap.max() {
            if decision[var] && assignment.value(var).is_none() {
                res = Some(var);
                break;
            }
            self.heap.extract();
        }
        while self.heap.restore().is_some() {}

        res
    }
}
