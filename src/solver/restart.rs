use std::iter::Peekable;

struct Luby {
    base: usize,
    uv: (isize, isize),
}

impl Luby {
    fn new(base: usize) -> Self {
        Self { base, uv: (1, 1) }
    }
}

impl Iterator for Luby {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let (u, v) = self.uv;
        // Based on Knuth's formula, see https://oeis.org/A182105.
        self.uv = if u & -u == v { (u + 1, 1) } else { (u, 2 * v) };
        Some(self.base * v as usize)
    }
}

/// Counts conflicts against the Luby sequence.
pub struct Restarts {
    conflicts: usize,
    threshold: Peekable<Luby>,
}

impl Restarts {
    pub fn new(base: usize) -> Self {
        Self {
            conflicts: 0,
            threshold: Luby::new(base.max(1)).peekable(),
        }
    }

    pub fn on_conflict(&mut self) {
        self.conflicts += 1;
    }

    /// Returns true once enough conflicts have been seen; the next interval
    /// starts right away.
    pub fn due(&mut self) -> bool {
        let limit = self.threshold.peek().copied().unwrap_or(usize::MAX);
        if self.conflicts >= limit {
            self.conflicts = 0;
            self.threshold.next();
            true
        } else {
            false
        }
    }
}
