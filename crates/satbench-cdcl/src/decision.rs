//! Decision engine for variable selection.
//!
//! Variables wait in an indexed binary max-heap ordered by VSIDS activity,
//! ties broken by the lower variable index. Assigned variables are removed
//! lazily when they surface at the top; unassigned ones are re-inserted on
//! backtrack.

use crate::heuristics::VsidsScores;
use crate::trail::Trail;
use satbench_base::{Lit, Var};

/// Sentinel position for variables that are not in the heap.
const NOT_IN_HEAP: usize = usize::MAX;

/// Indexed binary heap of variables.
#[derive(Debug, Clone)]
pub struct VarHeap {
    heap: Vec<Var>,
    /// Position of each variable in `heap`, or `NOT_IN_HEAP`.
    position: Vec<usize>,
}

impl VarHeap {
    /// Creates a heap holding every variable, ordered by `scores`.
    #[must_use]
    pub fn new(scores: &[f64]) -> Self {
        let mut heap = Self {
            heap: Vec::with_capacity(scores.len()),
            position: vec![NOT_IN_HEAP; scores.len()],
        };
        for var in (0..).map(Var::new).take(scores.len()) {
            heap.insert(var, scores);
        }
        heap
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[must_use]
    pub fn contains(&self, var: Var) -> bool {
        self.position[var.index()] != NOT_IN_HEAP
    }

    /// Inserts `var` if absent.
    pub fn insert(&mut self, var: Var, scores: &[f64]) {
        if self.contains(var) {
            return;
        }
        self.position[var.index()] = self.heap.len();
        self.heap.push(var);
        self.swim(self.heap.len() - 1, scores);
    }

    /// Restores the heap order after `var`'s score increased.
    pub fn increased(&mut self, var: Var, scores: &[f64]) {
        let pos = self.position[var.index()];
        if pos != NOT_IN_HEAP {
            self.swim(pos, scores);
        }
    }

    /// Removes and returns the best variable.
    pub fn pop(&mut self, scores: &[f64]) -> Option<Var> {
        let top = *self.heap.first()?;
        let last = self.heap.pop()?;
        self.position[top.index()] = NOT_IN_HEAP;
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.position[last.index()] = 0;
            self.sink(0, scores);
        }
        Some(top)
    }

    /// Rebuilds the order from scratch (after a rescale, or to check it).
    pub fn rebuild(&mut self, scores: &[f64]) {
        for pos in (0..self.heap.len() / 2).rev() {
            self.sink(pos, scores);
        }
    }

    /// Whether `a` must come out before `b`.
    fn before(a: Var, b: Var, scores: &[f64]) -> bool {
        let (sa, sb) = (scores[a.index()], scores[b.index()]);
        sa > sb || (sa == sb && a < b)
    }

    fn swim(&mut self, mut pos: usize, scores: &[f64]) {
        let var = self.heap[pos];
        while pos > 0 {
            let parent_pos = (pos - 1) / 2;
            let parent = self.heap[parent_pos];
            if !Self::before(var, parent, scores) {
                break;
            }
            self.heap[pos] = parent;
            self.position[parent.index()] = pos;
            pos = parent_pos;
        }
        self.heap[pos] = var;
        self.position[var.index()] = pos;
    }

    fn sink(&mut self, mut pos: usize, scores: &[f64]) {
        let var = self.heap[pos];
        loop {
            let left = 2 * pos + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let child_pos = if right < self.heap.len()
                && Self::before(self.heap[right], self.heap[left], scores)
            {
                right
            } else {
                left
            };
            let child = self.heap[child_pos];
            if !Self::before(child, var, scores) {
                break;
            }
            self.heap[pos] = child;
            self.position[child.index()] = pos;
            pos = child_pos;
        }
        self.heap[pos] = var;
        self.position[var.index()] = pos;
    }
}

/// Picks decision literals: VSIDS order for the variable, saved phase for
/// the polarity.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    /// Activity scores.
    pub vsids: VsidsScores,
    /// Priority queue for unassigned variables.
    queue: VarHeap,
    /// Last value held by each variable.
    phase: Vec<bool>,
}

impl DecisionEngine {
    /// Creates a new decision engine from initial activities.
    #[must_use]
    pub fn new(vsids: VsidsScores, initial_phase: bool) -> Self {
        let queue = VarHeap::new(vsids.scores());
        let phase = vec![initial_phase; vsids.scores().len()];
        Self {
            vsids,
            queue,
            phase,
        }
    }

    /// Bumps `var` and keeps the queue ordered.
    pub fn bump(&mut self, var: Var) {
        if self.vsids.bump(var) {
            self.queue.rebuild(self.vsids.scores());
        } else {
            self.queue.increased(var, self.vsids.scores());
        }
    }

    /// Decays all activities; called once per conflict after the bump pass.
    pub fn decay(&mut self) {
        self.vsids.decay();
    }

    /// Records that `lit` was unassigned: saves its phase and makes its
    /// variable eligible again.
    pub fn on_unassign(&mut self, lit: Lit) {
        let var = lit.var();
        self.phase[var.index()] = lit.is_positive();
        self.queue.insert(var, self.vsids.scores());
    }

    /// Picks the next decision literal.
    ///
    /// Returns `None` if all variables are assigned.
    pub fn pick(&mut self, trail: &Trail) -> Option<Lit> {
        while let Some(var) = self.queue.pop(self.vsids.scores()) {
            if !trail.is_assigned(var) {
                return Some(var.lit(self.phase[var.index()]));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pop_all(heap: &mut VarHeap, scores: &[f64]) -> Vec<u32> {
        std::iter::from_fn(|| heap.pop(scores))
            .map(|v| v.index() as u32)
            .collect()
    }

    #[test]
    fn test_heap_orders_by_score_then_index() {
        let scores = [1.0, 3.0, 1.0, 2.0, 3.0];
        let mut heap = VarHeap::new(&scores);
        assert_eq!(pop_all(&mut heap, &scores), vec![1, 4, 3, 0, 2]);
        assert!(heap.is_empty());
    }

    #[test]
    fn test_heap_increase_and_reinsert() {
        let mut scores = vec![0.0; 4];
        let mut heap = VarHeap::new(&scores);
        assert_eq!(heap.pop(&scores), Some(Var::new(0)));
        scores[3] = 5.0;
        heap.increased(Var::new(3), &scores);
        heap.insert(Var::new(0), &scores);
        heap.insert(Var::new(0), &scores);
        assert_eq!(heap.len(), 4);
        assert_eq!(pop_all(&mut heap, &scores), vec![3, 0, 1, 2]);
    }

    #[test]
    fn test_pick_skips_assigned_and_uses_phase() {
        let mut vsids = VsidsScores::new(3, 0.95);
        vsids.set(Var::new(0), 2.0);
        vsids.set(Var::new(1), 1.0);
        let mut engine = DecisionEngine::new(vsids, true);
        let mut trail = Trail::new(3);
        let _ = trail.push(Var::new(0).positive(), None);

        engine.on_unassign(Var::new(1).negative());
        assert_eq!(engine.pick(&trail), Some(Var::new(1).negative()));
        assert_eq!(engine.pick(&trail), Some(Var::new(2).positive()));
        assert_eq!(engine.pick(&trail), None);
    }
}
