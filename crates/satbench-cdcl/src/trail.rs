//! Assignment trail.
//!
//! The trail is the chronological record of every assigned literal, split
//! into decision-level segments. Together with the per-variable reason
//! references it *is* the implication graph: conflict analysis walks trail
//! positions and clause references, never pointers.

use crate::clause_db::ClauseRef;
use satbench_base::{Lit, Model, Var};

/// Outcome of [`Trail::push`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Push {
    /// The literal was unassigned and is now true.
    Assigned,
    /// The literal was already true.
    AlreadyTrue,
    /// The variable is assigned the opposite way.
    Contradiction,
}

/// Per-variable assignment data.
#[derive(Debug, Clone, Copy)]
struct VarData {
    value: Option<bool>,
    level: u32,
    reason: Option<ClauseRef>,
    position: usize,
}

impl Default for VarData {
    fn default() -> Self {
        Self {
            value: None,
            level: 0,
            reason: None,
            position: usize::MAX,
        }
    }
}

/// The assignment and its trail.
#[derive(Debug, Clone)]
pub struct Trail {
    vars: Vec<VarData>,
    /// Assigned literals in assignment order.
    lits: Vec<Lit>,
    /// Trail position at which each decision level above 0 starts.
    level_starts: Vec<usize>,
    /// Next trail position to propagate.
    head: usize,
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            vars: vec![VarData::default(); num_vars],
            lits: Vec::with_capacity(num_vars),
            level_starts: Vec::new(),
            head: 0,
        }
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// The current decision level.
    #[must_use]
    pub fn decision_level(&self) -> u32 {
        self.level_starts.len() as u32
    }

    /// Opens a new decision level.
    pub fn new_decision_level(&mut self) {
        self.level_starts.push(self.lits.len());
    }

    /// Makes `lit` true at the current decision level.
    pub fn push(&mut self, lit: Lit, reason: Option<ClauseRef>) -> Push {
        let data = &mut self.vars[lit.var().index()];
        match data.value {
            Some(v) if v == lit.is_positive() => Push::AlreadyTrue,
            Some(_) => Push::Contradiction,
            None => {
                *data = VarData {
                    value: Some(lit.is_positive()),
                    level: self.level_starts.len() as u32,
                    reason,
                    position: self.lits.len(),
                };
                self.lits.push(lit);
                Push::Assigned
            }
        }
    }

    /// Unassigns every literal above `level`, newest first, reporting each
    /// one to `on_unassign`.
    pub fn backtrack_to(&mut self, level: u32, mut on_unassign: impl FnMut(Lit)) {
        let Some(&start) = self.level_starts.get(level as usize) else {
            return;
        };
        while self.lits.len() > start {
            let Some(lit) = self.lits.pop() else { break };
            self.vars[lit.var().index()] = VarData::default();
            on_unassign(lit);
        }
        self.level_starts.truncate(level as usize);
        self.head = self.head.min(start);
    }

    /// The next literal whose consequences have not been propagated yet.
    pub fn next_to_propagate(&mut self) -> Option<Lit> {
        let lit = self.lits.get(self.head).copied()?;
        self.head += 1;
        Some(lit)
    }

    /// Marks everything as propagated (used when propagation stops on a
    /// conflict).
    pub fn skip_propagation(&mut self) {
        self.head = self.lits.len();
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.head < self.lits.len()
    }

    /// Truth value of `lit`, `None` if unassigned.
    #[must_use]
    pub fn value(&self, lit: Lit) -> Option<bool> {
        self.vars[lit.var().index()]
            .value
            .map(|v| v != lit.is_negative())
    }

    #[must_use]
    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit) == Some(true)
    }

    #[must_use]
    pub fn is_false(&self, lit: Lit) -> bool {
        self.value(lit) == Some(false)
    }

    #[must_use]
    pub fn is_assigned(&self, var: Var) -> bool {
        self.vars[var.index()].value.is_some()
    }

    /// Decision level at which `var` was assigned.
    #[must_use]
    pub fn level(&self, var: Var) -> u32 {
        self.vars[var.index()].level
    }

    /// The clause that implied `var`; `None` for decisions and level-0 units.
    #[must_use]
    pub fn reason(&self, var: Var) -> Option<ClauseRef> {
        self.vars[var.index()].reason
    }

    /// Trail position of an assigned variable.
    #[must_use]
    pub fn position(&self, var: Var) -> Option<usize> {
        let data = &self.vars[var.index()];
        data.value.map(|_| data.position)
    }

    /// Assigned literals in assignment order.
    #[must_use]
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    /// The current assignment as a model. Unassigned variables read `false`.
    #[must_use]
    pub fn model(&self) -> Model {
        Model::new(self.vars.iter().map(|d| d.value.unwrap_or(false)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(l: i64) -> Lit {
        Lit::from_dimacs(l).unwrap()
    }

    #[test]
    fn test_push_detects_contradiction() {
        let mut trail = Trail::new(2);
        assert_eq!(trail.push(lit(1), None), Push::Assigned);
        assert_eq!(trail.push(lit(1), None), Push::AlreadyTrue);
        assert_eq!(trail.push(lit(-1), None), Push::Contradiction);
        assert!(trail.is_true(lit(1)));
        assert!(trail.is_false(lit(-1)));
        assert_eq!(trail.value(lit(2)), None);
    }

    #[test]
    fn test_backtrack_unassigns_in_reverse_order() {
        let mut trail = Trail::new(4);
        let _ = trail.push(lit(1), None);
        trail.new_decision_level();
        let _ = trail.push(lit(2), None);
        let _ = trail.push(lit(-3), None);
        trail.new_decision_level();
        let _ = trail.push(lit(4), None);
        assert_eq!(trail.decision_level(), 2);
        assert_eq!(trail.level(lit(3).var()), 1);
        assert_eq!(trail.position(lit(4).var()), Some(3));

        let mut popped = Vec::new();
        trail.backtrack_to(0, |l| popped.push(l.to_dimacs()));
        assert_eq!(popped, vec![4, -3, 2]);
        assert_eq!(trail.decision_level(), 0);
        assert_eq!(trail.lits(), &[lit(1)]);
        assert!(!trail.is_assigned(lit(2).var()));
        assert_eq!(trail.position(lit(2).var()), None);
    }

    #[test]
    fn test_propagation_head_rewinds_on_backtrack() {
        let mut trail = Trail::new(3);
        let _ = trail.push(lit(1), None);
        assert_eq!(trail.next_to_propagate(), Some(lit(1)));
        trail.new_decision_level();
        let _ = trail.push(lit(2), None);
        assert_eq!(trail.next_to_propagate(), Some(lit(2)));
        assert_eq!(trail.next_to_propagate(), None);
        trail.backtrack_to(0, |_| {});
        assert!(!trail.has_pending());
        let _ = trail.push(lit(3), None);
        assert_eq!(trail.next_to_propagate(), Some(lit(3)));
    }

    #[test]
    fn test_backtrack_to_current_level_is_noop() {
        let mut trail = Trail::new(2);
        trail.new_decision_level();
        let _ = trail.push(lit(1), None);
        trail.backtrack_to(1, |_| panic!("nothing to unassign"));
        assert!(trail.is_true(lit(1)));
    }
}
