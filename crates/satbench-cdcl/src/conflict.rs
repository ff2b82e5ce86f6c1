//! Conflict analysis with 1-UIP resolution.

use crate::clause_db::{ClauseDatabase, ClauseRef};
use crate::decision::DecisionEngine;
use crate::trail::Trail;
use satbench_base::{Lit, Var};

/// A learned clause and where to go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// The learned clause. `learnt[0]` is the negated UIP; if there is a
    /// second literal, `learnt[1]` has the highest level among the rest.
    pub learnt: Vec<Lit>,
    /// Level to backtrack to; the learned clause is unit there.
    pub backtrack_level: u32,
    /// Number of distinct decision levels in `learnt`.
    pub lbd: u32,
}

/// Conflict analyzer.
#[derive(Debug, Clone)]
pub struct ConflictAnalyzer {
    /// Seen flags for variables.
    seen: Vec<bool>,
    /// Scratch space for LBD computation, indexed by level.
    level_marks: Vec<u32>,
    /// Stamp marking the current LBD computation in `level_marks`.
    stamp: u32,
}

impl ConflictAnalyzer {
    /// Creates a new conflict analyzer.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            seen: vec![false; num_vars],
            level_marks: vec![0; num_vars + 1],
            stamp: 0,
        }
    }

    /// Derives the first-UIP clause from a conflict at a decision level
    /// above 0.
    ///
    /// Every variable taking part in the resolution is bumped in
    /// `decision`, and every clause used is bumped in `db`.
    pub fn analyze(
        &mut self,
        conflict: ClauseRef,
        db: &mut ClauseDatabase,
        trail: &Trail,
        decision: &mut DecisionEngine,
    ) -> Analysis {
        let current_level = trail.decision_level();
        debug_assert!(current_level > 0);

        // Slot 0 is reserved for the UIP.
        let mut learnt = vec![Lit::new(Var::new(0), false)];
        let mut pending = 0usize;
        let mut index = trail.len();
        let mut clause = conflict;
        let mut resolved: Option<Lit> = None;

        loop {
            db.bump_activity(clause);
            for &q in db.lits(clause) {
                if Some(q) == resolved {
                    continue;
                }
                let var = q.var();
                if self.seen[var.index()] || trail.level(var) == 0 {
                    continue;
                }
                self.seen[var.index()] = true;
                decision.bump(var);
                if trail.level(var) == current_level {
                    pending += 1;
                } else {
                    learnt.push(q);
                }
            }

            // Walk back to the next marked literal of the current level.
            let p = loop {
                index -= 1;
                let lit = trail.lits()[index];
                if self.seen[lit.var().index()] {
                    break lit;
                }
            };
            self.seen[p.var().index()] = false;
            pending -= 1;
            if pending == 0 {
                learnt[0] = !p;
                break;
            }
            resolved = Some(p);
            match trail.reason(p.var()) {
                Some(reason) => clause = reason,
                // The decision is always the last marked literal of its level.
                None => {
                    learnt[0] = !p;
                    break;
                }
            }
        }

        for lit in &learnt[1..] {
            self.seen[lit.var().index()] = false;
        }

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            let mut best = 1;
            for i in 2..learnt.len() {
                if trail.level(learnt[i].var()) > trail.level(learnt[best].var()) {
                    best = i;
                }
            }
            learnt.swap(1, best);
            trail.level(learnt[1].var())
        };

        let lbd = self.lbd(&learnt, trail);
        Analysis {
            learnt,
            backtrack_level,
            lbd,
        }
    }

    /// Counts the distinct decision levels among `lits`.
    pub fn lbd(&mut self, lits: &[Lit], trail: &Trail) -> u32 {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.level_marks.iter_mut().for_each(|m| *m = 0);
            self.stamp = 1;
        }
        let mut count = 0;
        for lit in lits {
            let level = trail.level(lit.var()) as usize;
            if self.level_marks[level] != self.stamp {
                self.level_marks[level] = self.stamp;
                count += 1;
            }
        }
        count
    }
}
