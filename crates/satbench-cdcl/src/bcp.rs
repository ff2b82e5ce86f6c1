//! Boolean Constraint Propagation (BCP).
//!
//! Uses two watched literals per clause. A clause is only visited when one of
//! its watches becomes false; the visit either finds the clause satisfied,
//! moves the watch to another non-false literal, implies the other watch, or
//! reports a conflict. Watches are never restored on backtrack.

use crate::clause_db::{ClauseDatabase, ClauseRef};
use crate::trail::{Push, Trail};
use satbench_base::Lit;

/// Result of BCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BcpResult {
    /// No conflict, propagation complete.
    Ok,
    /// Conflict detected in the given clause.
    Conflict(ClauseRef),
}

/// A watched literal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watch {
    /// The clause being watched.
    pub clause: ClauseRef,
    /// Some literal of the clause; if it is true the clause is skipped
    /// without being read.
    pub blocker: Lit,
}

/// Watched literal data structure.
#[derive(Debug, Clone)]
pub struct WatchedLiterals {
    /// For each literal, the clauses watching it.
    watches: Vec<Vec<Watch>>,
}

impl WatchedLiterals {
    /// Creates a new watched literals structure.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        // 2 * num_vars for positive and negative literals
        Self {
            watches: vec![Vec::new(); num_vars * 2],
        }
    }

    /// Adds a watch for a literal.
    pub fn add_watch(&mut self, lit: Lit, clause: ClauseRef, blocker: Lit) {
        self.watches[lit.code()].push(Watch { clause, blocker });
    }

    /// Watches the first two literals of `clause`.
    pub fn attach(&mut self, clause: ClauseRef, lits: &[Lit]) {
        debug_assert!(lits.len() >= 2);
        self.add_watch(lits[0], clause, lits[1]);
        self.add_watch(lits[1], clause, lits[0]);
    }

    /// Gets watches for a literal.
    #[must_use]
    pub fn get_watches(&self, lit: Lit) -> &[Watch] {
        &self.watches[lit.code()]
    }

    /// Drops every watch of deleted clauses.
    pub fn purge(&mut self, db: &ClauseDatabase) {
        for list in &mut self.watches {
            list.retain(|w| !db.get(w.clause).is_deleted());
        }
    }

    /// Propagates every pending trail literal to fixpoint.
    ///
    /// `propagations` is increased by the number of implied literals. On a
    /// conflict the remaining trail is marked as propagated; the caller is
    /// expected to backtrack.
    pub fn propagate(
        &mut self,
        db: &mut ClauseDatabase,
        trail: &mut Trail,
        propagations: &mut u64,
    ) -> BcpResult {
        while let Some(p) = trail.next_to_propagate() {
            let false_lit = !p;
            let mut ws = std::mem::take(&mut self.watches[false_lit.code()]);
            let mut conflict = None;
            let mut i = 0;
            let mut j = 0;

            while i < ws.len() {
                let watch = ws[i];
                i += 1;

                if trail.is_true(watch.blocker) {
                    ws[j] = watch;
                    j += 1;
                    continue;
                }

                let lits = db.lits_mut(watch.clause);
                // Keep the falsified watch at position 1.
                if lits[0] == false_lit {
                    lits.swap(0, 1);
                }
                let first = lits[0];
                let kept = Watch {
                    clause: watch.clause,
                    blocker: first,
                };
                if first != watch.blocker && trail.is_true(first) {
                    ws[j] = kept;
                    j += 1;
                    continue;
                }

                if let Some(k) = (2..lits.len()).find(|&k| !trail.is_false(lits[k])) {
                    lits.swap(1, k);
                    let new_watch = lits[1];
                    self.watches[new_watch.code()].push(kept);
                    continue;
                }

                ws[j] = kept;
                j += 1;
                if trail.is_false(first) {
                    conflict = Some(watch.clause);
                    trail.skip_propagation();
                    while i < ws.len() {
                        ws[j] = ws[i];
                        j += 1;
                        i += 1;
                    }
                } else {
                    let pushed = trail.push(first, Some(watch.clause));
                    debug_assert_eq!(pushed, Push::Assigned);
                    *propagations += 1;
                }
            }

            ws.truncate(j);
            self.watches[false_lit.code()] = ws;
            if let Some(clause) = conflict {
                return BcpResult::Conflict(clause);
            }
        }
        BcpResult::Ok
    }

    /// Checks the watch invariant outside of propagation.
    ///
    /// Every live clause must be watched by its first two literals, and a
    /// false watch is only allowed when the clause holds a true literal
    /// assigned at a decision level no higher than that watch's. Such a clause
    /// stays satisfied until the watch itself is unassigned. Returns the first
    /// offending clause.
    #[must_use]
    pub fn check(&self, db: &ClauseDatabase, trail: &Trail) -> Option<ClauseRef> {
        for (cref, clause) in db.iter() {
            let lits = &clause.lits;
            for &w in &lits[..2] {
                if !self.watches[w.code()].iter().any(|x| x.clause == cref) {
                    return Some(cref);
                }
                if !trail.is_false(w) {
                    continue;
                }
                let false_at = trail.level(w.var());
                let justified = lits
                    .iter()
                    .any(|&l| trail.is_true(l) && trail.level(l.var()) <= false_at);
                if !justified {
                    return Some(cref);
                }
            }
        }
        None
    }
}
