//! Clause database management.
//!
//! Original clauses are stored once and never removed. Learned clauses are
//! appended during search and may be deleted by [`ClauseDatabase::reduce`];
//! their slots are recycled, but a [`ClauseRef`] stays valid for as long as
//! the clause it names is alive.

use satbench_base::Lit;
use std::cmp::Ordering;

/// Activity above which all clause activities are rescaled.
const ACTIVITY_RESCALE_LIMIT: f64 = 1e20;

/// Identity of a stored clause, used as the reason of implied literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseRef(u32);

impl ClauseRef {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A clause stored in the database.
#[derive(Debug, Clone)]
pub struct StoredClause {
    /// Literals in the clause. The first two are the watched ones.
    pub lits: Vec<Lit>,
    /// Whether this is a learned clause.
    pub learned: bool,
    /// Activity for deletion decisions (learned clauses only).
    pub activity: f64,
    /// Literal Block Distance at learning time.
    pub lbd: u32,
    deleted: bool,
}

impl StoredClause {
    #[must_use]
    pub fn len(&self) -> usize {
        self.lits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lits.is_empty()
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Database for storing clauses.
#[derive(Debug)]
pub struct ClauseDatabase {
    /// All clause slots, deleted ones included.
    clauses: Vec<StoredClause>,
    /// Slots of deleted learned clauses, reused by the next insertion.
    free: Vec<ClauseRef>,
    /// Number of original clauses.
    num_original: usize,
    /// Number of live learned clauses.
    num_learned: usize,
    /// Current activity increment.
    increment: f64,
    /// Activity decay factor.
    decay: f64,
}

impl ClauseDatabase {
    /// Creates a new empty clause database.
    #[must_use]
    pub fn new(decay: f64) -> Self {
        Self {
            clauses: Vec::new(),
            free: Vec::new(),
            num_original: 0,
            num_learned: 0,
            increment: 1.0,
            decay,
        }
    }

    /// Adds an original clause of at least two literals.
    pub fn add_original(&mut self, lits: Vec<Lit>) -> ClauseRef {
        debug_assert!(lits.len() >= 2, "unit clauses bypass the clause store");
        self.num_original += 1;
        self.insert(StoredClause {
            lits,
            learned: false,
            activity: 0.0,
            lbd: 0,
            deleted: false,
        })
    }

    /// Adds a learned clause of at least two literals.
    pub fn add_learned(&mut self, lits: Vec<Lit>, lbd: u32) -> ClauseRef {
        debug_assert!(lits.len() >= 2, "unit clauses bypass the clause store");
        self.num_learned += 1;
        let activity = self.increment;
        self.insert(StoredClause {
            lits,
            learned: true,
            activity,
            lbd,
            deleted: false,
        })
    }

    fn insert(&mut self, clause: StoredClause) -> ClauseRef {
        if let Some(cref) = self.free.pop() {
            self.clauses[cref.index()] = clause;
            cref
        } else {
            let cref = ClauseRef(self.clauses.len() as u32);
            self.clauses.push(clause);
            cref
        }
    }

    /// Gets a clause by reference.
    #[must_use]
    pub fn get(&self, cref: ClauseRef) -> &StoredClause {
        &self.clauses[cref.index()]
    }

    #[must_use]
    pub fn lits(&self, cref: ClauseRef) -> &[Lit] {
        &self.clauses[cref.index()].lits
    }

    /// Mutable literal access, for watch reordering.
    pub fn lits_mut(&mut self, cref: ClauseRef) -> &mut [Lit] {
        &mut self.clauses[cref.index()].lits
    }

    /// Iterates over live clauses.
    pub fn iter(&self) -> impl Iterator<Item = (ClauseRef, &StoredClause)> {
        self.clauses
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.deleted)
            .map(|(i, c)| (ClauseRef(i as u32), c))
    }

    /// Bumps the activity of a learned clause.
    pub fn bump_activity(&mut self, cref: ClauseRef) {
        let clause = &mut self.clauses[cref.index()];
        if !clause.learned {
            return;
        }
        clause.activity += self.increment;
        if clause.activity > ACTIVITY_RESCALE_LIMIT {
            for c in self.clauses.iter_mut().filter(|c| c.learned) {
                c.activity /= ACTIVITY_RESCALE_LIMIT;
            }
            self.increment /= ACTIVITY_RESCALE_LIMIT;
        }
    }

    /// Decays all clause activities (by growing the increment).
    pub fn decay_activity(&mut self) {
        self.increment /= self.decay;
    }

    /// Deletes learned clauses until `keep(n)` of the `n` deletable ones
    /// remain.
    ///
    /// Candidates are ordered by activity (lowest first), then by LBD
    /// (highest first), then by length (longest first). Clauses for which
    /// `locked` holds and binary clauses are never deleted. Returns the deleted references; the caller must
    /// drop their watches.
    pub fn reduce(
        &mut self,
        keep: impl FnOnce(usize) -> usize,
        locked: impl Fn(ClauseRef) -> bool,
    ) -> Vec<ClauseRef> {
        let mut candidates: Vec<ClauseRef> = self
            .iter()
            .filter(|(cref, c)| c.learned && c.len() > 2 && !locked(*cref))
            .map(|(cref, _)| cref)
            .collect();
        let keep = keep(candidates.len());
        if candidates.len() <= keep {
            return Vec::new();
        }

        candidates.sort_by(|&a, &b| {
            let (ca, cb) = (self.get(a), self.get(b));
            ca.activity
                .partial_cmp(&cb.activity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| cb.lbd.cmp(&ca.lbd))
                .then_with(|| cb.len().cmp(&ca.len()))
                .then_with(|| b.cmp(&a))
        });
        candidates.truncate(candidates.len() - keep);

        for &cref in &candidates {
            let clause = &mut self.clauses[cref.index()];
            clause.deleted = true;
            clause.lits = Vec::new();
            self.free.push(cref);
        }
        self.num_learned -= candidates.len();
        candidates
    }

    /// Returns the number of original clauses.
    #[must_use]
    pub fn num_original(&self) -> usize {
        self.num_original
    }

    /// Returns the number of live learned clauses.
    #[must_use]
    pub fn num_learned(&self) -> usize {
        self.num_learned
    }

    /// Returns the number of live clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.num_original + self.num_learned
    }

    /// Returns whether the database is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ClauseDatabase {
    fn default() -> Self {
        Self::new(0.999)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(dimacs: &[i64]) -> Vec<Lit> {
        dimacs.iter().map(|&l| Lit::from_dimacs(l).unwrap()).collect()
    }

    #[test]
    fn test_reduce_keeps_locked_binary_and_active() {
        let mut db = ClauseDatabase::default();
        let original = db.add_original(lits(&[1, 2, 3]));
        let binary = db.add_learned(lits(&[1, 2]), 2);
        let cold = db.add_learned(lits(&[1, 2, 3, 4]), 3);
        let hot = db.add_learned(lits(&[-1, 2, 3]), 2);
        let locked = db.add_learned(lits(&[-1, -2, 3]), 2);
        db.bump_activity(hot);
        db.bump_activity(hot);

        let deleted = db.reduce(|_| 1, |cref| cref == locked);
        assert_eq!(deleted, vec![cold]);
        assert!(db.get(cold).is_deleted());
        for cref in [original, binary, hot, locked] {
            assert!(!db.get(cref).is_deleted());
        }
        assert_eq!(db.num_learned(), 3);
        assert_eq!(db.num_original(), 1);
    }

    #[test]
    fn test_deleted_slot_is_recycled() {
        let mut db = ClauseDatabase::default();
        let a = db.add_learned(lits(&[1, 2, 3]), 2);
        let b = db.add_learned(lits(&[1, 2, 4]), 2);
        db.bump_activity(b);
        assert_eq!(db.reduce(|_| 1, |_| false), vec![a]);
        let c = db.add_learned(lits(&[4, 5, 6]), 3);
        assert_eq!(c, a);
        assert_eq!(db.lits(c), lits(&[4, 5, 6]).as_slice());
        assert_eq!(db.iter().count(), 2);
    }

    #[test]
    fn test_reduce_breaks_activity_ties_by_lbd() {
        let mut db = ClauseDatabase::default();
        let low_glue = db.add_learned(lits(&[1, 2, 3, 4]), 2);
        let high_glue = db.add_learned(lits(&[1, 2, 5]), 3);
        assert_eq!(db.reduce(|_| 1, |_| false), vec![high_glue]);
        assert!(!db.get(low_glue).is_deleted());
    }

    #[test]
    fn test_original_clauses_ignore_bumps() {
        let mut db = ClauseDatabase::default();
        let c = db.add_original(lits(&[1, 2]));
        db.bump_activity(c);
        assert_eq!(db.get(c).activity, 0.0);
    }
}
