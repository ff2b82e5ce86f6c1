//! Core CDCL solver implementation.

use crate::bcp::{BcpResult, WatchedLiterals};
use crate::clause_db::{ClauseDatabase, ClauseRef};
use crate::conflict::{Analysis, ConflictAnalyzer};
use crate::decision::DecisionEngine;
use crate::heuristics::VsidsScores;
use crate::restart::{ReductionSchedule, RestartPolicy, RestartStrategy};
use crate::trail::{Push, Trail};
use satbench_base::{
    Budget, CnfFormula, Error, Lit, Result, SatSolver, SolverStats, Var, Verdict,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for the CDCL solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CdclConfig {
    /// VSIDS decay factor, applied once per conflict.
    pub var_decay: f64,
    /// Learned-clause activity decay factor.
    pub clause_decay: f64,
    /// Restart schedule.
    pub restart: RestartStrategy,
    /// Number of learned clauses that triggers the first reduction.
    pub reduce_base: usize,
    /// Growth of the reduction threshold after each reduction.
    pub reduce_increment: usize,
    /// Share of the deletable learned clauses removed by a reduction.
    pub reduce_fraction: f64,
    /// Phase of variables that were never assigned.
    pub initial_phase: bool,
}

impl Default for CdclConfig {
    fn default() -> Self {
        Self {
            var_decay: 0.95,
            clause_decay: 0.999,
            restart: RestartStrategy::default(),
            reduce_base: 2000,
            reduce_increment: 300,
            reduce_fraction: 0.5,
            initial_phase: true,
        }
    }
}

impl CdclConfig {
    /// Rejects decays outside (0, 1] and reduction fractions outside [0, 1].
    pub fn validate(&self) -> Result<()> {
        for (name, decay) in [
            ("var_decay", self.var_decay),
            ("clause_decay", self.clause_decay),
        ] {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(Error::Config(format!(
                    "{name} must lie in (0, 1], got {decay}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.reduce_fraction) {
            return Err(Error::Config(format!(
                "reduce_fraction must lie in [0, 1], got {}",
                self.reduce_fraction
            )));
        }
        Ok(())
    }
}

/// Solver statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CdclStats {
    /// Number of decisions made.
    pub decisions: u64,
    /// Number of literals implied by propagation.
    pub propagations: u64,
    /// Number of conflicts encountered.
    pub conflicts: u64,
    /// Number of learned clauses, units included.
    pub learned_clauses: u64,
    /// Number of learned clauses removed by reductions.
    pub deleted_clauses: u64,
    /// Number of restarts.
    pub restarts: u64,
}

impl From<CdclStats> for SolverStats {
    fn from(stats: CdclStats) -> Self {
        Self {
            decisions: Some(stats.decisions),
            propagations: Some(stats.propagations),
            conflicts: Some(stats.conflicts),
            learned_clauses: Some(stats.learned_clauses),
            deleted_clauses: Some(stats.deleted_clauses),
            restarts: Some(stats.restarts),
            ..Self::default()
        }
    }
}

/// The main CDCL solver, loaded with one formula.
#[derive(Debug)]
pub struct CdclSolver {
    db: ClauseDatabase,
    watches: WatchedLiterals,
    trail: Trail,
    decision: DecisionEngine,
    analyzer: ConflictAnalyzer,
    restart: RestartPolicy,
    reduction: ReductionSchedule,
    stats: CdclStats,
    /// Set once the formula is known to be unsatisfiable.
    unsat: bool,
}

impl CdclSolver {
    /// Creates a solver with the default configuration.
    #[must_use]
    pub fn new(formula: &CnfFormula) -> Self {
        Self::with_config(formula, CdclConfig::default())
    }

    /// Loads `formula`: normalises its clauses, asserts units at level 0 and
    /// propagates them.
    #[must_use]
    pub fn with_config(formula: &CnfFormula, config: CdclConfig) -> Self {
        let num_vars = formula.num_vars();
        let mut unsat = false;
        let mut occurrences = vec![0u32; num_vars];
        let mut units = Vec::new();
        let mut clauses = Vec::new();
        for clause in formula.clauses() {
            let Some(lits) = normalize(clause) else {
                continue;
            };
            for lit in &lits {
                occurrences[lit.var().index()] += 1;
            }
            match lits.len() {
                0 => unsat = true,
                1 => units.push(lits[0]),
                _ => clauses.push(lits),
            }
        }

        let mut vsids = VsidsScores::new(num_vars, config.var_decay);
        for (var, &count) in (0..).map(Var::new).zip(&occurrences) {
            vsids.set(var, f64::from(count));
        }

        let mut db = ClauseDatabase::new(config.clause_decay);
        let mut watches = WatchedLiterals::new(num_vars);
        for lits in clauses {
            let cref = db.add_original(lits);
            watches.attach(cref, db.lits(cref));
        }

        let mut trail = Trail::new(num_vars);
        for lit in units {
            if trail.push(lit, None) == Push::Contradiction {
                unsat = true;
            }
        }
        let mut stats = CdclStats::default();
        if !unsat {
            let result = watches.propagate(&mut db, &mut trail, &mut stats.propagations);
            unsat = matches!(result, BcpResult::Conflict(_));
        }
        tracing::debug!(
            num_vars,
            original = db.num_original(),
            unsat,
            "cdcl: formula loaded"
        );

        Self {
            db,
            watches,
            trail,
            decision: DecisionEngine::new(vsids, config.initial_phase),
            analyzer: ConflictAnalyzer::new(num_vars),
            restart: RestartPolicy::new(config.restart),
            reduction: ReductionSchedule::new(
                config.reduce_base,
                config.reduce_increment,
                config.reduce_fraction,
            ),
            stats,
            unsat,
        }
    }

    /// Runs the search until a verdict is reached or `budget` runs out.
    ///
    /// The budget is charged one step per propagate/decide cycle. On
    /// exhaustion the verdict is TIMEOUT with the statistics so far.
    pub fn run(&mut self, budget: &Budget) -> Verdict {
        if self.unsat {
            return Verdict::unsat(self.stats.into());
        }
        let mut meter = budget.start();
        loop {
            if !meter.tick() {
                tracing::debug!(steps = meter.steps(), "cdcl: budget exhausted");
                return Verdict::timeout(self.stats.into());
            }

            match self.propagate() {
                BcpResult::Conflict(conflict) => {
                    self.stats.conflicts += 1;
                    if self.trail.decision_level() == 0 {
                        self.unsat = true;
                        return Verdict::unsat(self.stats.into());
                    }
                    self.handle_conflict(conflict);
                }
                BcpResult::Ok => match self.decision.pick(&self.trail) {
                    Some(lit) => {
                        self.stats.decisions += 1;
                        self.trail.new_decision_level();
                        let _ = self.trail.push(lit, None);
                    }
                    None => return Verdict::sat(self.trail.model(), self.stats.into()),
                },
            }
        }
    }

    /// Propagates pending literals to fixpoint or to the first conflict.
    pub fn propagate(&mut self) -> BcpResult {
        self.watches
            .propagate(&mut self.db, &mut self.trail, &mut self.stats.propagations)
    }

    fn handle_conflict(&mut self, conflict: ClauseRef) {
        let Analysis {
            learnt,
            backtrack_level,
            lbd,
        } = self
            .analyzer
            .analyze(conflict, &mut self.db, &self.trail, &mut self.decision);

        self.backtrack(backtrack_level);
        self.stats.learned_clauses += 1;
        let asserting = learnt[0];
        if learnt.len() == 1 {
            let _ = self.trail.push(asserting, None);
        } else {
            let cref = self.db.add_learned(learnt, lbd);
            self.watches.attach(cref, self.db.lits(cref));
            let _ = self.trail.push(asserting, Some(cref));
        }

        self.decision.decay();
        self.db.decay_activity();

        if self.restart.on_conflict() {
            self.stats.restarts += 1;
            tracing::trace!(
                conflicts = self.stats.conflicts,
                next = ?self.restart.limit(),
                "cdcl: restart"
            );
            self.backtrack(0);
        }
        if self.reduction.is_due(self.db.num_learned()) {
            self.reduce_db();
        }
    }

    fn reduce_db(&mut self) {
        let locked: HashSet<ClauseRef> = self
            .trail
            .lits()
            .iter()
            .filter_map(|lit| self.trail.reason(lit.var()))
            .collect();
        let reduction = &mut self.reduction;
        let deleted = self
            .db
            .reduce(|n| reduction.advance(n), |cref| locked.contains(&cref));
        if !deleted.is_empty() {
            self.watches.purge(&self.db);
        }
        self.stats.deleted_clauses += deleted.len() as u64;
        tracing::debug!(
            deleted = deleted.len(),
            learned = self.db.num_learned(),
            next = self.reduction.next_threshold(),
            "cdcl: reduced clause database"
        );
    }

    fn backtrack(&mut self, level: u32) {
        let decision = &mut self.decision;
        self.trail.backtrack_to(level, |lit| decision.on_unassign(lit));
    }

    /// Restarts the search: backtracks to level 0, keeping learned clauses.
    pub fn restart(&mut self) {
        self.backtrack(0);
    }

    #[must_use]
    pub fn stats(&self) -> CdclStats {
        self.stats
    }

    #[must_use]
    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    #[must_use]
    pub fn clause_db(&self) -> &ClauseDatabase {
        &self.db
    }

    /// Checks the watch invariant; returns the first offending clause.
    #[must_use]
    pub fn check_watches(&self) -> Option<ClauseRef> {
        self.watches.check(&self.db, &self.trail)
    }

    /// Checks that every implied literal's reason has all its other literals
    /// false and assigned earlier on the trail.
    #[must_use]
    pub fn check_trail_causality(&self) -> bool {
        self.trail.lits().iter().enumerate().all(|(pos, &lit)| {
            let Some(reason) = self.trail.reason(lit.var()) else {
                return true;
            };
            let lits = self.db.lits(reason);
            lits[0] == lit
                && lits[1..].iter().all(|&other| {
                    self.trail.is_false(other)
                        && self.trail.position(other.var()).is_some_and(|p| p < pos)
                })
        })
    }
}

/// Removes duplicate literals. Returns `None` for tautologies.
fn normalize(clause: &[Lit]) -> Option<Vec<Lit>> {
    let mut lits: Vec<Lit> = Vec::with_capacity(clause.len());
    for &lit in clause {
        if lits.contains(&!lit) {
            return None;
        }
        if !lits.contains(&lit) {
            lits.push(lit);
        }
    }
    Some(lits)
}

/// CDCL as a [`SatSolver`]: builds a fresh [`CdclSolver`] per call.
#[derive(Debug, Clone, Default)]
pub struct Cdcl {
    pub config: CdclConfig,
}

impl Cdcl {
    #[must_use]
    pub fn new(config: CdclConfig) -> Self {
        Self { config }
    }
}

impl SatSolver for Cdcl {
    fn name(&self) -> &'static str {
        "cdcl"
    }

    fn solve(&mut self, formula: &CnfFormula, budget: &Budget) -> Result<Verdict> {
        self.config.validate()?;
        let mut solver = CdclSolver::with_config(formula, self.config.clone());
        Ok(solver.run(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(num_vars: usize, clauses: &[&[i64]]) -> CnfFormula {
        CnfFormula::from_dimacs(num_vars, clauses.iter().copied()).unwrap()
    }

    #[test]
    fn test_normalize() {
        let lits = |d: &[i64]| -> Vec<Lit> {
            d.iter().map(|&l| Lit::from_dimacs(l).unwrap()).collect()
        };
        assert_eq!(normalize(&lits(&[1, 2, 1])), Some(lits(&[1, 2])));
        assert_eq!(normalize(&lits(&[1, -2, 2])), None);
    }

    #[test]
    fn test_tautologies_are_ignored() {
        let f = formula(2, &[&[1, -1], &[2, -2, 1]]);
        let solver = CdclSolver::new(&f);
        assert_eq!(solver.clause_db().num_original(), 0);
    }

    #[test]
    fn test_conflicting_units_at_load() {
        let f = formula(1, &[&[1], &[-1]]);
        let verdict = CdclSolver::new(&f).run(&Budget::unlimited());
        assert!(verdict.is_unsat());
        assert_eq!(verdict.stats.conflicts, Some(0));
    }

    #[test]
    fn test_units_propagate_at_load() {
        let f = formula(3, &[&[1], &[-1, 2], &[-2, 3, 1]]);
        let solver = CdclSolver::new(&f);
        assert!(solver.trail().is_true(Lit::from_dimacs(2).unwrap()));
        assert_eq!(solver.trail().decision_level(), 0);
        assert_eq!(solver.stats().propagations, 1);
    }

    #[test]
    fn test_stats_conversion() {
        let stats = CdclStats {
            conflicts: 3,
            ..CdclStats::default()
        };
        let stats = SolverStats::from(stats);
        assert_eq!(stats.conflicts, Some(3));
        assert_eq!(stats.flips, None);
    }

    #[test]
    fn test_rejects_degenerate_decays() {
        let f = formula(1, &[&[1]]);
        for (var_decay, clause_decay) in [(0.0, 0.999), (0.95, 1.5), (f64::NAN, 0.999)] {
            let mut solver = Cdcl::new(CdclConfig {
                var_decay,
                clause_decay,
                ..CdclConfig::default()
            });
            let result = solver.solve(&f, &Budget::unlimited());
            assert!(matches!(result, Err(Error::Config(_))), "{var_decay} {clause_decay}");
        }
        assert!(CdclConfig::default().validate().is_ok());
        let no_decay = CdclConfig {
            var_decay: 1.0,
            clause_decay: 1.0,
            ..CdclConfig::default()
        };
        assert!(no_decay.validate().is_ok());
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: CdclConfig = serde_json::from_str(r#"{"var_decay": 0.9}"#).unwrap();
        assert_eq!(config.var_decay, 0.9);
        assert_eq!(config.reduce_base, 2000);
        assert_eq!(config.restart, RestartStrategy::default());
    }
}
