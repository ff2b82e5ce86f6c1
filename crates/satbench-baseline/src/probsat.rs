//! probSAT local search with the exponential break function.

use crate::local_search::LocalSearchState;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use satbench_base::{Budget, CnfFormula, Error, Result, SatSolver, SolverStats, Var, Verdict};
use serde::{Deserialize, Serialize};

/// Configuration for [`ProbSat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbSatConfig {
    /// Base of the break function; a variable breaking `b` clauses is picked
    /// with weight `epsilon^b`.
    pub epsilon: f64,
    pub max_tries: u32,
    /// Flips per try.
    pub max_flips: u64,
    pub seed: u64,
}

impl Default for ProbSatConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.5,
            max_tries: 1,
            max_flips: 10_000,
            seed: 42,
        }
    }
}

/// probSAT: from a random unsatisfied clause, flip a variable drawn with
/// probability proportional to `epsilon^break`.
#[derive(Debug, Clone, Default)]
pub struct ProbSat {
    pub config: ProbSatConfig,
}

impl ProbSat {
    #[must_use]
    pub fn new(config: ProbSatConfig) -> Self {
        Self { config }
    }

    fn pick(&self, state: &LocalSearchState, rng: &mut SmallRng, weights: &mut Vec<f64>) -> Option<Var> {
        let clause = state.random_unsat_clause(rng)?;
        weights.clear();
        weights.extend(
            clause
                .iter()
                .map(|lit| self.config.epsilon.powi(state.break_count(lit.var()) as i32)),
        );
        let total: f64 = weights.iter().sum();
        let mut r = rng.random::<f64>() * total;
        for (lit, &w) in clause.iter().zip(weights.iter()) {
            if r < w {
                return Some(lit.var());
            }
            r -= w;
        }
        clause.last().map(|lit| lit.var())
    }
}

impl SatSolver for ProbSat {
    fn name(&self) -> &'static str {
        "probsat"
    }

    fn solve(&mut self, formula: &CnfFormula, budget: &Budget) -> Result<Verdict> {
        if !(self.config.epsilon > 0.0 && self.config.epsilon <= 1.0) {
            return Err(Error::Config(format!(
                "probsat epsilon must lie in (0, 1], got {}",
                self.config.epsilon
            )));
        }

        let mut state = LocalSearchState::new(formula);
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut meter = budget.start();
        let mut weights = Vec::new();
        let mut flips = 0u64;
        let mut restarts = 0u64;
        let stats = |flips, restarts| SolverStats {
            flips: Some(flips),
            restarts: Some(restarts),
            ..SolverStats::default()
        };

        if state.has_empty_clause() {
            tracing::debug!("probsat: empty clause, nothing to search");
            return Ok(Verdict::timeout(stats(flips, restarts)));
        }

        for attempt in 0..self.config.max_tries {
            state.randomize(&mut rng);
            for _ in 0..self.config.max_flips {
                if state.num_unsat() == 0 {
                    break;
                }
                if !meter.tick() {
                    return Ok(Verdict::timeout(stats(flips, restarts)));
                }
                if let Some(var) = self.pick(&state, &mut rng, &mut weights) {
                    state.flip(var);
                    flips += 1;
                }
            }
            if state.num_unsat() == 0 {
                tracing::debug!(attempt, flips, "probsat: model found");
                return Ok(Verdict::sat(state.model(), stats(flips, restarts)));
            }
            restarts += 1;
        }
        Ok(Verdict::timeout(stats(flips, restarts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_epsilon() {
        for epsilon in [0.0, -1.0, 2.0] {
            let mut solver = ProbSat::new(ProbSatConfig {
                epsilon,
                ..ProbSatConfig::default()
            });
            let result = solver.solve(&CnfFormula::new(1), &Budget::unlimited());
            assert!(matches!(result, Err(Error::Config(_))), "{epsilon}");
        }
    }

    #[test]
    fn test_flip_budget_gives_timeout() {
        // x1 and -x1 cannot both hold; local search can only run out.
        let f = CnfFormula::from_dimacs(2, [&[1][..], &[-1][..], &[1, 2][..]]).unwrap();
        let mut solver = ProbSat::new(ProbSatConfig {
            max_tries: 3,
            max_flips: 20,
            ..ProbSatConfig::default()
        });
        let verdict = solver.solve(&f, &Budget::unlimited()).unwrap();
        assert_eq!(verdict.status, satbench_base::Status::Timeout);
        assert_eq!(verdict.stats.flips, Some(60));
        assert_eq!(verdict.stats.restarts, Some(3));
        assert!(verdict.model.is_none());
    }

    #[test]
    fn test_zero_break_variable_dominates() {
        let f = CnfFormula::from_dimacs(3, [&[1, 2][..], &[-1, 3][..]]).unwrap();
        let mut state = LocalSearchState::new(&f);
        let mut rng = SmallRng::seed_from_u64(3);
        state.randomize(&mut rng);
        for i in 0..3 {
            let var = Var::new(i);
            if state.model().value(var) {
                state.flip(var);
            }
        }
        // x2 breaks nothing (weight 1); x1 breaks one clause (weight 1e-6).
        let solver = ProbSat::new(ProbSatConfig {
            epsilon: 1e-6,
            ..ProbSatConfig::default()
        });
        let mut weights = Vec::new();
        let picks = (0..50)
            .filter(|_| solver.pick(&state, &mut rng, &mut weights) == Some(Var::new(1)))
            .count();
        assert!(picks >= 49);
    }
}
