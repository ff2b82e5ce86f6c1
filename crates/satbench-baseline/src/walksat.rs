//! WalkSAT local search.

use crate::local_search::LocalSearchState;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use satbench_base::{Budget, CnfFormula, Error, Result, SatSolver, SolverStats, Var, Verdict};
use serde::{Deserialize, Serialize};

/// Configuration for [`WalkSat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkSatConfig {
    /// Probability of a random walk step instead of a greedy one.
    pub noise: f64,
    /// Number of random restarts.
    pub max_tries: u32,
    /// Flips per try.
    pub max_flips: u64,
    pub seed: u64,
}

impl Default for WalkSatConfig {
    fn default() -> Self {
        Self {
            noise: 0.5,
            max_tries: 1,
            max_flips: 10_000,
            seed: 42,
        }
    }
}

/// WalkSAT: flip a variable of a random unsatisfied clause, either at random
/// (with probability `noise`) or the one breaking the fewest clauses.
///
/// Incomplete: it never proves unsatisfiability and answers TIMEOUT when
/// its tries or the budget run out.
#[derive(Debug, Clone, Default)]
pub struct WalkSat {
    pub config: WalkSatConfig,
}

impl WalkSat {
    #[must_use]
    pub fn new(config: WalkSatConfig) -> Self {
        Self { config }
    }

    fn pick(&self, state: &LocalSearchState, rng: &mut SmallRng) -> Option<Var> {
        let clause = state.random_unsat_clause(rng)?;
        if rng.random_bool(self.config.noise) {
            return Some(clause[rng.random_range(0..clause.len())].var());
        }
        clause
            .iter()
            .map(|lit| lit.var())
            .min_by_key(|&var| state.break_count(var))
    }
}

impl SatSolver for WalkSat {
    fn name(&self) -> &'static str {
        "walksat"
    }

    fn solve(&mut self, formula: &CnfFormula, budget: &Budget) -> Result<Verdict> {
        if !(0.0..=1.0).contains(&self.config.noise) {
            return Err(Error::Config(format!(
                "walksat noise must lie in [0, 1], got {}",
                self.config.noise
            )));
        }

        let mut state = LocalSearchState::new(formula);
        let mut rng = SmallRng::seed_from_u64(self.config.seed);
        let mut meter = budget.start();
        let mut flips = 0u64;
        let mut restarts = 0u64;
        let stats = |flips, restarts| SolverStats {
            flips: Some(flips),
            restarts: Some(restarts),
            ..SolverStats::default()
        };

        if state.has_empty_clause() {
            tracing::debug!("walksat: empty clause, nothing to search");
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
                if let Some(var) = self.pick(&state, &mut rng) {
                    state.flip(var);
                    flips += 1;
                }
            }
            if state.num_unsat() == 0 {
                tracing::debug!(attempt, flips, "walksat: model found");
                return Ok(Verdict::sat(state.model(), stats(flips, restarts)));
            }
            restarts += 1;
        }
        Ok(Verdict::timeout(stats(flips, restarts)))
    }
}
