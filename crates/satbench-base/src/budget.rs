//! Resource budgets and the cooperative cancellation point.
//!
//! Solvers never get interrupted from the outside. Instead they call
//! [`BudgetMeter::tick`] at a well-defined boundary of their main loop (one
//! propagate/decide cycle, one branch node, one flip) and stop cleanly when it
//! reports the budget as spent.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// How often the wall clock is consulted, in ticks.
const CLOCK_CHECK_INTERVAL: u64 = 64;

/// Step and time limits for one solve call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Maximum number of steps (solver-specific unit).
    pub max_steps: Option<u64>,
    /// Maximum wall-clock time.
    pub time_limit: Option<Duration>,
}

impl Budget {
    /// No limit at all.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_steps: None,
            time_limit: None,
        }
    }

    #[must_use]
    pub const fn with_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    #[must_use]
    pub const fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn is_unlimited(&self) -> bool {
        self.max_steps.is_none() && self.time_limit.is_none()
    }

    /// Starts metering against this budget.
    #[must_use]
    pub fn start(&self) -> BudgetMeter {
        BudgetMeter {
            steps: 0,
            max_steps: self.max_steps,
            deadline: self.time_limit.map(|limit| Instant::now() + limit),
            exhausted: false,
        }
    }
}

/// A running budget.
#[derive(Debug, Clone)]
pub struct BudgetMeter {
    steps: u64,
    max_steps: Option<u64>,
    deadline: Option<Instant>,
    exhausted: bool,
}

impl BudgetMeter {
    /// Accounts for one step. Returns `false` once the budget is spent; from
    /// then on every call returns `false`.
    pub fn tick(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.max_steps.is_some_and(|max| self.steps >= max) {
            self.exhausted = true;
            return false;
        }
        if let Some(deadline) = self.deadline {
            if self.steps % CLOCK_CHECK_INTERVAL == 0 && Instant::now() >= deadline {
                self.exhausted = true;
                return false;
            }
        }
        self.steps += 1;
        true
    }

    /// Steps consumed so far.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_budget() {
        let mut meter = Budget::unlimited().with_steps(3).start();
        assert!(meter.tick());
        assert!(meter.tick());
        assert!(meter.tick());
        assert!(!meter.tick());
        assert!(!meter.tick());
        assert!(meter.is_exhausted());
        assert_eq!(meter.steps(), 3);
    }

    #[test]
    fn test_zero_time_limit_stops_immediately() {
        let mut meter = Budget::unlimited().with_time_limit(Duration::ZERO).start();
        assert!(!meter.tick());
    }

    #[test]
    fn test_unlimited() {
        let budget = Budget::unlimited();
        assert!(budget.is_unlimited());
        let mut meter = budget.start();
        for _ in 0..1000 {
            assert!(meter.tick());
        }
    }
}
