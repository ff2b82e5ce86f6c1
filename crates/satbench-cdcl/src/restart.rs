//! Restart and clause-database reduction schedules.

use serde::{Deserialize, Serialize};

/// When to restart the search.
///
/// Every variant counts conflicts since the last restart; a restart happens
/// once that count reaches the current limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RestartStrategy {
    /// Limits `first`, `first * factor`, `first * factor^2`, ... (truncated).
    Geometric { first: u64, factor: f64 },
    /// Limits `unit * luby(i)`: 1 1 2 1 1 2 4 1 1 2 ...
    Luby { unit: u64 },
    /// The same limit every time.
    Fixed { interval: u64 },
    /// Never restart.
    Never,
}

impl Default for RestartStrategy {
    fn default() -> Self {
        Self::Geometric {
            first: 100,
            factor: 1.5,
        }
    }
}

/// Knuth's reluctant doubling; yields the Luby sequence in O(1) per term.
#[derive(Debug, Clone)]
struct ReluctantDoubling {
    u: i64,
    v: i64,
}

impl ReluctantDoubling {
    fn new() -> Self {
        Self { u: 1, v: 1 }
    }

    fn next(&mut self) -> u64 {
        let res = self.v;
        if self.u & -self.u == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v *= 2;
        }
        res as u64
    }
}

/// Running state of a [`RestartStrategy`].
#[derive(Debug, Clone)]
pub struct RestartPolicy {
    strategy: RestartStrategy,
    conflicts_since_restart: u64,
    /// Current limit; `None` never restarts.
    limit: Option<u64>,
    luby: ReluctantDoubling,
}

impl RestartPolicy {
    #[must_use]
    pub fn new(strategy: RestartStrategy) -> Self {
        let mut luby = ReluctantDoubling::new();
        let limit = match strategy {
            RestartStrategy::Geometric { first, .. } => Some(first.max(1)),
            RestartStrategy::Luby { unit } => Some(unit.max(1) * luby.next()),
            RestartStrategy::Fixed { interval } => Some(interval.max(1)),
            RestartStrategy::Never => None,
        };
        Self {
            strategy,
            conflicts_since_restart: 0,
            limit,
            luby,
        }
    }

    /// Records a conflict and tells whether to restart now. A `true` answer
    /// also advances the schedule.
    pub fn on_conflict(&mut self) -> bool {
        self.conflicts_since_restart += 1;
        let Some(limit) = self.limit else {
            return false;
        };
        if self.conflicts_since_restart < limit {
            return false;
        }
        self.conflicts_since_restart = 0;
        self.limit = Some(match self.strategy {
            RestartStrategy::Geometric { factor, .. } => {
                ((limit as f64 * factor) as u64).max(1)
            }
            RestartStrategy::Luby { unit } => unit.max(1) * self.luby.next(),
            RestartStrategy::Fixed { interval } => interval.max(1),
            RestartStrategy::Never => return false,
        });
        true
    }

    /// The number of conflicts that will trigger the next restart.
    #[must_use]
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }
}

/// Thresholds at which the learned clauses are reduced.
#[derive(Debug, Clone)]
pub struct ReductionSchedule {
    next: usize,
    increment: usize,
    fraction: f64,
}

impl ReductionSchedule {
    /// First reduction at `base` learned clauses, then every `increment`
    /// more; each reduction deletes `fraction` of the candidates.
    #[must_use]
    pub fn new(base: usize, increment: usize, fraction: f64) -> Self {
        Self {
            next: base,
            increment,
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// Whether `num_learned` live learned clauses call for a reduction.
    #[must_use]
    pub fn is_due(&self, num_learned: usize) -> bool {
        num_learned >= self.next
    }

    /// Moves to the next threshold and returns how many of `candidates`
    /// deletable clauses to keep.
    pub fn advance(&mut self, candidates: usize) -> usize {
        self.next += self.increment;
        candidates - (candidates as f64 * self.fraction) as usize
    }

    #[must_use]
    pub fn next_threshold(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restarts_at(strategy: RestartStrategy, conflicts: u64) -> Vec<u64> {
        let mut policy = RestartPolicy::new(strategy);
        (1..=conflicts).filter(|_| policy.on_conflict()).collect()
    }

    #[test]
    fn reluctant_doubling_generates_luby_sequence() {
        let mut luby = ReluctantDoubling::new();
        let seq: Vec<u64> = (0..15).map(|_| luby.next()).collect();
        assert_eq!(seq, vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8]);
    }

    #[test]
    fn geometric_schedule() {
        // Limits 100, 150, 225: restarts after 100, 250, 475 conflicts.
        let strategy = RestartStrategy::default();
        assert_eq!(restarts_at(strategy, 500), vec![100, 250, 475]);
    }

    #[test]
    fn luby_schedule() {
        let strategy = RestartStrategy::Luby { unit: 10 };
        assert_eq!(restarts_at(strategy, 80), vec![10, 20, 40, 50, 60, 80]);
    }

    #[test]
    fn never_restarts() {
        assert!(restarts_at(RestartStrategy::Never, 1000).is_empty());
        assert_eq!(RestartPolicy::new(RestartStrategy::Never).limit(), None);
    }

    #[test]
    fn reduction_thresholds_grow() {
        let mut schedule = ReductionSchedule::new(2000, 300, 0.5);
        assert!(!schedule.is_due(1999));
        assert!(schedule.is_due(2000));
        assert_eq!(schedule.advance(2000), 1000);
        assert_eq!(schedule.next_threshold(), 2300);
        assert_eq!(schedule.advance(7), 4);
    }

    #[test]
    fn strategy_serde_roundtrip() {
        let json = r#"{"kind":"luby","unit":100}"#;
        let strategy: RestartStrategy = serde_json::from_str(json).unwrap();
        assert_eq!(strategy, RestartStrategy::Luby { unit: 100 });
    }
}
