//! Solver verdicts and statistics.

use crate::types::Model;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Sat,
    Unsat,
    /// Step or time budget spent before a decision was reached.
    Timeout,
}

impl Status {
    /// Conventional SAT-competition exit code.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Sat => 10,
            Self::Unsat => 20,
            Self::Timeout => 0,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sat => "SAT",
            Self::Unsat => "UNSAT",
            Self::Timeout => "TIMEOUT",
        })
    }
}

/// Solver statistics.
///
/// Each solver fills only the counters that make sense for it; the rest stay
/// `None` and are rendered empty in CSV output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    /// Number of decisions made.
    pub decisions: Option<u64>,
    /// Number of literals assigned by propagation.
    pub propagations: Option<u64>,
    /// Number of conflicts encountered.
    pub conflicts: Option<u64>,
    /// Number of learned clauses.
    pub learned_clauses: Option<u64>,
    /// Number of learned clauses removed by database reduction.
    pub deleted_clauses: Option<u64>,
    /// Number of restarts.
    pub restarts: Option<u64>,
    /// Number of unit propagations (DPLL).
    pub unit_propagations: Option<u64>,
    /// Number of pure literal eliminations (DPLL).
    pub pure_eliminations: Option<u64>,
    /// Number of variable flips (local search).
    pub flips: Option<u64>,
}

/// The structured result of a solve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    /// Present iff `status` is `Sat`.
    pub model: Option<Model>,
    pub stats: SolverStats,
}

impl Verdict {
    #[must_use]
    pub fn sat(model: Model, stats: SolverStats) -> Self {
        Self {
            status: Status::Sat,
            model: Some(model),
            stats,
        }
    }

    #[must_use]
    pub fn unsat(stats: SolverStats) -> Self {
        Self {
            status: Status::Unsat,
            model: None,
            stats,
        }
    }

    #[must_use]
    pub fn timeout(stats: SolverStats) -> Self {
        Self {
            status: Status::Timeout,
            model: None,
            stats,
        }
    }

    #[must_use]
    pub fn is_sat(&self) -> bool {
        self.status == Status::Sat
    }

    #[must_use]
    pub fn is_unsat(&self) -> bool {
        self.status == Status::Unsat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Timeout).unwrap(), "\"TIMEOUT\"");
        assert_eq!(Status::Sat.to_string(), "SAT");
        assert_eq!(Status::Unsat.exit_code(), 20);
    }
}
