//! # satbench-baseline
//!
//! Reference solvers measured against the CDCL core:
//! - **DPLL** with Jeroslow-Wang branching, unit propagation and pure-literal
//!   elimination (complete)
//! - **WalkSAT** and **probSAT** stochastic local search (incomplete: they
//!   report SAT or TIMEOUT, never UNSAT)

pub mod dpll;
pub mod local_search;
pub mod probsat;
pub mod walksat;

pub use dpll::{Dpll, DpllSearch, DpllStats};
pub use probsat::{ProbSat, ProbSatConfig};
pub use walksat::{WalkSat, WalkSatConfig};
