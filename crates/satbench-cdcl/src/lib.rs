//! # satbench-cdcl
//!
//! Conflict-Driven Clause Learning (CDCL) core algorithm.
//!
//! Implements:
//! - Two-watched-literal Boolean Constraint Propagation (BCP)
//! - First-UIP conflict analysis with non-chronological backtracking
//! - VSIDS decisions with phase saving
//! - Restart schedules and learned-clause database reduction

pub mod bcp;
pub mod clause_db;
pub mod conflict;
pub mod decision;
pub mod heuristics;
pub mod restart;
pub mod solver;
pub mod trail;

pub use restart::RestartStrategy;
pub use solver::{Cdcl, CdclConfig, CdclSolver, CdclStats};
