//! # satbench-base
//!
//! Core types and contracts shared by every satbench solver.
//!
//! This crate provides the foundational building blocks used across all other
//! satbench crates, including:
//!
//! - **Types**: variables, literals, CNF formulas and models
//! - **Budgets**: step/time limits with a cooperative cancellation point
//! - **Verdicts**: the structured result every solver returns
//! - **Traits**: the `SatSolver` capability shared by all solver variants
//! - **Error Types**: unified error handling across the workspace

pub mod budget;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;
pub mod verdict;

pub use budget::{Budget, BudgetMeter};
pub use error::{Error, Result};
pub use memory::MemoryUsage;
pub use traits::SatSolver;
pub use types::{CnfFormula, Lit, Model, Var, MAX_VARS};
pub use verdict::{SolverStats, Status, Verdict};
