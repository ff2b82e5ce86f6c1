//! Common traits for satbench components.

use crate::budget::Budget;
use crate::error::Result;
use crate::types::CnfFormula;
use crate::verdict::Verdict;

/// The capability shared by every solver variant.
///
/// Variants keep no state across calls: each `solve` builds a fresh search
/// state for the given formula and drops it once a verdict is produced.
pub trait SatSolver {
    /// Short stable name used in result records (`cdcl`, `dpll`, ...).
    fn name(&self) -> &'static str;

    /// Decides `formula` within `budget`.
    fn solve(&mut self, formula: &CnfFormula, budget: &Budget) -> Result<Verdict>;
}

impl<S: SatSolver + ?Sized> SatSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&mut self, formula: &CnfFormula, budget: &Budget) -> Result<Verdict> {
        (**self).solve(formula, budget)
    }
}
