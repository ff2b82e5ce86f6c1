//! Original clause sets.

use super::{Lit, Model};
use crate::error::{Error, Result};

/// A CNF formula over a declared number of variables.
///
/// Clauses are kept exactly as given (duplicates, tautologies and empty
/// clauses included); solvers normalise them on load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CnfFormula {
    num_vars: usize,
    clauses: Vec<Vec<Lit>>,
}

impl CnfFormula {
    /// Creates an empty formula over `num_vars` variables.
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            clauses: Vec::new(),
        }
    }

    /// Builds a formula from DIMACS-style clauses.
    pub fn from_dimacs<I, C>(num_vars: usize, clauses: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[i64]>,
    {
        let mut formula = Self::new(num_vars);
        for clause in clauses {
            formula.add_dimacs_clause(clause.as_ref())?;
        }
        Ok(formula)
    }

    /// Adds a clause of signed DIMACS literals.
    ///
    /// Fails when a literal is 0 or names a variable beyond `num_vars`.
    pub fn add_dimacs_clause(&mut self, literals: &[i64]) -> Result<()> {
        let mut clause = Vec::with_capacity(literals.len());
        for &literal in literals {
            match Lit::from_dimacs(literal) {
                Some(lit) if lit.var().index() < self.num_vars => clause.push(lit),
                _ => {
                    return Err(Error::LiteralOutOfRange {
                        literal,
                        num_vars: self.num_vars,
                    })
                }
            }
        }
        self.clauses.push(clause);
        Ok(())
    }

    /// Adds an already-encoded clause.
    pub fn add_clause(&mut self, clause: impl IntoIterator<Item = Lit>) -> Result<()> {
        let clause: Vec<Lit> = clause.into_iter().collect();
        if let Some(lit) = clause.iter().find(|l| l.var().index() >= self.num_vars) {
            return Err(Error::LiteralOutOfRange {
                literal: lit.to_dimacs(),
                num_vars: self.num_vars,
            });
        }
        self.clauses.push(clause);
        Ok(())
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    #[must_use]
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn clauses(&self) -> &[Vec<Lit>] {
        &self.clauses
    }

    /// Returns the first clause with no true literal under `model`.
    #[must_use]
    pub fn first_falsified(&self, model: &Model) -> Option<&[Lit]> {
        self.clauses
            .iter()
            .find(|clause| !clause.iter().any(|&lit| model.lit_value(lit)))
            .map(Vec::as_slice)
    }

    /// Whether every clause holds a literal made true by `model`.
    #[must_use]
    pub fn is_satisfied_by(&self, model: &Model) -> bool {
        model.len() >= self.num_vars && self.first_falsified(model).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_literals() {
        let mut formula = CnfFormula::new(2);
        assert!(formula.add_dimacs_clause(&[1, -2]).is_ok());
        assert!(matches!(
            formula.add_dimacs_clause(&[3]),
            Err(Error::LiteralOutOfRange { literal: 3, num_vars: 2 })
        ));
        assert!(formula.add_dimacs_clause(&[0]).is_err());
        assert_eq!(formula.num_clauses(), 1);
    }

    #[test]
    fn test_satisfaction_check() {
        let formula = CnfFormula::from_dimacs(2, [vec![1, 2], vec![-1, -2]]).unwrap();
        assert!(formula.is_satisfied_by(&Model::new(vec![true, false])));
        assert!(!formula.is_satisfied_by(&Model::new(vec![true, true])));
        let falsified = formula.first_falsified(&Model::new(vec![false, false])).unwrap();
        assert_eq!(falsified.iter().map(|l| l.to_dimacs()).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_empty_clause_is_never_satisfied() {
        let formula = CnfFormula::from_dimacs(1, [Vec::<i64>::new()]).unwrap();
        assert!(!formula.is_satisfied_by(&Model::new(vec![true])));
    }
}
