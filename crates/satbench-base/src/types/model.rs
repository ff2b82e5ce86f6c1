//! Satisfying assignments.

use super::{Lit, Var};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A total assignment, indexed by 0-based variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    #[must_use]
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Builds a model from signed DIMACS literals over `num_vars` variables.
    ///
    /// Variables not mentioned default to `false`.
    #[must_use]
    pub fn from_dimacs(num_vars: usize, literals: &[i64]) -> Self {
        let mut values = vec![false; num_vars];
        for lit in literals.iter().filter_map(|&l| Lit::from_dimacs(l)) {
            if let Some(slot) = values.get_mut(lit.var().index()) {
                *slot = lit.is_positive();
            }
        }
        Self { values }
    }

    #[must_use]
    pub fn value(&self, var: Var) -> bool {
        self.values.get(var.index()).copied().unwrap_or(false)
    }

    /// Whether `lit` is true under this model.
    #[must_use]
    pub fn lit_value(&self, lit: Lit) -> bool {
        self.value(lit.var()) != lit.is_negative()
    }

    /// The model as signed DIMACS literals, one per variable.
    #[must_use]
    pub fn to_dimacs(&self) -> Vec<i64> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let number = i as i64 + 1;
                if v {
                    number
                } else {
                    -number
                }
            })
            .collect()
    }

    #[must_use]
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for Model {
    /// Renders the competition `v ... 0` line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v")?;
        for lit in self.to_dimacs() {
            write!(f, " {lit}")?;
        }
        write!(f, " 0")
    }
}
