//! Variables, literals, formulas and models.
//!
//! Variables are 0-based internally; DIMACS variable `v` is `Var(v - 1)`.
//! Literals pack a variable and a polarity into one `u32` so they can index
//! per-literal arrays directly.

mod formula;
mod model;

pub use formula::CnfFormula;
pub use model::Model;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// Largest number of variables a formula may declare: every literal code
/// `2 * var + 1` must fit in a `u32`.
pub const MAX_VARS: usize = 1 << 31;

/// A Boolean variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Var(u32);

impl Var {
    /// Creates a variable from its 0-based index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Creates a variable from a 1-based DIMACS number.
    ///
    /// Returns `None` for 0 and for numbers beyond [`MAX_VARS`].
    #[must_use]
    pub fn from_dimacs(number: u64) -> Option<Self> {
        let index = number.checked_sub(1)?;
        if index >= MAX_VARS as u64 {
            return None;
        }
        u32::try_from(index).ok().map(Self)
    }

    /// The 0-based index, for array access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The 1-based DIMACS number.
    #[must_use]
    pub const fn to_dimacs(self) -> i64 {
        self.0 as i64 + 1
    }

    /// The literal of this variable with the given polarity.
    #[must_use]
    pub const fn lit(self, positive: bool) -> Lit {
        Lit::new(self, !positive)
    }

    #[must_use]
    pub const fn positive(self) -> Lit {
        Lit::new(self, false)
    }

    #[must_use]
    pub const fn negative(self) -> Lit {
        Lit::new(self, true)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.to_dimacs())
    }
}

/// A variable with a polarity, encoded as `2 * var + negated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lit(u32);

impl Lit {
    #[must_use]
    pub const fn new(var: Var, negated: bool) -> Self {
        Self((var.0 << 1) | negated as u32)
    }

    /// Converts a signed DIMACS literal. Returns `None` for 0.
    #[must_use]
    pub fn from_dimacs(literal: i64) -> Option<Self> {
        let var = Var::from_dimacs(literal.unsigned_abs())?;
        Some(Self::new(var, literal < 0))
    }

    /// The signed DIMACS form.
    #[must_use]
    pub const fn to_dimacs(self) -> i64 {
        let number = self.var().to_dimacs();
        if self.is_negative() {
            -number
        } else {
            number
        }
    }

    #[must_use]
    pub const fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 & 1 == 1
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// Dense index in `0..2 * num_vars`.
    #[must_use]
    pub const fn code(self) -> usize {
        self.0 as usize
    }

    /// Whether `self` and `other` share a variable with opposite signs.
    #[must_use]
    pub fn is_complement_of(self, other: Lit) -> bool {
        self.0 ^ other.0 == 1
    }
}

impl Not for Lit {
    type Output = Lit;

    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}
