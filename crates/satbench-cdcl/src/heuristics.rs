//! VSIDS activity scores.

use satbench_base::Var;

/// Activity above which every score is rescaled.
const RESCALE_LIMIT: f64 = 1e100;

/// VSIDS (Variable State Independent Decaying Sum) scores.
///
/// Decay is implemented by growing the bump increment instead of shrinking
/// every score; the two are equivalent up to a common factor, which the
/// periodic rescale keeps bounded.
#[derive(Debug, Clone)]
pub struct VsidsScores {
    /// Activity score for each variable.
    scores: Vec<f64>,
    /// Decay factor.
    decay: f64,
    /// Increment value.
    increment: f64,
}

impl VsidsScores {
    /// Creates new VSIDS scores, all zero.
    #[must_use]
    pub fn new(num_vars: usize, decay: f64) -> Self {
        Self {
            scores: vec![0.0; num_vars],
            decay,
            increment: 1.0,
        }
    }

    /// Sets the initial score of a variable.
    pub fn set(&mut self, var: Var, score: f64) {
        self.scores[var.index()] = score;
    }

    /// Bumps the activity of a variable.
    ///
    /// Returns `true` when the bump triggered a global rescale (relative order
    /// is unchanged).
    pub fn bump(&mut self, var: Var) -> bool {
        self.scores[var.index()] += self.increment;

        if self.scores[var.index()] > RESCALE_LIMIT {
            for score in &mut self.scores {
                *score *= 1e-100;
            }
            self.increment *= 1e-100;
            return true;
        }
        false
    }

    /// Decays all activities.
    pub fn decay(&mut self) {
        self.increment /= self.decay;
    }

    /// Gets the score for a variable.
    #[must_use]
    pub fn score(&self, var: Var) -> f64 {
        self.scores[var.index()]
    }

    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }
}
