//! Shared state for stochastic local search.
//!
//! Keeps, for the current full assignment, the number of true literals of
//! every clause and the set of unsatisfied clauses, so that break counts and
//! flips cost time proportional to the occurrences of one variable.

use rand::rngs::SmallRng;
use rand::Rng;
use satbench_base::{CnfFormula, Lit, Model, Var};

/// Sentinel for clauses that are not in the unsatisfied set.
const SATISFIED: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct LocalSearchState {
    clauses: Vec<Vec<Lit>>,
    /// Clauses containing each literal, indexed by literal code.
    occurrences: Vec<Vec<usize>>,
    values: Vec<bool>,
    true_count: Vec<u32>,
    unsat: Vec<usize>,
    /// Position of each clause in `unsat`, or `SATISFIED`.
    unsat_pos: Vec<usize>,
    /// Whether some clause is empty, which no assignment satisfies.
    has_empty_clause: bool,
}

impl LocalSearchState {
    /// Builds the occurrence lists. Duplicate literals are merged and
    /// tautologies left out, since they hold under every assignment.
    #[must_use]
    pub fn new(formula: &CnfFormula) -> Self {
        let num_vars = formula.num_vars();
        let mut clauses = Vec::with_capacity(formula.num_clauses());
        let mut has_empty_clause = false;
        'outer: for clause in formula.clauses() {
            let mut lits: Vec<Lit> = Vec::with_capacity(clause.len());
            for &lit in clause {
                if lits.contains(&!lit) {
                    continue 'outer;
                }
                if !lits.contains(&lit) {
                    lits.push(lit);
                }
            }
            has_empty_clause |= lits.is_empty();
            clauses.push(lits);
        }

        let mut occurrences = vec![Vec::new(); 2 * num_vars];
        for (ci, clause) in clauses.iter().enumerate() {
            for lit in clause {
                occurrences[lit.code()].push(ci);
            }
        }

        let num_clauses = clauses.len();
        Self {
            clauses,
            occurrences,
            values: vec![false; num_vars],
            true_count: vec![0; num_clauses],
            unsat: Vec::new(),
            unsat_pos: vec![SATISFIED; num_clauses],
            has_empty_clause,
        }
    }

    /// Draws a fresh uniform assignment and recomputes the clause counters.
    pub fn randomize(&mut self, rng: &mut SmallRng) {
        for value in &mut self.values {
            *value = rng.random_bool(0.5);
        }
        self.unsat.clear();
        for ci in 0..self.clauses.len() {
            let count = self.clauses[ci]
                .iter()
                .filter(|&&lit| self.is_true(lit))
                .count() as u32;
            self.true_count[ci] = count;
            self.unsat_pos[ci] = SATISFIED;
            if count == 0 {
                self.mark_unsat(ci);
            }
        }
    }

    fn is_true(&self, lit: Lit) -> bool {
        self.values[lit.var().index()] != lit.is_negative()
    }

    fn mark_unsat(&mut self, ci: usize) {
        self.unsat_pos[ci] = self.unsat.len();
        self.unsat.push(ci);
    }

    fn mark_sat(&mut self, ci: usize) {
        let pos = self.unsat_pos[ci];
        self.unsat.swap_remove(pos);
        if let Some(&moved) = self.unsat.get(pos) {
            self.unsat_pos[moved] = pos;
        }
        self.unsat_pos[ci] = SATISFIED;
    }

    /// Number of clauses that flipping `var` would make unsatisfied.
    #[must_use]
    pub fn break_count(&self, var: Var) -> u32 {
        let true_lit = var.lit(self.values[var.index()]);
        self.occurrences[true_lit.code()]
            .iter()
            .filter(|&&ci| self.true_count[ci] == 1)
            .count() as u32
    }

    /// Flips `var`, updating the counters and the unsatisfied set.
    pub fn flip(&mut self, var: Var) {
        let was_true = var.lit(self.values[var.index()]);
        self.values[var.index()] = !self.values[var.index()];

        for i in 0..self.occurrences[was_true.code()].len() {
            let ci = self.occurrences[was_true.code()][i];
            self.true_count[ci] -= 1;
            if self.true_count[ci] == 0 {
                self.mark_unsat(ci);
            }
        }
        let now_true = !was_true;
        for i in 0..self.occurrences[now_true.code()].len() {
            let ci = self.occurrences[now_true.code()][i];
            self.true_count[ci] += 1;
            if self.true_count[ci] == 1 {
                self.mark_sat(ci);
            }
        }
    }

    /// A uniformly chosen unsatisfied clause, `None` if there is none.
    pub fn random_unsat_clause(&self, rng: &mut SmallRng) -> Option<&[Lit]> {
        if self.unsat.is_empty() {
            return None;
        }
        let ci = self.unsat[rng.random_range(0..self.unsat.len())];
        Some(&self.clauses[ci])
    }

    #[must_use]
    pub fn num_unsat(&self) -> usize {
        self.unsat.len()
    }

    #[must_use]
    pub fn has_empty_clause(&self) -> bool {
        self.has_empty_clause
    }

    #[must_use]
    pub fn model(&self) -> Model {
        Model::new(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn formula(num_vars: usize, clauses: &[&[i64]]) -> CnfFormula {
        CnfFormula::from_dimacs(num_vars, clauses.iter().copied()).unwrap()
    }

    fn unsat_by_scan(state: &LocalSearchState, f: &CnfFormula) -> usize {
        let model = state.model();
        f.clauses()
            .iter()
            .filter(|c| !c.iter().any(|&l| model.lit_value(l)))
            .count()
    }

    #[test]
    fn test_counters_follow_flips() {
        let f = formula(4, &[&[1, 2], &[-1, 3], &[-2, -3, 4], &[-4, 1], &[2, -3]]);
        let mut state = LocalSearchState::new(&f);
        let mut rng = SmallRng::seed_from_u64(7);
        state.randomize(&mut rng);
        assert_eq!(state.num_unsat(), unsat_by_scan(&state, &f));

        for v in [0, 2, 1, 3, 0, 0, 2] {
            let var = Var::new(v);
            let predicted = state.num_unsat() + state.break_count(var) as usize;
            state.flip(var);
            assert_eq!(state.num_unsat(), unsat_by_scan(&state, &f));
            // Breaks are an upper bound on the increase.
            assert!(state.num_unsat() <= predicted);
        }
    }

    #[test]
    fn test_tautologies_and_empty_clauses() {
        let f = formula(2, &[&[1, -1], &[2, 2]]);
        let state = LocalSearchState::new(&f);
        assert!(!state.has_empty_clause());
        assert_eq!(state.occurrences[Var::new(1).positive().code()], vec![0]);
    }
}
