//! DPLL with the Jeroslow-Wang branching rule.
//!
//! Unit propagation and pure-literal elimination scan the clause list; the
//! search keeps one frame per open decision on an explicit stack and undoes
//! assignments through a trail.

use satbench_base::{Budget, CnfFormula, Lit, Model, Result, SatSolver, SolverStats, Var, Verdict};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpllStats {
    pub decisions: u64,
    pub unit_propagations: u64,
    pub pure_eliminations: u64,
}

impl From<DpllStats> for SolverStats {
    fn from(stats: DpllStats) -> Self {
        Self {
            decisions: Some(stats.decisions),
            unit_propagations: Some(stats.unit_propagations),
            pure_eliminations: Some(stats.pure_eliminations),
            ..Self::default()
        }
    }
}

/// An open decision.
#[derive(Debug, Clone, Copy)]
struct Frame {
    lit: Lit,
    /// Trail length before the decision.
    mark: usize,
    /// Whether the complement has been tried as well.
    flipped: bool,
}

/// Search state for one formula.
#[derive(Debug)]
pub struct DpllSearch<'a> {
    clauses: &'a [Vec<Lit>],
    values: Vec<Option<bool>>,
    trail: Vec<Var>,
    stats: DpllStats,
}

impl<'a> DpllSearch<'a> {
    #[must_use]
    pub fn new(formula: &'a CnfFormula) -> Self {
        Self {
            clauses: formula.clauses(),
            values: vec![None; formula.num_vars()],
            trail: Vec::new(),
            stats: DpllStats::default(),
        }
    }

    fn value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.var().index()].map(|v| v != lit.is_negative())
    }

    fn assign(&mut self, lit: Lit) {
        self.values[lit.var().index()] = Some(lit.is_positive());
        self.trail.push(lit.var());
    }

    fn undo(&mut self, mark: usize) {
        for var in self.trail.drain(mark..) {
            self.values[var.index()] = None;
        }
    }

    /// Assigns unit literals until none is left. Returns `false` on a
    /// falsified clause.
    fn unit_propagate(&mut self) -> bool {
        loop {
            let mut unit = None;
            for clause in self.clauses {
                let mut open = None;
                let mut open_count = 0;
                let mut satisfied = false;
                for &lit in clause {
                    match self.value(lit) {
                        Some(true) => {
                            satisfied = true;
                            break;
                        }
                        Some(false) => {}
                        None => {
                            open_count += 1;
                            open = Some(lit);
                        }
                    }
                }
                if satisfied {
                    continue;
                }
                match open_count {
                    0 => return false,
                    1 => {
                        unit = open;
                        break;
                    }
                    _ => {}
                }
            }
            let Some(lit) = unit else {
                return true;
            };
            self.stats.unit_propagations += 1;
            self.assign(lit);
        }
    }

    /// Literal polarities occurring in unsatisfied clauses, indexed by
    /// literal code, together with the Jeroslow-Wang weight of each literal.
    fn scan_open_clauses(&self) -> (Vec<bool>, Vec<f64>) {
        let mut occurs = vec![false; 2 * self.values.len()];
        let mut weight = vec![0.0; 2 * self.values.len()];
        for clause in self.clauses {
            if clause.iter().any(|&lit| self.value(lit) == Some(true)) {
                continue;
            }
            let open: Vec<Lit> = clause
                .iter()
                .copied()
                .filter(|&lit| self.value(lit).is_none())
                .collect();
            let w = 2f64.powi(-(open.len() as i32));
            for lit in open {
                occurs[lit.code()] = true;
                weight[lit.code()] += w;
            }
        }
        (occurs, weight)
    }

    /// Assigns every pure literal.
    fn eliminate_pure_literals(&mut self) {
        let (occurs, _) = self.scan_open_clauses();
        for (i, var) in (0..self.values.len()).zip((0..).map(Var::new)) {
            let (pos, neg) = (var.positive(), var.negative());
            if self.values[i].is_some() {
                continue;
            }
            let pure = match (occurs[pos.code()], occurs[neg.code()]) {
                (true, false) => pos,
                (false, true) => neg,
                _ => continue,
            };
            self.stats.pure_eliminations += 1;
            self.assign(pure);
        }
    }

    /// The open literal of maximal Jeroslow-Wang weight; `None` once every
    /// clause is satisfied.
    fn pick_literal(&self) -> Option<Lit> {
        let (occurs, weight) = self.scan_open_clauses();
        let mut best: Option<(usize, f64)> = None;
        for (code, &w) in weight.iter().enumerate() {
            if occurs[code] && best.map_or(true, |(_, b)| w > b) {
                best = Some((code, w));
            }
        }
        best.map(|(code, _)| {
            let var = Var::new((code / 2) as u32);
            var.lit(code % 2 == 0)
        })
    }

    /// Runs the search.
    pub fn run(&mut self, budget: &Budget) -> Verdict {
        let mut meter = budget.start();
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            if !meter.tick() {
                return Verdict::timeout(self.stats.into());
            }

            if self.unit_propagate() {
                self.eliminate_pure_literals();
                match self.pick_literal() {
                    None => {
                        let values = self.values.iter().map(|v| v.unwrap_or(false)).collect();
                        return Verdict::sat(Model::new(values), self.stats.into());
                    }
                    Some(lit) => {
                        self.stats.decisions += 1;
                        stack.push(Frame {
                            lit,
                            mark: self.trail.len(),
                            flipped: false,
                        });
                        self.assign(lit);
                        continue;
                    }
                }
            }

            // Conflict: resume the deepest decision with an untried branch.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Verdict::unsat(self.stats.into());
                };
                let (lit, mark) = (frame.lit, frame.mark);
                if frame.flipped {
                    stack.pop();
                    continue;
                }
                frame.flipped = true;
                self.undo(mark);
                self.stats.decisions += 1;
                self.assign(!lit);
                break;
            }
        }
    }
}

/// DPLL as a [`SatSolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Dpll;

impl SatSolver for Dpll {
    fn name(&self) -> &'static str {
        "dpll"
    }

    fn solve(&mut self, formula: &CnfFormula, budget: &Budget) -> Result<Verdict> {
        Ok(DpllSearch::new(formula).run(budget))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(num_vars: usize, clauses: &[&[i64]]) -> CnfFormula {
        CnfFormula::from_dimacs(num_vars, clauses.iter().copied()).unwrap()
    }

    #[test]
    fn test_unit_chain_needs_no_decision() {
        let f = formula(3, &[&[1], &[-1, 2], &[-2, 3]]);
        let verdict = Dpll.solve(&f, &Budget::unlimited()).unwrap();
        assert!(verdict.is_sat());
        assert_eq!(verdict.stats.decisions, Some(0));
        assert_eq!(verdict.stats.unit_propagations, Some(3));
    }

    #[test]
    fn test_pure_literal() {
        let f = formula(2, &[&[1, 2], &[1, -2]]);
        let mut search = DpllSearch::new(&f);
        let verdict = search.run(&Budget::unlimited());
        assert!(verdict.is_sat());
        assert_eq!(verdict.stats.pure_eliminations, Some(1));
        assert!(verdict.model.unwrap().value(Var::new(0)));
    }

    #[test]
    fn test_jeroslow_wang_prefers_short_clauses() {
        // -3 sits in a binary clause, 1 and 2 only in ternary ones.
        let f = formula(3, &[&[1, 2, 3], &[-3, 1], &[-3, 2], &[-1, -2, 3]]);
        let search = DpllSearch::new(&f);
        assert_eq!(search.pick_literal().map(|l| l.to_dimacs()), Some(-3));
    }

    #[test]
    fn test_exhausts_both_branches() {
        let f = formula(2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        let verdict = Dpll.solve(&f, &Budget::unlimited()).unwrap();
        assert!(verdict.is_unsat());
        assert_eq!(verdict.stats.decisions, Some(2));
    }

    #[test]
    fn test_node_budget() {
        let f = formula(2, &[&[1, 2], &[1, -2], &[-1, 2], &[-1, -2]]);
        let verdict = Dpll.solve(&f, &Budget::unlimited().with_steps(1)).unwrap();
        assert_eq!(verdict.status, satbench_base::Status::Timeout);
    }
}
