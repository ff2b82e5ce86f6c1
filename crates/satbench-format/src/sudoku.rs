//! Sudoku puzzles as CNF.
//!
//! A grid of side `n = b * b` uses `n³` variables, one per (row, column,
//! digit). Cells, rows, columns and boxes each get an at-least-one clause and
//! pairwise at-most-one clauses per digit; every clue becomes a unit clause.

use satbench_base::{CnfFormula, Error, Lit, Model, Result, Var, MAX_VARS};
use std::fmt;
use std::str::FromStr;

/// An n×n Sudoku grid; 0 marks an empty cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SudokuGrid {
    box_size: usize,
    cells: Vec<Vec<u32>>,
}

impl SudokuGrid {
    /// Builds a grid from rows, checking shape and digit range.
    pub fn new(cells: Vec<Vec<u32>>) -> Result<Self> {
        let size = cells.len();
        let box_size = (1..=size).find(|b| b * b >= size).unwrap_or(0);
        if size == 0 || box_size * box_size != size {
            return Err(Error::Sudoku(format!(
                "grid side {size} is not a perfect square"
            )));
        }
        if size.checked_pow(3).map_or(true, |vars| vars > MAX_VARS) {
            return Err(Error::Sudoku(format!(
                "grid side {size} needs more than {MAX_VARS} variables"
            )));
        }
        for (r, row) in cells.iter().enumerate() {
            if row.len() != size {
                return Err(Error::Sudoku(format!(
                    "row {} has {} cells, expected {size}",
                    r + 1,
                    row.len()
                )));
            }
            if let Some(&digit) = row.iter().find(|&&d| d as usize > size) {
                return Err(Error::Sudoku(format!(
                    "digit {digit} in row {} exceeds {size}",
                    r + 1
                )));
            }
        }
        Ok(Self { box_size, cells })
    }

    /// Side length `n`.
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn box_size(&self) -> usize {
        self.box_size
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.cells[row][col]
    }

    /// Variable for `digit` (1-based) at (`row`, `col`) (0-based).
    #[must_use]
    pub fn var(&self, row: usize, col: usize, digit: u32) -> Var {
        let n = self.size();
        let index = row * n * n + col * n + digit as usize - 1;
        // In range: `new` bounds n^3 by MAX_VARS.
        Var::new(index as u32)
    }

    /// Encodes the puzzle rules and clues.
    #[must_use]
    pub fn encode(&self) -> CnfFormula {
        let n = self.size();
        let mut clauses: Vec<Vec<Lit>> = Vec::new();
        let digits = 1..=n as u32;

        for r in 0..n {
            for c in 0..n {
                let cell: Vec<Var> = digits.clone().map(|d| self.var(r, c, d)).collect();
                exactly_one(&mut clauses, &cell);
            }
        }
        for d in digits.clone() {
            for r in 0..n {
                let row: Vec<Var> = (0..n).map(|c| self.var(r, c, d)).collect();
                exactly_one(&mut clauses, &row);
            }
            for c in 0..n {
                let col: Vec<Var> = (0..n).map(|r| self.var(r, c, d)).collect();
                exactly_one(&mut clauses, &col);
            }
            for br in (0..n).step_by(self.box_size) {
                for bc in (0..n).step_by(self.box_size) {
                    let cells: Vec<Var> = self
                        .box_cells(br, bc)
                        .map(|(r, c)| self.var(r, c, d))
                        .collect();
                    exactly_one(&mut clauses, &cells);
                }
            }
        }
        for (r, row) in self.cells.iter().enumerate() {
            for (c, &digit) in row.iter().enumerate() {
                if digit != 0 {
                    clauses.push(vec![self.var(r, c, digit).positive()]);
                }
            }
        }

        let mut formula = CnfFormula::new(n * n * n);
        for clause in clauses {
            let added = formula.add_clause(clause);
            debug_assert!(added.is_ok(), "sudoku encoding out of range: {added:?}");
        }
        formula
    }

    /// Reads the filled grid out of a model of [`Self::encode`].
    ///
    /// Cells with no true digit variable stay 0.
    #[must_use]
    pub fn decode(&self, model: &Model) -> SudokuGrid {
        let n = self.size();
        let cells = (0..n)
            .map(|r| {
                (0..n)
                    .map(|c| {
                        (1..=n as u32)
                            .find(|&d| model.value(self.var(r, c, d)))
                            .unwrap_or(0)
                    })
                    .collect()
            })
            .collect();
        SudokuGrid {
            box_size: self.box_size,
            cells,
        }
    }

    /// Whether the grid is complete and every row, column and box is a
    /// permutation of `1..=n`.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        let n = self.size();
        let rows_ok = (0..n).all(|r| is_permutation((0..n).map(|c| self.cells[r][c]), n));
        let cols_ok = (0..n).all(|c| is_permutation((0..n).map(|r| self.cells[r][c]), n));
        let boxes_ok = (0..n).step_by(self.box_size).all(|br| {
            (0..n).step_by(self.box_size).all(|bc| {
                is_permutation(self.box_cells(br, bc).map(|(r, c)| self.cells[r][c]), n)
            })
        });
        rows_ok && cols_ok && boxes_ok
    }

    /// Whether every clue of `self` appears unchanged in `solution`.
    #[must_use]
    pub fn is_completed_by(&self, solution: &SudokuGrid) -> bool {
        solution.size() == self.size()
            && self
                .cells
                .iter()
                .flatten()
                .zip(solution.cells.iter().flatten())
                .all(|(&clue, &value)| clue == 0 || clue == value)
    }

    fn box_cells(&self, br: usize, bc: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        let b = self.box_size;
        (0..b).flat_map(move |dr| (0..b).map(move |dc| (br + dr, bc + dc)))
    }
}

fn is_permutation(values: impl Iterator<Item = u32>, n: usize) -> bool {
    let mut seen = vec![false; n + 1];
    for v in values {
        let v = v as usize;
        if v == 0 || v > n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

fn exactly_one(clauses: &mut Vec<Vec<Lit>>, vars: &[Var]) {
    clauses.push(vars.iter().map(|v| v.positive()).collect());
    for (i, a) in vars.iter().enumerate() {
        for b in &vars[i + 1..] {
            clauses.push(vec![a.negative(), b.negative()]);
        }
    }
}

impl FromStr for SudokuGrid {
    type Err = Error;

    /// Parses one row per line: compact digits (`0` or `.` for blanks) or
    /// whitespace-separated numbers. Blank lines and `#` comments are skipped.
    fn from_str(s: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in s.lines() {
            let text = line.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let row = if text.contains(char::is_whitespace) {
                text.split_whitespace()
                    .map(|tok| match tok {
                        "." => Ok(0),
                        _ => tok
                            .parse::<u32>()
                            .map_err(|e| Error::Sudoku(format!("invalid cell '{tok}': {e}"))),
                    })
                    .collect::<Result<Vec<u32>>>()?
            } else {
                text.chars()
                    .map(|ch| match ch {
                        '.' => Ok(0),
                        _ => ch
                            .to_digit(10)
                            .ok_or_else(|| Error::Sudoku(format!("invalid cell '{ch}'"))),
                    })
                    .collect::<Result<Vec<u32>>>()?
            };
            rows.push(row);
        }
        Self::new(rows)
    }
}

impl fmt::Display for SudokuGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let wide = self.size() > 9;
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(u32::to_string).collect();
            if wide {
                writeln!(f, "{}", line.join(" "))?;
            } else {
                writeln!(f, "{}", line.concat())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_and_spaced() {
        let compact: SudokuGrid = "1.3.\n0000\n0000\n0000\n".parse().unwrap();
        let spaced: SudokuGrid = "1 0 3 0\n0 0 0 0\n0 0 0 0\n0 0 0 0\n".parse().unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(compact.box_size(), 2);
        assert_eq!(compact.get(0, 2), 3);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!("123\n123\n123\n".parse::<SudokuGrid>().is_err());
        assert!("1234\n123\n1234\n1234\n".parse::<SudokuGrid>().is_err());
        assert!("5000\n0000\n0000\n0000\n".parse::<SudokuGrid>().is_err());
    }

    #[test]
    fn test_rejects_grid_beyond_variable_range() {
        let err = SudokuGrid::new(vec![vec![0; 1296]; 1296]).unwrap_err();
        assert!(matches!(err, Error::Sudoku(_)));
    }

    #[test]
    fn test_encoding_size() {
        let grid: SudokuGrid = "1000\n0000\n0000\n0000\n".parse().unwrap();
        let formula = grid.encode();
        assert_eq!(formula.num_vars(), 64);
        // 4 groups (cell, row, col, box) x 16 exactly-one constraints of
        // 1 + C(4,2) clauses each, plus one clue.
        assert_eq!(formula.num_clauses(), 4 * 16 * 7 + 1);
    }

    #[test]
    fn test_var_numbering() {
        let grid: SudokuGrid = "0000\n0000\n0000\n0000\n".parse().unwrap();
        assert_eq!(grid.var(0, 0, 1).to_dimacs(), 1);
        assert_eq!(grid.var(0, 1, 1).to_dimacs(), 5);
        assert_eq!(grid.var(3, 3, 4).to_dimacs(), 64);
    }

    #[test]
    fn test_is_solved() {
        let solved: SudokuGrid = "1234\n3412\n2143\n4321\n".parse().unwrap();
        assert!(solved.is_solved());
        let broken: SudokuGrid = "1234\n3412\n2143\n4312\n".parse().unwrap();
        assert!(!broken.is_solved());
    }
}
