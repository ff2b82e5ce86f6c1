//! DIMACS CNF format parser.
//!
//! Standard format used in SAT competitions.

use satbench_base::{CnfFormula, Error, Result, MAX_VARS};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// A DIMACS CNF formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimacsCnf {
    /// Number of variables.
    pub num_vars: usize,
    /// Clause count declared in the header.
    pub declared_clauses: usize,
    /// Clauses as vectors of literals.
    pub clauses: Vec<Vec<i64>>,
}

impl DimacsCnf {
    /// Parses DIMACS CNF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut header: Option<(usize, usize)> = None;
        let mut clauses = Vec::new();
        let mut clause = Vec::new();
        let mut line_no = 0;

        for line in reader.lines() {
            let line = line?;
            line_no += 1;
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('c') {
                continue;
            }
            // SATLIB end-of-data marker
            if line.starts_with('%') {
                break;
            }

            if line.starts_with('p') {
                if header.is_some() {
                    return Err(Error::parse(line_no, "duplicate 'p' header"));
                }
                let parsed = parse_header(line, line_no)?;
                clauses.reserve(parsed.1);
                header = Some(parsed);
                continue;
            }

            let Some((num_vars, _)) = header else {
                return Err(Error::parse(
                    line_no,
                    "clause before DIMACS header 'p cnf ...'",
                ));
            };

            for token in line.split_whitespace() {
                let lit: i64 = token
                    .parse()
                    .map_err(|e| Error::parse(line_no, format!("invalid literal '{token}': {e}")))?;
                if lit == 0 {
                    clauses.push(std::mem::take(&mut clause));
                } else if lit.unsigned_abs() > num_vars as u64 {
                    return Err(Error::parse(
                        line_no,
                        format!("literal {lit} out of range for {num_vars} variables"),
                    ));
                } else {
                    clause.push(lit);
                }
            }
        }

        let Some((num_vars, declared_clauses)) = header else {
            return Err(Error::parse(line_no, "DIMACS header 'p cnf ...' not found"));
        };
        if !clause.is_empty() {
            return Err(Error::parse(line_no, "last clause is not terminated by 0"));
        }
        if clauses.len() != declared_clauses {
            tracing::warn!(
                "DIMACS header declares {} clauses, found {}",
                declared_clauses,
                clauses.len()
            );
        }

        Ok(Self {
            num_vars,
            declared_clauses,
            clauses,
        })
    }

    /// Parses a DIMACS file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Converts to DIMACS string.
    #[must_use]
    pub fn to_dimacs(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "p cnf {} {}", self.num_vars, self.clauses.len());
        for clause in &self.clauses {
            for lit in clause {
                let _ = write!(out, "{lit} ");
            }
            out.push_str("0\n");
        }
        out
    }

    /// Validates the clauses into a solver-ready formula.
    pub fn to_formula(&self) -> Result<CnfFormula> {
        CnfFormula::from_dimacs(self.num_vars, &self.clauses)
    }
}

impl FromStr for DimacsCnf {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_reader(s.as_bytes())
    }
}

impl From<&CnfFormula> for DimacsCnf {
    fn from(formula: &CnfFormula) -> Self {
        let clauses: Vec<Vec<i64>> = formula
            .clauses()
            .iter()
            .map(|clause| clause.iter().map(|lit| lit.to_dimacs()).collect())
            .collect();
        Self {
            num_vars: formula.num_vars(),
            declared_clauses: clauses.len(),
            clauses,
        }
    }
}

/// Writes `formula` in DIMACS form.
pub fn write_dimacs<W: Write>(mut writer: W, formula: &CnfFormula) -> io::Result<()> {
    writeln!(writer, "p cnf {} {}", formula.num_vars(), formula.num_clauses())?;
    for clause in formula.clauses() {
        for lit in clause {
            write!(writer, "{lit} ")?;
        }
        writeln!(writer, "0")?;
    }
    writer.flush()
}

fn parse_header(line: &str, line_no: usize) -> Result<(usize, usize)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 || parts[0] != "p" || parts[1] != "cnf" {
        return Err(Error::parse(
            line_no,
            format!("malformed header '{line}', expected 'p cnf <vars> <clauses>'"),
        ));
    }
    let num_vars: usize = parts[2]
        .parse()
        .map_err(|e| Error::parse(line_no, format!("invalid variable count: {e}")))?;
    if num_vars > MAX_VARS {
        return Err(Error::parse(
            line_no,
            format!("variable count {num_vars} exceeds the supported maximum {MAX_VARS}"),
        ));
    }
    let num_clauses = parts[3]
        .parse()
        .map_err(|e| Error::parse(line_no, format!("invalid clause count: {e}")))?;
    Ok((num_vars, num_clauses))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_err_line(input: &str) -> usize {
        match input.parse::<DimacsCnf>() {
            Err(Error::Parse { line, .. }) => line,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_variable_count_beyond_literal_range() {
        assert_eq!(parse_err_line("c big\np cnf 4294967296 1\n1 0\n"), 2);
        let cnf: DimacsCnf = "p cnf 2147483648 0\n".parse().unwrap();
        assert_eq!(cnf.num_vars, MAX_VARS);
    }

    #[test]
    fn test_parse_dimacs() {
        let input = r"
c This is a comment
p cnf 3 2
1 -2 0
2 3 0
";
        let cnf: DimacsCnf = input.parse().unwrap();
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.clauses.len(), 2);
        assert_eq!(cnf.clauses[0], vec![1, -2]);
        assert_eq!(cnf.clauses[1], vec![2, 3]);
    }

    #[test]
    fn test_clause_spanning_lines_and_satlib_trailer() {
        let input = "p cnf 3 2\n1 2\n3 0 -1\n-2 0\n%\n0\n";
        let cnf: DimacsCnf = input.parse().unwrap();
        assert_eq!(cnf.clauses, vec![vec![1, 2, 3], vec![-1, -2]]);
    }

    #[test]
    fn test_lone_zero_is_empty_clause() {
        let cnf: DimacsCnf = "p cnf 1 2\n1 0\n0\n".parse().unwrap();
        assert_eq!(cnf.clauses, vec![vec![1], vec![]]);
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(parse_err_line("1 2 0\n"), 1);
        assert_eq!(parse_err_line("p cnf x 2\n"), 1);
        assert_eq!(parse_err_line("p dnf 2 2\n"), 1);
        assert_eq!(parse_err_line("p cnf 2 1\n1 a 0\n"), 2);
        assert_eq!(parse_err_line("p cnf 2 1\n\n1 3 0\n"), 3);
        assert_eq!(parse_err_line("p cnf 2 1\np cnf 2 1\n"), 2);
        assert!("p cnf 2 1\n1 2\n".parse::<DimacsCnf>().is_err());
        assert!("c only a comment\n".parse::<DimacsCnf>().is_err());
    }

    #[test]
    fn test_to_dimacs_reparses() {
        let cnf: DimacsCnf = "p cnf 2 2\n1 2 0\n-1 -2 0\n".parse().unwrap();
        let again: DimacsCnf = cnf.to_dimacs().parse().unwrap();
        assert_eq!(again.clauses, cnf.clauses);
        assert_eq!(cnf.to_formula().unwrap().num_clauses(), 2);
    }
}
