//! Per-run result records and their CSV/JSONL output.

use satbench_base::{Budget, CnfFormula, Error, MemoryUsage, SatSolver, SolverStats, Status};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

/// Column order of the CSV output.
pub const CSV_HEADER: [&str; 20] = [
    "solver",
    "file",
    "problem_type",
    "num_vars",
    "num_clauses",
    "status",
    "wall_time",
    "cpu_time",
    "peak_memory",
    "decisions",
    "propagations",
    "conflicts",
    "learned_clauses",
    "deleted_clauses",
    "restarts",
    "unit_propagations",
    "pure_eliminations",
    "flips",
    "noise",
    "verified",
];

/// Everything measured about one solver run on one formula.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub solver: String,
    pub file: String,
    pub problem_type: String,
    pub num_vars: usize,
    pub num_clauses: usize,
    pub status: Status,
    /// Seconds of wall-clock time spent in `solve`.
    pub wall_time: f64,
    /// Seconds of CPU time of the solving thread.
    pub cpu_time: f64,
    /// Peak resident set size of the process, in bytes.
    pub peak_memory: u64,
    #[serde(flatten)]
    pub stats: SolverStats,
    /// WalkSAT noise of a parameter sweep run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<f64>,
    /// Whether the model satisfied every clause; empty unless SAT.
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Vec<i64>>,
}

impl RunRecord {
    /// Runs `solver` on `formula` under `budget`, timing the call and
    /// checking any model against the formula.
    ///
    /// A model that falsifies a clause is an `Error::Verification`.
    pub fn measure(
        solver: &mut dyn SatSolver,
        formula: &CnfFormula,
        budget: &Budget,
        file: &Path,
    ) -> Result<Self, Error> {
        let wall = Instant::now();
        let cpu = cpu_time::ThreadTime::now();
        let verdict = solver.solve(formula, budget)?;
        let cpu_time = cpu.elapsed().as_secs_f64();
        let wall_time = wall.elapsed().as_secs_f64();

        let verified = match &verdict.model {
            Some(model) => {
                if let Some(clause) = formula.first_falsified(model) {
                    return Err(Error::Verification {
                        solver: solver.name().to_string(),
                        clause: clause.iter().map(|lit| lit.to_dimacs()).collect(),
                    });
                }
                Some(true)
            }
            None => None,
        };

        tracing::info!(
            solver = solver.name(),
            file = %file.display(),
            status = %verdict.status,
            wall_time,
            "run finished"
        );

        Ok(Self {
            solver: solver.name().to_string(),
            file: file.display().to_string(),
            problem_type: infer_problem_type(file).to_string(),
            num_vars: formula.num_vars(),
            num_clauses: formula.num_clauses(),
            status: verdict.status,
            wall_time,
            cpu_time,
            peak_memory: MemoryUsage::current().peak_rss_bytes,
            stats: verdict.stats,
            noise: None,
            verified,
            model: verdict.model.map(|model| model.to_dimacs()),
        })
    }

    fn csv_fields(&self) -> Vec<String> {
        let opt = |value: Option<u64>| value.map(|v| v.to_string()).unwrap_or_default();
        let s = &self.stats;
        vec![
            self.solver.clone(),
            self.file.clone(),
            self.problem_type.clone(),
            self.num_vars.to_string(),
            self.num_clauses.to_string(),
            self.status.to_string(),
            format!("{:.6}", self.wall_time),
            format!("{:.6}", self.cpu_time),
            self.peak_memory.to_string(),
            opt(s.decisions),
            opt(s.propagations),
            opt(s.conflicts),
            opt(s.learned_clauses),
            opt(s.deleted_clauses),
            opt(s.restarts),
            opt(s.unit_propagations),
            opt(s.pure_eliminations),
            opt(s.flips),
            self.noise.map(|v| v.to_string()).unwrap_or_default(),
            self.verified.map(|v| v.to_string()).unwrap_or_default(),
        ]
    }
}

/// Classifies a benchmark file by the directories it sits in.
pub fn infer_problem_type(path: &Path) -> &'static str {
    let mut components = path.components().map(|c| c.as_os_str());
    if components.clone().any(|c| c == "sudoku") {
        "sudoku"
    } else if components.any(|c| c == "random_sat") {
        "random_3sat"
    } else {
        "unknown"
    }
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_csv_line<W: Write>(writer: &mut W, fields: &[String]) -> io::Result<()> {
    let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
    writeln!(writer, "{}", line.join(","))
}

/// Writes the header and one row per record.
pub fn write_csv<W: Write>(mut writer: W, records: &[RunRecord]) -> io::Result<()> {
    let header: Vec<String> = CSV_HEADER.iter().map(|h| h.to_string()).collect();
    write_csv_line(&mut writer, &header)?;
    for record in records {
        write_csv_line(&mut writer, &record.csv_fields())?;
    }
    writer.flush()
}

/// Writes one JSON object per line.
pub fn write_jsonl<W: Write>(mut writer: W, records: &[RunRecord]) -> Result<(), Error> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use satbench_base::{Model, Verdict};

    /// Always answers SAT with the all-false model.
    struct AllFalse;

    impl SatSolver for AllFalse {
        fn name(&self) -> &'static str {
            "all-false"
        }

        fn solve(&mut self, formula: &CnfFormula, _: &Budget) -> satbench_base::Result<Verdict> {
            let model = Model::new(vec![false; formula.num_vars()]);
            Ok(Verdict::sat(model, SolverStats::default()))
        }
    }

    fn formula(clauses: &[&[i64]]) -> CnfFormula {
        CnfFormula::from_dimacs(2, clauses.iter().copied()).unwrap()
    }

    #[test]
    fn test_problem_type_from_path() {
        assert_eq!(infer_problem_type(Path::new("bench/sudoku/p1.cnf")), "sudoku");
        assert_eq!(
            infer_problem_type(Path::new("bench/random_sat/uf20-01.cnf")),
            "random_3sat"
        );
        assert_eq!(infer_problem_type(Path::new("bench/sudoku_extra.cnf")), "unknown");
    }

    #[test]
    fn test_measure_verifies_model() {
        let f = formula(&[&[-1, 2], &[-2]]);
        let record = RunRecord::measure(&mut AllFalse, &f, &Budget::unlimited(), Path::new("a.cnf"))
            .unwrap();
        assert_eq!(record.status, Status::Sat);
        assert_eq!(record.verified, Some(true));
        assert_eq!(record.model, Some(vec![-1, -2]));
        assert_eq!(record.num_clauses, 2);
    }

    #[test]
    fn test_measure_rejects_bad_model() {
        let f = formula(&[&[-1], &[1, 2]]);
        let err = RunRecord::measure(&mut AllFalse, &f, &Budget::unlimited(), Path::new("a.cnf"))
            .unwrap_err();
        assert!(err.is_fatal());
        match err {
            Error::Verification { solver, clause } => {
                assert_eq!(solver, "all-false");
                assert_eq!(clause, vec![1, 2]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_csv_quotes_and_blanks() {
        let f = formula(&[&[-1]]);
        let mut record =
            RunRecord::measure(&mut AllFalse, &f, &Budget::unlimited(), Path::new("x.cnf")).unwrap();
        record.file = "odd,\"name\".cnf".to_string();

        let mut out = Vec::new();
        write_csv(&mut out, &[record.clone()]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split(',').count(), CSV_HEADER.len());
        assert!(lines[1].starts_with("all-false,\"odd,\"\"name\"\".cnf\",unknown,2,1,SAT,"));
        // Nine empty counters and no noise, then the verification flag.
        assert!(lines[1].ends_with(&format!("{}true", ",".repeat(11))));

        record.noise = Some(0.3);
        let mut out = Vec::new();
        write_csv(&mut out, &[record]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().ends_with(",0.3,true"));
    }

    #[test]
    fn test_jsonl_flattens_stats() {
        let f = formula(&[&[-2]]);
        let record =
            RunRecord::measure(&mut AllFalse, &f, &Budget::unlimited(), Path::new("z.cnf")).unwrap();
        let mut out = Vec::new();
        write_jsonl(&mut out, &[record.clone(), record]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        let value: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(value["status"], "SAT");
        assert!(value["decisions"].is_null());
        assert_eq!(value["model"], serde_json::json!([-1, -2]));
    }
}
