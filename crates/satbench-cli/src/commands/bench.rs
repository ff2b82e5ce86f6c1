//! Bench command: every selected solver on every benchmark file.

use crate::config::{ExperimentConfig, SolverKind};
use crate::record::{self, RunRecord};
use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use satbench_base::CnfFormula;
use satbench_format::DimacsCnf;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct BenchArgs {
    /// Files or directories searched recursively for `.cnf` files
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// CSV output path; a `.jsonl` file with the same stem is written next to it
    #[arg(short, long, default_value = "results.csv")]
    pub output: PathBuf,

    /// Solvers to run (defaults to the config file, or all of them)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub solvers: Vec<SolverKind>,

    /// Number of parallel workers (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Timeout in seconds per run
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Flip limit per try for the local searches
    #[arg(long)]
    pub max_flips: Option<u64>,

    /// JSON experiment configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: BenchArgs) -> anyhow::Result<ExitCode> {
    let mut config = ExperimentConfig::load(args.config.as_deref())?;
    if !args.solvers.is_empty() {
        config.solvers = args.solvers.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = Some(timeout);
    }
    if let Some(max_flips) = args.max_flips {
        config.set_max_flips(max_flips);
    }
    config.validate()?;

    let files = collect_files(&args.paths)?;
    tracing::info!("Found {} files to process", files.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()?;

    let per_file: Vec<anyhow::Result<Vec<RunRecord>>> =
        pool.install(|| files.par_iter().map(|path| process_file(path, &config)).collect());

    let mut records = Vec::new();
    for result in per_file {
        records.extend(result?);
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let csv = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    record::write_csv(BufWriter::new(csv), &records)?;

    let jsonl_path = args.output.with_extension("jsonl");
    let jsonl = File::create(&jsonl_path)
        .with_context(|| format!("creating {}", jsonl_path.display()))?;
    record::write_jsonl(BufWriter::new(jsonl), &records)?;

    tracing::info!(
        "Wrote {} records to {} and {}",
        records.len(),
        args.output.display(),
        jsonl_path.display()
    );
    Ok(ExitCode::SUCCESS)
}

/// Every `.cnf` file under `paths`, in sorted order.
pub(crate) fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "cnf") {
                files.push(path.to_owned());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Runs every configured solver on one file. Unreadable files are skipped
/// with a warning; a model that fails verification aborts the whole bench.
fn process_file(path: &Path, config: &ExperimentConfig) -> anyhow::Result<Vec<RunRecord>> {
    let formula = match load(path) {
        Ok(formula) => formula,
        Err(e) => {
            tracing::warn!("Skipping {}: {}", path.display(), e);
            return Ok(Vec::new());
        }
    };

    let mut records = Vec::with_capacity(config.solvers.len());
    for &kind in &config.solvers {
        let mut solver = config.build_solver(kind);
        let record = RunRecord::measure(solver.as_mut(), &formula, &config.budget(), path)
            .with_context(|| format!("{kind} on {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

pub(crate) fn load(path: &Path) -> satbench_base::Result<CnfFormula> {
    DimacsCnf::from_path(path)?.to_formula()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write(path: &Path, text: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap().write_all(text.as_bytes()).unwrap();
    }

    #[test]
    fn test_collect_files_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(&dir.join("b/sudoku/2.cnf"), "p cnf 1 1\n1 0\n");
        write(&dir.join("a/1.cnf"), "p cnf 1 1\n1 0\n");
        write(&dir.join("a/notes.txt"), "ignored");

        let files = collect_files(&[dir.to_path_buf()]).unwrap();
        assert_eq!(files, vec![dir.join("a/1.cnf"), dir.join("b/sudoku/2.cnf")]);
    }

    #[test]
    fn test_bench_writes_csv_and_jsonl() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write(&dir.join("in/random_sat/sat.cnf"), "p cnf 2 2\n1 2 0\n-1 0\n");
        write(&dir.join("in/unsat.cnf"), "p cnf 1 2\n1 0\n-1 0\n");
        write(&dir.join("in/broken.cnf"), "p cnf 1 1\n5 0\n");

        let output = dir.join("out/results.csv");
        let args = BenchArgs {
            paths: vec![dir.join("in")],
            output: output.clone(),
            solvers: vec![SolverKind::Cdcl, SolverKind::Dpll],
            jobs: 2,
            timeout: Some(10.0),
            max_flips: None,
            config: None,
        };
        run(args).unwrap();

        let csv = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        // Header plus two solvers on the two readable files.
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("cdcl,"));
        assert!(lines[1].contains(",random_3sat,2,2,SAT,"));
        assert!(lines[2].starts_with("dpll,"));
        assert!(lines[3].contains(",unknown,1,2,UNSAT,"));

        let jsonl = fs::read_to_string(dir.join("out/results.jsonl")).unwrap();
        assert_eq!(jsonl.lines().count(), 4);
    }
}
