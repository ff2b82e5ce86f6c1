//! Sudoku command.

use crate::config::{ExperimentConfig, SolverKind};
use crate::record::RunRecord;
use anyhow::Context;
use clap::Args;
use satbench_base::Status;
use satbench_format::{write_dimacs, SudokuGrid};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct SudokuArgs {
    /// Puzzle file, one row per line (`.` or `0` for blanks)
    #[arg(required = true)]
    pub puzzle: PathBuf,

    /// Where to write the DIMACS encoding (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Solve the puzzle and print the completed grid instead
    #[arg(long)]
    pub solve: bool,

    /// Solver used with `--solve`
    #[arg(short, long, value_enum, default_value_t = SolverKind::Cdcl)]
    pub solver: SolverKind,

    /// Timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<f64>,
}

pub fn run(args: SudokuArgs) -> anyhow::Result<ExitCode> {
    let text = fs::read_to_string(&args.puzzle)
        .with_context(|| format!("reading {}", args.puzzle.display()))?;
    let grid: SudokuGrid = text.parse()?;
    let formula = grid.encode();
    tracing::info!(
        "Encoded {}x{} puzzle: {} variables, {} clauses",
        grid.size(),
        grid.size(),
        formula.num_vars(),
        formula.num_clauses()
    );

    if !args.solve {
        match &args.output {
            Some(path) => write_dimacs(BufWriter::new(File::create(path)?), &formula)?,
            None => write_dimacs(BufWriter::new(io::stdout().lock()), &formula)?,
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = ExperimentConfig {
        timeout_secs: args.timeout,
        ..ExperimentConfig::default()
    };
    config.validate()?;
    let mut solver = config.build_solver(args.solver);
    let record = RunRecord::measure(solver.as_mut(), &formula, &config.budget(), &args.puzzle)?;

    match record.status {
        Status::Sat => {
            let model = record
                .model
                .as_deref()
                .map(|lits| satbench_base::Model::from_dimacs(formula.num_vars(), lits))
                .context("SAT verdict without a model")?;
            let solution = grid.decode(&model);
            anyhow::ensure!(
                solution.is_solved() && grid.is_completed_by(&solution),
                "decoded grid is not a valid completion of the puzzle"
            );
            print!("{solution}");
        }
        Status::Unsat => println!("no solution"),
        Status::Timeout => println!("unknown (budget exhausted)"),
    }
    Ok(ExitCode::from(record.status.exit_code() as u8))
}
