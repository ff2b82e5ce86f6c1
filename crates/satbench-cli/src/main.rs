//! satbench CLI - runs and compares SAT solvers.

mod commands;
mod config;
mod record;

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "satbench")]
#[command(author, version, about = "CDCL and baseline SAT solvers with an experiment harness", long_about = None)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one DIMACS file and print its result record as JSON
    Solve(commands::solve::SolveArgs),
    /// Run solvers over benchmark files and write CSV/JSONL results
    Bench(commands::bench::BenchArgs),
    /// Encode a Sudoku puzzle to DIMACS, or solve it
    Sudoku(commands::sudoku::SudokuArgs),
    /// Run WalkSAT across noise settings and write CSV/JSONL results
    Sweep(commands::sweep::SweepArgs),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve(args) => commands::solve::run(args),
        Commands::Bench(args) => commands::bench::run(args),
        Commands::Sudoku(args) => commands::sudoku::run(args),
        Commands::Sweep(args) => commands::sweep::run(args),
    }
}
