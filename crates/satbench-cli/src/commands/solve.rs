//! Solve command.

use crate::config::{ExperimentConfig, SolverKind};
use crate::record::RunRecord;
use anyhow::Context;
use clap::Args;
use satbench_format::DimacsCnf;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args)]
pub struct SolveArgs {
    /// DIMACS CNF file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Solver to run
    #[arg(short, long, value_enum, default_value_t = SolverKind::Cdcl)]
    pub solver: SolverKind,

    /// Timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// Step budget (cycles, nodes or flips)
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// Seed for the local searches
    #[arg(long)]
    pub seed: Option<u64>,

    /// Include the model in the printed record
    #[arg(short, long)]
    pub model: bool,

    /// JSON experiment configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: SolveArgs) -> anyhow::Result<ExitCode> {
    let mut config = ExperimentConfig::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.timeout_secs = Some(timeout);
    }
    if args.max_steps.is_some() {
        config.max_steps = args.max_steps;
    }
    if let Some(seed) = args.seed {
        config.set_seed(seed);
    }
    config.validate()?;

    tracing::info!("Loading problem from {:?}", args.input);
    let formula = DimacsCnf::from_path(&args.input)
        .and_then(|dimacs| dimacs.to_formula())
        .with_context(|| format!("loading {}", args.input.display()))?;
    tracing::info!(
        "Problem: {} variables, {} clauses",
        formula.num_vars(),
        formula.num_clauses()
    );

    let mut solver = config.build_solver(args.solver);
    let mut record = RunRecord::measure(solver.as_mut(), &formula, &config.budget(), &args.input)?;
    let status = record.status;
    if !args.model {
        record.model = None;
    }

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(ExitCode::from(status.exit_code() as u8))
}
