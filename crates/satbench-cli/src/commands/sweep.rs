//! Sweep command: WalkSAT at several noise settings over benchmark files.

use super::bench::{collect_files, load};
use crate::config::ExperimentConfig;
use crate::record::{self, RunRecord};
use anyhow::Context;
use clap::Args;
use rayon::prelude::*;
use satbench_base::CnfFormula;
use satbench_baseline::{WalkSat, WalkSatConfig};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Files or directories searched recursively for `.cnf` files
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Noise values to try
    #[arg(short, long, value_delimiter = ',', default_values_t = [0.1, 0.3, 0.5, 0.7])]
    pub noise: Vec<f64>,

    /// CSV output path; a `.jsonl` file with the same stem is written next to it
    #[arg(short, long, default_value = "results/parameter_sensitivity.csv")]
    pub output: PathBuf,

    /// Flips per run
    #[arg(long, default_value_t = 10_000)]
    pub max_flips: u64,

    /// Number of parallel workers (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Timeout in seconds per run
    #[arg(short, long)]
    pub timeout: Option<f64>,

    /// JSON experiment configuration (seed and budget)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: SweepArgs) -> anyhow::Result<ExitCode> {
    let mut config = ExperimentConfig::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.timeout_secs = Some(timeout);
    }
    config.validate()?;
    if let Some(bad) = args.noise.iter().find(|p| !(0.0..=1.0).contains(*p)) {
        return Err(satbench_base::Error::Config(format!(
            "noise must lie in [0, 1], got {bad}"
        ))
        .into());
    }

    let mut formulas: Vec<(PathBuf, CnfFormula)> = Vec::new();
    for path in collect_files(&args.paths)? {
        match load(&path) {
            Ok(formula) => formulas.push((path, formula)),
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    tracing::info!(
        "Sweeping {} noise values over {} files",
        args.noise.len(),
        formulas.len()
    );

    // Noise-major, so the output groups every file under each setting.
    let jobs: Vec<(f64, usize)> = args
        .noise
        .iter()
        .flat_map(|&noise| (0..formulas.len()).map(move |i| (noise, i)))
        .collect();

    let base = WalkSatConfig {
        max_tries: 1,
        max_flips: args.max_flips,
        ..config.walksat.clone()
    };
    let budget = config.budget();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()?;
    let results: Vec<anyhow::Result<RunRecord>> = pool.install(|| {
        jobs.par_iter()
            .map(|&(noise, i)| {
                let (path, formula) = &formulas[i];
                let mut solver = WalkSat::new(WalkSatConfig {
                    noise,
                    ..base.clone()
                });
                let mut record = RunRecord::measure(&mut solver, formula, &budget, path)
                    .with_context(|| format!("walksat (noise {noise}) on {}", path.display()))?;
                record.noise = Some(noise);
                Ok(record)
            })
            .collect()
    });
    let records = results.into_iter().collect::<anyhow::Result<Vec<_>>>()?;

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
