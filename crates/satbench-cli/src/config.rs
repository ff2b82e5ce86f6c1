//! Experiment configuration.

use anyhow::Context;
use clap::ValueEnum;
use satbench_base::{Budget, SatSolver};
use satbench_baseline::{Dpll, ProbSat, ProbSatConfig, WalkSat, WalkSatConfig};
use satbench_cdcl::{Cdcl, CdclConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// The solver variants the harness can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SolverKind {
    Cdcl,
    Dpll,
    Walksat,
    Probsat,
}

impl SolverKind {
    pub const ALL: [SolverKind; 4] = [Self::Cdcl, Self::Dpll, Self::Walksat, Self::Probsat];
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cdcl => "cdcl",
            Self::Dpll => "dpll",
            Self::Walksat => "walksat",
            Self::Probsat => "probsat",
        })
    }
}

/// Settings for a solve or bench run, loaded from a JSON file. Every field is
/// optional; command-line flags override what the file says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Solvers run by `bench`.
    pub solvers: Vec<SolverKind>,
    /// Per-run wall-clock limit in seconds.
    pub timeout_secs: Option<f64>,
    /// Per-run step limit (cycles, nodes or flips depending on the solver).
    pub max_steps: Option<u64>,
    pub cdcl: CdclConfig,
    pub walksat: WalkSatConfig,
    pub probsat: ProbSatConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            solvers: SolverKind::ALL.to_vec(),
            timeout_secs: Some(60.0),
            max_steps: None,
            cdcl: CdclConfig::default(),
            walksat: WalkSatConfig::default(),
            probsat: ProbSatConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Loads the configuration from `path`, or the defaults without one.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        tracing::debug!(?config, "loaded experiment config");
        Ok(config)
    }

    /// Rejects values no run could use.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(secs) = self.timeout_secs {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(satbench_base::Error::Config(format!(
                    "timeout_secs must be positive, got {secs}"
                ))
                .into());
            }
        }
        if self.solvers.is_empty() {
            return Err(satbench_base::Error::Config("no solvers selected".into()).into());
        }
        self.cdcl.validate()?;
        Ok(())
    }

    /// Sets a seed for both local searches.
    pub fn set_seed(&mut self, seed: u64) {
        self.walksat.seed = seed;
        self.probsat.seed = seed;
    }

    /// Sets the per-try flip limit of both local searches.
    pub fn set_max_flips(&mut self, max_flips: u64) {
        self.walksat.max_flips = max_flips;
        self.probsat.max_flips = max_flips;
    }

    /// The budget of one run.
    pub fn budget(&self) -> Budget {
        let mut budget = Budget::unlimited();
        if let Some(steps) = self.max_steps {
            budget = budget.with_steps(steps);
        }
        if let Some(secs) = self.timeout_secs {
            budget = budget.with_time_limit(Duration::from_secs_f64(secs));
        }
        budget
    }

    /// A fresh solver of the given kind.
    pub fn build_solver(&self, kind: SolverKind) -> Box<dyn SatSolver> {
        match kind {
            SolverKind::Cdcl => Box::new(Cdcl::new(self.cdcl.clone())),
            SolverKind::Dpll => Box::new(Dpll),
            SolverKind::Walksat => Box::new(WalkSat::new(self.walksat.clone())),
            SolverKind::Probsat => Box::new(ProbSat::new(self.probsat.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"solvers": ["cdcl", "walksat"], "walksat": {"noise": 0.3}}"#;
        let config: ExperimentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.solvers, vec![SolverKind::Cdcl, SolverKind::Walksat]);
        assert_eq!(config.walksat.noise, 0.3);
        assert_eq!(config.walksat.max_flips, 10_000);
        assert_eq!(config.timeout_secs, Some(60.0));
        assert_eq!(config.cdcl, CdclConfig::default());
    }

    #[test]
    fn test_validate() {
        let mut config = ExperimentConfig::default();
        assert!(config.validate().is_ok());
        config.timeout_secs = Some(0.0);
        assert!(config.validate().is_err());
        config.timeout_secs = None;
        config.solvers.clear();
        assert!(config.validate().is_err());

        let zero_decay = ExperimentConfig {
            cdcl: CdclConfig {
                var_decay: 0.0,
                ..CdclConfig::default()
            },
            ..ExperimentConfig::default()
        };
        assert!(zero_decay.validate().is_err());
    }

    #[test]
    fn test_budget_from_config() {
        let config = ExperimentConfig {
            timeout_secs: None,
            max_steps: Some(5),
            ..ExperimentConfig::default()
        };
        let mut meter = config.budget().start();
        assert_eq!((0..10).filter(|_| meter.tick()).count(), 5);
    }

    #[test]
    fn test_solver_names_match_kinds() {
        let config = ExperimentConfig::default();
        for kind in SolverKind::ALL {
            assert_eq!(config.build_solver(kind).name(), kind.to_string());
        }
    }
}
