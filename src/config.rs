// File: src/config.rs
//! Pipeline configuration.
//!
//! Values come from an optional TOML file, then `TRIAGE_*` environment
//! variables, then whatever the caller sets explicitly (CLI flags).
use crate::core::svm::{SolverChoice, SvmParams};
use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_PATH: &str = "model.joblib";
pub const ENV_MODEL_PATH: &str = "TRIAGE_MODEL_PATH";
pub const ENV_TRAIN_IF_MISSING: &str = "TRIAGE_TRAIN_IF_MISSING";

/// Hyperparameters for the offline training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub c: f64,
    pub tolerance: f64,
    pub max_iter: usize,
    /// Seeds both the train/test shuffle and the solver's sample order.
    pub seed: u64,
    pub test_fraction: f64,
    pub solver: SolverChoice,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let svm = SvmParams::default();
        Self {
            c: svm.c,
            tolerance: svm.tolerance,
            max_iter: svm.max_iter,
            seed: svm.seed,
            test_fraction: 0.2,
            solver: svm.solver,
        }
    }
}

impl TrainingConfig {
    pub fn svm_params(&self) -> SvmParams {
        SvmParams {
            c: self.c,
            tolerance: self.tolerance,
            max_iter: self.max_iter,
            seed: self.seed,
            solver: self.solver,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(TriageError::Config(format!("training.c must be positive, got {}", self.c)));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(TriageError::Config("training.tolerance must be positive".into()));
        }
        if self.max_iter == 0 {
            return Err(TriageError::Config("training.max_iter must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(TriageError::Config(format!(
                "training.test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Where the trained artifact is read from and written to.
    pub model_path: PathBuf,
    /// Train from the synthetic corpus when no artifact exists.
    pub train_if_missing: bool,
    pub training: TrainingConfig,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            train_if_missing: true,
            training: TrainingConfig::default(),
        }
    }
}

impl TriageConfig {
    /// Reads `path` if given (it must exist), otherwise starts from defaults.
    /// Environment overrides are applied on top and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| {
                    TriageError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| TriageError::Config(e.to_string()))
    }

    /// Applies `TRIAGE_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_MODEL_PATH).filter(|p| !p.is_empty()) {
            self.model_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(ENV_TRAIN_IF_MISSING) {
            self.train_if_missing = parse_bool(&flag).ok_or_else(|| {
                TriageError::Config(format!("{ENV_TRAIN_IF_MISSING} is not a boolean: '{flag}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.model_path.as_os_str().is_empty() {
            return Err(TriageError::Config("model_path must not be empty".into()));
        }
        self.training.validate()
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
