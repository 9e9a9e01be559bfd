//! Deserialized run configuration.
//!
//! A single explicit `Config` value is threaded through the orchestrator
//! rather than read from globals or environment variables.

use std::path::{Path as FsPath, PathBuf};

use serde::Deserialize;

use crate::error::AnalysisError;
use crate::policy::NoSolverFallback;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub policy: PolicyConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub prediction_model: PredictionModelConfig,
    #[serde(default)]
    pub verbose: bool,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub heuristic: HeuristicConfig,
    #[serde(default)]
    pub reuse_policy: bool,
    #[serde(default)]
    pub req: BudgetConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    pub input_size: u64,
    #[serde(default)]
    pub max_history: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub max: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionModelConfig {
    /// Extrapolation horizon. `None` means the default, `ceil(1.5 * |series|)`.
    pub size: Option<usize>,
    /// Degree of the polynomial trend family. `None` means 1 (a line).
    pub polynomial_degree: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeuristicConfig {
    #[serde(default)]
    pub no_solver: bool,
    #[serde(default = "default_fallback")]
    pub fallback: FallbackKind,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            no_solver: false,
            fallback: default_fallback(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackKind {
    ExploreAll,
    FirstChoice,
}

impl From<FallbackKind> for NoSolverFallback {
    fn from(kind: FallbackKind) -> Self {
        match kind {
            FallbackKind::ExploreAll => NoSolverFallback::ExploreAll,
            FallbackKind::FirstChoice => NoSolverFallback::FirstChoice,
        }
    }
}

fn default_fallback() -> FallbackKind {
    FallbackKind::ExploreAll
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetConfig {
    pub max_input_size: Option<u64>,
    pub max_res: Option<f64>,
}

impl Config {
    /// Parses and validates a TOML configuration file. Validation failures
    /// surface as [`AnalysisError::Configuration`] (exit code 1), never a
    /// panic.
    pub fn load(path: &FsPath) -> Result<Self, AnalysisError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::Configuration(format!("reading {}: {e}", path.display())))?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| AnalysisError::Configuration(format!("parsing {}: {e}", path.display())))?;
        Ok(config)
    }

    /// The horizon for extrapolation: the configured size, or the default
    /// of `ceil(1.5 * series_len)` when unset.
    pub fn prediction_horizon(&self, series_len: usize) -> usize {
        self.prediction_model
            .size
            .unwrap_or_else(|| ((series_len as f64) * 1.5).ceil() as usize)
    }

    /// Degree of the polynomial trend family: the configured value, or 1
    /// (a line) when unset.
    pub fn polynomial_degree(&self) -> usize {
        self.prediction_model.polynomial_degree.unwrap_or(1)
    }

    pub fn policy_file(&self) -> PathBuf {
        self.output_dir.join("serialized").join("policy.bin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            outputDir = "/tmp/wca-out"

            [policy]
            inputSize = 5

            [input]
            max = 10
        "#
    }

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.policy.input_size, 5);
        assert_eq!(config.input.max, 10);
        assert!(!config.verbose);
        assert!(!config.reuse_policy);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.heuristic.fallback, FallbackKind::ExploreAll);
    }

    #[test]
    fn input_max_need_not_dominate_policy_input_size() {
        let toml = r#"
            outputDir = "/tmp/wca-out"

            [policy]
            inputSize = 10

            [input]
            max = 3
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.policy.input_size, 10);
        assert_eq!(config.input.max, 3);
    }

    #[test]
    fn polynomial_degree_defaults_to_one() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.polynomial_degree(), 1);
    }

    #[test]
    fn polynomial_degree_honors_explicit_value() {
        let mut config: Config = toml::from_str(minimal_toml()).unwrap();
        config.prediction_model.polynomial_degree = Some(3);
        assert_eq!(config.polynomial_degree(), 3);
    }

    #[test]
    fn prediction_horizon_defaults_to_1_5x_series() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(config.prediction_horizon(10), 15);
    }

    #[test]
    fn prediction_horizon_honors_explicit_size() {
        let mut config: Config = toml::from_str(minimal_toml()).unwrap();
        config.prediction_model.size = Some(3);
        assert_eq!(config.prediction_horizon(100), 3);
    }

    #[test]
    fn policy_file_lives_under_output_dir() {
        let config: Config = toml::from_str(minimal_toml()).unwrap();
        assert_eq!(
            config.policy_file(),
            PathBuf::from("/tmp/wca-out/serialized/policy.bin")
        );
    }
}
