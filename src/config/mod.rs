use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod validator;

use crate::cli::Cli;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineSettings,
}

/// How derived state is recomputed within one tick.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeStrategy {
    /// One pass in declaration order. A predicate reading a field declared
    /// after it sees that field's state from the previous tick.
    #[default]
    SinglePass,
    /// Repeat passes until no field changes visibility or enablement,
    /// bounded by `max_settle_passes`.
    FixedPoint,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    #[serde(default)]
    pub recompute: RecomputeStrategy,
    /// Upper bound on passes per tick for `fixed_point`
    #[serde(default = "default_max_settle_passes")]
    pub max_settle_passes: usize,
    /// Emit a warning when a predicate or validator panics
    #[serde(default = "default_log_evaluation_failures")]
    pub log_evaluation_failures: bool,
}

fn default_max_settle_passes() -> usize {
    16
}

fn default_log_evaluation_failures() -> bool {
    true
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            recompute: RecomputeStrategy::default(),
            max_settle_passes: default_max_settle_passes(),
            log_evaluation_failures: default_log_evaluation_failures(),
        }
    }
}

impl EngineSettings {
    pub fn fixed_point() -> Self {
        Self {
            recompute: RecomputeStrategy::FixedPoint,
            ..Self::default()
        }
    }

    /// Passes allowed per tick under the configured strategy.
    pub fn pass_limit(&self) -> usize {
        match self.recompute {
            RecomputeStrategy::SinglePass => 1,
            RecomputeStrategy::FixedPoint => self.max_settle_passes.max(1),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_root(".")
    }

    /// Create settings from CLI arguments (config file, env vars, then CLI flags)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(File::from(cli.config.clone()).required(false))?;

        if cli.fixed_point {
            settings.engine.recompute = RecomputeStrategy::FixedPoint;
        }

        Self::validate(&settings)?;
        Ok(settings)
    }

    /// Load `formwright.{toml,yaml,json}` from `root` (optional), then
    /// `FORMWRIGHT__*` environment overrides.
    pub fn from_root(root: &str) -> Result<Self, anyhow::Error> {
        let config_path = Path::new(root).join("formwright");
        let settings = Self::load(File::from(config_path).required(false))?;

        Self::validate(&settings)?;
        Ok(settings)
    }

    fn load<S>(file: S) -> Result<Self, anyhow::Error>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .set_default("engine.recompute", "single_pass")?
            .set_default("engine.max_settle_passes", default_max_settle_passes() as i64)?
            .set_default("engine.log_evaluation_failures", default_log_evaluation_failures())?
            .add_source(file)
            .add_source(
                Environment::with_prefix("FORMWRIGHT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(settings: &Settings) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(settings).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!("Configuration validation failed:\n{}", error_messages.join("\n"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.recompute, RecomputeStrategy::SinglePass);
        assert_eq!(settings.max_settle_passes, 16);
        assert!(settings.log_evaluation_failures);
        assert_eq!(settings.pass_limit(), 1);
    }

    #[test]
    fn test_fixed_point_pass_limit() {
        let mut settings = EngineSettings::fixed_point();
        assert_eq!(settings.pass_limit(), 16);
        settings.max_settle_passes = 0;
        assert_eq!(settings.pass_limit(), 1);
    }

    #[test]
    fn test_strategy_wire_names() {
        let strategy: RecomputeStrategy = serde_json::from_str("\"fixed_point\"").unwrap();
        assert_eq!(strategy, RecomputeStrategy::FixedPoint);
    }
}
