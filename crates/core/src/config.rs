use crate::domain::contract::ProfileRules;
use crate::error::ConfigError;
use crate::funds::filter::FilterConfig;
use crate::risk::category::CategoryBands;
use crate::risk::weights::FactorWeights;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Settings {
    pub fund_universe_path: Option<String>,
    pub engine_config_path: Option<String>,
    pub sentry_dsn: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            fund_universe_path: std::env::var("FUND_UNIVERSE_PATH").ok(),
            engine_config_path: std::env::var("ENGINE_CONFIG_PATH").ok(),
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
        })
    }

    pub fn require_fund_universe_path(&self) -> anyhow::Result<&str> {
        self.fund_universe_path
            .as_deref()
            .context("FUND_UNIVERSE_PATH is required")
    }

    /// Engine config from `ENGINE_CONFIG_PATH`, or the built-in defaults.
    pub fn load_engine_config(&self) -> anyhow::Result<EngineConfig> {
        match self.engine_config_path.as_deref() {
            Some(path) => EngineConfig::from_path(path),
            None => Ok(EngineConfig::default()),
        }
    }
}

/// Everything the engine needs besides the fund universe. Loaded once,
/// validated once, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: FactorWeights,
    /// Monthly income at which the income factor saturates.
    pub income_cap: f64,
    pub profile: ProfileRules,
    pub bands: CategoryBands,
    pub filter: FilterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: FactorWeights::default(),
            income_cap: 100_000.0,
            profile: ProfileRules::default(),
            bands: CategoryBands::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config file. Missing keys take their defaults; the result
    /// is not validated here.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read engine config {} failed", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("engine config {} is not valid JSON", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        if !self.income_cap.is_finite() || self.income_cap <= 0.0 {
            return Err(ConfigError::InvalidIncomeCap {
                value: self.income_cap,
            });
        }
        self.profile.validate()?;
        self.bands.validate()?;
        self.filter.validate()?;
        Ok(())
    }
}
