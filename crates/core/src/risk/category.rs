use crate::domain::recommendation::{BaselineAllocation, RiskCategory};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One score band. The lower bound is the previous band's `upper` (or 0 for
/// the first band, which is closed at 0); `upper` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryBand {
    pub category: RiskCategory,
    pub upper: f64,
    pub allocation: BaselineAllocation,
}

/// Score bands for all five categories, in increasing order of risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryBands {
    bands: [CategoryBand; 5],
}

impl Default for CategoryBands {
    fn default() -> Self {
        let band = |category, upper, debt, equity| CategoryBand {
            category,
            upper,
            allocation: BaselineAllocation::new(debt, equity),
        };
        Self {
            bands: [
                band(RiskCategory::VeryConservative, 0.2, 0.85, 0.15),
                band(RiskCategory::Conservative, 0.4, 0.70, 0.30),
                band(RiskCategory::Moderate, 0.6, 0.55, 0.45),
                band(RiskCategory::Growth, 0.8, 0.35, 0.65),
                band(RiskCategory::Aggressive, 1.0, 0.20, 0.80),
            ],
        }
    }
}

impl CategoryBands {
    pub fn new(bands: [CategoryBand; 5]) -> Result<Self, ConfigError> {
        let out = Self { bands };
        out.validate()?;
        Ok(out)
    }

    pub fn bands(&self) -> &[CategoryBand; 5] {
        &self.bands
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::InvalidBands { reason });

        let mut lower = 0.0;
        for (band, expected) in self.bands.iter().zip(RiskCategory::ALL) {
            if band.category != expected {
                return invalid(format!(
                    "expected {expected} band, found {}",
                    band.category
                ));
            }
            if !band.upper.is_finite() || band.upper <= lower {
                return invalid(format!(
                    "{} band upper bound {} must exceed {lower}",
                    band.category, band.upper
                ));
            }
            let a = band.allocation;
            let in_unit = |v: f64| (0.0..=1.0).contains(&v);
            if !in_unit(a.debt) || !in_unit(a.equity) || (a.debt + a.equity - 1.0).abs() > 1e-9 {
                return invalid(format!(
                    "{} allocation {}/{} must be fractions summing to 1",
                    band.category, a.debt, a.equity
                ));
            }
            lower = band.upper;
        }

        if lower != 1.0 {
            return invalid(format!("bands must end at 1.0, last upper bound is {lower}"));
        }
        Ok(())
    }

    pub fn allocation_for(&self, category: RiskCategory) -> BaselineAllocation {
        self.bands[category.index()].allocation
    }

    /// First band containing `score` wins. Scores outside every band (only
    /// possible for NaN or values outside `[0, 1]`) map to Moderate.
    pub fn categorize(&self, score: f64) -> (RiskCategory, BaselineAllocation) {
        let mut lower = 0.0;
        for (i, band) in self.bands.iter().enumerate() {
            let above_lower = if i == 0 { score >= lower } else { score > lower };
            if above_lower && score <= band.upper {
                return (band.category, band.allocation);
            }
            lower = band.upper;
        }

        warn!(score, "risk score outside every category band; using Moderate");
        (
            RiskCategory::Moderate,
            self.allocation_for(RiskCategory::Moderate),
        )
    }
}
