use crate::error::ConfigError;
use crate::risk::factors::FactorScores;
use serde::{Deserialize, Serialize};

/// Allowed deviation of the weight total from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Relative importance of each risk factor. Weights must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    pub age: f64,
    pub income: f64,
    pub timeline: f64,
    pub surplus: f64,
    pub savings: f64,
    pub tolerance: f64,
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            age: 0.25,
            income: 0.20,
            timeline: 0.20,
            surplus: 0.15,
            savings: 0.10,
            tolerance: 0.10,
        }
    }
}

impl FactorWeights {
    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("age", self.age),
            ("income", self.income),
            ("timeline", self.timeline),
            ("surplus", self.surplus),
            ("savings", self.savings),
            ("tolerance", self.tolerance),
        ]
    }

    pub fn total(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (factor, value) in self.named() {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { factor, value });
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                total,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }
        Ok(())
    }

    /// Per-factor `weight * factor`.
    pub fn contributions(&self, factors: &FactorScores) -> FactorScores {
        FactorScores {
            age: self.age * factors.age,
            income: self.income * factors.income,
            timeline: self.timeline * factors.timeline,
            surplus: self.surplus * factors.surplus,
            savings: self.savings * factors.savings,
            tolerance: self.tolerance * factors.tolerance,
        }
    }

    /// Weighted sum of the factors. Not clamped; see
    /// [`RiskScoringEngine`](crate::risk::RiskScoringEngine) for the final score.
    pub fn weighted_sum(&self, factors: &FactorScores) -> f64 {
        let c = self.contributions(factors);
        c.age + c.income + c.timeline + c.surplus + c.savings + c.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaled(total: f64) -> FactorWeights {
        let d = FactorWeights::default();
        FactorWeights {
            age: d.age * total,
            income: d.income * total,
            timeline: d.timeline * total,
            surplus: d.surplus * total,
            savings: d.savings * total,
            tolerance: d.tolerance * total,
        }
    }

    #[test]
    fn default_weights_are_valid() {
        assert!(FactorWeights::default().validate().is_ok());
        assert!((FactorWeights::default().total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn totals_outside_tolerance_are_rejected() {
        for total in [0.95, 1.05] {
            let err = scaled(total).validate().unwrap_err();
            assert!(matches!(err, ConfigError::WeightSum { .. }), "{total}: {err}");
        }
    }

    #[test]
    fn totals_within_tolerance_are_accepted() {
        for total in [0.999, 1.0, 1.001] {
            assert!(scaled(total).validate().is_ok(), "{total}");
        }
    }

    #[test]
    fn negative_weight_is_rejected() {
        let w = FactorWeights {
            age: -0.05,
            income: 0.30,
            ..FactorWeights::default()
        };
        assert_eq!(
            w.validate().unwrap_err(),
            ConfigError::InvalidWeight {
                factor: "age",
                value: -0.05
            }
        );
    }

    #[test]
    fn weighted_sum_of_ones_is_total() {
        let ones = FactorScores {
            age: 1.0,
            income: 1.0,
            timeline: 1.0,
            surplus: 1.0,
            savings: 1.0,
            tolerance: 1.0,
        };
        let w = FactorWeights::default();
        assert!((w.weighted_sum(&ones) - w.total()).abs() < 1e-12);
    }
}
