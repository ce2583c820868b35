//! Per-factor risk capacity scores. Each function is total and returns a value
//! in `[0, 1]` for any finite input.

use crate::domain::profile::UserProfile;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Savings beyond this many months of income earn no extra credit.
const SAVINGS_CAP_MONTHS: f64 = 60.0;
/// Goal horizons beyond this many years earn no extra credit.
const TIMELINE_CAP_YEARS: f64 = 30.0;
/// Timeline factor used when the profile has no goals.
pub const NEUTRAL_TIMELINE_FACTOR: f64 = 0.5;

/// Inclusive questionnaire scale for risk tolerance. Defaults to 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceScale {
    pub min: u8,
    pub max: u8,
}

impl Default for ToleranceScale {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl ToleranceScale {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min >= self.max {
            return Err(ConfigError::InvalidToleranceScale {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn contains(&self, value: u8) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn contains_value(&self, value: f64) -> bool {
        (self.min as f64..=self.max as f64).contains(&value)
    }

    /// `(tolerance - min) / (max - min)`, so `min` maps to 0 and `max` to 1.
    pub fn rescale(&self, tolerance: u8) -> f64 {
        let span = (self.max as f64 - self.min as f64).max(1.0);
        ((tolerance as f64 - self.min as f64) / span).clamp(0.0, 1.0)
    }
}

pub fn age_factor(age: u32) -> f64 {
    match age {
        0..=25 => 1.0,
        26..=35 => 0.8,
        36..=45 => 0.6,
        46..=55 => 0.4,
        _ => 0.2,
    }
}

pub fn income_factor(monthly_income: f64, income_cap: f64) -> f64 {
    if income_cap <= 0.0 {
        return 0.0;
    }
    (monthly_income.min(income_cap) / income_cap).clamp(0.0, 1.0)
}

/// Log-compressed surplus relative to half of the user's own income.
pub fn surplus_factor(monthly_surplus: f64, monthly_income: f64) -> f64 {
    let scale = (monthly_income / 2.0).ln_1p();
    if monthly_income <= 0.0 || scale <= 0.0 {
        return 0.0;
    }
    unit(monthly_surplus.max(0.0).ln_1p() / scale)
}

/// Savings expressed as months of income, log-scaled and capped at five years.
pub fn savings_factor(current_savings: f64, monthly_income: f64) -> f64 {
    let income_per_month = monthly_income / 12.0;
    if monthly_income <= 0.0 || income_per_month <= 0.0 {
        return 0.0;
    }
    let savings_months = current_savings.max(0.0) / income_per_month;
    unit(savings_months.ln_1p() / SAVINGS_CAP_MONTHS.ln_1p())
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn timeline_factor(average_goal_years: Option<f64>) -> f64 {
    match average_goal_years {
        Some(years) => (years.max(0.0).ln_1p() / TIMELINE_CAP_YEARS.ln_1p()).clamp(0.0, 1.0),
        None => NEUTRAL_TIMELINE_FACTOR,
    }
}

pub fn tolerance_factor(tolerance: u8, scale: ToleranceScale) -> f64 {
    scale.rescale(tolerance)
}

/// The six normalized factor values for one profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub age: f64,
    pub income: f64,
    pub timeline: f64,
    pub surplus: f64,
    pub savings: f64,
    pub tolerance: f64,
}

impl FactorScores {
    pub fn from_profile(profile: &UserProfile, income_cap: f64, scale: ToleranceScale) -> Self {
        Self {
            age: age_factor(profile.age),
            income: income_factor(profile.monthly_income, income_cap),
            timeline: timeline_factor(profile.average_goal_horizon_years()),
            surplus: surplus_factor(profile.monthly_surplus, profile.monthly_income),
            savings: savings_factor(profile.current_savings, profile.monthly_income),
            tolerance: tolerance_factor(profile.risk_tolerance_score, scale),
        }
    }
}

/// Factor values alongside their weighted contributions to the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    pub factors: FactorScores,
    pub contributions: FactorScores,
}
