use crate::risk::weights::FactorWeights;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A validated financial profile. Built from a [`ProfileInput`] and never
/// mutated once it enters the engine.
///
/// [`ProfileInput`]: crate::domain::contract::ProfileInput
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub monthly_income: f64,
    pub current_savings: f64,
    pub monthly_surplus: f64,
    /// Goal horizon in months → target amount.
    pub goals: BTreeMap<u32, f64>,
    pub risk_tolerance_score: u8,
    pub custom_weights: Option<FactorWeights>,
}

impl UserProfile {
    /// Mean goal horizon in years, `None` when no goals were given.
    pub fn average_goal_horizon_years(&self) -> Option<f64> {
        if self.goals.is_empty() {
            return None;
        }
        let total: f64 = self.goals.keys().map(|&months| months as f64 / 12.0).sum();
        Some(total / self.goals.len() as f64)
    }
}
