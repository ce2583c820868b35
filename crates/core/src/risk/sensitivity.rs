use crate::domain::contract::ProfileInput;
use crate::domain::recommendation::RiskCategory;
use crate::risk::engine::RiskScoringEngine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::warn;

/// Profile fields that can be varied in a sensitivity run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Age,
    MonthlyIncome,
    CurrentSavings,
    MonthlySurplus,
    RiskToleranceScore,
}

impl FromStr for ProfileField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "age" => Ok(Self::Age),
            "monthly_income" => Ok(Self::MonthlyIncome),
            "current_savings" => Ok(Self::CurrentSavings),
            "monthly_surplus" => Ok(Self::MonthlySurplus),
            "risk_tolerance_score" => Ok(Self::RiskToleranceScore),
            other => Err(format!("unknown profile field {other:?}")),
        }
    }
}

impl ProfileField {
    fn apply(self, input: &mut ProfileInput, value: f64) {
        let slot = match self {
            Self::Age => &mut input.age,
            Self::MonthlyIncome => &mut input.monthly_income,
            Self::CurrentSavings => &mut input.current_savings,
            Self::MonthlySurplus => &mut input.monthly_surplus,
            Self::RiskToleranceScore => &mut input.risk_tolerance_score,
        };
        *slot = Some(value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRequest {
    pub base: ProfileInput,
    /// Field name → values to try, one re-score per value.
    pub variations: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub value: f64,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub score_change: f64,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityReport {
    pub base_score: f64,
    pub base_category: RiskCategory,
    pub results: BTreeMap<String, Vec<SensitivityPoint>>,
}

impl RiskScoringEngine {
    /// Re-score `base` once per variation value and report the change
    /// against the base score. Unknown field names get an empty result list.
    pub fn analyze_sensitivity(&self, request: &SensitivityRequest) -> SensitivityReport {
        let base = self.assess(&request.base);
        let base_score = base.assessment().risk_score;

        let mut results = BTreeMap::new();
        for (name, values) in &request.variations {
            let field = match name.parse::<ProfileField>() {
                Ok(field) => field,
                Err(e) => {
                    warn!(param = %name, error = %e, "skipping sensitivity parameter");
                    results.insert(name.clone(), Vec::new());
                    continue;
                }
            };

            let points = values
                .iter()
                .map(|&value| {
                    let mut varied = request.base.clone();
                    field.apply(&mut varied, value);
                    let outcome = self.assess(&varied);
                    let a = outcome.assessment();
                    SensitivityPoint {
                        value,
                        risk_score: a.risk_score,
                        risk_category: a.risk_category,
                        score_change: a.risk_score - base_score,
                        fallback_used: outcome.is_fallback(),
                    }
                })
                .collect();
            results.insert(name.clone(), points);
        }

        SensitivityReport {
            base_score,
            base_category: base.assessment().risk_category,
            results,
        }
    }
}
