use crate::config::EngineConfig;
use crate::domain::contract::{FieldWarning, ProfileInput};
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::{BaselineAllocation, RiskCategory};
use crate::error::{ConfigError, ProfileError};
use crate::risk::factors::{FactorBreakdown, FactorScores};
use crate::risk::weights::FactorWeights;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Score reported when the pipeline could not produce one.
pub const FALLBACK_SCORE: f64 = 0.3;
pub const FALLBACK_CATEGORY: RiskCategory = RiskCategory::Conservative;
pub const FALLBACK_ALLOCATION: BaselineAllocation = BaselineAllocation::new(0.70, 0.30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub allocation: BaselineAllocation,
    /// Absent on the fallback path.
    pub factor_breakdown: Option<FactorBreakdown>,
}

impl RiskAssessment {
    pub fn fallback() -> Self {
        Self {
            risk_score: FALLBACK_SCORE,
            risk_category: FALLBACK_CATEGORY,
            allocation: FALLBACK_ALLOCATION,
            factor_breakdown: None,
        }
    }
}

/// Which path produced an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScoringOutcome {
    /// Scored normally, possibly after replacing some fields with defaults.
    Validated {
        assessment: RiskAssessment,
        warnings: Vec<FieldWarning>,
    },
    /// Scoring failed; the fixed conservative assessment was substituted.
    /// Field warnings gathered before the failure are kept.
    Fallback {
        assessment: RiskAssessment,
        error: String,
        warnings: Vec<FieldWarning>,
    },
}

impl ScoringOutcome {
    /// The conservative fallback, also used for records that could not be
    /// read as a profile at all.
    pub fn fallback(error: impl Into<String>, warnings: Vec<FieldWarning>) -> Self {
        Self::Fallback {
            assessment: RiskAssessment::fallback(),
            error: error.into(),
            warnings,
        }
    }

    pub fn assessment(&self) -> &RiskAssessment {
        match self {
            Self::Validated { assessment, .. } | Self::Fallback { assessment, .. } => assessment,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn warnings(&self) -> &[FieldWarning] {
        match self {
            Self::Validated { warnings, .. } | Self::Fallback { warnings, .. } => warnings,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Validated { .. } => None,
            Self::Fallback { error, .. } => Some(error),
        }
    }
}

/// `Σ weight_i * factor_i`, clamped to `[0, 1]`. Non-finite sums are errors
/// rather than being clamped into range.
pub fn weighted_score(weights: &FactorWeights, factors: &FactorScores) -> Result<f64, ProfileError> {
    let raw = weights.weighted_sum(factors);
    if !raw.is_finite() {
        return Err(ProfileError::NonFiniteScore { value: raw });
    }
    Ok(raw.clamp(0.0, 1.0))
}

/// Multi-factor risk scorer. Holds validated, immutable configuration and is
/// safe to share across threads.
#[derive(Debug, Clone)]
pub struct RiskScoringEngine {
    config: EngineConfig,
}

impl RiskScoringEngine {
    /// Fails if the weights, bands or profile rules are inconsistent. No
    /// request is ever scored with an invalid configuration.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(weights = ?config.weights, "risk scoring engine configured");
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Factor values and score for an already validated profile. Uses the
    /// profile's custom weights when present.
    pub fn score_profile(&self, profile: &UserProfile) -> Result<(f64, FactorBreakdown), ProfileError> {
        let weights = profile.custom_weights.unwrap_or(self.config.weights);
        let factors = FactorScores::from_profile(
            profile,
            self.config.income_cap,
            self.config.profile.tolerance_scale,
        );
        let score = weighted_score(&weights, &factors)?;
        Ok((
            score,
            FactorBreakdown {
                factors,
                contributions: weights.contributions(&factors),
            },
        ))
    }

    pub fn categorize(&self, score: f64) -> (RiskCategory, BaselineAllocation) {
        self.config.bands.categorize(score)
    }

    /// Validate, score and categorize one profile. Never fails: bad fields
    /// fall back to defaults, and anything worse yields the conservative
    /// fallback assessment.
    pub fn assess(&self, input: &ProfileInput) -> ScoringOutcome {
        let mut warnings = Vec::new();
        let result = self.try_assess(input, &mut warnings);
        for w in &warnings {
            warn!(field = %w.field, reason = %w.reason, fallback = %w.fallback, "profile field replaced by default");
        }
        match result {
            Ok(assessment) => {
                info!(
                    risk_score = assessment.risk_score,
                    risk_category = %assessment.risk_category,
                    warnings = warnings.len(),
                    "risk assessment completed"
                );
                ScoringOutcome::Validated {
                    assessment,
                    warnings,
                }
            }
            Err(e) => {
                error!(error = %e, "risk assessment failed; using conservative fallback");
                ScoringOutcome::fallback(e.to_string(), warnings)
            }
        }
    }

    fn try_assess(
        &self,
        input: &ProfileInput,
        warnings: &mut Vec<FieldWarning>,
    ) -> Result<RiskAssessment, ProfileError> {
        let profile = input.validate_and_into_profile(&self.config.profile, warnings)?;
        let (risk_score, breakdown) = self.score_profile(&profile)?;
        let (risk_category, allocation) = self.categorize(risk_score);
        Ok(RiskAssessment {
            risk_score,
            risk_category,
            allocation,
            factor_breakdown: Some(breakdown),
        })
    }
}
