pub mod category;
pub mod engine;
pub mod factors;
pub mod sensitivity;
pub mod weights;

pub use category::{CategoryBand, CategoryBands};
pub use engine::{RiskAssessment, RiskScoringEngine, ScoringOutcome};
pub use factors::{FactorBreakdown, FactorScores, ToleranceScale};
pub use weights::FactorWeights;
