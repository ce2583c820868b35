use thiserror::Error;

/// Engine configuration problems. Raised once at construction; an engine that
/// fails validation never serves a request.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("factor weights must sum to 1.0 (±{tolerance}), got {total:.4}")]
    WeightSum { total: f64, tolerance: f64 },

    #[error("invalid factor weight: {factor} = {value}. Must be finite and non-negative")]
    InvalidWeight { factor: &'static str, value: f64 },

    #[error("invalid income cap: {value}. Must be finite and positive")]
    InvalidIncomeCap { value: f64 },

    #[error("invalid risk tolerance scale: {min}..={max}")]
    InvalidToleranceScale { min: u8, max: u8 },

    #[error("invalid age range: {min}..={max} (default {default})")]
    InvalidAgeRange { min: u32, max: u32, default: u32 },

    #[error("invalid risk category bands: {reason}")]
    InvalidBands { reason: String },

    #[error("invalid fund filter config: {reason}")]
    InvalidFilter { reason: String },
}

/// Failures inside the scoring pipeline that have no field-level default.
/// These are converted into the conservative fallback assessment by the engine.
#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("goal horizon must be a whole number of months, got {key:?}")]
    InvalidGoalHorizon { key: String },

    #[error("goal amount for {months} months is invalid: {reason}")]
    InvalidGoalAmount { months: u32, reason: String },

    #[error("goals are invalid: {reason}")]
    InvalidGoals { reason: String },

    #[error("risk score is not a finite number ({value})")]
    NonFiniteScore { value: f64 },
}
