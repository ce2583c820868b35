use crate::domain::profile::UserProfile;
use crate::error::{ConfigError, ProfileError};
use crate::risk::factors::ToleranceScale;
use crate::risk::weights::FactorWeights;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A field that deserializes either as `T` or, failing that, as whatever JSON
/// was sent. Deserializing a `Lenient` never fails; validation decides what
/// to do with the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(Value),
}

impl Lenient<f64> {
    /// Numbers pass through; numeric strings such as `"30"` are parsed.
    pub fn number(&self) -> Result<f64, String> {
        match self {
            Self::Valid(v) => Ok(*v),
            Self::Invalid(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("{s:?} is not a number")),
            Self::Invalid(other) => Err(format!("expected a number, got {other}")),
        }
    }
}

impl From<f64> for Lenient<f64> {
    fn from(value: f64) -> Self {
        Self::Valid(value)
    }
}

/// Inbound profile record as supplied by callers. Every field is optional and
/// loosely typed; [`ProfileInput::validate_and_into_profile`] turns it into a
/// [`UserProfile`], replacing bad fields with documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileInput {
    pub age: Option<Lenient<f64>>,
    pub monthly_income: Option<Lenient<f64>>,
    pub current_savings: Option<Lenient<f64>>,
    pub monthly_surplus: Option<Lenient<f64>>,
    /// Goal horizon in months (as a JSON object key) → target amount.
    pub goals: Option<Lenient<BTreeMap<String, Lenient<f64>>>>,
    pub risk_tolerance_score: Option<Lenient<f64>>,
    pub custom_weights: Option<Lenient<FactorWeights>>,
}

/// A field that failed validation and was replaced by a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWarning {
    pub field: String,
    pub reason: String,
    pub fallback: String,
}

impl FieldWarning {
    fn new(field: &str, reason: impl Into<String>, fallback: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
            fallback: fallback.to_string(),
        }
    }
}

/// Acceptable ranges and fallback values used while validating a profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRules {
    pub min_age: u32,
    pub max_age: u32,
    pub default_age: u32,
    pub default_monthly_income: f64,
    pub tolerance_scale: ToleranceScale,
    pub default_tolerance: u8,
}

impl Default for ProfileRules {
    fn default() -> Self {
        Self {
            min_age: 18,
            max_age: 100,
            default_age: 30,
            default_monthly_income: 50_000.0,
            tolerance_scale: ToleranceScale::default(),
            default_tolerance: 3,
        }
    }
}

impl ProfileRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_age > self.max_age || !(self.min_age..=self.max_age).contains(&self.default_age)
        {
            return Err(ConfigError::InvalidAgeRange {
                min: self.min_age,
                max: self.max_age,
                default: self.default_age,
            });
        }
        self.tolerance_scale.validate()?;
        if !self.tolerance_scale.contains(self.default_tolerance) {
            return Err(ConfigError::InvalidToleranceScale {
                min: self.tolerance_scale.min,
                max: self.tolerance_scale.max,
            });
        }
        Ok(())
    }
}

impl ProfileInput {
    /// Validate every field, falling back to a default (and recording a
    /// warning in `warnings`) for each one that is missing, mistyped or out
    /// of range.
    ///
    /// Only broken goals are returned as errors: they have no sensible
    /// per-field default. Warnings for the other fields are still recorded.
    pub fn validate_and_into_profile(
        &self,
        rules: &ProfileRules,
        warnings: &mut Vec<FieldWarning>,
    ) -> Result<UserProfile, ProfileError> {
        let age = match self.age.as_ref().map(Lenient::number) {
            // Whole years only; 100.7 is treated as 100.
            Some(Ok(a))
                if a.is_finite()
                    && (rules.min_age as f64..=rules.max_age as f64).contains(&a.trunc()) =>
            {
                a.trunc() as u32
            }
            Some(Ok(a)) => {
                warnings.push(FieldWarning::new(
                    "age",
                    format!("{a} outside {}..={}", rules.min_age, rules.max_age),
                    rules.default_age,
                ));
                rules.default_age
            }
            Some(Err(reason)) => {
                warnings.push(FieldWarning::new("age", reason, rules.default_age));
                rules.default_age
            }
            None => {
                warnings.push(FieldWarning::new("age", "missing", rules.default_age));
                rules.default_age
            }
        };

        let monthly_income = match self.monthly_income.as_ref().map(Lenient::number) {
            Some(Ok(v)) if v.is_finite() && v >= 0.0 => v,
            Some(Ok(v)) if v.is_finite() => {
                warnings.push(FieldWarning::new("monthly_income", format!("negative ({v})"), 0));
                0.0
            }
            Some(Ok(v)) => {
                warnings.push(FieldWarning::new(
                    "monthly_income",
                    format!("not a finite number ({v})"),
                    rules.default_monthly_income,
                ));
                rules.default_monthly_income
            }
            Some(Err(reason)) => {
                warnings.push(FieldWarning::new(
                    "monthly_income",
                    reason,
                    rules.default_monthly_income,
                ));
                rules.default_monthly_income
            }
            None => {
                warnings.push(FieldWarning::new(
                    "monthly_income",
                    "missing",
                    rules.default_monthly_income,
                ));
                rules.default_monthly_income
            }
        };

        let current_savings = non_negative("current_savings", self.current_savings.as_ref(), warnings);
        let monthly_surplus = non_negative("monthly_surplus", self.monthly_surplus.as_ref(), warnings);

        let scale = rules.tolerance_scale;
        let risk_tolerance_score = match self.risk_tolerance_score.as_ref().map(Lenient::number) {
            Some(Ok(t)) if t.is_finite() && scale.contains_value(t.trunc()) => t.trunc() as u8,
            Some(Ok(t)) => {
                warnings.push(FieldWarning::new(
                    "risk_tolerance_score",
                    format!("{t} outside {}..={}", scale.min, scale.max),
                    rules.default_tolerance,
                ));
                rules.default_tolerance
            }
            Some(Err(reason)) => {
                warnings.push(FieldWarning::new(
                    "risk_tolerance_score",
                    reason,
                    rules.default_tolerance,
                ));
                rules.default_tolerance
            }
            None => {
                warnings.push(FieldWarning::new(
                    "risk_tolerance_score",
                    "missing",
                    rules.default_tolerance,
                ));
                rules.default_tolerance
            }
        };

        let custom_weights = match &self.custom_weights {
            Some(Lenient::Valid(w)) => match w.validate() {
                Ok(()) => Some(*w),
                Err(e) => {
                    warnings.push(FieldWarning::new("custom_weights", e.to_string(), "engine weights"));
                    None
                }
            },
            Some(Lenient::Invalid(raw)) => {
                warnings.push(FieldWarning::new(
                    "custom_weights",
                    format!("expected a weight table, got {raw}"),
                    "engine weights",
                ));
                None
            }
            None => None,
        };

        let goals = match &self.goals {
            Some(Lenient::Valid(raw)) => parse_goals(raw)?,
            Some(Lenient::Invalid(Value::Null)) | None => BTreeMap::new(),
            Some(Lenient::Invalid(raw)) => {
                return Err(ProfileError::InvalidGoals {
                    reason: format!("expected an object of months to amounts, got {raw}"),
                })
            }
        };

        Ok(UserProfile {
            age,
            monthly_income,
            current_savings,
            monthly_surplus,
            goals,
            risk_tolerance_score,
            custom_weights,
        })
    }
}

fn non_negative(field: &str, value: Option<&Lenient<f64>>, warnings: &mut Vec<FieldWarning>) -> f64 {
    match value.map(Lenient::number) {
        Some(Ok(v)) if v.is_finite() && v >= 0.0 => v,
        Some(Ok(v)) if v.is_finite() => {
            warnings.push(FieldWarning::new(field, format!("negative ({v})"), 0));
            0.0
        }
        Some(Ok(v)) => {
            warnings.push(FieldWarning::new(field, format!("not a finite number ({v})"), 0));
            0.0
        }
        Some(Err(reason)) => {
            warnings.push(FieldWarning::new(field, reason, 0));
            0.0
        }
        None => {
            warnings.push(FieldWarning::new(field, "missing", 0));
            0.0
        }
    }
}

fn parse_goals(raw: &BTreeMap<String, Lenient<f64>>) -> Result<BTreeMap<u32, f64>, ProfileError> {
    let mut goals = BTreeMap::new();
    for (key, amount) in raw {
        let months = key
            .trim()
            .parse::<u32>()
            .map_err(|_| ProfileError::InvalidGoalHorizon { key: key.clone() })?;
        let amount = match amount.number() {
            Ok(a) if a.is_finite() => a,
            Ok(a) => {
                return Err(ProfileError::InvalidGoalAmount {
                    months,
                    reason: format!("not a finite number ({a})"),
                })
            }
            Err(reason) => return Err(ProfileError::InvalidGoalAmount { months, reason }),
        };
        goals.insert(months, amount);
    }
    Ok(goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(v: serde_json::Value) -> ProfileInput {
        serde_json::from_value(v).unwrap()
    }

    fn validate(v: serde_json::Value) -> (Result<UserProfile, ProfileError>, Vec<FieldWarning>) {
        let mut warnings = Vec::new();
        let profile = input(v).validate_and_into_profile(&ProfileRules::default(), &mut warnings);
        (profile, warnings)
    }

    fn fields(warnings: &[FieldWarning]) -> Vec<&str> {
        warnings.iter().map(|w| w.field.as_str()).collect()
    }

    fn complete() -> serde_json::Value {
        json!({
            "age": 25,
            "monthly_income": 80000,
            "current_savings": 200000,
            "monthly_surplus": 25000,
            "goals": {"60": 500000, "120": 1000000},
            "risk_tolerance_score": 5,
        })
    }

    #[test]
    fn complete_profile_validates_without_warnings() {
        let (profile, warnings) = validate(complete());
        let profile = profile.unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(profile.age, 25);
        assert_eq!(profile.risk_tolerance_score, 5);
        assert_eq!(profile.goals.len(), 2);
        assert_eq!(profile.goals.get(&120), Some(&1_000_000.0));
    }

    #[test]
    fn out_of_range_age_falls_back_to_default() {
        let mut v = complete();
        v["age"] = json!(12);
        let (profile, warnings) = validate(v);
        assert_eq!(profile.unwrap().age, 30);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "age");
        assert_eq!(warnings[0].fallback, "30");
    }

    #[test]
    fn fractional_age_truncates_to_whole_years() {
        let mut v = complete();
        v["age"] = json!(100.7);
        let (profile, warnings) = validate(v);
        assert_eq!(profile.unwrap().age, 100);
        assert!(warnings.is_empty());
    }

    #[test]
    fn negative_money_fields_are_floored() {
        let mut v = complete();
        v["monthly_income"] = json!(-10);
        v["current_savings"] = json!(-5);
        v["monthly_surplus"] = json!(-1);
        let (profile, warnings) = validate(v);
        let profile = profile.unwrap();
        assert_eq!(profile.monthly_income, 0.0);
        assert_eq!(profile.current_savings, 0.0);
        assert_eq!(profile.monthly_surplus, 0.0);
        assert_eq!(fields(&warnings), ["monthly_income", "current_savings", "monthly_surplus"]);
    }

    #[test]
    fn invalid_tolerance_uses_scale_default() {
        let mut v = complete();
        v["risk_tolerance_score"] = json!(9);
        let (profile, warnings) = validate(v);
        assert_eq!(profile.unwrap().risk_tolerance_score, 3);
        assert_eq!(warnings[0].field, "risk_tolerance_score");
    }

    #[test]
    fn missing_fields_fall_back_and_are_reported() {
        let mut warnings = Vec::new();
        let profile = ProfileInput::default()
            .validate_and_into_profile(&ProfileRules::default(), &mut warnings)
            .unwrap();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.monthly_income, 50_000.0);
        assert_eq!(profile.risk_tolerance_score, 3);
        assert!(profile.goals.is_empty());
        assert_eq!(warnings.len(), 5);
    }

    #[test]
    fn mistyped_fields_deserialize_and_fall_back_with_warnings() {
        let mut v = complete();
        v["age"] = json!("thirty");
        v["risk_tolerance_score"] = json!("high");
        v["current_savings"] = json!([1, 2]);
        v["custom_weights"] = json!("balanced");
        let (profile, warnings) = validate(v);
        let profile = profile.unwrap();

        assert_eq!(profile.age, 30);
        assert_eq!(profile.risk_tolerance_score, 3);
        assert_eq!(profile.current_savings, 0.0);
        assert_eq!(profile.custom_weights, None);
        assert_eq!(
            fields(&warnings),
            ["age", "current_savings", "risk_tolerance_score", "custom_weights"]
        );
        assert!(warnings[0].reason.contains("thirty"));
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let mut v = complete();
        v["age"] = json!("42");
        v["monthly_income"] = json!(" 65000 ");
        v["goals"] = json!({"48": "250000"});
        let (profile, warnings) = validate(v);
        let profile = profile.unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(profile.age, 42);
        assert_eq!(profile.monthly_income, 65_000.0);
        assert_eq!(profile.goals.get(&48), Some(&250_000.0));
    }

    #[test]
    fn null_goals_mean_no_goals() {
        let mut v = complete();
        v["goals"] = json!(null);
        let (profile, warnings) = validate(v);
        assert!(profile.unwrap().goals.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn unparseable_goal_horizon_is_an_error() {
        let mut v = complete();
        v["goals"] = json!({"soon": 1000});
        let (profile, _) = validate(v);
        assert_eq!(
            profile.unwrap_err(),
            ProfileError::InvalidGoalHorizon {
                key: "soon".to_string()
            }
        );
    }

    #[test]
    fn non_object_goals_are_an_error() {
        let mut v = complete();
        v["goals"] = json!("retire early");
        let (profile, _) = validate(v);
        assert!(matches!(profile, Err(ProfileError::InvalidGoals { .. })));

        let mut v = complete();
        v["goals"] = json!({"24": "lots"});
        let (profile, _) = validate(v);
        assert!(matches!(
            profile,
            Err(ProfileError::InvalidGoalAmount { months: 24, .. })
        ));
    }

    #[test]
    fn goal_errors_keep_earlier_field_warnings() {
        let (profile, warnings) = validate(json!({"age": 7, "goals": {"soon": 1}}));
        assert!(profile.is_err());
        assert_eq!(
            fields(&warnings),
            [
                "age",
                "monthly_income",
                "current_savings",
                "monthly_surplus",
                "risk_tolerance_score"
            ]
        );
    }

    #[test]
    fn invalid_custom_weights_are_dropped_with_warning() {
        let mut v = complete();
        v["custom_weights"] = json!({
            "age": 0.5, "income": 0.5, "timeline": 0.5,
            "surplus": 0.0, "savings": 0.0, "tolerance": 0.0
        });
        let (profile, warnings) = validate(v);
        assert_eq!(profile.unwrap().custom_weights, None);
        assert_eq!(warnings[0].field, "custom_weights");
    }

    #[test]
    fn default_rules_are_consistent() {
        assert!(ProfileRules::default().validate().is_ok());
        let bad = ProfileRules {
            default_age: 10,
            ..ProfileRules::default()
        };
        assert!(bad.validate().is_err());
    }
}
