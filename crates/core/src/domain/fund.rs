use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Fund sub-categories the allocator knows how to fill. Anything else in the
/// input deserializes to [`FundCategory::Other`], which never matches.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FundCategory {
    LargeCap,
    MidCap,
    SmallCap,
    Debt,
    Hybrid,
    #[default]
    #[serde(other)]
    Other,
}

impl FundCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeCap => "large_cap",
            Self::MidCap => "mid_cap",
            Self::SmallCap => "small_cap",
            Self::Debt => "debt",
            Self::Hybrid => "hybrid",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "large_cap" => Ok(Self::LargeCap),
            "mid_cap" => Ok(Self::MidCap),
            "small_cap" => Ok(Self::SmallCap),
            "debt" => Ok(Self::Debt),
            "hybrid" => Ok(Self::Hybrid),
            other => anyhow::bail!("unknown fund category: {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    pub fund_name: String,
    #[serde(default)]
    pub category: FundCategory,
    /// Annualized three-year return, in percent.
    #[serde(rename = "3yr_return")]
    pub three_year_return: f64,
    /// Percent per year.
    pub expense_ratio: f64,
    pub sharpe_ratio: f64,
    /// Percent.
    pub alpha: f64,
    pub age_years: u32,
}

/// A fund that survived filtering, with its composite score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredFund {
    #[serde(flatten)]
    pub fund: FundRecord,
    pub score: f64,
}

/// The full, read-only set of funds the engine selects from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundUniverse {
    funds: Vec<FundRecord>,
}

impl FundUniverse {
    pub fn new(funds: Vec<FundRecord>) -> Self {
        Self { funds }
    }

    /// Read a JSON array of fund records.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read fund universe {} failed", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("fund universe {} is not a valid JSON array", path.display()))
    }

    pub fn funds(&self) -> &[FundRecord] {
        &self.funds
    }

    pub fn len(&self) -> usize {
        self.funds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    /// Funds of one category, in universe order. `Other` never matches.
    pub fn in_category(&self, category: FundCategory) -> Vec<&FundRecord> {
        if category == FundCategory::Other {
            return Vec::new();
        }
        self.funds
            .iter()
            .filter(|f| f.category == category)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wire_field_names() {
        let fund: FundRecord = serde_json::from_value(json!({
            "fund_name": "Axis Bluechip Fund",
            "category": "large_cap",
            "3yr_return": 13.8,
            "expense_ratio": 1.15,
            "sharpe_ratio": 0.92,
            "alpha": 2.8,
            "age_years": 12,
        }))
        .unwrap();
        assert_eq!(fund.category, FundCategory::LargeCap);
        assert_eq!(fund.three_year_return, 13.8);
    }

    #[test]
    fn unknown_or_missing_category_never_matches() {
        let universe: FundUniverse = serde_json::from_value(json!([
            {"fund_name": "A", "category": "sectoral", "3yr_return": 1.0,
             "expense_ratio": 1.0, "sharpe_ratio": 1.0, "alpha": 1.0, "age_years": 5},
            {"fund_name": "B", "3yr_return": 1.0,
             "expense_ratio": 1.0, "sharpe_ratio": 1.0, "alpha": 1.0, "age_years": 5},
        ]))
        .unwrap();
        assert_eq!(universe.len(), 2);
        assert!(universe.funds().iter().all(|f| f.category == FundCategory::Other));
        assert!(universe.in_category(FundCategory::Other).is_empty());
        assert!(universe.in_category(FundCategory::LargeCap).is_empty());
    }

    #[test]
    fn category_round_trips_through_str() {
        for c in [
            FundCategory::LargeCap,
            FundCategory::MidCap,
            FundCategory::SmallCap,
            FundCategory::Debt,
            FundCategory::Hybrid,
        ] {
            assert_eq!(c.as_str().parse::<FundCategory>().unwrap(), c);
        }
        assert!("other".parse::<FundCategory>().is_err());
    }

    #[test]
    fn scored_fund_flattens_record() {
        let scored = ScoredFund {
            fund: FundRecord {
                fund_name: "X".to_string(),
                category: FundCategory::Debt,
                three_year_return: 7.5,
                expense_ratio: 0.5,
                sharpe_ratio: 1.2,
                alpha: 1.1,
                age_years: 8,
            },
            score: 0.75,
        };
        let v = serde_json::to_value(&scored).unwrap();
        assert_eq!(v["fund_name"], "X");
        assert_eq!(v["category"], "debt");
        assert_eq!(v["3yr_return"], 7.5);
        assert_eq!(v["score"], 0.75);
    }
}
