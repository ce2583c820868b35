use crate::domain::contract::FieldWarning;
use crate::domain::fund::{FundCategory, ScoredFund};
use crate::risk::factors::FactorBreakdown;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Very Conservative")]
    VeryConservative,
    Conservative,
    Moderate,
    Growth,
    Aggressive,
}

impl RiskCategory {
    /// Increasing order of risk.
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::VeryConservative,
        RiskCategory::Conservative,
        RiskCategory::Moderate,
        RiskCategory::Growth,
        RiskCategory::Aggressive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryConservative => "Very Conservative",
            Self::Conservative => "Conservative",
            Self::Moderate => "Moderate",
            Self::Growth => "Growth",
            Self::Aggressive => "Aggressive",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Debt/equity split as fractions of the portfolio (`0.55` = 55%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineAllocation {
    pub debt: f64,
    pub equity: f64,
}

impl BaselineAllocation {
    pub const fn new(debt: f64, equity: f64) -> Self {
        Self { debt, equity }
    }

    pub fn debt_pct(&self) -> f64 {
        self.debt * 100.0
    }

    pub fn equity_pct(&self) -> f64 {
        self.equity * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategoryAllocation {
    pub sub_category: FundCategory,
    /// Percent of the total portfolio, 0–100.
    pub allocation_pct: f64,
    /// Best first; at most the filter's `top_n`.
    pub funds: Vec<ScoredFund>,
}

/// Allocation slices that found at least one fund. Slices without funds are
/// omitted rather than redistributed, and the hybrid slice is added on top of
/// the debt/equity split, so `total_allocation_pct` can land on either side
/// of 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRecommendation {
    pub risk_category: RiskCategory,
    pub risk_score: f64,
    pub baseline: BaselineAllocation,
    pub allocations: BTreeMap<FundCategory, SubCategoryAllocation>,
    pub total_allocation_pct: f64,
}

impl PortfolioRecommendation {
    pub fn get(&self, sub_category: FundCategory) -> Option<&SubCategoryAllocation> {
        self.allocations.get(&sub_category)
    }
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Display-ready advisory result: scores rounded to 3 places, percentages to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryReport {
    pub generated_at: DateTime<Utc>,
    pub risk_score: f64,
    pub risk_category: RiskCategory,
    pub debt_percentage: f64,
    pub equity_percentage: f64,
    pub total_categories: usize,
    pub total_allocation: f64,
    pub recommendations: BTreeMap<FundCategory, CategoryRecommendation>,
    pub factor_breakdown: Option<FactorBreakdown>,
    pub fallback_used: bool,
    pub error: Option<String>,
    pub warnings: Vec<FieldWarning>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecommendation {
    pub allocation_percentage: f64,
    pub fund_count: usize,
    pub top_funds: Vec<FundSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundSummary {
    pub fund_name: String,
    pub category: FundCategory,
    #[serde(rename = "3yr_return")]
    pub three_year_return: f64,
    pub expense_ratio: f64,
    pub sharpe_ratio: f64,
    pub score: f64,
}

impl From<&ScoredFund> for FundSummary {
    fn from(scored: &ScoredFund) -> Self {
        Self {
            fund_name: scored.fund.fund_name.clone(),
            category: scored.fund.category,
            three_year_return: scored.fund.three_year_return,
            expense_ratio: scored.fund.expense_ratio,
            sharpe_ratio: scored.fund.sharpe_ratio,
            score: round_to(scored.score, 3),
        }
    }
}

impl AdvisoryReport {
    pub fn from_recommendation(
        recommendation: &PortfolioRecommendation,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let recommendations = recommendation
            .allocations
            .iter()
            .map(|(&sub_category, slice)| {
                (
                    sub_category,
                    CategoryRecommendation {
                        allocation_percentage: round_to(slice.allocation_pct, 1),
                        fund_count: slice.funds.len(),
                        top_funds: slice.funds.iter().map(FundSummary::from).collect(),
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        Self {
            generated_at,
            risk_score: round_to(recommendation.risk_score, 3),
            risk_category: recommendation.risk_category,
            debt_percentage: round_to(recommendation.baseline.debt_pct(), 1),
            equity_percentage: round_to(recommendation.baseline.equity_pct(), 1),
            total_categories: recommendations.len(),
            total_allocation: round_to(recommendation.total_allocation_pct, 1),
            recommendations,
            factor_breakdown: None,
            fallback_used: false,
            error: None,
            warnings: Vec::new(),
        }
    }
}
