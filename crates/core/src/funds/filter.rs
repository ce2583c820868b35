use crate::domain::fund::{FundCategory, FundRecord, FundUniverse, ScoredFund};
use crate::error::ConfigError;
use crate::funds::stats::{min_max_normalize, quantile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum expense ratio (percent, exclusive) per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseThresholds {
    pub large_cap: f64,
    pub mid_cap: f64,
    pub small_cap: f64,
    pub debt: f64,
    pub hybrid: f64,
    pub default: f64,
}

impl Default for ExpenseThresholds {
    fn default() -> Self {
        Self {
            large_cap: 2.0,
            mid_cap: 2.25,
            small_cap: 2.5,
            debt: 1.5,
            hybrid: 2.0,
            default: 2.0,
        }
    }
}

impl ExpenseThresholds {
    pub fn for_category(&self, category: FundCategory) -> f64 {
        match category {
            FundCategory::LargeCap => self.large_cap,
            FundCategory::MidCap => self.mid_cap,
            FundCategory::SmallCap => self.small_cap,
            FundCategory::Debt => self.debt,
            FundCategory::Hybrid => self.hybrid,
            FundCategory::Other => self.default,
        }
    }
}

/// Weights of the min-max normalized metrics in the composite fund score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositeWeights {
    pub three_year_return: f64,
    /// Applied to the negated expense ratio: cheaper funds score higher.
    pub expense_ratio: f64,
    pub sharpe_ratio: f64,
    pub alpha: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            three_year_return: 0.4,
            expense_ratio: 0.2,
            sharpe_ratio: 0.2,
            alpha: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub expense_thresholds: ExpenseThresholds,
    /// Funds must be strictly older than this.
    pub min_age_years: u32,
    /// 3yr return must beat this quantile of its category.
    pub return_quantile: f64,
    /// Sharpe ratio must beat this quantile of its category.
    pub sharpe_quantile: f64,
    pub composite: CompositeWeights,
    pub top_n: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            expense_thresholds: ExpenseThresholds::default(),
            min_age_years: 3,
            return_quantile: 0.5,
            sharpe_quantile: 0.75,
            composite: CompositeWeights::default(),
            top_n: 5,
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::InvalidFilter { reason });

        for (name, q) in [
            ("return_quantile", self.return_quantile),
            ("sharpe_quantile", self.sharpe_quantile),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return invalid(format!("{name} must be within [0, 1], got {q}"));
            }
        }

        let t = self.expense_thresholds;
        for v in [t.large_cap, t.mid_cap, t.small_cap, t.debt, t.hybrid, t.default] {
            if !v.is_finite() {
                return invalid(format!("expense threshold must be finite, got {v}"));
            }
        }

        let w = self.composite;
        for v in [w.three_year_return, w.expense_ratio, w.sharpe_ratio, w.alpha] {
            if !v.is_finite() || v < 0.0 {
                return invalid(format!("composite weight must be finite and non-negative, got {v}"));
            }
        }

        if self.top_n == 0 {
            return invalid("top_n must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Screens one category of the universe and ranks the survivors.
#[derive(Debug, Clone, Default)]
pub struct FundFilterEngine {
    config: FilterConfig,
}

impl FundFilterEngine {
    pub fn new(config: FilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Top `top_n` funds of `category`. Empty when the category has no funds
    /// or none pass the filters; the filters are never relaxed.
    pub fn select(&self, universe: &FundUniverse, category: FundCategory) -> Vec<ScoredFund> {
        self.select_top(universe, category, self.config.top_n)
    }

    pub fn select_top(
        &self,
        universe: &FundUniverse,
        category: FundCategory,
        n: usize,
    ) -> Vec<ScoredFund> {
        let candidates = universe.in_category(category);
        if candidates.is_empty() {
            debug!(%category, "no funds in category");
            return Vec::new();
        }

        let survivors = self.apply_filters(&candidates, category);
        debug!(
            %category,
            candidates = candidates.len(),
            survivors = survivors.len(),
            "applied fund filters"
        );
        if survivors.is_empty() {
            return Vec::new();
        }

        let mut scored = self.score(&survivors);
        // Stable: equal scores keep universe order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(n);
        scored
    }

    /// Funds passing every filter. Quantile cut-offs are computed over
    /// `candidates` (a single category), not the whole universe.
    pub fn apply_filters<'a>(
        &self,
        candidates: &[&'a FundRecord],
        category: FundCategory,
    ) -> Vec<&'a FundRecord> {
        let returns: Vec<f64> = candidates.iter().map(|f| f.three_year_return).collect();
        let sharpes: Vec<f64> = candidates.iter().map(|f| f.sharpe_ratio).collect();
        let (Some(return_cut), Some(sharpe_cut)) = (
            quantile(&returns, self.config.return_quantile),
            quantile(&sharpes, self.config.sharpe_quantile),
        ) else {
            return Vec::new();
        };
        let max_expense = self.config.expense_thresholds.for_category(category);
        let min_age = self.config.min_age_years;

        candidates
            .iter()
            .copied()
            .filter(|f| {
                f.three_year_return > return_cut
                    && f.expense_ratio < max_expense
                    && f.age_years > min_age
                    && f.sharpe_ratio > sharpe_cut
            })
            .collect()
    }

    /// Composite score per fund, normalized over `funds` only.
    pub fn score(&self, funds: &[&FundRecord]) -> Vec<ScoredFund> {
        let metric = |pick: fn(&FundRecord) -> f64| -> Vec<f64> {
            min_max_normalize(&funds.iter().map(|f| pick(f)).collect::<Vec<_>>())
        };
        let returns = metric(|f| f.three_year_return);
        let expenses = metric(|f| -f.expense_ratio);
        let sharpes = metric(|f| f.sharpe_ratio);
        let alphas = metric(|f| f.alpha);

        let w = self.config.composite;
        funds
            .iter()
            .enumerate()
            .map(|(i, &fund)| ScoredFund {
                fund: fund.clone(),
                score: w.three_year_return * returns[i]
                    + w.expense_ratio * expenses[i]
                    + w.sharpe_ratio * sharpes[i]
                    + w.alpha * alphas[i],
            })
            .collect()
    }
}
