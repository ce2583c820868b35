use crate::config::EngineConfig;
use crate::domain::fund::{FundCategory, FundUniverse};
use crate::domain::recommendation::{
    BaselineAllocation, PortfolioRecommendation, RiskCategory, SubCategoryAllocation,
};
use crate::error::ConfigError;
use crate::funds::filter::FundFilterEngine;
use crate::risk::category::CategoryBands;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Share of the equity sleeve given to each equity sub-category.
pub const EQUITY_SPLIT: [(FundCategory, f64); 3] = [
    (FundCategory::LargeCap, 0.5),
    (FundCategory::MidCap, 0.3),
    (FundCategory::SmallCap, 0.2),
];

/// Share of the debt sleeve given to each debt sub-category.
pub const DEBT_SPLIT: [(FundCategory, f64); 1] = [(FundCategory::Debt, 1.0)];

/// Both sleeves must exceed this fraction for a hybrid slice to be considered.
const HYBRID_MIN_SLEEVE: f64 = 0.2;
/// Hybrid takes at most this fraction of the portfolio...
const HYBRID_CAP: f64 = 0.15;
/// ...and at most this share of the smaller sleeve.
const HYBRID_SLEEVE_SHARE: f64 = 0.2;

/// Hybrid slice as a fraction of the portfolio, `None` when the baseline is
/// too one-sided. The slice is added on top of the debt/equity split.
pub fn hybrid_share(baseline: BaselineAllocation) -> Option<f64> {
    if baseline.equity > HYBRID_MIN_SLEEVE && baseline.debt > HYBRID_MIN_SLEEVE {
        Some(
            HYBRID_CAP
                .min(baseline.equity * HYBRID_SLEEVE_SHARE)
                .min(baseline.debt * HYBRID_SLEEVE_SHARE),
        )
    } else {
        None
    }
}

/// Splits a category's baseline across sub-categories and fills each slice
/// with a fund shortlist.
#[derive(Debug, Clone, Default)]
pub struct PortfolioAllocator {
    bands: CategoryBands,
    filter: FundFilterEngine,
}

impl PortfolioAllocator {
    pub fn new(bands: CategoryBands, filter: FundFilterEngine) -> Self {
        Self { bands, filter }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.bands.validate()?;
        Ok(Self::new(config.bands, FundFilterEngine::new(config.filter)?))
    }

    pub fn filter(&self) -> &FundFilterEngine {
        &self.filter
    }

    pub fn allocate(&self, universe: &FundUniverse, risk_score: f64) -> PortfolioRecommendation {
        let (category, baseline) = self.bands.categorize(risk_score);
        self.allocate_baseline(universe, risk_score, category, baseline)
    }

    /// Slices whose shortlist comes back empty are dropped, not redistributed,
    /// and the total is the plain sum of what remains.
    pub fn allocate_baseline(
        &self,
        universe: &FundUniverse,
        risk_score: f64,
        risk_category: RiskCategory,
        baseline: BaselineAllocation,
    ) -> PortfolioRecommendation {
        let mut allocations = BTreeMap::new();

        let sleeves: [(f64, &[(FundCategory, f64)]); 2] =
            [(baseline.equity, &EQUITY_SPLIT[..]), (baseline.debt, &DEBT_SPLIT[..])];
        for (sleeve, split) in sleeves {
            if sleeve <= 0.0 {
                continue;
            }
            for &(sub_category, share) in split {
                let fraction = sleeve * share;
                if fraction > 0.0 {
                    self.fill(universe, sub_category, fraction, &mut allocations);
                }
            }
        }

        if let Some(fraction) = hybrid_share(baseline) {
            self.fill(universe, FundCategory::Hybrid, fraction, &mut allocations);
        }

        let total_allocation_pct = allocations.values().map(|a| a.allocation_pct).sum();
        info!(
            %risk_category,
            risk_score,
            slices = allocations.len(),
            total_allocation_pct,
            "portfolio allocated"
        );

        PortfolioRecommendation {
            risk_category,
            risk_score,
            baseline,
            allocations,
            total_allocation_pct,
        }
    }

    fn fill(
        &self,
        universe: &FundUniverse,
        sub_category: FundCategory,
        fraction: f64,
        allocations: &mut BTreeMap<FundCategory, SubCategoryAllocation>,
    ) {
        let funds = self.filter.select(universe, sub_category);
        if funds.is_empty() {
            debug!(%sub_category, "no eligible funds; slice omitted");
            return;
        }
        allocations.insert(
            sub_category,
            SubCategoryAllocation {
                sub_category,
                allocation_pct: fraction * 100.0,
                funds,
            },
        );
    }
}
