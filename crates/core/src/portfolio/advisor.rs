use crate::config::EngineConfig;
use crate::domain::contract::ProfileInput;
use crate::domain::fund::{FundCategory, FundUniverse, ScoredFund};
use crate::domain::recommendation::{AdvisoryReport, PortfolioRecommendation};
use crate::error::ConfigError;
use crate::portfolio::allocator::PortfolioAllocator;
use crate::risk::engine::{RiskScoringEngine, ScoringOutcome};
use crate::risk::sensitivity::{SensitivityReport, SensitivityRequest};
use chrono::{DateTime, Utc};
use tracing::error;

/// Scoring engine and allocator built from one validated configuration.
#[derive(Debug, Clone)]
pub struct Advisor {
    engine: RiskScoringEngine,
    allocator: PortfolioAllocator,
}

impl Advisor {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        let allocator = PortfolioAllocator::from_config(&config)?;
        let engine = RiskScoringEngine::new(config)?;
        Ok(Self { engine, allocator })
    }

    pub fn engine(&self) -> &RiskScoringEngine {
        &self.engine
    }

    pub fn allocator(&self) -> &PortfolioAllocator {
        &self.allocator
    }

    pub fn assess(&self, input: &ProfileInput) -> ScoringOutcome {
        self.engine.assess(input)
    }

    pub fn analyze_sensitivity(&self, request: &SensitivityRequest) -> SensitivityReport {
        self.engine.analyze_sensitivity(request)
    }

    pub fn select_funds(&self, universe: &FundUniverse, category: FundCategory) -> Vec<ScoredFund> {
        self.allocator.filter().select(universe, category)
    }

    /// Score the profile, then allocate from the category and baseline the
    /// assessment carries. A fallback assessment is allocated like any other.
    pub fn recommend(
        &self,
        input: &ProfileInput,
        universe: &FundUniverse,
    ) -> (ScoringOutcome, PortfolioRecommendation) {
        let outcome = self.engine.assess(input);
        let recommendation = self.allocate_outcome(&outcome, universe);
        (outcome, recommendation)
    }

    pub fn advise(
        &self,
        input: &ProfileInput,
        universe: &FundUniverse,
        generated_at: DateTime<Utc>,
    ) -> AdvisoryReport {
        let outcome = self.engine.assess(input);
        self.report(&outcome, universe, generated_at)
    }

    /// Report for a record that could not be read as a profile at all: the
    /// conservative fallback, carrying `error`.
    pub fn advise_unreadable(
        &self,
        error: impl Into<String>,
        universe: &FundUniverse,
        generated_at: DateTime<Utc>,
    ) -> AdvisoryReport {
        let error = error.into();
        error!(error = %error, "unreadable profile record; using conservative fallback");
        let outcome = ScoringOutcome::fallback(error, Vec::new());
        self.report(&outcome, universe, generated_at)
    }

    fn allocate_outcome(
        &self,
        outcome: &ScoringOutcome,
        universe: &FundUniverse,
    ) -> PortfolioRecommendation {
        let a = outcome.assessment();
        self.allocator
            .allocate_baseline(universe, a.risk_score, a.risk_category, a.allocation)
    }

    fn report(
        &self,
        outcome: &ScoringOutcome,
        universe: &FundUniverse,
        generated_at: DateTime<Utc>,
    ) -> AdvisoryReport {
        let recommendation = self.allocate_outcome(outcome, universe);
        let mut report = AdvisoryReport::from_recommendation(&recommendation, generated_at);
        report.factor_breakdown = outcome.assessment().factor_breakdown;
        report.fallback_used = outcome.is_fallback();
        report.error = outcome.error().map(str::to_string);
        report.warnings = outcome.warnings().to_vec();
        report
    }
}
