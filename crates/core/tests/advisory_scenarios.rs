use chrono::{TimeZone, Utc};
use fundwise_core::domain::fund::{FundCategory, FundRecord, FundUniverse};
use fundwise_core::domain::recommendation::RiskCategory;
use fundwise_core::{Advisor, EngineConfig, ProfileInput};
use serde_json::json;

const SAMPLE_FUNDS: &str = include_str!("../../../data/sample_funds.json");

fn advisor() -> Advisor {
    Advisor::new(EngineConfig::default()).unwrap()
}

fn profile(v: serde_json::Value) -> ProfileInput {
    serde_json::from_value(v).unwrap()
}

fn scenario_a() -> ProfileInput {
    profile(json!({
        "age": 25,
        "monthly_income": 80000,
        "current_savings": 200000,
        "monthly_surplus": 25000,
        "goals": {"60": 500000, "120": 1000000},
        "risk_tolerance_score": 5,
    }))
}

fn scenario_b() -> ProfileInput {
    profile(json!({
        "age": 55,
        "monthly_income": 120000,
        "current_savings": 1500000,
        "monthly_surplus": 20000,
        "goals": {"36": 300000},
        "risk_tolerance_score": 2,
    }))
}

/// Six funds in each listed category; the top two of each survive filtering.
fn universe_with(categories: &[FundCategory]) -> FundUniverse {
    let mut funds = Vec::new();
    for &category in categories {
        for i in 0..6 {
            funds.push(FundRecord {
                fund_name: format!("{category} fund {i}"),
                category,
                three_year_return: 6.0 + 1.5 * i as f64,
                expense_ratio: 0.9 + 0.05 * i as f64,
                sharpe_ratio: 0.5 + 0.15 * i as f64,
                alpha: 1.0 + 0.4 * i as f64,
                age_years: 4 + i as u32,
            });
        }
    }
    FundUniverse::new(funds)
}

fn every_category() -> FundUniverse {
    universe_with(&[
        FundCategory::LargeCap,
        FundCategory::MidCap,
        FundCategory::SmallCap,
        FundCategory::Debt,
        FundCategory::Hybrid,
    ])
}

#[test]
fn young_aggressive_investor_gets_equity_heavy_portfolio() {
    let (outcome, rec) = advisor().recommend(&scenario_a(), &every_category());
    assert!(!outcome.is_fallback());
    assert!(matches!(
        rec.risk_category,
        RiskCategory::Aggressive | RiskCategory::Growth
    ));
    assert!(rec.baseline.equity >= 0.65);
}

#[test]
fn older_cautious_investor_scores_below_young_one() {
    let a = advisor();
    let young = a.assess(&scenario_a());
    let older = a.assess(&scenario_b());
    let (young, older) = (young.assessment(), older.assessment());

    assert!(older.risk_score < young.risk_score);
    assert!(older.risk_category < young.risk_category);
    assert!(older.allocation.debt > young.allocation.debt);

    // Savings cover far more than 60 months of income, so that factor saturates.
    let factors = older.factor_breakdown.unwrap().factors;
    assert_eq!(factors.savings, 1.0);
    assert_eq!(factors.age, 0.4);
    assert_eq!(factors.tolerance, 0.25);
}

#[test]
fn missing_category_is_dropped_without_renormalizing() {
    let universe = universe_with(&[
        FundCategory::LargeCap,
        FundCategory::MidCap,
        FundCategory::Debt,
        FundCategory::Hybrid,
    ]);
    let a = advisor();
    assert!(a.select_funds(&universe, FundCategory::SmallCap).is_empty());

    let (_, rec) = a.recommend(&scenario_a(), &universe);
    assert!(rec.get(FundCategory::SmallCap).is_none());
    let small_cap_share = rec.baseline.equity * 0.2 * 100.0;
    let hybrid = rec.get(FundCategory::Hybrid).map_or(0.0, |h| h.allocation_pct);
    assert!((rec.total_allocation_pct - (100.0 - small_cap_share + hybrid)).abs() < 1e-9);
    assert!(rec.total_allocation_pct < 100.0);
}

#[test]
fn moderate_baseline_adds_nine_percent_hybrid_on_top() {
    let a = advisor();
    let rec = a.allocator().allocate(&every_category(), 0.5);
    assert_eq!(rec.risk_category, RiskCategory::Moderate);

    let hybrid = rec.get(FundCategory::Hybrid).unwrap().allocation_pct;
    assert!((hybrid - 9.0).abs() < 1e-9);
    let large = rec.get(FundCategory::LargeCap).unwrap().allocation_pct;
    assert!((large - 22.5).abs() < 1e-9);
    let debt = rec.get(FundCategory::Debt).unwrap().allocation_pct;
    assert!((debt - 55.0).abs() < 1e-9);
}

#[test]
fn totals_may_exceed_or_fall_short_of_one_hundred() {
    let a = advisor();
    let over = a.allocator().allocate(&every_category(), 0.5);
    assert!(over.total_allocation_pct > 100.0);

    let sparse = universe_with(&[FundCategory::LargeCap]);
    let under = a.allocator().allocate(&sparse, 0.5);
    assert!(under.total_allocation_pct < 100.0);
    assert_eq!(under.allocations.len(), 1);
}

#[test]
fn sample_universe_produces_display_ready_reports() {
    let universe: FundUniverse = serde_json::from_str(SAMPLE_FUNDS).unwrap();
    assert_eq!(universe.len(), 20);

    let at = Utc.with_ymd_and_hms(2026, 2, 14, 12, 0, 0).unwrap();
    let report = advisor().advise(&scenario_a(), &universe, at);

    assert!(!report.fallback_used);
    assert_eq!(report.risk_category, RiskCategory::Aggressive);
    assert_eq!(report.equity_percentage, 80.0);
    let large = &report.recommendations[&FundCategory::LargeCap];
    assert_eq!(large.allocation_percentage, 40.0);
    assert_eq!(large.top_funds[0].fund_name, "Axis Bluechip Fund");
    // The sample debt funds never clear both the median-return and Sharpe cut-offs.
    assert!(!report.recommendations.contains_key(&FundCategory::Debt));
    assert_eq!(report.total_allocation, 80.0);
}

#[test]
fn repeated_selection_is_deterministic() {
    let universe: FundUniverse = serde_json::from_str(SAMPLE_FUNDS).unwrap();
    let a = advisor();
    for category in [FundCategory::MidCap, FundCategory::SmallCap, FundCategory::Hybrid] {
        assert_eq!(
            a.select_funds(&universe, category),
            a.select_funds(&universe, category)
        );
    }
}
