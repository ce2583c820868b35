use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use fundwise_core::domain::contract::FieldWarning;
use fundwise_core::risk::sensitivity::{SensitivityReport, SensitivityRequest};
use fundwise_core::risk::FactorBreakdown;
use fundwise_core::{
    AdvisoryReport, Advisor, FundCategory, FundUniverse, ProfileInput, RiskCategory, ScoredFund,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fundwise_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // A bad engine config must never serve requests.
    let advisor = Advisor::new(settings.load_engine_config()?)?;

    let universe = match settings
        .require_fund_universe_path()
        .and_then(FundUniverse::load)
    {
        Ok(universe) => {
            tracing::info!(funds = universe.len(), "fund universe loaded");
            Some(universe)
        }
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "fund universe unavailable; starting API in degraded mode");
            None
        }
    };

    let app = router(AppState::new(advisor, universe));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/assessments", post(create_assessment))
        .route("/recommendations", post(create_recommendation))
        .route("/sensitivity", post(run_sensitivity))
        .route("/funds", get(list_funds))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    advisor: Arc<Advisor>,
    /// `None` in degraded mode; recommendations then draw from an empty universe.
    universe: Option<Arc<FundUniverse>>,
}

impl AppState {
    fn new(advisor: Advisor, universe: Option<FundUniverse>) -> Self {
        Self {
            advisor: Arc::new(advisor),
            universe: universe.map(Arc::new),
        }
    }

    fn universe(&self) -> Arc<FundUniverse> {
        self.universe.clone().unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
struct ApiAssessment {
    risk_score: f64,
    risk_category: RiskCategory,
    debt_percentage: f64,
    equity_percentage: f64,
    factor_breakdown: Option<FactorBreakdown>,
    warnings: Vec<FieldWarning>,
    fallback_used: bool,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiRecommendation {
    recommendation_id: Uuid,
    report: AdvisoryReport,
}

#[derive(Debug, Deserialize)]
struct FundsQuery {
    category: String,
}

#[derive(Debug, Serialize)]
struct ApiFunds {
    category: FundCategory,
    funds: Vec<ScoredFund>,
}

async fn create_assessment(
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ApiAssessment>, StatusCode> {
    let outcome = state.advisor.assess(&input);
    if let Some(error) = outcome.error() {
        report_fallback(error);
    }

    let a = outcome.assessment();
    Ok(Json(ApiAssessment {
        risk_score: a.risk_score,
        risk_category: a.risk_category,
        debt_percentage: a.allocation.debt_pct(),
        equity_percentage: a.allocation.equity_pct(),
        factor_breakdown: a.factor_breakdown,
        warnings: outcome.warnings().to_vec(),
        fallback_used: outcome.is_fallback(),
        error: outcome.error().map(str::to_string),
    }))
}

async fn create_recommendation(
    State(state): State<AppState>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<ApiRecommendation>, StatusCode> {
    let report = state.advisor.advise(&input, &state.universe(), Utc::now());
    if let Some(error) = &report.error {
        report_fallback(error);
    }

    let recommendation_id = Uuid::new_v4();
    tracing::info!(
        %recommendation_id,
        risk_category = %report.risk_category,
        categories = report.total_categories,
        "recommendation generated"
    );

    Ok(Json(ApiRecommendation {
        recommendation_id,
        report,
    }))
}

async fn run_sensitivity(
    State(state): State<AppState>,
    Json(request): Json<SensitivityRequest>,
) -> Result<Json<SensitivityReport>, StatusCode> {
    Ok(Json(state.advisor.analyze_sensitivity(&request)))
}

async fn list_funds(
    State(state): State<AppState>,
    Query(query): Query<FundsQuery>,
) -> Result<Json<ApiFunds>, StatusCode> {
    let Some(universe) = &state.universe else {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    };

    let category: FundCategory = query.category.parse().map_err(|e: anyhow::Error| {
        tracing::debug!(error = %e, "rejected fund category");
        StatusCode::BAD_REQUEST
    })?;

    Ok(Json(ApiFunds {
        category,
        funds: state.advisor.select_funds(universe, category),
    }))
}

fn report_fallback(error: &str) {
    sentry::capture_message(
        &format!("risk assessment fell back to conservative profile: {error}"),
        sentry::Level::Warning,
    );
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &fundwise_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
