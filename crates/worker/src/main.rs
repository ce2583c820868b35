use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fundwise_core::{Advisor, EngineConfig, FundUniverse};

mod batch;

#[derive(Debug, Parser)]
#[command(name = "fundwise_worker")]
struct Args {
    /// JSON array of profile records.
    #[arg(long)]
    profiles: PathBuf,

    /// JSON array of fund records. Defaults to FUND_UNIVERSE_PATH.
    #[arg(long)]
    funds: Option<PathBuf>,

    /// Engine config JSON. Defaults to ENGINE_CONFIG_PATH, then built-in defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write reports here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Validate inputs and log counts without advising.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fundwise_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => settings.load_engine_config()?,
    };
    let advisor = Advisor::new(config)?;

    let universe = match &args.funds {
        Some(path) => FundUniverse::load(path)?,
        None => FundUniverse::load(settings.require_fund_universe_path()?)?,
    };
    let profiles = batch::load_profiles(&args.profiles)?;

    if args.dry_run {
        tracing::info!(
            dry_run = true,
            profiles = profiles.len(),
            funds = universe.len(),
            "inputs validated"
        );
        return Ok(());
    }

    let (reports, summary) = batch::run_batch(&advisor, &profiles, &universe, chrono::Utc::now());
    if let Err(err) = batch::write_reports(&reports, args.output.as_deref()) {
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }

    tracing::info!(
        profiles = summary.profiles,
        unreadable = summary.unreadable,
        fallbacks = summary.fallbacks,
        warnings = summary.warnings,
        "batch complete"
    );
    Ok(())
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
