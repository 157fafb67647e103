//! Teflu Server — application entry point.

mod config;

use teflu_core::error::TefluError;
use teflu_core::shift::SystemClock;
use teflu_db::repository::{SurrealScanRepository, SurrealToolRepository};
use teflu_db::{DbError, DbManager, ensure_defaults};
use surrealdb::{Connection, Surreal};
use teflu_inventory::DashboardAggregator;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("database: {0}")]
    Database(#[from] DbError),

    #[error("{0}")]
    Service(#[from] TefluError),

    #[error("signal handler: {0}")]
    Signal(#[from] std::io::Error),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();
}

type Dashboard<C> = DashboardAggregator<SurrealToolRepository<C>, SurrealScanRepository<C>, SystemClock>;

fn dashboard<C: Connection>(db: &Surreal<C>) -> Dashboard<C> {
    DashboardAggregator::new(
        SurrealToolRepository::new(db.clone()),
        SurrealScanRepository::new(db.clone()),
        SystemClock,
    )
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    if config.auth.session_secret.is_empty() {
        error!("auth.session_secret is not set; logins will be refused");
    }

    let db = DbManager::connect(&config.database).await?;
    let report = ensure_defaults(db.client(), &config.authz.admin_role_name).await?;
    info!(
        admin_role = %report.admin_role_id,
        admin_role_created = report.admin_role_created,
        modules_created = report.modules_created,
        "Defaults verified"
    );

    let stats = dashboard(db.client()).shift_stats().await?;
    info!(
        shift = %stats.current_shift,
        shift_date = %stats.shift_date,
        total = stats.total,
        registered = stats.registered,
        missing = stats.missing,
        "Teflu ready"
    );

    tokio::signal::ctrl_c().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    info!("Starting Teflu server...");

    if let Err(e) = run().await {
        error!(error = %e, "Teflu server failed");
        std::process::exit(1);
    }

    info!("Teflu server stopped.");
}
