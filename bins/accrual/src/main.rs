//! Monthly leave accrual job for Staffline.
//!
//! Intended to run from cron once per calendar month. Re-running for the
//! same month is safe: already-credited employees are skipped.
//!
//! Usage:
//!   accrual            - Accrue for the current month
//!   accrual 2025-06    - Accrue for a specific month (manual re-run)

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use staffline_core::leave::{AccrualPeriod, Actor, LeaveLedger};
use staffline_db::{SqlBalanceStore, SqlEmployeeDirectory, connect};
use staffline_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staffline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Target period: explicit YYYY-MM argument, or the current month
    let period = match std::env::args().nth(1) {
        Some(raw) => raw
            .parse::<AccrualPeriod>()
            .map_err(|e| anyhow::anyhow!("invalid period argument: {e}"))?,
        None => AccrualPeriod::containing(Utc::now()),
    };

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let ledger = LeaveLedger::new(
        Arc::new(SqlBalanceStore::new(db.clone())),
        Arc::new(SqlEmployeeDirectory::new(db)),
    )
    .with_accrual_concurrency(config.accrual.concurrency);

    // Ctrl-C stops the run between employees; credits already committed stay
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Cancellation requested, finishing in-flight employees");
            signal_cancel.cancel();
        }
    });

    match ledger.accrue_monthly(period, &Actor::system(), &cancel).await {
        Ok(summary) => {
            info!(
                %period,
                credited = summary.credited,
                skipped = summary.skipped,
                errors = summary.errors,
                "accrual job complete"
            );
            if summary.errors > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            error!(%period, error = %e, "accrual job failed");
            Err(e.into())
        }
    }
}
