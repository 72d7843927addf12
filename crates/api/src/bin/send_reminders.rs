//! Runs a single reminder sweep and exits. Meant for cron-style schedulers when
//! the in-process reminder loop is not wanted.

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::services::send_due_reminders;
use api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&std::env::var("DATABASE_URL")?)
        .await?;

    let state = AppState::from_env(pool)?;
    let summary = send_due_reminders(&state).await?;

    if summary.failed > 0 {
        anyhow::bail!(
            "{} of {} reminders could not be sent",
            summary.failed,
            summary.due
        );
    }
    Ok(())
}
