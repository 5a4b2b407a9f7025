//! Offline reconciliation job. Recomputes every user's earnings from the
//! referral counts and overwrites drifted rows, then exits. The same pass is
//! reachable over HTTP via POST /api/admin/update-earnings.

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use refpay::config::DEFAULT_REFERRAL_BONUS;
use refpay::referrals::repo::reconcile;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "refpay=info".to_string());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let bonus = std::env::var("REFERRAL_BONUS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_REFERRAL_BONUS);

    let db = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("connect to database")?;

    tracing::info!("starting earnings update");
    let updated = reconcile(&db, bonus).await?;
    tracing::info!(updated, "earnings update completed");

    db.close().await;
    Ok(())
}
