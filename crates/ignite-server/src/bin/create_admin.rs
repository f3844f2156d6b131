//! Seeds an administrator account. Safe to run repeatedly: an existing
//! account with the same email is left alone.

use anyhow::Context;
use tracing::info;

use ignite_api::auth::ensure_admin;
use ignite_api::config::AppConfig;
use ignite_db::Database;

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ignite=info,ignite_api=info".into()),
        )
        .init();

    let db_path = AppConfig::db_path_from_env();
    let email = std::env::var("IGNITE_ADMIN_EMAIL").unwrap_or_else(|_| "admin@ignite.com".into());
    let name = std::env::var("IGNITE_ADMIN_NAME").unwrap_or_else(|_| "Admin".into());
    let password =
        std::env::var("IGNITE_ADMIN_PASSWORD").context("IGNITE_ADMIN_PASSWORD must be set")?;

    let db = Database::open(&db_path)?;
    if !ensure_admin(&db, &name, &email, &password)? {
        info!(%email, "Admin user already exists");
    }

    Ok(())
}
