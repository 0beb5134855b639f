use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

pub type DatabasePool = Arc<PgPool>;

pub async fn create_pool(database_url: &str, database_name: Option<&str>) -> anyhow::Result<PgPool> {
    let mut options = PgConnectOptions::from_str(database_url)?;
    if let Some(name) = database_name {
        options = options.database(name);
    }

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if database_url.contains("sslmode=require") || database_url.contains("sslmode=prefer") {
        tracing::info!("Database connection configured to use TLS");
    } else if !database_url.contains("localhost") && !database_url.contains("127.0.0.1") {
        tracing::warn!("Connecting to remote database without explicit sslmode. Consider adding sslmode=require");
    }

    Ok(pool)
}

pub async fn new_pool(database_url: &str, database_name: Option<&str>) -> anyhow::Result<DatabasePool> {
    let pool = create_pool(database_url, database_name).await?;
    Ok(Arc::new(pool))
}

/// Applies the embedded schema (`migrations/`). Safe to run on every start.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
