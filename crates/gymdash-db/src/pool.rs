//! Pool setup, database bootstrap and the embedded gymdash migrations.

use std::time::Duration;

use anyhow::{Context, Result, ensure};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Executor, PgPool, Row};
use tracing::{debug, info};

use crate::config::DbConfig;

/// Migrations embedded at compile time from `crates/gymdash-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Tables owned by gymdash, in the order `db-init` reports them.
pub const TABLES: [&str; 5] = ["members", "plans", "assignments", "overlays", "food_catalog"];

/// Connections kept by the CLI and the API server.
const MAX_CONNECTIONS: u32 = 5;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

fn options(max_connections: u32) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
}

pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    let pool = options(MAX_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("cannot reach the gymdash database at {}", config.database_url))?;
    debug!(db = config.database_name().unwrap_or("?"), "pool connected");
    Ok(pool)
}

/// Apply pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("gymdash schema migration failed")?;
    info!(known = MIGRATOR.iter().count(), "schema up to date");
    Ok(())
}

/// `CREATE DATABASE` takes no bind parameters, so only plain identifiers
/// are accepted.
fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Create the configured database through the server's `postgres`
/// database when it is missing.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let name = config
        .database_name()
        .context("the database URL does not name a database")?;
    ensure!(
        is_plain_identifier(name),
        "database name {name:?} must use only letters, digits and underscores"
    );

    let maintenance_url = config.maintenance_url();
    let admin = options(1)
        .connect(&maintenance_url)
        .await
        .with_context(|| format!("cannot reach the maintenance database at {maintenance_url}"))?;

    let present: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&admin)
            .await
            .context("failed to look up existing databases")?;

    if present {
        info!(db = name, "database present");
    } else {
        admin
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .with_context(|| format!("failed to create database {name}"))?;
        info!(db = name, "database created");
    }

    admin.close().await;
    Ok(())
}

/// Row count of each gymdash table, in [`TABLES`] order.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let selects: Vec<String> = TABLES
        .iter()
        .map(|t| format!("(SELECT COUNT(*) FROM {t}) AS {t}"))
        .collect();
    let row: PgRow = sqlx::query(&format!("SELECT {}", selects.join(", ")))
        .fetch_one(pool)
        .await
        .context("failed to count gymdash rows")?;

    TABLES
        .iter()
        .map(|&t| {
            let count: i64 = row
                .try_get(t)
                .with_context(|| format!("no row count for {t}"))?;
            Ok((t, count))
        })
        .collect()
}
