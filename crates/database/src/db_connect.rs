use app_config::SurrealDbConfig;
use app_error::{AppError, AppResult};
use std::sync::Arc;

use crate::{Database, service::DbCredentials};

/// Index definitions for the accounts store. Email uniqueness is enforced
/// here so concurrent signups cannot both land the same address; the
/// application-level check only exists to produce a friendly conflict
/// before paying for a password hash.
pub async fn ensure_account_schema(db: &Database) -> AppResult<()> {
    db.query("DEFINE INDEX IF NOT EXISTS userEmailIdx ON TABLE users COLUMNS email UNIQUE")
        .r#await()
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to define account schema: {}", e))
        })?;

    Ok(())
}

pub async fn initialize_user_db(db_config: &SurrealDbConfig) -> AppResult<Arc<Database>> {
    tracing::debug!("Connecting to SurrealDB: {}", db_config.endpoint);

    let is_secure = db_config.endpoint.starts_with("wss://");

    if is_secure {
        tracing::info!("Using secure TLS connection to database");
    } else if !db_config.endpoint.contains("memory") {
        tracing::warn!("Using non-secure database connection");
    }

    let max_connections = db_config.pool.size;

    tracing::info!(
        "Initializing database connection pool with {} connections",
        max_connections
    );

    let credentials = DbCredentials::new(&db_config.username, &db_config.password);

    let db = Database::initialize(
        &db_config.endpoint,
        max_connections,
        &db_config.namespace,
        &db_config.database,
        &credentials,
    )
    .await?;

    ensure_account_schema(&db).await?;

    tracing::info!("Successfully connected to user SurrealDB with connection pool");

    Ok(Arc::new(db))
}

/// In-memory store for tests. Each call returns a fresh, isolated database
/// so test cases can run in parallel.
pub async fn initialize_memory_db() -> AppResult<Arc<Database>> {
    let db = Database::initialize_memory(10, "test", "test").await?;

    ensure_account_schema(&db).await?;

    tracing::info!("Successfully connected to in-memory SurrealDB");

    Ok(Arc::new(db))
}
