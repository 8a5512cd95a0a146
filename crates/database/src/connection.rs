use crate::error::DbError;
use configuration::DatabaseSettings;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is the only long-lived database resource. Every query checks a
/// connection out for its own duration and hands it back when it completes or
/// fails, so handlers never manage connections themselves.
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, DbError> {
    if settings.max_connections == 0 {
        return Err(DbError::ConnectionConfigError(
            "database.max_connections must be at least 1".to_string(),
        ));
    }

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(&settings.connection_url())
        .await?;

    tracing::info!(
        max_connections = settings.max_connections,
        "Connected to the database."
    );
    Ok(pool)
}

/// Applies the embedded migrations so the schema is up to date.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Use a relative path from the crate root
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
