//! # Database Connection Pool Management
//!
//! Provides database connection pool creation for executing [`SqlQuery`]
//! handles.
//!
//! [`SqlQuery`]: super::SqlQuery

use crate::config::DatabaseConfig;
use crate::errors::{QueryGateError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Type alias for the database connection pool
pub type DbPool = PgPool;

/// Create a database connection pool with the specified configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    validate_config(config)?;

    let pool_options = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true);

    let pool_options = if let Some(idle_timeout) = config.idle_timeout() {
        pool_options.idle_timeout(idle_timeout)
    } else {
        pool_options
    };

    let pool = pool_options.connect(&config.url).await.map_err(|e| {
        tracing::error!(
            error = %e,
            url = %sanitize_url(&config.url),
            "Failed to create database pool"
        );
        QueryGateError::Database {
            source: e,
            context: format!("Failed to connect to database: {}", sanitize_url(&config.url)),
        }
    })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        connect_timeout_ms = config.connect_timeout().as_millis(),
        idle_timeout_ms = config.idle_timeout().map(|d| d.as_millis()),
        "Database connection pool created"
    );

    Ok(pool)
}

/// Validate database configuration
fn validate_config(config: &DatabaseConfig) -> Result<()> {
    if config.max_connections == 0 {
        return Err(QueryGateError::config("max_connections must be greater than 0"));
    }

    if config.min_connections > config.max_connections {
        return Err(QueryGateError::config(
            "min_connections cannot be greater than max_connections",
        ));
    }

    if !config.is_postgresql() {
        return Err(QueryGateError::config(
            "Database URL must start with 'postgresql://' or 'postgres://'",
        ));
    }

    Ok(())
}

/// Strip the password from a connection URL for logging
fn sanitize_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.rsplit_once('@') else {
        return url.to_string();
    };

    match credentials.split_once(':') {
        Some((user, _)) => format!("{}://{}:***@{}", scheme, user, host),
        None => url.to_string(),
    }
}
