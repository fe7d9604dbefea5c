//! Bounded pool of async PostgreSQL connections.
//!
//! The pool is built once at startup and shared by every request. Each
//! repository call checks out one connection, runs a single statement and
//! hands the connection back; connections idle for longer than the idle
//! timeout are closed by the pool's reaper.

use std::time::Duration;

use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection could be checked out.
    #[error("{message}")]
    Checkout { message: String },

    /// The pool itself could not be built.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Settings for [`DbPool`].
///
/// Defaults: at most 10 connections, idle connections released after 30s.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    connection_string: String,
    max_size: u32,
    idle_timeout: Option<Duration>,
}

impl PoolConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            max_size: 10,
            idle_timeout: Some(Duration::from_secs(30)),
        }
    }
}

#[derive(Clone)]
pub struct DbPool {
    inner: bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>,
}

impl DbPool {
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.connection_string);

        let inner = bb8::Pool::builder()
            .max_size(config.max_size)
            .idle_timeout(config.idle_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner })
    }

    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner.get().await.map_err(|err| match err {
            bb8::RunError::User(err) => PoolError::checkout(err.to_string()),
            bb8::RunError::TimedOut => {
                PoolError::checkout("timed out waiting for a database connection")
            }
        })
    }
}
