//! `SQLite` file that keeps client state between runs.

use std::sync::Arc;
use std::time::Duration;

use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use thiserror::Error;

use crate::repository::{ClientStateRepository, Storage};

mod client_state_repo;
mod migrate;

const MAX_CONNECTIONS: u32 = 5;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Run on every new connection. Two app processes may share one file.
const CONNECTION_PRAGMAS: [&str; 2] = ["PRAGMA journal_mode = WAL;", "PRAGMA busy_timeout = 5000;"];

/// Key/value store for the token, identity, theme and selected language.
#[derive(Clone)]
pub struct SqliteClientStore {
    pool: SqlitePool,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqliteInitError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl SqliteClientStore {
    /// Open the client-state database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if the file cannot be opened or a pragma
    /// is refused.
    pub async fn connect(database_url: &str) -> Result<Self, SqliteInitError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    for pragma in CONNECTION_PRAGMAS {
                        sqlx::query(pragma).execute(&mut *conn).await?;
                    }
                    Ok(())
                })
            })
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bring the `client_state` table up to the current schema version.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` if a migration step fails.
    pub async fn migrate(&self) -> Result<(), SqliteInitError> {
        migrate::run_migrations(&self.pool).await
    }
}

impl Storage {
    /// Client state persisted in `SQLite`, migrated and ready to use.
    ///
    /// # Errors
    ///
    /// See `SqliteClientStore::connect` and `SqliteClientStore::migrate`.
    pub async fn sqlite(database_url: &str) -> Result<Self, SqliteInitError> {
        let store = SqliteClientStore::connect(database_url).await?;
        store.migrate().await?;
        let client_state: Arc<dyn ClientStateRepository> = Arc::new(store);
        Ok(Self { client_state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connections_wait_on_a_busy_file() {
        let store = SqliteClientStore::connect("sqlite::memory:").await.unwrap();
        let (timeout,): (i64,) = sqlx::query_as("PRAGMA busy_timeout;")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(timeout, 5000);
    }

    #[test]
    fn store_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqliteClientStore>();
    }
}
