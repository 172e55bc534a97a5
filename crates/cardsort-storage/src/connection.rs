//! SQLite connection management.
//!
//! The sorter runs on a single-board computer next to the mechanism, so
//! the database is a local SQLite file in WAL mode: the web UI reads the
//! scan log while the pipeline appends to it. [`Database`] wraps the
//! connection pool and applies the embedded migrations on open.

use crate::error::{StorageError, StorageResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Database connection configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub database_path: String,

    /// Maximum number of pooled connections.
    pub max_connections: u32,

    /// Whether to create the database file if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to run migrations on open.
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: "cardsort.db".to_string(),
            max_connections: 5,
            create_if_missing: true,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for the given database path, with defaults otherwise.
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Default::default()
        }
    }

    /// Set the maximum number of pooled connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set whether to create the database file if it doesn't exist.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set whether to run migrations on open.
    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.auto_migrate = migrate;
        self
    }
}

/// Connection pool wrapper with embedded migrations.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (and if configured, create and migrate) the database.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unusable path, or a database
    /// error if the pool or migrations fail.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cardsort_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new(DatabaseConfig::new("cardsort.db")).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        if let Some(parent) = Path::new(&config.database_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!("cannot create database directory: {}", e))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", config.database_path))
            .map_err(|e| StorageError::Configuration(format!("invalid database path: {}", e)))?
            .create_if_missing(config.create_if_missing)
            .foreign_keys(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }

        tracing::info!(path = %config.database_path, "database opened");
        Ok(db)
    }

    /// Open an in-memory database, migrated and ready. Used by tests and
    /// by the pipeline's dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns a database error if the pool or migrations fail.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // An in-memory database exists per connection; the pool must not
        // open a second one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the migrations embedded from the workspace `migrations/`
    /// directory.
    ///
    /// # Errors
    ///
    /// Returns a migration error if any migration fails to apply.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// The underlying connection pool, for constructing repositories.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the pool, waiting for in-flight connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Verify the connection with a trivial query.
    ///
    /// # Errors
    ///
    /// Returns a database error if the query cannot be executed.
    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_path, "cardsort.db");
        assert_eq!(config.max_connections, 5);
        assert!(config.create_if_missing);
        assert!(config.auto_migrate);
    }

    #[test]
    fn test_config_builder() {
        let config = DatabaseConfig::new("sorter/cards.db")
            .max_connections(2)
            .create_if_missing(false)
            .auto_migrate(false);

        assert_eq!(config.database_path, "sorter/cards.db");
        assert_eq!(config.max_connections, 2);
        assert!(!config.create_if_missing);
        assert!(!config.auto_migrate);
    }

    #[tokio::test]
    async fn test_in_memory_database_migrates_and_responds() {
        let db = Database::in_memory().await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;
    }
}
