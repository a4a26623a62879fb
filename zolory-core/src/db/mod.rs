// zolory-core/src/db/mod.rs

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::config::LedgerConfig;
use crate::Error;

/// The single long-lived handle to the ledger store. Cloning is cheap; every
/// repository holds a clone of the same pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (creating if needed) the SQLite database at `database_url`.
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        Self::from_config(&LedgerConfig {
            database_url: database_url.to_string(),
            ..LedgerConfig::default()
        })
        .await
    }

    pub async fn from_config(config: &LedgerConfig) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?;
        Self::connect_with(options, config.max_connections, config.busy_timeout).await
    }

    /// Open a database file directly by path.
    pub async fn open_file(path: &Path, max_connections: u32, busy_timeout: Duration) -> Result<Self, Error> {
        let options = SqliteConnectOptions::new().filename(path);
        Self::connect_with(options, max_connections, busy_timeout).await
    }

    async fn connect_with(
        options: SqliteConnectOptions,
        max_connections: u32,
        busy_timeout: Duration,
    ) -> Result<Self, Error> {
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Relationships between tables are informational only.
        let options = options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(false)
            .busy_timeout(busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite ledger (max_connections={})", max_connections);
        Ok(Self { pool })
    }

    /// Run migrations in the `migrations/` folder.
    pub async fn migrate(&self) -> Result<(), Error> {
        info!("Applying migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations applied successfully.");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
