// src/lib.rs

pub mod config;
pub mod db;
pub mod repositories;
pub mod tasks;
pub mod test_utils;
pub mod utils;

pub use config::LedgerConfig;
pub use db::Database;
pub use zolory_common::error::Error;
pub use zolory_common::models;

use repositories::{
    SqliteEconomyRepository, SqliteGamblingRepository, SqliteModerationRepository,
    SqliteServerSettingsRepository, SqliteStatsRepository, SqliteUserRepository,
};

/// Every repository over one shared pool.
#[derive(Clone)]
pub struct Ledger {
    pub users: SqliteUserRepository,
    pub servers: SqliteServerSettingsRepository,
    pub economy: SqliteEconomyRepository,
    pub gambling: SqliteGamblingRepository,
    pub moderation: SqliteModerationRepository,
    pub stats: SqliteStatsRepository,
}

impl Ledger {
    pub fn new(db: &Database) -> Self {
        let pool = db.pool().clone();
        Self {
            users: SqliteUserRepository::new(pool.clone()),
            servers: SqliteServerSettingsRepository::new(pool.clone()),
            economy: SqliteEconomyRepository::new(pool.clone()),
            gambling: SqliteGamblingRepository::new(pool.clone()),
            moderation: SqliteModerationRepository::new(pool.clone()),
            stats: SqliteStatsRepository::new(pool),
        }
    }
}
