// src/repositories/mod.rs

pub use zolory_common::traits::{
    EconomyRepository, GamblingRepository, ModerationRepository, ServerSettingsRepository,
    StatsRepository, UserRepository,
};

pub use sqlite::{
    SqliteEconomyRepository, SqliteGamblingRepository, SqliteModerationRepository,
    SqliteServerSettingsRepository, SqliteStatsRepository, SqliteUserRepository,
};

pub mod sqlite;
