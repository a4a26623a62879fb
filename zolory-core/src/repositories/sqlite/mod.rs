pub mod economy;
pub mod gambling;
pub mod moderation;
pub mod server_settings;
pub mod stats;
pub mod user;

pub use economy::SqliteEconomyRepository;
pub use gambling::SqliteGamblingRepository;
pub use moderation::SqliteModerationRepository;
pub use server_settings::SqliteServerSettingsRepository;
pub use stats::SqliteStatsRepository;
pub use user::SqliteUserRepository;
