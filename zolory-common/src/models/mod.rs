// File: zolory-common/src/models/mod.rs
pub mod user;
pub mod server;
pub mod economy;
pub mod gamble;
pub mod moderation;
pub mod stats;

pub use user::{User, UserMetric, level_for_experience};
pub use server::{ServerSettings, ServerSettingChange};
pub use economy::{CurrencyType, DailyClaim, DebitOutcome, LeaderboardEntry, UserBalance};
pub use gamble::{GambleOutcome, GambleRecord, GameType, GamblingStats};
pub use moderation::{
    ModerationHistoryEntry, ModerationRecord, ModerationType, Sanction, SanctionKind,
    Warning, WarningEntry, sanction_expiry,
};
pub use stats::DatabaseStats;
