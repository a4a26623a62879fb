pub mod repository_traits;

pub use repository_traits::{
    EconomyRepository, GamblingRepository, ModerationRepository, ServerSettingsRepository,
    StatsRepository, UserRepository,
};
