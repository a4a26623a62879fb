use async_trait::async_trait;
use crate::error::Error;
use crate::models::{
    CurrencyType, DailyClaim, DatabaseStats, DebitOutcome, GambleOutcome, GambleRecord,
    GameType, GamblingStats, LeaderboardEntry, ModerationHistoryEntry, Sanction, SanctionKind,
    ServerSettingChange, ServerSettings, User, UserBalance, UserMetric, WarningEntry,
};

/// Global user identity, experience and reputation.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert-or-ignore; returns whatever row is stored afterwards.
    async fn create_user(&self, user_id: i64, username: &str) -> Result<User, Error>;
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error>;

    /// No-op when the user does not exist.
    async fn record_activity(&self, user_id: i64) -> Result<(), Error>;
    async fn increment_message_count(&self, user_id: i64) -> Result<(), Error>;

    /// Returns `(new_level, new_experience)`.
    async fn add_experience(&self, user_id: i64, xp: i64) -> Result<(i64, i64), Error>;
    async fn adjust_reputation(&self, user_id: i64, delta: i64) -> Result<(), Error>;
    async fn top_users(&self, metric: UserMetric, limit: i64) -> Result<Vec<User>, Error>;
}

#[async_trait]
pub trait ServerSettingsRepository: Send + Sync {
    async fn create_server_settings(
        &self,
        server_id: i64,
        server_name: &str,
        prefix: &str,
    ) -> Result<ServerSettings, Error>;
    async fn get_server_settings(&self, server_id: i64) -> Result<Option<ServerSettings>, Error>;
    async fn update_server_settings(
        &self,
        server_id: i64,
        changes: &[ServerSettingChange],
    ) -> Result<ServerSettings, Error>;
}

/// Per-server balances. Every mutation is atomic per (user, server).
#[async_trait]
pub trait EconomyRepository: Send + Sync {
    /// The "ensure" half of ensure-then-mutate. Idempotent.
    async fn create_user_balance(&self, user_id: i64, server_id: i64) -> Result<UserBalance, Error>;
    async fn get_user_balance(&self, user_id: i64, server_id: i64) -> Result<Option<UserBalance>, Error>;

    /// Ensures the balance row, then credits `amount` and `total_earned`.
    /// Returns the new balance of `currency`.
    async fn add_currency(
        &self,
        user_id: i64,
        server_id: i64,
        currency: CurrencyType,
        amount: i64,
    ) -> Result<i64, Error>;

    /// Debits only if the balance covers `amount`; otherwise changes nothing.
    async fn remove_currency(
        &self,
        user_id: i64,
        server_id: i64,
        currency: CurrencyType,
        amount: i64,
    ) -> Result<DebitOutcome, Error>;

    async fn claim_daily(&self, user_id: i64, server_id: i64, reward_amount: i64) -> Result<DailyClaim, Error>;

    async fn leaderboard(
        &self,
        server_id: i64,
        currency: CurrencyType,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, Error>;
}

/// Append-only gambling history. Balances are settled separately.
#[async_trait]
pub trait GamblingRepository: Send + Sync {
    async fn record_gamble(
        &self,
        user_id: i64,
        server_id: i64,
        game_type: GameType,
        bet_amount: i64,
        winnings: i64,
        result: GambleOutcome,
    ) -> Result<i64, Error>;
    async fn gambling_stats(&self, user_id: i64, server_id: i64) -> Result<GamblingStats, Error>;
    async fn gambling_history(&self, user_id: i64, server_id: i64, limit: i64) -> Result<Vec<GambleRecord>, Error>;
}

#[async_trait]
pub trait ModerationRepository: Send + Sync {
    async fn issue_warning(
        &self,
        server_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
    ) -> Result<i64, Error>;

    /// `duration_minutes = None` issues a permanent sanction.
    async fn issue_sanction(
        &self,
        kind: SanctionKind,
        server_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
        duration_minutes: Option<i64>,
    ) -> Result<i64, Error>;

    /// Deactivates every active row for (server, user). Returns rows changed.
    async fn lift_sanction(&self, kind: SanctionKind, server_id: i64, user_id: i64) -> Result<u64, Error>;

    /// Read-only: a lapsed row still marked active reports `false`.
    async fn is_sanctioned(&self, kind: SanctionKind, server_id: i64, user_id: i64) -> Result<bool, Error>;

    async fn latest_sanction(
        &self,
        kind: SanctionKind,
        server_id: i64,
        user_id: i64,
    ) -> Result<Option<Sanction>, Error>;

    /// Deactivates every lapsed row of `kind`. Idempotent.
    async fn sweep_expired(&self, kind: SanctionKind) -> Result<u64, Error>;

    async fn moderation_history(&self, server_id: i64, user_id: i64) -> Result<Vec<ModerationHistoryEntry>, Error>;
    async fn user_warnings(&self, server_id: i64, user_id: i64) -> Result<Vec<WarningEntry>, Error>;

    async fn issue_mute(
        &self,
        server_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
        duration_minutes: Option<i64>,
    ) -> Result<i64, Error> {
        self.issue_sanction(SanctionKind::Mute, server_id, user_id, moderator_id, reason, duration_minutes)
            .await
    }

    async fn issue_ban(
        &self,
        server_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
        duration_minutes: Option<i64>,
    ) -> Result<i64, Error> {
        self.issue_sanction(SanctionKind::Ban, server_id, user_id, moderator_id, reason, duration_minutes)
            .await
    }

    async fn lift_mute(&self, server_id: i64, user_id: i64) -> Result<u64, Error> {
        self.lift_sanction(SanctionKind::Mute, server_id, user_id).await
    }

    async fn lift_ban(&self, server_id: i64, user_id: i64) -> Result<u64, Error> {
        self.lift_sanction(SanctionKind::Ban, server_id, user_id).await
    }

    async fn is_muted(&self, server_id: i64, user_id: i64) -> Result<bool, Error> {
        self.is_sanctioned(SanctionKind::Mute, server_id, user_id).await
    }

    async fn is_banned(&self, server_id: i64, user_id: i64) -> Result<bool, Error> {
        self.is_sanctioned(SanctionKind::Ban, server_id, user_id).await
    }
}

/// Read-only reporting.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn database_stats(&self) -> Result<DatabaseStats, Error>;
}
