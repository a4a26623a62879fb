// src/repositories/sqlite/economy.rs

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use tracing::debug;

use crate::models::economy::{DAILY_COOLDOWN_SECS, STREAK_WINDOW_SECS};
use crate::models::{CurrencyType, DailyClaim, DebitOutcome, LeaderboardEntry, UserBalance};
use crate::repositories::EconomyRepository;
use crate::utils::bounds::add_range;
use crate::utils::time::{current_epoch, from_epoch, to_epoch};
use crate::Error;

const ENSURE_BALANCE_SQL: &str = r#"
    INSERT OR IGNORE INTO user_balance (user_id, server_id, last_daily_claim)
    VALUES (?1, ?2, ?3)
"#;

fn credit_sql(currency: CurrencyType) -> &'static str {
    match currency {
        CurrencyType::Coins => r#"
            UPDATE user_balance
            SET coins = coins + ?1, total_earned = total_earned + ?1
            WHERE user_id = ?2 AND server_id = ?3
              AND coins <= ?4 AND total_earned <= ?4
            RETURNING coins AS amount
        "#,
        CurrencyType::Gems => r#"
            UPDATE user_balance
            SET gems = gems + ?1, total_earned = total_earned + ?1
            WHERE user_id = ?2 AND server_id = ?3
              AND gems <= ?4 AND total_earned <= ?4
            RETURNING gems AS amount
        "#,
    }
}

/// The balance guard lives in the WHERE clause so check and debit are one statement.
/// `?4` caps `total_spent` so the running total cannot overflow.
fn debit_sql(currency: CurrencyType) -> &'static str {
    match currency {
        CurrencyType::Coins => r#"
            UPDATE user_balance
            SET coins = coins - ?1, total_spent = total_spent + ?1
            WHERE user_id = ?2 AND server_id = ?3 AND coins >= ?1 AND total_spent <= ?4
            RETURNING coins AS amount
        "#,
        CurrencyType::Gems => r#"
            UPDATE user_balance
            SET gems = gems - ?1, total_spent = total_spent + ?1
            WHERE user_id = ?2 AND server_id = ?3 AND gems >= ?1 AND total_spent <= ?4
            RETURNING gems AS amount
        "#,
    }
}

fn leaderboard_sql(currency: CurrencyType) -> &'static str {
    match currency {
        CurrencyType::Coins => r#"
            SELECT u.user_id, u.username, ub.coins AS amount
            FROM user_balance ub
            JOIN users u ON ub.user_id = u.user_id
            WHERE ub.server_id = ?1
            ORDER BY ub.coins DESC, ub.balance_id ASC
            LIMIT ?2
        "#,
        CurrencyType::Gems => r#"
            SELECT u.user_id, u.username, ub.gems AS amount
            FROM user_balance ub
            JOIN users u ON ub.user_id = u.user_id
            WHERE ub.server_id = ?1
            ORDER BY ub.gems DESC, ub.balance_id ASC
            LIMIT ?2
        "#,
    }
}

fn balance_from_row(r: &SqliteRow) -> Result<UserBalance, Error> {
    Ok(UserBalance {
        user_id: r.try_get("user_id")?,
        server_id: r.try_get("server_id")?,
        coins: r.try_get("coins")?,
        gems: r.try_get("gems")?,
        daily_streak: r.try_get("daily_streak")?,
        last_daily_claim: from_epoch(r.try_get::<i64, _>("last_daily_claim")?),
        total_earned: r.try_get("total_earned")?,
        total_spent: r.try_get("total_spent")?,
        bank_balance: r.try_get("bank_balance")?,
    })
}

fn require_non_negative(what: &str, amount: i64) -> Result<(), Error> {
    if amount < 0 {
        return Err(Error::InvalidArgument(format!("{} must not be negative (got {})", what, amount)));
    }
    Ok(())
}

fn overflow(what: &str, amount: i64, user_id: i64, server_id: i64) -> Error {
    Error::InvalidArgument(format!(
        "{} of {} would overflow the balance of user {} in server {}",
        what, amount, user_id, server_id
    ))
}

/// Inserts a fresh balance row if none exists for (user, server).
async fn ensure_balance(conn: &mut SqliteConnection, user_id: i64, server_id: i64) -> Result<bool, Error> {
    let fresh = UserBalance::new(user_id, server_id);
    let inserted = sqlx::query(ENSURE_BALANCE_SQL)
        .bind(user_id)
        .bind(server_id)
        .bind(to_epoch(fresh.last_daily_claim))
        .execute(conn)
        .await?
        .rows_affected();
    Ok(inserted > 0)
}

#[derive(Clone)]
pub struct SqliteEconomyRepository {
    pool: Pool<Sqlite>,
}

impl SqliteEconomyRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EconomyRepository for SqliteEconomyRepository {
    async fn create_user_balance(&self, user_id: i64, server_id: i64) -> Result<UserBalance, Error> {
        let mut conn = self.pool.acquire().await?;
        if ensure_balance(&mut conn, user_id, server_id).await? {
            debug!("Created balance row for user={} server={}", user_id, server_id);
        }
        drop(conn);

        self.get_user_balance(user_id, server_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("balance for user {} in server {}", user_id, server_id)))
    }

    async fn get_user_balance(&self, user_id: i64, server_id: i64) -> Result<Option<UserBalance>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, server_id, coins, gems, daily_streak, last_daily_claim,
                   total_earned, total_spent, bank_balance
            FROM user_balance
            WHERE user_id = ?1 AND server_id = ?2
            "#,
        )
            .bind(user_id)
            .bind(server_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(balance_from_row).transpose()
    }

    async fn add_currency(
        &self,
        user_id: i64,
        server_id: i64,
        currency: CurrencyType,
        amount: i64,
    ) -> Result<i64, Error> {
        require_non_negative("amount", amount)?;

        let (_, ceiling) = add_range(amount);
        let mut tx = self.pool.begin().await?;
        ensure_balance(&mut tx, user_id, server_id).await?;

        // The row exists, so no row back means the ceiling guard refused it.
        let Some(row) = sqlx::query(credit_sql(currency))
            .bind(amount)
            .bind(user_id)
            .bind(server_id)
            .bind(ceiling)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Err(overflow("credit", amount, user_id, server_id));
        };
        let new_amount: i64 = row.try_get("amount")?;

        tx.commit().await?;
        debug!("add_currency: user={} server={} +{} {} -> {}", user_id, server_id, amount, currency, new_amount);
        Ok(new_amount)
    }

    async fn remove_currency(
        &self,
        user_id: i64,
        server_id: i64,
        currency: CurrencyType,
        amount: i64,
    ) -> Result<DebitOutcome, Error> {
        require_non_negative("amount", amount)?;

        let (_, ceiling) = add_range(amount);
        let debited = sqlx::query(debit_sql(currency))
            .bind(amount)
            .bind(user_id)
            .bind(server_id)
            .bind(ceiling)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = debited {
            let remaining: i64 = row.try_get("amount")?;
            debug!("remove_currency: user={} server={} -{} {} -> {}", user_id, server_id, amount, currency, remaining);
            return Ok(DebitOutcome::Debited { remaining });
        }

        // Nothing changed; report what was there for the caller's message.
        let Some(balance) = self.get_user_balance(user_id, server_id).await? else {
            return Ok(DebitOutcome::InsufficientFunds { requested: amount, available: 0 });
        };
        // total_spent only grows, so a refusal on its cap is still valid now.
        if balance.total_spent > ceiling {
            return Err(overflow("debit", amount, user_id, server_id));
        }
        Ok(DebitOutcome::InsufficientFunds { requested: amount, available: balance.amount(currency) })
    }

    async fn claim_daily(&self, user_id: i64, server_id: i64, reward_amount: i64) -> Result<DailyClaim, Error> {
        require_non_negative("reward_amount", reward_amount)?;
        let (_, ceiling) = add_range(reward_amount);
        let now = current_epoch();

        // Cooldown check, streak decision and credit in a single statement, so
        // two concurrent claims cannot both see the old last_daily_claim.
        let claimed = sqlx::query(
            r#"
            UPDATE user_balance
            SET daily_streak = CASE
                    WHEN ?1 - last_daily_claim < ?2 THEN daily_streak + 1
                    ELSE 1
                END,
                coins = coins + ?3,
                total_earned = total_earned + ?3,
                last_daily_claim = ?1
            WHERE user_id = ?4 AND server_id = ?5
              AND ?1 - last_daily_claim >= ?6
              AND coins <= ?7 AND total_earned <= ?7
            RETURNING daily_streak
            "#,
        )
            .bind(now)
            .bind(STREAK_WINDOW_SECS)
            .bind(reward_amount)
            .bind(user_id)
            .bind(server_id)
            .bind(DAILY_COOLDOWN_SECS)
            .bind(ceiling)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = claimed {
            let streak: i64 = row.try_get("daily_streak")?;
            debug!("claim_daily: user={} server={} +{} coins, streak={}", user_id, server_id, reward_amount, streak);
            return Ok(DailyClaim { claimed: true, streak });
        }

        let Some(balance) = self.get_user_balance(user_id, server_id).await? else {
            return Err(Error::NotFound(format!("balance for user {} in server {}", user_id, server_id)));
        };
        let on_cooldown = now - to_epoch(balance.last_daily_claim) < DAILY_COOLDOWN_SECS;
        if !on_cooldown && (balance.coins > ceiling || balance.total_earned > ceiling) {
            return Err(overflow("daily reward", reward_amount, user_id, server_id));
        }
        debug!("claim_daily: user={} server={} still on cooldown", user_id, server_id);
        Ok(DailyClaim { claimed: false, streak: balance.daily_streak })
    }

    async fn leaderboard(
        &self,
        server_id: i64,
        currency: CurrencyType,
        limit: i64,
    ) -> Result<Vec<LeaderboardEntry>, Error> {
        // SQLite treats a negative LIMIT as "no limit".
        let rows = sqlx::query(leaderboard_sql(currency))
            .bind(server_id)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(LeaderboardEntry {
                user_id: row.try_get("user_id")?,
                username: row.try_get("username")?,
                amount: row.try_get("amount")?,
            });
        }
        Ok(results)
    }
}
