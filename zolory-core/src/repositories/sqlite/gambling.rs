// src/repositories/sqlite/gambling.rs

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

use crate::models::{GambleOutcome, GambleRecord, GameType, GamblingStats};
use crate::repositories::GamblingRepository;
use crate::utils::time::{current_epoch, from_epoch};
use crate::Error;

#[derive(Clone)]
pub struct SqliteGamblingRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGamblingRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GamblingRepository for SqliteGamblingRepository {
    async fn record_gamble(
        &self,
        user_id: i64,
        server_id: i64,
        game_type: GameType,
        bet_amount: i64,
        winnings: i64,
        result: GambleOutcome,
    ) -> Result<i64, Error> {
        if bet_amount <= 0 {
            return Err(Error::InvalidArgument(format!("bet_amount must be positive (got {})", bet_amount)));
        }
        if winnings < 0 {
            return Err(Error::InvalidArgument(format!("winnings must not be negative (got {})", winnings)));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO gamble_records (
                user_id, server_id, game_type, bet_amount, winnings, result, timestamp
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING gamble_id
            "#,
        )
            .bind(user_id)
            .bind(server_id)
            .bind(game_type.to_string())
            .bind(bet_amount)
            .bind(winnings)
            .bind(result.to_string())
            .bind(current_epoch())
            .fetch_one(&self.pool)
            .await?;

        let gamble_id: i64 = row.try_get("gamble_id")?;
        debug!(
            "record_gamble: id={} user={} server={} {} bet={} winnings={} {}",
            gamble_id, user_id, server_id, game_type, bet_amount, winnings, result
        );
        Ok(gamble_id)
    }

    async fn gambling_stats(&self, user_id: i64, server_id: i64) -> Result<GamblingStats, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_games,
                SUM(CASE WHEN result = 'win' THEN 1 ELSE 0 END) AS wins,
                SUM(CASE WHEN result = 'lose' THEN 1 ELSE 0 END) AS losses,
                SUM(bet_amount) AS total_bet,
                SUM(winnings) AS total_winnings,
                AVG(winnings - bet_amount) AS avg_profit
            FROM gamble_records
            WHERE user_id = ?1 AND server_id = ?2
            "#,
        )
            .bind(user_id)
            .bind(server_id)
            .fetch_one(&self.pool)
            .await?;

        // SUM and AVG are NULL over zero rows.
        Ok(GamblingStats {
            total_games: row.try_get("total_games")?,
            wins: row.try_get::<Option<i64>, _>("wins")?.unwrap_or(0),
            losses: row.try_get::<Option<i64>, _>("losses")?.unwrap_or(0),
            total_bet: row.try_get::<Option<i64>, _>("total_bet")?.unwrap_or(0),
            total_winnings: row.try_get::<Option<i64>, _>("total_winnings")?.unwrap_or(0),
            avg_profit: row.try_get("avg_profit")?,
        })
    }

    async fn gambling_history(&self, user_id: i64, server_id: i64, limit: i64) -> Result<Vec<GambleRecord>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT gamble_id, user_id, server_id, game_type, bet_amount,
                   winnings, result, timestamp
            FROM gamble_records
            WHERE user_id = ?1 AND server_id = ?2
            ORDER BY timestamp DESC, gamble_id DESC
            LIMIT ?3
            "#,
        )
            .bind(user_id)
            .bind(server_id)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(GambleRecord {
                gamble_id: row.try_get("gamble_id")?,
                user_id: row.try_get("user_id")?,
                server_id: row.try_get("server_id")?,
                game_type: row.try_get::<String, _>("game_type")?.parse()?,
                bet_amount: row.try_get("bet_amount")?,
                winnings: row.try_get("winnings")?,
                result: row.try_get::<String, _>("result")?.parse()?,
                timestamp: from_epoch(row.try_get::<i64, _>("timestamp")?),
            });
        }
        Ok(results)
    }
}
