// src/repositories/sqlite/stats.rs

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use crate::models::DatabaseStats;
use crate::repositories::StatsRepository;
use crate::Error;

#[derive(Clone)]
pub struct SqliteStatsRepository {
    pool: Pool<Sqlite>,
}

impl SqliteStatsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for SqliteStatsRepository {
    /// One statement, so all four counts come from the same snapshot.
    async fn database_stats(&self) -> Result<DatabaseStats, Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS total_users,
                (SELECT COUNT(*) FROM server_settings) AS total_servers,
                (SELECT COUNT(*) FROM gamble_records) AS total_gambles,
                (SELECT COUNT(*) FROM moderation_records) AS total_moderations
            "#,
        )
            .fetch_one(&self.pool)
            .await?;

        Ok(DatabaseStats {
            total_users: row.try_get("total_users")?,
            total_servers: row.try_get("total_servers")?,
            total_gambles: row.try_get("total_gambles")?,
            total_moderations: row.try_get("total_moderations")?,
        })
    }
}
