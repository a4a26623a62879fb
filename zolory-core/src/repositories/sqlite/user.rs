// src/repositories/sqlite/user.rs

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite, SqliteConnection};
use tracing::debug;

use crate::models::{User, UserMetric, level_for_experience};
use crate::repositories::UserRepository;
use crate::utils::bounds::add_range;
use crate::utils::time::{current_epoch, from_epoch, to_epoch};
use crate::Error;

/// One fixed statement per rankable column. `rowid` breaks ties in storage order.
macro_rules! top_users_query {
    ($column:literal) => {
        concat!(
            "SELECT user_id, username, coins, gems, level, experience, total_messages, ",
            "reputation, join_date, last_activity FROM users ORDER BY ",
            $column,
            " DESC, rowid ASC LIMIT ?1"
        )
    };
}

fn top_users_sql(metric: UserMetric) -> &'static str {
    match metric {
        UserMetric::Level => top_users_query!("level"),
        UserMetric::Coins => top_users_query!("coins"),
        UserMetric::Gems => top_users_query!("gems"),
        UserMetric::Experience => top_users_query!("experience"),
        UserMetric::Reputation => top_users_query!("reputation"),
    }
}

fn user_from_row(r: &SqliteRow) -> Result<User, Error> {
    Ok(User {
        user_id: r.try_get("user_id")?,
        username: r.try_get("username")?,
        coins: r.try_get("coins")?,
        gems: r.try_get("gems")?,
        level: r.try_get("level")?,
        experience: r.try_get("experience")?,
        total_messages: r.try_get("total_messages")?,
        reputation: r.try_get("reputation")?,
        join_date: from_epoch(r.try_get::<i64, _>("join_date")?),
        last_activity: from_epoch(r.try_get::<i64, _>("last_activity")?),
    })
}

async fn user_exists(conn: &mut SqliteConnection, user_id: i64) -> Result<bool, Error> {
    let row = sqlx::query("SELECT 1 FROM users WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: Pool<Sqlite>,
}

impl SqliteUserRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(&self, user_id: i64, username: &str) -> Result<User, Error> {
        let user = User::new(user_id, username);
        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (user_id, username, join_date, last_activity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
            .bind(user.user_id)
            .bind(&user.username)
            .bind(to_epoch(user.join_date))
            .bind(to_epoch(user.last_activity))
            .execute(&self.pool)
            .await?
            .rows_affected();

        if inserted == 0 {
            debug!("create_user: user {} already exists, leaving it untouched", user_id);
        }

        self.get_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("user {} vanished after insert", user_id)))
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, username, coins, gems, level, experience,
                   total_messages, reputation, join_date, last_activity
            FROM users
            WHERE user_id = ?1
            "#,
        )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn record_activity(&self, user_id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE users SET last_activity = ?1 WHERE user_id = ?2")
            .bind(current_epoch())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_message_count(&self, user_id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE users SET total_messages = total_messages + 1 WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_experience(&self, user_id: i64, xp: i64) -> Result<(i64, i64), Error> {
        // Experience is never negative, so only a positive xp can overflow.
        let (_, ceiling) = add_range(xp);

        // The UPDATE comes first so the write lock is held before anything is read.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE users
            SET experience = MAX(experience + ?1, 0)
            WHERE user_id = ?2 AND experience <= ?3
            RETURNING experience
            "#,
        )
            .bind(xp)
            .bind(user_id)
            .bind(ceiling)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            if user_exists(&mut tx, user_id).await? {
                return Err(Error::InvalidArgument(format!(
                    "adding {} xp would overflow the experience of user {}", xp, user_id
                )));
            }
            return Err(Error::NotFound(format!("user {}", user_id)));
        };
        let new_experience: i64 = row.try_get("experience")?;
        let new_level = level_for_experience(new_experience);

        sqlx::query("UPDATE users SET level = ?1 WHERE user_id = ?2")
            .bind(new_level)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!("add_experience: user={} xp={:+} -> level={} experience={}", user_id, xp, new_level, new_experience);
        Ok((new_level, new_experience))
    }

    async fn adjust_reputation(&self, user_id: i64, delta: i64) -> Result<(), Error> {
        let (floor, ceiling) = add_range(delta);
        let updated = sqlx::query(
            "UPDATE users SET reputation = reputation + ?1 WHERE user_id = ?2 AND reputation BETWEEN ?3 AND ?4",
        )
            .bind(delta)
            .bind(user_id)
            .bind(floor)
            .bind(ceiling)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            let mut conn = self.pool.acquire().await?;
            if user_exists(&mut conn, user_id).await? {
                return Err(Error::InvalidArgument(format!(
                    "reputation change of {} would overflow for user {}", delta, user_id
                )));
            }
        }
        Ok(())
    }

    async fn top_users(&self, metric: UserMetric, limit: i64) -> Result<Vec<User>, Error> {
        let rows = sqlx::query(top_users_sql(metric))
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(user_from_row).collect()
    }
}
