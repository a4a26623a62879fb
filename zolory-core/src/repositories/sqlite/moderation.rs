// src/repositories/sqlite/moderation.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

use crate::models::{
    ModerationHistoryEntry, ModerationRecord, ModerationType, Sanction, SanctionKind, Warning,
    WarningEntry, sanction_expiry,
};
use crate::repositories::ModerationRepository;
use crate::utils::time::{current_epoch, from_epoch, to_epoch};
use crate::Error;

/// Expands `$sql!(table, id_column)` for the table backing `kind`.
macro_rules! per_kind {
    ($kind:expr, $sql:ident) => {
        match $kind {
            SanctionKind::Mute => $sql!("mutes", "mute_id"),
            SanctionKind::Ban => $sql!("bans", "ban_id"),
        }
    };
}

macro_rules! insert_sanction_sql {
    ($table:literal, $id:literal) => {
        concat!(
            "INSERT INTO ", $table,
            " (server_id, user_id, moderator_id, reason, duration, issued_at, expires_at, active)",
            " VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1) RETURNING ", $id, " AS sanction_id"
        )
    };
}

macro_rules! lift_sql {
    ($table:literal, $id:literal) => {
        concat!(
            "UPDATE ", $table,
            " SET active = 0 WHERE server_id = ?1 AND user_id = ?2 AND active = 1"
        )
    };
}

// In force: active = 1 AND expires_at > now.
macro_rules! in_force_sql {
    ($table:literal, $id:literal) => {
        concat!(
            "SELECT EXISTS (SELECT 1 FROM ", $table,
            " WHERE server_id = ?1 AND user_id = ?2 AND active = 1 AND expires_at > ?3) AS in_force"
        )
    };
}

// Lapsed: active = 1 AND expires_at <= now. The exact complement of in force.
macro_rules! sweep_sql {
    ($table:literal, $id:literal) => {
        concat!(
            "UPDATE ", $table,
            " SET active = 0 WHERE active = 1 AND expires_at <= ?1"
        )
    };
}

macro_rules! latest_sql {
    ($table:literal, $id:literal) => {
        concat!(
            "SELECT ", $id, " AS sanction_id, server_id, user_id, moderator_id, reason, duration,",
            " issued_at, expires_at, active FROM ", $table,
            " WHERE server_id = ?1 AND user_id = ?2 ORDER BY ", $id, " DESC LIMIT 1"
        )
    };
}

const INSERT_RECORD_SQL: &str = r#"
    INSERT INTO moderation_records (
        server_id, user_id, moderator_id, action_type, reason, duration, timestamp
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

fn sanction_from_row(kind: SanctionKind, r: &SqliteRow) -> Result<Sanction, Error> {
    Ok(Sanction {
        sanction_id: r.try_get("sanction_id")?,
        kind,
        server_id: r.try_get("server_id")?,
        user_id: r.try_get("user_id")?,
        moderator_id: r.try_get("moderator_id")?,
        reason: r.try_get("reason")?,
        duration_minutes: r.try_get("duration")?,
        issued_at: from_epoch(r.try_get::<i64, _>("issued_at")?),
        expires_at: from_epoch(r.try_get::<i64, _>("expires_at")?),
        active: r.try_get("active")?,
    })
}

#[derive(Clone)]
pub struct SqliteModerationRepository {
    pool: Pool<Sqlite>,
}

impl SqliteModerationRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ModerationRepository for SqliteModerationRepository {
    async fn issue_warning(
        &self,
        server_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
    ) -> Result<i64, Error> {
        let now = current_epoch();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO warnings (server_id, user_id, moderator_id, reason, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING warning_id
            "#,
        )
            .bind(server_id)
            .bind(user_id)
            .bind(moderator_id)
            .bind(reason)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;
        let warning_id: i64 = row.try_get("warning_id")?;

        sqlx::query(INSERT_RECORD_SQL)
            .bind(server_id)
            .bind(user_id)
            .bind(moderator_id)
            .bind(ModerationType::Warn.to_string())
            .bind(reason)
            .bind(None::<i64>)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Warning {} issued to user {} in server {} by {}", warning_id, user_id, server_id, moderator_id);
        Ok(warning_id)
    }

    async fn issue_sanction(
        &self,
        kind: SanctionKind,
        server_id: i64,
        user_id: i64,
        moderator_id: i64,
        reason: &str,
        duration_minutes: Option<i64>,
    ) -> Result<i64, Error> {
        if let Some(minutes) = duration_minutes {
            if minutes <= 0 {
                return Err(Error::InvalidArgument(format!("{} duration must be positive (got {})", kind, minutes)));
            }
        }

        let issued_at = Utc::now();
        let Some(expires_at) = sanction_expiry(issued_at, duration_minutes) else {
            return Err(Error::InvalidArgument(format!(
                "{} duration of {:?} minutes is out of range",
                kind, duration_minutes
            )));
        };
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(per_kind!(kind, insert_sanction_sql))
            .bind(server_id)
            .bind(user_id)
            .bind(moderator_id)
            .bind(reason)
            .bind(duration_minutes)
            .bind(to_epoch(issued_at))
            .bind(to_epoch(expires_at))
            .fetch_one(&mut *tx)
            .await?;
        let sanction_id: i64 = row.try_get("sanction_id")?;

        sqlx::query(INSERT_RECORD_SQL)
            .bind(server_id)
            .bind(user_id)
            .bind(moderator_id)
            .bind(kind.action().to_string())
            .bind(reason)
            .bind(duration_minutes)
            .bind(to_epoch(issued_at))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        match duration_minutes {
            Some(minutes) => info!(
                "{} {} issued to user {} in server {} by {} for {} minutes",
                kind, sanction_id, user_id, server_id, moderator_id, minutes
            ),
            None => info!(
                "{} {} issued to user {} in server {} by {} (permanent)",
                kind, sanction_id, user_id, server_id, moderator_id
            ),
        }
        Ok(sanction_id)
    }

    async fn lift_sanction(&self, kind: SanctionKind, server_id: i64, user_id: i64) -> Result<u64, Error> {
        let lifted = sqlx::query(per_kind!(kind, lift_sql))
            .bind(server_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if lifted > 0 {
            info!("Lifted {} {}(s) for user {} in server {}", lifted, kind, user_id, server_id);
        } else {
            debug!("lift_{}: nothing active for user {} in server {}", kind, user_id, server_id);
        }
        Ok(lifted)
    }

    async fn is_sanctioned(&self, kind: SanctionKind, server_id: i64, user_id: i64) -> Result<bool, Error> {
        let row = sqlx::query(per_kind!(kind, in_force_sql))
            .bind(server_id)
            .bind(user_id)
            .bind(current_epoch())
            .fetch_one(&self.pool)
            .await?;

        let in_force: i64 = row.try_get("in_force")?;
        Ok(in_force != 0)
    }

    async fn latest_sanction(
        &self,
        kind: SanctionKind,
        server_id: i64,
        user_id: i64,
    ) -> Result<Option<Sanction>, Error> {
        let row = sqlx::query(per_kind!(kind, latest_sql))
            .bind(server_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| sanction_from_row(kind, &r)).transpose()
    }

    async fn sweep_expired(&self, kind: SanctionKind) -> Result<u64, Error> {
        let swept = sqlx::query(per_kind!(kind, sweep_sql))
            .bind(current_epoch())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if swept > 0 {
            info!("Deactivated {} expired {}(s)", swept, kind);
        }
        Ok(swept)
    }

    async fn moderation_history(&self, server_id: i64, user_id: i64) -> Result<Vec<ModerationHistoryEntry>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT mr.mod_id, mr.server_id, mr.user_id, mr.moderator_id, mr.action_type,
                   mr.reason, mr.duration, mr.timestamp, u.username AS moderator_name
            FROM moderation_records mr
            LEFT JOIN users u ON mr.moderator_id = u.user_id
            WHERE mr.server_id = ?1 AND mr.user_id = ?2
            ORDER BY mr.timestamp DESC, mr.mod_id DESC
            "#,
        )
            .bind(server_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(ModerationHistoryEntry {
                record: ModerationRecord {
                    mod_id: row.try_get("mod_id")?,
                    server_id: row.try_get("server_id")?,
                    user_id: row.try_get("user_id")?,
                    moderator_id: row.try_get("moderator_id")?,
                    action_type: row.try_get::<String, _>("action_type")?.parse()?,
                    reason: row.try_get("reason")?,
                    duration_minutes: row.try_get("duration")?,
                    timestamp: from_epoch(row.try_get::<i64, _>("timestamp")?),
                },
                moderator: row.try_get("moderator_name")?,
            });
        }
        Ok(results)
    }

    async fn user_warnings(&self, server_id: i64, user_id: i64) -> Result<Vec<WarningEntry>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT w.warning_id, w.server_id, w.user_id, w.moderator_id, w.reason,
                   w.timestamp, u.username AS moderator_name
            FROM warnings w
            LEFT JOIN users u ON w.moderator_id = u.user_id
            WHERE w.server_id = ?1 AND w.user_id = ?2
            ORDER BY w.timestamp DESC, w.warning_id DESC
            "#,
        )
            .bind(server_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(WarningEntry {
                warning: Warning {
                    warning_id: row.try_get("warning_id")?,
                    server_id: row.try_get("server_id")?,
                    user_id: row.try_get("user_id")?,
                    moderator_id: row.try_get("moderator_id")?,
                    reason: row.try_get("reason")?,
                    timestamp: from_epoch(row.try_get::<i64, _>("timestamp")?),
                },
                moderator: row.try_get("moderator_name")?,
            });
        }
        Ok(results)
    }
}
