// src/repositories/sqlite/server_settings.rs

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info};

use crate::models::{ServerSettingChange, ServerSettings};
use crate::repositories::ServerSettingsRepository;
use crate::utils::time::{from_epoch, to_epoch};
use crate::Error;

const SELECT_SETTINGS_SQL: &str = r#"
    SELECT server_id, server_name, prefix, welcome_channel_id,
           moderation_channel_id, log_channel_id, auto_role_id,
           currency_name, max_level, xp_per_message, created_at
    FROM server_settings
    WHERE server_id = ?1
"#;

fn settings_from_row(r: &SqliteRow) -> Result<ServerSettings, Error> {
    Ok(ServerSettings {
        server_id: r.try_get("server_id")?,
        server_name: r.try_get("server_name")?,
        command_prefix: r.try_get("prefix")?,
        welcome_channel_id: r.try_get("welcome_channel_id")?,
        moderation_channel_id: r.try_get("moderation_channel_id")?,
        log_channel_id: r.try_get("log_channel_id")?,
        auto_role_id: r.try_get("auto_role_id")?,
        currency_name: r.try_get("currency_name")?,
        max_level: r.try_get("max_level")?,
        xp_per_message: r.try_get("xp_per_message")?,
        created_at: from_epoch(r.try_get::<i64, _>("created_at")?),
    })
}

/// Whitelisted column updates. Nothing outside this match can be written.
fn change_sql(change: &ServerSettingChange) -> &'static str {
    match change {
        ServerSettingChange::Prefix(_) => "UPDATE server_settings SET prefix = ?1 WHERE server_id = ?2",
        ServerSettingChange::WelcomeChannel(_) => "UPDATE server_settings SET welcome_channel_id = ?1 WHERE server_id = ?2",
        ServerSettingChange::ModerationChannel(_) => "UPDATE server_settings SET moderation_channel_id = ?1 WHERE server_id = ?2",
        ServerSettingChange::LogChannel(_) => "UPDATE server_settings SET log_channel_id = ?1 WHERE server_id = ?2",
        ServerSettingChange::AutoRole(_) => "UPDATE server_settings SET auto_role_id = ?1 WHERE server_id = ?2",
        ServerSettingChange::CurrencyName(_) => "UPDATE server_settings SET currency_name = ?1 WHERE server_id = ?2",
        ServerSettingChange::MaxLevel(_) => "UPDATE server_settings SET max_level = ?1 WHERE server_id = ?2",
        ServerSettingChange::XpPerMessage(_) => "UPDATE server_settings SET xp_per_message = ?1 WHERE server_id = ?2",
    }
}

#[derive(Clone)]
pub struct SqliteServerSettingsRepository {
    pool: Pool<Sqlite>,
}

impl SqliteServerSettingsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServerSettingsRepository for SqliteServerSettingsRepository {
    async fn create_server_settings(
        &self,
        server_id: i64,
        server_name: &str,
        prefix: &str,
    ) -> Result<ServerSettings, Error> {
        let settings = ServerSettings::new(server_id, server_name, prefix);
        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO server_settings (server_id, server_name, prefix, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
            .bind(settings.server_id)
            .bind(&settings.server_name)
            .bind(&settings.command_prefix)
            .bind(to_epoch(settings.created_at))
            .execute(&self.pool)
            .await?
            .rows_affected();

        if inserted > 0 {
            info!("Registered server {} ('{}')", server_id, server_name);
        }

        self.get_server_settings(server_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("server {}", server_id)))
    }

    async fn get_server_settings(&self, server_id: i64) -> Result<Option<ServerSettings>, Error> {
        let row = sqlx::query(SELECT_SETTINGS_SQL)
            .bind(server_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(settings_from_row).transpose()
    }

    async fn update_server_settings(
        &self,
        server_id: i64,
        changes: &[ServerSettingChange],
    ) -> Result<ServerSettings, Error> {
        let mut tx = self.pool.begin().await?;

        // Touch the row first: takes the write lock and detects a missing server.
        let exists = sqlx::query("UPDATE server_settings SET server_id = server_id WHERE server_id = ?1")
            .bind(server_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if exists == 0 {
            return Err(Error::NotFound(format!("server {}", server_id)));
        }

        for change in changes {
            let query = sqlx::query(change_sql(change));
            let query = match change {
                ServerSettingChange::Prefix(v) | ServerSettingChange::CurrencyName(v) => query.bind(v.clone()),
                ServerSettingChange::WelcomeChannel(v)
                | ServerSettingChange::ModerationChannel(v)
                | ServerSettingChange::LogChannel(v)
                | ServerSettingChange::AutoRole(v) => query.bind(*v),
                ServerSettingChange::MaxLevel(v) | ServerSettingChange::XpPerMessage(v) => query.bind(*v),
            };
            query.bind(server_id).execute(&mut *tx).await?;
            debug!("server {}: applied {:?}", server_id, change);
        }

        let row = sqlx::query(SELECT_SETTINGS_SQL)
            .bind(server_id)
            .fetch_one(&mut *tx)
            .await?;
        let updated = settings_from_row(&row)?;

        tx.commit().await?;
        Ok(updated)
    }
}
