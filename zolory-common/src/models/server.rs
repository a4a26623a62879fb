use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFIX: &str = "!";

/// Per-server configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub server_id: i64,
    pub server_name: String,
    pub command_prefix: String,
    pub welcome_channel_id: Option<i64>,
    pub moderation_channel_id: Option<i64>,
    pub log_channel_id: Option<i64>,
    pub auto_role_id: Option<i64>,
    pub currency_name: String,
    pub max_level: i64,
    pub xp_per_message: i64,
    pub created_at: DateTime<Utc>,
}

impl ServerSettings {
    pub fn new(server_id: i64, server_name: &str, command_prefix: &str) -> Self {
        Self {
            server_id,
            server_name: server_name.to_string(),
            command_prefix: command_prefix.to_string(),
            welcome_channel_id: None,
            moderation_channel_id: None,
            log_channel_id: None,
            auto_role_id: None,
            currency_name: "coins".to_string(),
            max_level: 100,
            xp_per_message: 10,
            created_at: Utc::now(),
        }
    }
}

/// The only fields of `ServerSettings` that may change after creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ServerSettingChange {
    Prefix(String),
    WelcomeChannel(Option<i64>),
    ModerationChannel(Option<i64>),
    LogChannel(Option<i64>),
    AutoRole(Option<i64>),
    CurrencyName(String),
    MaxLevel(i64),
    XpPerMessage(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_wire_format() {
        let change = ServerSettingChange::WelcomeChannel(Some(5));
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(json, r#"{"field":"welcome_channel","value":5}"#);
        let back: ServerSettingChange = serde_json::from_str(&json).unwrap();
        assert_eq!(back, change);
    }
}
