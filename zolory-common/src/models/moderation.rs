use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A sanction issued without a duration lasts this long.
pub const PERMANENT_SANCTION_DAYS: i64 = 365 * 100;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ModerationType {
    Warn,
    Mute,
    Kick,
    Ban,
}

impl fmt::Display for ModerationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModerationType::Warn => write!(f, "warn"),
            ModerationType::Mute => write!(f, "mute"),
            ModerationType::Kick => write!(f, "kick"),
            ModerationType::Ban => write!(f, "ban"),
        }
    }
}

impl FromStr for ModerationType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warn" => Ok(ModerationType::Warn),
            "mute" => Ok(ModerationType::Mute),
            "kick" => Ok(ModerationType::Kick),
            "ban" => Ok(ModerationType::Ban),
            _ => Err(format!("Unknown moderation type: {}", s)),
        }
    }
}

/// The two time-bounded sanctions. Each has its own table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SanctionKind {
    Mute,
    Ban,
}

impl SanctionKind {
    pub fn action(self) -> ModerationType {
        match self {
            SanctionKind::Mute => ModerationType::Mute,
            SanctionKind::Ban => ModerationType::Ban,
        }
    }
}

impl fmt::Display for SanctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.action().fmt(f)
    }
}

/// `issued_at + duration`, or `issued_at + 100 years` when permanent.
/// `None` when the expiry falls outside the representable date range.
pub fn sanction_expiry(issued_at: DateTime<Utc>, duration_minutes: Option<i64>) -> Option<DateTime<Utc>> {
    let duration = match duration_minutes {
        Some(minutes) => Duration::try_minutes(minutes)?,
        None => Duration::try_days(PERMANENT_SANCTION_DAYS)?,
    };
    issued_at.checked_add_signed(duration)
}

/// Audit-trail row written alongside every warning, mute and ban.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ModerationRecord {
    pub mod_id: i64,
    pub server_id: i64,
    pub user_id: i64,
    pub moderator_id: i64,
    pub action_type: ModerationType,
    pub reason: String,
    pub duration_minutes: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Warning {
    pub warning_id: i64,
    pub server_id: i64,
    pub user_id: i64,
    pub moderator_id: i64,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// A mute or a ban.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Sanction {
    pub sanction_id: i64,
    pub kind: SanctionKind,
    pub server_id: i64,
    pub user_id: i64,
    pub moderator_id: i64,
    pub reason: String,
    pub duration_minutes: Option<i64>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

impl Sanction {
    /// Must agree with the SQL predicates used by `is_muted`/`is_banned` and
    /// the sweeper: in force iff active and `now < expires_at`.
    pub fn is_in_force(&self, now: DateTime<Utc>) -> bool {
        self.active && now < self.expires_at
    }

    pub fn is_permanent(&self) -> bool {
        self.duration_minutes.is_none()
    }
}

/// A row of `moderation_history`, with the moderator's username resolved.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ModerationHistoryEntry {
    pub record: ModerationRecord,
    pub moderator: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct WarningEntry {
    pub warning: Warning,
    pub moderator: Option<String>,
}
