use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use crate::error::Error;

/// Minimum seconds between two successful daily claims.
pub const DAILY_COOLDOWN_SECS: i64 = 24 * 3600;

/// A claim made this many seconds or more after the previous one breaks the streak.
pub const STREAK_WINDOW_SECS: i64 = 48 * 3600;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyType {
    #[default]
    Coins,
    Gems,
}

impl CurrencyType {
    /// Allow-list fallback: anything other than a known currency means coins.
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or_default()
    }
}

impl fmt::Display for CurrencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyType::Coins => write!(f, "coins"),
            CurrencyType::Gems => write!(f, "gems"),
        }
    }
}

impl FromStr for CurrencyType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coins" => Ok(CurrencyType::Coins),
            "gems" => Ok(CurrencyType::Gems),
            _ => Err(format!("Unknown currency: {}", s)),
        }
    }
}

/// One user's wallet inside one server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserBalance {
    pub user_id: i64,
    pub server_id: i64,
    pub coins: i64,
    pub gems: i64,
    pub daily_streak: i64,
    pub last_daily_claim: DateTime<Utc>,
    pub total_earned: i64,
    pub total_spent: i64,
    pub bank_balance: i64,
}

impl UserBalance {
    /// A fresh balance. `last_daily_claim` starts one cooldown in the past so
    /// the first claim is immediately eligible.
    pub fn new(user_id: i64, server_id: i64) -> Self {
        Self {
            user_id,
            server_id,
            coins: 0,
            gems: 0,
            daily_streak: 0,
            last_daily_claim: Utc::now() - Duration::seconds(DAILY_COOLDOWN_SECS),
            total_earned: 0,
            total_spent: 0,
            bank_balance: 0,
        }
    }

    pub fn amount(&self, currency: CurrencyType) -> i64 {
        match currency {
            CurrencyType::Coins => self.coins,
            CurrencyType::Gems => self.gems,
        }
    }
}

/// Result of a guarded currency removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited { remaining: i64 },
    InsufficientFunds { requested: i64, available: i64 },
}

impl DebitOutcome {
    pub fn is_debited(&self) -> bool {
        matches!(self, DebitOutcome::Debited { .. })
    }

    /// For callers that prefer `?` over matching.
    pub fn into_result(self) -> Result<i64, Error> {
        match self {
            DebitOutcome::Debited { remaining } => Ok(remaining),
            DebitOutcome::InsufficientFunds { requested, available } => {
                Err(Error::InsufficientFunds { requested, available })
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct DailyClaim {
    pub claimed: bool,
    pub streak: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub username: String,
    pub amount: i64,
}
