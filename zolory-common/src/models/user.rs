use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Experience needed to advance one level.
pub const XP_PER_LEVEL: i64 = 1000;

/// `level = 1 + floor(experience / 1000)`. Negative experience is treated as 0.
pub fn level_for_experience(experience: i64) -> i64 {
    1 + experience.max(0).div_euclid(XP_PER_LEVEL)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub coins: i64,
    pub gems: i64,
    pub level: i64,
    pub experience: i64,
    pub total_messages: i64,
    pub reputation: i64,
    pub join_date: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: i64, username: &str) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            username: username.to_string(),
            coins: 0,
            gems: 0,
            level: 1,
            experience: 0,
            total_messages: 0,
            reputation: 0,
            join_date: now,
            last_activity: now,
        }
    }
}

/// Columns `top_users` may rank by.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserMetric {
    #[default]
    Level,
    Coins,
    Gems,
    Experience,
    Reputation,
}

impl UserMetric {
    /// Allow-list fallback: anything outside the known metrics ranks by level.
    pub fn from_selector(selector: &str) -> Self {
        selector.parse().unwrap_or_default()
    }
}

impl fmt::Display for UserMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserMetric::Level => write!(f, "level"),
            UserMetric::Coins => write!(f, "coins"),
            UserMetric::Gems => write!(f, "gems"),
            UserMetric::Experience => write!(f, "experience"),
            UserMetric::Reputation => write!(f, "reputation"),
        }
    }
}

impl FromStr for UserMetric {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "level" => Ok(UserMetric::Level),
            "coins" => Ok(UserMetric::Coins),
            "gems" => Ok(UserMetric::Gems),
            "experience" => Ok(UserMetric::Experience),
            "reputation" => Ok(UserMetric::Reputation),
            _ => Err(format!("Unknown user metric: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_experience(0), 1);
        assert_eq!(level_for_experience(999), 1);
        assert_eq!(level_for_experience(1000), 2);
        assert_eq!(level_for_experience(1500), 2);
        assert_eq!(level_for_experience(900), 1);
        assert_eq!(level_for_experience(-250), 1);
    }

    #[test]
    fn test_metric_selector_falls_back_to_level() {
        assert_eq!(UserMetric::from_selector("coins"), UserMetric::Coins);
        assert_eq!(UserMetric::from_selector("Reputation"), UserMetric::Reputation);
        assert_eq!(UserMetric::from_selector("DROP TABLE"), UserMetric::Level);
        assert_eq!(UserMetric::from_selector("level; --"), UserMetric::Level);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(42, "zed");
        assert_eq!(user.level, 1);
        assert_eq!(user.experience, 0);
        assert_eq!(user.join_date, user.last_activity);
    }
}
