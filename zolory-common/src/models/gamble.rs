use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Slots,
    Dice,
    Flip,
    Roulette,
    Blackjack,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Slots => write!(f, "slots"),
            GameType::Dice => write!(f, "dice"),
            GameType::Flip => write!(f, "flip"),
            GameType::Roulette => write!(f, "roulette"),
            GameType::Blackjack => write!(f, "blackjack"),
        }
    }
}

impl FromStr for GameType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slots" => Ok(GameType::Slots),
            "dice" => Ok(GameType::Dice),
            "flip" => Ok(GameType::Flip),
            "roulette" => Ok(GameType::Roulette),
            "blackjack" => Ok(GameType::Blackjack),
            _ => Err(format!("Unknown game type: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GambleOutcome {
    Win,
    Lose,
}

impl fmt::Display for GambleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GambleOutcome::Win => write!(f, "win"),
            GambleOutcome::Lose => write!(f, "lose"),
        }
    }
}

impl FromStr for GambleOutcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "win" => Ok(GambleOutcome::Win),
            "lose" => Ok(GambleOutcome::Lose),
            _ => Err(format!("Unknown gamble result: {}", s)),
        }
    }
}

/// One settled game. Rows are never updated after insert.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GambleRecord {
    pub gamble_id: i64,
    pub user_id: i64,
    pub server_id: i64,
    pub game_type: GameType,
    pub bet_amount: i64,
    pub winnings: i64,
    pub result: GambleOutcome,
    pub timestamp: DateTime<Utc>,
}

/// Aggregates over a user's games in one server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct GamblingStats {
    pub total_games: i64,
    pub wins: i64,
    pub losses: i64,
    pub total_bet: i64,
    pub total_winnings: i64,
    /// Mean of `winnings - bet_amount`; `None` when no games were played.
    pub avg_profit: Option<f64>,
}

impl GamblingStats {
    pub fn net_profit(&self) -> i64 {
        self.total_winnings - self.total_bet
    }
}
