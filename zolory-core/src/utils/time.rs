use chrono::{DateTime, Utc};

/// Convert a UTC instant to epoch seconds, the storage format of every
/// timestamp column.
pub fn to_epoch(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

/// Convert epoch seconds back to a UTC instant.
/// Out-of-range values fall back to 1970-01-01.
pub fn from_epoch(epoch: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch, 0).unwrap_or_default()
}

/// Returns the current epoch seconds.
pub fn current_epoch() -> i64 {
    Utc::now().timestamp()
}
