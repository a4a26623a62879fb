use serde::{Deserialize, Serialize};

/// Row counts across the whole store.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub struct DatabaseStats {
    pub total_users: i64,
    pub total_servers: i64,
    pub total_gambles: i64,
    pub total_moderations: i64,
}
