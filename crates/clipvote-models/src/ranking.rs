//! Derived player ranking row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `player_rankings` materialized view.
///
/// `total_votes` aggregates votes over the owner's live videos and `ranking`
/// is the dense rank by `total_votes` descending; owners with equal counts
/// share a rank.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerRanking {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub city: String,
    pub country: String,
    pub total_votes: i64,
    pub ranking: i64,
    pub last_updated: DateTime<Utc>,
}
