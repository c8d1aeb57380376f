//! User account model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered contest participant.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2id PHC string. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}
