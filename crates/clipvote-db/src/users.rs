//! Repository for the `users` table.

use clipvote_models::User;
use sqlx::PgPool;

/// Column list for user queries.
const USER_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, city, country, created_at";

/// User account persistence.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. Fails with a unique violation on a duplicate email.
    pub async fn create(
        pool: &PgPool,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
        city: &str,
        country: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, city, country)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(first_name)
            .bind(last_name)
            .bind(email)
            .bind(password_hash)
            .bind(city)
            .bind(country)
            .fetch_one(pool)
            .await
    }

    /// Whether an email address is already registered.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Look up a user by email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Look up a user by id.
    pub async fn find_by_id(pool: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
