use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::user::User;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created: DateTime<Utc>,
}

fn generate_key() -> String {
    Uuid::new_v4().simple().to_string()
}

impl AuthToken {
    pub async fn create(conn: &mut SqliteConnection, user_id: i64) -> Result<AuthToken, sqlx::Error> {
        sqlx::query_as::<_, AuthToken>(
            "INSERT INTO auth_tokens (key, user_id, created) VALUES (?, ?, ?)
             RETURNING key, user_id, created",
        )
        .bind(generate_key())
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
    }

    /// Returns the user's existing token, issuing one if there is none.
    pub async fn get_or_create(pool: &SqlitePool, user_id: i64) -> Result<AuthToken, sqlx::Error> {
        // A no-op update on conflict makes RETURNING yield the existing row.
        sqlx::query_as::<_, AuthToken>(
            "INSERT INTO auth_tokens (key, user_id, created) VALUES (?, ?, ?)
             ON CONFLICT (user_id) DO UPDATE SET key = key
             RETURNING key, user_id, created",
        )
        .bind(generate_key())
        .bind(user_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    /// Resolves a token key to its active owner.
    pub async fn find_user(pool: &SqlitePool, key: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.first_name, u.last_name, u.is_staff,
                    u.is_superuser, u.is_active, u.date_joined, u.last_login
             FROM auth_tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.key = ? AND u.is_active = 1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_for_user(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM auth_tokens").execute(pool).await?;
        Ok(result.rows_affected())
    }
}
