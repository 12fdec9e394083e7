use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use crate::error::{is_unique_violation, ApiError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub is_staff: bool,
    pub is_superuser: bool,
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, is_staff, \
     is_superuser, is_active, date_joined, last_login";

/// Trims the address and lower-cases the domain part.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn is_valid_email(email: &str) -> bool {
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

impl User {
    /// Inserts a user whose password has already been hashed.
    pub async fn insert(
        conn: &mut SqliteConnection,
        new: &NewUser<'_>,
        password_hash: &str,
    ) -> Result<User, ApiError> {
        let email = normalize_email(new.email);
        let now = Utc::now();
        let result = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, is_staff, is_superuser, date_joined)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.is_staff)
        .bind(new.is_superuser)
        .bind(now)
        .fetch_one(&mut *conn)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                Err(ApiError::field("email", "User with this email already exists."))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(normalize_email(email))
            .fetch_one(pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Removes the user; todos, memberships and the token go with it.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Public profile embedded in other records.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_domain_only() {
        assert_eq!(normalize_email("  Ann.Lee@Example.COM "), "Ann.Lee@example.com");
        assert_eq!(normalize_email("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@b.io"));
        assert!(!is_valid_email("missing-at.io"));
        assert!(!is_valid_email("@b.io"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("a b@c.io"));
    }
}
