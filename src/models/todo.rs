use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

pub const STATUS_TODO: &str = "To Do";
pub const STATUS_DONE: &str = "Done";

pub fn status_label(done: bool) -> &'static str {
    if done {
        STATUS_DONE
    } else {
        STATUS_TODO
    }
}

/// A todo joined with the profile of the user who owns it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub done: bool,
    pub date_created: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Partial write; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct TodoChanges<'a> {
    pub name: Option<&'a str>,
    pub done: Option<bool>,
}

const TODO_SELECT: &str = "SELECT t.id, t.name, t.done, t.date_created, t.date_completed, t.user_id,
            u.first_name, u.last_name, u.email
     FROM todos t
     JOIN users u ON u.id = t.user_id";

impl Todo {
    pub fn status(&self) -> &'static str {
        status_label(self.done)
    }

    pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!("{} WHERE t.user_id = ? ORDER BY t.id", TODO_SELECT))
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!("{} ORDER BY t.id", TODO_SELECT))
            .fetch_all(pool)
            .await
    }

    /// Done todos created in `[from, until)`.
    pub async fn list_completed_between(
        pool: &SqlitePool,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!(
            "{} WHERE t.done = 1 AND t.date_created >= ? AND t.date_created < ? ORDER BY t.date_created, t.id",
            TODO_SELECT
        ))
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    pub async fn find_for_user(
        pool: &SqlitePool,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as::<_, Todo>(&format!("{} WHERE t.id = ? AND t.user_id = ?", TODO_SELECT))
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        name: &str,
        done: bool,
    ) -> Result<Todo, sqlx::Error> {
        let now = Utc::now();
        let completed = if done { Some(now) } else { None };
        let result = sqlx::query(
            "INSERT INTO todos (name, done, date_created, date_completed, user_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(done)
        .bind(now)
        .bind(completed)
        .bind(user_id)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        Self::find_for_user(pool, id, user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Applies `changes` to the caller's todo. Flipping `done` stamps or
    /// clears `date_completed`. Returns `None` when the row is not theirs.
    pub async fn update_for_user(
        pool: &SqlitePool,
        id: i64,
        user_id: i64,
        changes: &TodoChanges<'_>,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE todos SET
                name = COALESCE(?, name),
                date_completed = CASE
                    WHEN ? IS NULL THEN date_completed
                    WHEN ? = 1 AND done = 0 THEN ?
                    WHEN ? = 1 THEN date_completed
                    ELSE NULL
                END,
                done = COALESCE(?, done)
             WHERE id = ? AND user_id = ?",
        )
        .bind(changes.name)
        .bind(changes.done)
        .bind(changes.done)
        .bind(Utc::now())
        .bind(changes.done)
        .bind(changes.done)
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_for_user(pool, id, user_id).await
    }

    pub async fn delete_for_user(pool: &SqlitePool, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
