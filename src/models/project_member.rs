use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{is_unique_violation, ApiError};

use super::project::Project;
use super::user::User;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProjectMember {
    pub id: i64,
    pub project_id: i64,
    pub member_id: i64,
}

impl ProjectMember {
    /// Adds `member_id` to the project roster. Both rows must exist, the pair
    /// must be new, and the roster must have room under `max_members`.
    pub async fn add(pool: &SqlitePool, project_id: i64, member_id: i64) -> Result<ProjectMember, ApiError> {
        let project = Project::find_by_id(pool, project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Project not found.".into()))?;
        if User::find_by_id(pool, member_id).await?.is_none() {
            return Err(ApiError::NotFound("User not found.".into()));
        }

        // Capacity check and insert run as a single statement.
        let result = sqlx::query_as::<_, ProjectMember>(
            "INSERT INTO project_members (project_id, member_id)
             SELECT ?, ?
             WHERE (SELECT COUNT(*) FROM project_members WHERE project_id = ?) < ?
             RETURNING id, project_id, member_id",
        )
        .bind(project_id)
        .bind(member_id)
        .bind(project_id)
        .bind(project.max_members)
        .fetch_optional(pool)
        .await;

        match result {
            Ok(Some(member)) => Ok(member),
            Ok(None) => Err(ApiError::field(
                "member",
                format!("Project already has the maximum of {} members.", project.max_members),
            )),
            Err(e) if is_unique_violation(&e) => Err(ApiError::field(
                "non_field_errors",
                "The fields project, member must make a unique set.",
            )),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove(pool: &SqlitePool, project_id: i64, member_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_members WHERE project_id = ? AND member_id = ?")
            .bind(project_id)
            .bind(member_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_project(pool: &SqlitePool, project_id: i64) -> Result<Vec<ProjectMember>, sqlx::Error> {
        sqlx::query_as::<_, ProjectMember>(
            "SELECT id, project_id, member_id FROM project_members WHERE project_id = ? ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }
}
