use serde::{Serialize, Serializer};
use sqlx::{FromRow, SqlitePool};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum ProjectStatus {
    NotStarted = 0,
    InProgress = 1,
    Completed = 2,
}

impl ProjectStatus {
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "To be started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::NotStarted
    }
}

impl TryFrom<i64> for ProjectStatus {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ProjectStatus::NotStarted),
            1 => Ok(ProjectStatus::InProgress),
            2 => Ok(ProjectStatus::Completed),
            other => Err(other),
        }
    }
}

// Rendered as its label, e.g. "In Progress"
impl Serialize for ProjectStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub max_members: i64,
    pub status: ProjectStatus,
}

#[derive(Debug, Default)]
pub struct ProjectChanges<'a> {
    pub name: Option<&'a str>,
    pub max_members: Option<i64>,
    pub status: Option<ProjectStatus>,
}

impl Project {
    pub async fn create(
        pool: &SqlitePool,
        name: &str,
        max_members: i64,
        status: ProjectStatus,
    ) -> Result<Project, sqlx::Error> {
        sqlx::query_as::<_, Project>(
            "INSERT INTO projects (name, max_members, status) VALUES (?, ?, ?)
             RETURNING id, name, max_members, status",
        )
        .bind(name)
        .bind(max_members)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Project>, sqlx::Error> {
        sqlx::query_as::<_, Project>("SELECT id, name, max_members, status FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Applies `changes`; `max_members` may not drop below the current roster size.
    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        changes: &ProjectChanges<'_>,
    ) -> Result<Project, ApiError> {
        let updated = sqlx::query_as::<_, Project>(
            "UPDATE projects SET
                name = COALESCE(?, name),
                max_members = COALESCE(?, max_members),
                status = COALESCE(?, status)
             WHERE id = ?
               AND (SELECT COUNT(*) FROM project_members WHERE project_id = projects.id)
                   <= COALESCE(?, max_members)
             RETURNING id, name, max_members, status",
        )
        .bind(changes.name)
        .bind(changes.max_members)
        .bind(changes.status)
        .bind(id)
        .bind(changes.max_members)
        .fetch_optional(pool)
        .await?;

        if let Some(project) = updated {
            return Ok(project);
        }
        match Project::find_by_id(pool, id).await? {
            Some(_) => Err(ApiError::field(
                "max_members",
                "Ensure this value is not less than the current number of members.",
            )),
            None => Err(ApiError::NotFound("Project not found.".into())),
        }
    }

    /// Deletes the project and, through the foreign key, its roster.
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
