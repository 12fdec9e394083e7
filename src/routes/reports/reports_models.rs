use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::project::ProjectStatus;

// structs
#[derive(Serialize, FromRow)]
pub struct UserStats {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub completed_count: i64,
    pub pending_count: i64,
}

#[derive(Serialize, FromRow)]
pub struct PendingUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub pending_count: i64,
}

#[derive(Serialize)]
pub struct CompletedTodo {
    pub id: i64,
    pub name: String,
    pub creator: String,
    pub email: String,
    pub created_at: String,
    pub status: &'static str,
}

#[derive(Serialize, FromRow)]
pub struct ProjectOverview {
    pub id: i64,
    pub name: String,
    pub status: ProjectStatus,
    pub existing_member_count: i64,
    pub max_members: i64,
}

#[derive(Serialize, FromRow)]
pub struct ProjectSummary {
    pub id: i64,
    pub name: String,
    pub status: ProjectStatus,
    pub max_members: i64,
}

// one row per project member, filtered on the member's name
#[derive(FromRow)]
pub struct ProjectMemberName {
    pub id: i64,
    pub name: String,
    pub status: ProjectStatus,
    pub max_members: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<ProjectMemberName> for ProjectSummary {
    fn from(row: ProjectMemberName) -> Self {
        ProjectSummary {
            id: row.id,
            name: row.name,
            status: row.status,
            max_members: row.max_members,
        }
    }
}

#[derive(Serialize, FromRow)]
pub struct MemberStats {
    #[serde(skip)]
    pub project_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub completed_count: i64,
    pub pending_count: i64,
}

#[derive(Serialize)]
pub struct ProjectReport {
    pub project_title: String,
    pub report: Vec<MemberStats>,
}

// project names arrive as JSON arrays from json_group_array
#[derive(FromRow)]
pub struct UserProjectsRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub to_do_projects: String,
    pub in_progress_projects: String,
    pub completed_projects: String,
}

#[derive(Serialize)]
pub struct UserProjects {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub to_do_projects: Vec<String>,
    pub in_progress_projects: Vec<String>,
    pub completed_projects: Vec<String>,
}

impl TryFrom<UserProjectsRow> for UserProjects {
    type Error = serde_json::Error;

    fn try_from(row: UserProjectsRow) -> Result<Self, Self::Error> {
        Ok(UserProjects {
            to_do_projects: serde_json::from_str(&row.to_do_projects)?,
            in_progress_projects: serde_json::from_str(&row.in_progress_projects)?,
            completed_projects: serde_json::from_str(&row.completed_projects)?,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        })
    }
}

// query strings

#[derive(Deserialize)]
pub struct TopPendingQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct PendingCountQuery {
    pub count: Option<i64>,
}

#[derive(Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Deserialize)]
pub struct MemberNameQuery {
    pub letter: Option<String>,
}
