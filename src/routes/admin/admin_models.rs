use serde::{Deserialize, Serialize};

use crate::models::{project::Project, project_member::ProjectMember};

#[derive(Serialize)]
pub struct AdminDefaultResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub max_members: Option<i64>,
    pub status: Option<i64>,
}

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub max_members: Option<i64>,
    pub status: Option<i64>,
}

#[derive(Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: Project,
    pub members: Vec<ProjectMember>,
}

#[derive(Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Option<i64>,
}

#[derive(Deserialize)]
pub struct ProjectPath {
    pub id: i64,
}

#[derive(Deserialize)]
pub struct MemberPath {
    pub id: i64,
    pub user_id: i64,
}

#[derive(Deserialize)]
pub struct UserPath {
    pub id: i64,
}
