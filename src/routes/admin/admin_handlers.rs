use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use log::info;
use crate::auth::StaffUser;
use crate::error::{ApiError, Validator};
use crate::models::{
    auth_token::AuthToken,
    project::{Project, ProjectChanges, ProjectStatus},
    project_member::ProjectMember,
    user::User,
};
use super::admin_models::{
    AdminDefaultResponse,
    CreateProjectRequest, UpdateProjectRequest, ProjectDetailResponse,
    AddMemberRequest, ProjectPath, MemberPath, UserPath,
};

const PROJECT_NAME_MAX_LENGTH: usize = 100;

fn validate_status(v: &mut Validator, status: Option<i64>) -> Option<ProjectStatus> {
    let status = status?;
    match ProjectStatus::try_from(status) {
        Ok(status) => Some(status),
        Err(value) => {
            v.add("status", format!("\"{}\" is not a valid choice.", value));
            None
        }
    }
}

fn validate_max_members(v: &mut Validator, max_members: Option<i64>) {
    if matches!(max_members, Some(n) if n < 0) {
        v.add("max_members", "Ensure this value is greater than or equal to 0.");
    }
}

fn project_not_found() -> ApiError {
    ApiError::NotFound("Project not found.".into())
}

pub async fn create_project(
    pool: web::Data<SqlitePool>,
    StaffUser(staff): StaffUser,
    request: web::Json<CreateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    v.require("name", request.name.as_deref());
    v.max_length("name", request.name.as_deref(), PROJECT_NAME_MAX_LENGTH);
    if request.max_members.is_none() {
        v.add("max_members", "This field is required.");
    }
    validate_max_members(&mut v, request.max_members);
    let status = validate_status(&mut v, request.status);
    v.finish()?;

    let project = Project::create(
        pool.get_ref(),
        request.name.as_deref().unwrap_or_default(),
        request.max_members.unwrap_or_default(),
        status.unwrap_or_default(),
    )
    .await?;
    info!("Staff {} created project {}", staff.email, project.id);
    Ok(HttpResponse::Created().json(project))
}

pub async fn get_project(
    pool: web::Data<SqlitePool>,
    _: StaffUser,
    path: web::Path<ProjectPath>,
) -> Result<HttpResponse, ApiError> {
    let project = Project::find_by_id(pool.get_ref(), path.id)
        .await?
        .ok_or_else(project_not_found)?;
    let members = ProjectMember::list_for_project(pool.get_ref(), project.id).await?;
    Ok(HttpResponse::Ok().json(ProjectDetailResponse { project, members }))
}

pub async fn update_project(
    pool: web::Data<SqlitePool>,
    _: StaffUser,
    path: web::Path<ProjectPath>,
    request: web::Json<UpdateProjectRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    if request.name.is_some() {
        v.require("name", request.name.as_deref());
        v.max_length("name", request.name.as_deref(), PROJECT_NAME_MAX_LENGTH);
    }
    validate_max_members(&mut v, request.max_members);
    let status = validate_status(&mut v, request.status);
    v.finish()?;

    let changes = ProjectChanges {
        name: request.name.as_deref(),
        max_members: request.max_members,
        status,
    };
    let project = Project::update(pool.get_ref(), path.id, &changes).await?;
    Ok(HttpResponse::Ok().json(project))
}

pub async fn delete_project(
    pool: web::Data<SqlitePool>,
    StaffUser(staff): StaffUser,
    path: web::Path<ProjectPath>,
) -> Result<HttpResponse, ApiError> {
    if !Project::delete(pool.get_ref(), path.id).await? {
        return Err(project_not_found());
    }
    info!("Staff {} deleted project {}", staff.email, path.id);
    Ok(HttpResponse::NoContent().finish())
}

pub async fn add_member(
    pool: web::Data<SqlitePool>,
    _: StaffUser,
    path: web::Path<ProjectPath>,
    request: web::Json<AddMemberRequest>,
) -> Result<HttpResponse, ApiError> {
    let user_id = request
        .user_id
        .ok_or_else(|| ApiError::field("user_id", "This field is required."))?;
    let member = ProjectMember::add(pool.get_ref(), path.id, user_id).await?;
    info!("User {} joined project {}", user_id, path.id);
    Ok(HttpResponse::Created().json(member))
}

pub async fn remove_member(
    pool: web::Data<SqlitePool>,
    _: StaffUser,
    path: web::Path<MemberPath>,
) -> Result<HttpResponse, ApiError> {
    if !ProjectMember::remove(pool.get_ref(), path.id, path.user_id).await? {
        return Err(ApiError::NotFound("Project member not found.".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_user(
    pool: web::Data<SqlitePool>,
    StaffUser(staff): StaffUser,
    path: web::Path<UserPath>,
) -> Result<HttpResponse, ApiError> {
    if !User::delete(pool.get_ref(), path.id).await? {
        return Err(ApiError::NotFound("User not found.".into()));
    }
    info!("Staff {} deleted user {}", staff.email, path.id);
    Ok(HttpResponse::NoContent().finish())
}

// Revoke every issued token
pub async fn reset_tokens(
    pool: web::Data<SqlitePool>,
    StaffUser(staff): StaffUser,
) -> Result<HttpResponse, ApiError> {
    let revoked = AuthToken::delete_all(pool.get_ref()).await?;
    info!("Staff {} revoked {} tokens", staff.email, revoked);
    Ok(HttpResponse::Ok().json(AdminDefaultResponse {
        success: true,
        message: "All tokens have been reset successfully".into(),
    }))
}
