use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;
use log::info;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, Validator};
use crate::models::{
    todo::Todo,
    user::UserSummary,
};
use crate::routes::todos::todos_models::TodoResponse;
use super::reports_models::{
    UserStats, PendingUser, CompletedTodo,
    ProjectOverview, ProjectSummary, ProjectMemberName, ProjectReport, MemberStats,
    UserProjects, UserProjectsRow,
    TopPendingQuery, PendingCountQuery, DateRangeQuery, MemberNameQuery,
};

const DEFAULT_TOP_PENDING: i64 = 5;
const MAX_TOP_PENDING: i64 = 100;
const DATE_FORMAT: &str = "%d-%m-%Y";
const CREATED_AT_FORMAT: &str = "%I:%M %p, %d %b, %Y";

// Per-user todo counts, shared by the stats-style reports
const USER_TODO_COUNTS: &str = "
    SELECT u.id, u.first_name, u.last_name, u.email,
           COUNT(CASE WHEN t.done = 1 THEN 1 END) AS completed_count,
           COUNT(CASE WHEN t.done = 0 THEN 1 END) AS pending_count
    FROM users u
    LEFT JOIN todos t ON t.user_id = u.id
    GROUP BY u.id";

pub async fn list_users(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT id, first_name, last_name, email FROM users ORDER BY id",
    )
    .fetch_all(pool.get_ref())
    .await?;
    Ok(HttpResponse::Ok().json(users))
}

pub async fn list_todos(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let todos = Todo::list_all(pool.get_ref()).await?;
    let todos: Vec<TodoResponse> = todos.into_iter().map(TodoResponse::from).collect();
    Ok(HttpResponse::Ok().json(todos))
}

pub async fn list_projects(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let projects = sqlx::query_as::<_, ProjectOverview>(
        "SELECT p.id, p.name, p.status, COUNT(pm.id) AS existing_member_count, p.max_members
         FROM projects p
         LEFT JOIN project_members pm ON pm.project_id = p.id
         GROUP BY p.id
         ORDER BY p.id",
    )
    .fetch_all(pool.get_ref())
    .await?;
    Ok(HttpResponse::Ok().json(projects))
}

// completed and pending todo counts for every user
pub async fn user_todo_stats(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let stats = sqlx::query_as::<_, UserStats>(&format!("{} ORDER BY u.id", USER_TODO_COUNTS))
        .fetch_all(pool.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(stats))
}

// users with the most pending todos, five by default
pub async fn top_pending_users(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
    query: web::Query<TopPendingQuery>,
) -> Result<HttpResponse, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_PENDING);
    if !(1..=MAX_TOP_PENDING).contains(&limit) {
        return Err(ApiError::field(
            "limit",
            format!("Ensure this value is between 1 and {}.", MAX_TOP_PENDING),
        ));
    }

    let users = sqlx::query_as::<_, PendingUser>(&format!(
        "SELECT id, first_name, last_name, email, pending_count
         FROM ({})
         ORDER BY pending_count DESC, id
         LIMIT ?",
        USER_TODO_COUNTS
    ))
    .bind(limit)
    .fetch_all(pool.get_ref())
    .await?;
    Ok(HttpResponse::Ok().json(users))
}

// users whose pending count is exactly `count`
pub async fn users_with_pending_count(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
    query: web::Query<PendingCountQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = match query.count {
        Some(count) if count >= 0 => count,
        Some(_) => return Err(ApiError::field("count", "Ensure this value is greater than or equal to 0.")),
        None => return Err(ApiError::field("count", "This field is required.")),
    };

    let users = sqlx::query_as::<_, PendingUser>(&format!(
        "SELECT id, first_name, last_name, email, pending_count
         FROM ({})
         WHERE pending_count = ?
         ORDER BY id",
        USER_TODO_COUNTS
    ))
    .bind(count)
    .fetch_all(pool.get_ref())
    .await?;
    Ok(HttpResponse::Ok().json(users))
}

fn parse_date(v: &mut Validator, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    v.require(field, value);
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            v.add(field, "Date has wrong format. Use DD-MM-YYYY.");
            None
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// done todos created between start and end, both days included
pub async fn completed_todos_in_range(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    let start = parse_date(&mut v, "start", query.start.as_deref());
    let end = parse_date(&mut v, "end", query.end.as_deref());
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            v.add("end", "End date must not be before start date.");
        }
    }
    v.finish()?;

    let (Some(start), Some(end)) = (start, end) else {
        return Err(ApiError::field("start", "This field is required."));
    };
    let until = end
        .checked_add_days(Days::new(1))
        .ok_or_else(|| ApiError::field("end", "Date is out of range."))?;

    info!("Fetching completed todos between {} and {}", start, end);
    let todos = Todo::list_completed_between(pool.get_ref(), start_of_day(start), start_of_day(until)).await?;
    let todos: Vec<CompletedTodo> = todos
        .into_iter()
        .map(|todo| CompletedTodo {
            creator: format!("{} {}", todo.first_name, todo.last_name),
            created_at: todo.date_created.format(CREATED_AT_FORMAT).to_string(),
            status: todo.status(),
            id: todo.id,
            name: todo.name,
            email: todo.email,
        })
        .collect();
    Ok(HttpResponse::Ok().json(todos))
}

/// Case-insensitive match on the first letters of the first name or the last
/// letters of the last name. Folds full Unicode case, not only ASCII.
fn member_name_matches(first_name: &str, last_name: &str, letter: &str) -> bool {
    let letter = letter.to_lowercase();
    first_name.to_lowercase().starts_with(&letter) || last_name.to_lowercase().ends_with(&letter)
}

// projects with a member whose first name starts, or last name ends, with the letter
pub async fn projects_with_member_name(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
    query: web::Query<MemberNameQuery>,
) -> Result<HttpResponse, ApiError> {
    let letter = query.letter.as_deref().unwrap_or("A");
    let mut v = Validator::new();
    v.require("letter", Some(letter));
    v.max_length("letter", Some(letter), 30);
    v.finish()?;

    let rows = sqlx::query_as::<_, ProjectMemberName>(
        "SELECT p.id, p.name, p.status, p.max_members, u.first_name, u.last_name
         FROM projects p
         JOIN project_members pm ON pm.project_id = p.id
         JOIN users u ON u.id = pm.member_id
         ORDER BY p.id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let mut projects: Vec<ProjectSummary> = Vec::new();
    for row in rows {
        if projects.last().map_or(false, |p| p.id == row.id) {
            continue;
        }
        if member_name_matches(&row.first_name, &row.last_name, letter) {
            projects.push(ProjectSummary::from(row));
        }
    }
    Ok(HttpResponse::Ok().json(projects))
}

// per project, each member's completed and pending todo counts
pub async fn project_report(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let projects = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM projects ORDER BY id")
        .fetch_all(pool.get_ref())
        .await?;

    let members = sqlx::query_as::<_, MemberStats>(&format!(
        "SELECT pm.project_id, c.first_name, c.last_name, c.email, c.completed_count, c.pending_count
         FROM project_members pm
         JOIN ({}) c ON c.id = pm.member_id
         ORDER BY pm.project_id, c.email",
        USER_TODO_COUNTS
    ))
    .fetch_all(pool.get_ref())
    .await?;

    let mut by_project: BTreeMap<i64, Vec<MemberStats>> = BTreeMap::new();
    for member in members {
        by_project.entry(member.project_id).or_default().push(member);
    }

    let report: Vec<ProjectReport> = projects
        .into_iter()
        .map(|(id, name)| ProjectReport {
            project_title: name,
            report: by_project.remove(&id).unwrap_or_default(),
        })
        .collect();
    Ok(HttpResponse::Ok().json(report))
}

// project names per user, split by project status
pub async fn user_project_status(
    pool: web::Data<SqlitePool>,
    _: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let rows = sqlx::query_as::<_, UserProjectsRow>(
        "SELECT u.first_name, u.last_name, u.email,
                json_group_array(p.name ORDER BY p.id) FILTER (WHERE p.status = 0) AS to_do_projects,
                json_group_array(p.name ORDER BY p.id) FILTER (WHERE p.status = 1) AS in_progress_projects,
                json_group_array(p.name ORDER BY p.id) FILTER (WHERE p.status = 2) AS completed_projects
         FROM users u
         LEFT JOIN project_members pm ON pm.member_id = u.id
         LEFT JOIN projects p ON p.id = pm.project_id
         GROUP BY u.id
         ORDER BY u.id",
    )
    .fetch_all(pool.get_ref())
    .await?;

    let users = rows
        .into_iter()
        .map(UserProjects::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(HttpResponse::Ok().json(users))
}
