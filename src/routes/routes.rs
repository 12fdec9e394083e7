use actix_web::{error, web, HttpResponse};
use serde_json::json;

use super::admin::admin_handlers;
use super::reports::reports_handlers;
use super::todos::todos_handlers;
use super::users::users_handlers;

// Malformed bodies and query strings become 400s with a JSON detail
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| {
        let detail = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "detail": detail })),
        )
        .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _| {
        let detail = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(json!({ "detail": detail })),
        )
        .into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .configure(users_configure)
        .configure(todos_configure)
        .configure(reports_configure)
        .configure(admin_configure)
        .route("/api-token-auth/", web::post().to(users_handlers::obtain_token));
}

pub fn users_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("/register", web::post().to(users_handlers::register))
            .route("/login", web::post().to(users_handlers::login))
            .route("/logout", web::post().to(users_handlers::logout))
            .route("/me", web::get().to(users_handlers::me))
    );
}

pub fn todos_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/todos")
            .route("/", web::get().to(todos_handlers::list_todos))
            .route("/", web::post().to(todos_handlers::create_todo))
            .route("/{id}/", web::get().to(todos_handlers::get_todo))
            .route("/{id}/", web::put().to(todos_handlers::update_todo))
            .route("/{id}/", web::patch().to(todos_handlers::update_todo))
            .route("/{id}/", web::delete().to(todos_handlers::delete_todo))
    );
}

pub fn reports_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/reports")
            .route("/users", web::get().to(reports_handlers::list_users))
            .route("/users/stats", web::get().to(reports_handlers::user_todo_stats))
            .route("/users/top-pending", web::get().to(reports_handlers::top_pending_users))
            .route("/users/pending", web::get().to(reports_handlers::users_with_pending_count))
            .route("/users/project-status", web::get().to(reports_handlers::user_project_status))
            .route("/todos", web::get().to(reports_handlers::list_todos))
            .route("/todos/completed", web::get().to(reports_handlers::completed_todos_in_range))
            .route("/projects", web::get().to(reports_handlers::list_projects))
            .route("/projects/members-named", web::get().to(reports_handlers::projects_with_member_name))
            .route("/projects/report", web::get().to(reports_handlers::project_report))
    );
}

pub fn admin_configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/projects", web::post().to(admin_handlers::create_project))
            .route("/projects/{id}", web::get().to(admin_handlers::get_project))
            .route("/projects/{id}", web::patch().to(admin_handlers::update_project))
            .route("/projects/{id}", web::delete().to(admin_handlers::delete_project))
            .route("/projects/{id}/members", web::post().to(admin_handlers::add_member))
            .route("/projects/{id}/members/{user_id}", web::delete().to(admin_handlers::remove_member))
            .route("/users/{id}", web::delete().to(admin_handlers::delete_user))
            .route("/tokens/reset", web::post().to(admin_handlers::reset_tokens))
    );
}
