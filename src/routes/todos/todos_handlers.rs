use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use log::info;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, Validator};
use crate::models::todo::{Todo, TodoChanges};
use super::todos_models::{
    CreateTodoRequest, UpdateTodoRequest,
    TodoPath, TodoResponse,
};

const NAME_MAX_LENGTH: usize = 1000;

fn not_found(verb: &str) -> ApiError {
    ApiError::NotFound(format!(
        "Todo not found or you don't have permission to {} this Todo.",
        verb
    ))
}

// Handler to list the caller's todos
pub async fn list_todos(
    pool: web::Data<SqlitePool>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let todos = Todo::list_for_user(pool.get_ref(), user.id).await?;
    let todos: Vec<TodoResponse> = todos.into_iter().map(TodoResponse::from).collect();
    Ok(HttpResponse::Ok().json(todos))
}

// Handler to add a todo owned by the caller
pub async fn create_todo(
    pool: web::Data<SqlitePool>,
    AuthenticatedUser(user): AuthenticatedUser,
    request: web::Json<CreateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    v.require("name", request.name.as_deref());
    v.max_length("name", request.name.as_deref(), NAME_MAX_LENGTH);
    v.finish()?;

    let name = request.name.as_deref().unwrap_or_default();
    let todo = Todo::create(pool.get_ref(), user.id, name, request.done.unwrap_or(false)).await?;
    info!("User {} created todo {}", user.id, todo.id);
    Ok(HttpResponse::Created().json(TodoResponse::from(todo)))
}

pub async fn get_todo(
    pool: web::Data<SqlitePool>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<TodoPath>,
) -> Result<HttpResponse, ApiError> {
    let todo = Todo::find_for_user(pool.get_ref(), path.id, user.id)
        .await?
        .ok_or_else(|| not_found("view"))?;
    Ok(HttpResponse::Ok().json(TodoResponse::from(todo)))
}

// Handler to update name and/or done flag
pub async fn update_todo(
    pool: web::Data<SqlitePool>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<TodoPath>,
    request: web::Json<UpdateTodoRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    if request.name.is_some() {
        v.require("name", request.name.as_deref());
        v.max_length("name", request.name.as_deref(), NAME_MAX_LENGTH);
    }
    v.finish()?;

    let changes = TodoChanges {
        name: request.name.as_deref(),
        done: request.done,
    };
    let todo = Todo::update_for_user(pool.get_ref(), path.id, user.id, &changes)
        .await?
        .ok_or_else(|| {
            info!("User {} cannot update todo {}", user.id, path.id);
            not_found("update")
        })?;
    Ok(HttpResponse::Ok().json(TodoResponse::from(todo)))
}

pub async fn delete_todo(
    pool: web::Data<SqlitePool>,
    AuthenticatedUser(user): AuthenticatedUser,
    path: web::Path<TodoPath>,
) -> Result<HttpResponse, ApiError> {
    if !Todo::delete_for_user(pool.get_ref(), path.id, user.id).await? {
        info!("User {} cannot delete todo {}", user.id, path.id);
        return Err(not_found("delete"));
    }
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    use crate::test_support::{self, bearer};

    #[actix_web::test]
    async fn create_and_list_are_scoped_to_owner() {
        let pool = test_support::pool().await;
        let (ann, ann_token) = test_support::create_user(&pool, "ann@example.com", "Ann", "Lee").await;
        let (_, bob_token) = test_support::create_user(&pool, "bob@example.com", "Bob", "Ray").await;
        let app = test::init_service(test_support::app(&pool)).await;

        let req = test::TestRequest::post()
            .uri("/api/todos/")
            .insert_header(bearer(&ann_token))
            .set_json(json!({ "name": "write report" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["name"], "write report");
        assert_eq!(created["status"], "To Do");
        assert_eq!(created["done"], false);
        assert_eq!(created["creator"]["id"], ann.id);
        assert_eq!(created["creator"]["email"], "ann@example.com");

        let req = test::TestRequest::get()
            .uri("/api/todos/")
            .insert_header(bearer(&ann_token))
            .to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let req = test::TestRequest::get()
            .uri("/api/todos/")
            .insert_header(bearer(&bob_token))
            .to_request();
        let list: Value = test::call_and_read_body_json(&app, req).await;
        assert!(list.as_array().unwrap().is_empty());

        let req = test::TestRequest::get()
            .uri(&format!("/api/todos/{}/", created["id"]))
            .insert_header(bearer(&bob_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn create_requires_name() {
        let pool = test_support::pool().await;
        let (_, token) = test_support::create_user(&pool, "ann@example.com", "Ann", "Lee").await;
        let app = test::init_service(test_support::app(&pool)).await;

        let req = test::TestRequest::post()
            .uri("/api/todos/")
            .insert_header(bearer(&token))
            .set_json(json!({ "done": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"][0], "This field is required.");
    }

    #[actix_web::test]
    async fn marking_done_toggles_status_label() {
        let pool = test_support::pool().await;
        let (_, token) = test_support::create_user(&pool, "ann@example.com", "Ann", "Lee").await;
        let app = test::init_service(test_support::app(&pool)).await;

        let req = test::TestRequest::post()
            .uri("/api/todos/")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "ship it" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/todos/{}/", created["id"]);

        let req = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(json!({ "done": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "Done");
        assert_eq!(body["name"], "ship it");
        assert!(body["date_completed"].is_string());

        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header(bearer(&token))
            .set_json(json!({ "done": false, "name": "ship it again" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "To Do");
        assert_eq!(body["name"], "ship it again");
        assert!(body["date_completed"].is_null());
    }

    #[actix_web::test]
    async fn other_users_get_not_found_on_update_and_delete() {
        let pool = test_support::pool().await;
        let (_, ann_token) = test_support::create_user(&pool, "ann@example.com", "Ann", "Lee").await;
        let (_, bob_token) = test_support::create_user(&pool, "bob@example.com", "Bob", "Ray").await;
        let app = test::init_service(test_support::app(&pool)).await;

        let req = test::TestRequest::post()
            .uri("/api/todos/")
            .insert_header(bearer(&ann_token))
            .set_json(json!({ "name": "private" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/todos/{}/", created["id"]);

        let req = test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&bob_token))
            .set_json(json!({ "done": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["detail"],
            "Todo not found or you don't have permission to update this Todo."
        );

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&bob_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&ann_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&ann_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn todos_require_authentication() {
        let pool = test_support::pool().await;
        let app = test::init_service(test_support::app(&pool)).await;

        let req = test::TestRequest::get()
            .uri("/api/todos/")
            .insert_header(("Authorization", "Token not-a-real-key"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
