use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{todo::Todo, user::UserSummary};

#[derive(Serialize)]
pub struct TodoResponse {
    pub id: i64,
    pub name: String,
    pub done: bool,
    pub status: &'static str,
    pub date_created: DateTime<Utc>,
    pub date_completed: Option<DateTime<Utc>>,
    pub creator: UserSummary,
}

impl From<Todo> for TodoResponse {
    fn from(todo: Todo) -> Self {
        TodoResponse {
            status: todo.status(),
            creator: UserSummary {
                id: todo.user_id,
                first_name: todo.first_name,
                last_name: todo.last_name,
                email: todo.email,
            },
            id: todo.id,
            name: todo.name,
            done: todo.done,
            date_created: todo.date_created,
            date_completed: todo.date_completed,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateTodoRequest {
    pub name: Option<String>,
    pub done: Option<bool>,
}

// PUT and PATCH both apply a partial update
#[derive(Deserialize)]
pub struct UpdateTodoRequest {
    pub name: Option<String>,
    pub done: Option<bool>,
}

#[derive(Deserialize)]
pub struct TodoPath {
    pub id: i64,
}
