use std::str::FromStr;

use actix_web::{web, App};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::auth::register_user;
use crate::config::Config;
use crate::models::{auth_token::AuthToken, user::NewUser, user::User};
use crate::routes::routes;

pub const PASSWORD: &str = "correct horse";

/// In-memory database shared by a single long-lived connection.
pub async fn pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    crate::db::migrate(&pool).await.unwrap();
    pool
}

pub fn config() -> Config {
    Config {
        database_url: "sqlite::memory:".into(),
        database_max_connections: 1,
        server_address: "127.0.0.1:0".into(),
        bcrypt_cost: 4,
        admin: None,
    }
}

pub fn app(
    pool: &SqlitePool,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(pool.clone()))
        .app_data(web::Data::new(config()))
        .configure(routes::configure)
}

pub async fn create_user(pool: &SqlitePool, email: &str, first_name: &str, last_name: &str) -> (User, String) {
    let new = NewUser {
        email,
        password: PASSWORD,
        first_name,
        last_name,
        is_staff: false,
        is_superuser: false,
    };
    let (user, token) = register_user(pool, &new, 4).await.unwrap();
    (user, token.key)
}

pub async fn create_staff(pool: &SqlitePool, email: &str) -> (User, String) {
    let (user, _) = create_user(pool, email, "Staff", "Member").await;
    sqlx::query("UPDATE users SET is_staff = 1 WHERE id = ?")
        .bind(user.id)
        .execute(pool)
        .await
        .unwrap();
    let token = AuthToken::get_or_create(pool, user.id).await.unwrap();
    let user = User::find_by_id(pool, user.id).await.unwrap().unwrap();
    (user, token.key)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Token {}", token))
}
