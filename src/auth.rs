use std::future::Future;
use std::pin::Pin;

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use bcrypt::{hash, verify};
use log::{error, info};
use sqlx::SqlitePool;

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{
    auth_token::AuthToken,
    user::{NewUser, User},
};

/// Inserts the user and issues their first token in one transaction.
pub async fn register_user(
    pool: &SqlitePool,
    new: &NewUser<'_>,
    bcrypt_cost: u32,
) -> Result<(User, AuthToken), ApiError> {
    let password_hash = hash(new.password, bcrypt_cost)?;

    let mut tx = pool.begin().await?;
    let user = User::insert(&mut tx, new, &password_hash).await?;
    let token = AuthToken::create(&mut tx, user.id).await?;
    tx.commit().await?;

    info!("User {} registered", user.email);
    Ok((user, token))
}

/// Checks email/password against the stored hash. `None` on any mismatch.
pub async fn authenticate(pool: &SqlitePool, email: &str, password: &str) -> Result<Option<User>, ApiError> {
    let user = match User::find_by_email(pool, email).await? {
        Some(user) if user.is_active => user,
        _ => return Ok(None),
    };

    match verify(password, &user.password_hash) {
        Ok(true) => {
            User::touch_last_login(pool, user.id).await?;
            Ok(Some(user))
        }
        Ok(false) => Ok(None),
        Err(e) => {
            error!("Error when checking password for user {}: {}", user.email, e);
            Ok(None)
        }
    }
}

/// Creates the configured superuser unless that email is already taken.
pub async fn ensure_superuser(pool: &SqlitePool, config: &Config) -> Result<(), ApiError> {
    let Some(admin) = &config.admin else {
        return Ok(());
    };
    if User::email_exists(pool, &admin.email).await? {
        return Ok(());
    }

    let new = NewUser {
        email: &admin.email,
        password: &admin.password,
        first_name: "",
        last_name: "",
        is_staff: true,
        is_superuser: true,
    };
    register_user(pool, &new, config.bcrypt_cost).await?;
    info!("Superuser {} created", admin.email);
    Ok(())
}

/// Pulls the key out of `Authorization: Token <key>` or `Bearer <key>`.
pub fn token_from_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;
    let key = key.trim();
    if key.is_empty() || key.contains(' ') {
        return None;
    }
    if scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer") {
        Some(key)
    } else {
        None
    }
}

/// The user owning the request's token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<SqlitePool>>().cloned();
        let key = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(token_from_header)
            .map(str::to_owned);

        Box::pin(async move {
            let Some(key) = key else {
                return Err(ApiError::Unauthorized(
                    "Authentication credentials were not provided.".into(),
                ));
            };
            let Some(pool) = pool else {
                error!("Database pool missing from app data");
                return Err(ApiError::Database(sqlx::Error::PoolClosed));
            };

            match AuthToken::find_user(pool.get_ref(), &key).await? {
                Some(user) => Ok(AuthenticatedUser(user)),
                None => {
                    info!("Rejected invalid token");
                    Err(ApiError::Unauthorized("Invalid token.".into()))
                }
            }
        })
    }
}

/// An authenticated user with the staff (or superuser) flag.
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl FromRequest for StaffUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let authenticated = AuthenticatedUser::from_request(req, payload);
        Box::pin(async move {
            let AuthenticatedUser(user) = authenticated.await?;
            if user.is_staff || user.is_superuser {
                Ok(StaffUser(user))
            } else {
                Err(ApiError::Forbidden(
                    "You do not have permission to perform this action.".into(),
                ))
            }
        })
    }
}
