use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;
use log::info;
use crate::auth::{authenticate, register_user, AuthenticatedUser};
use crate::config::Config;
use crate::error::{ApiError, Validator};
use crate::models::{
    auth_token::AuthToken,
    user::{is_valid_email, NewUser, User},
};
use super::users_models::{
    RegisterRequest, RegisterResponse,
    LoginRequest, LoginResponse,
    ObtainTokenRequest, ObtainTokenResponse,
    LogoutResponse, ProfileResponse,
};

// register user to DB and hand back the first token
pub async fn register(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    info!("Received request to register user: {:?}", req.email);

    let mut v = Validator::new();
    v.require("email", req.email.as_deref());
    v.require("password", req.password.as_deref());
    v.require("confirm_password", req.confirm_password.as_deref());
    v.max_length("first_name", req.first_name.as_deref(), 30);
    v.max_length("last_name", req.last_name.as_deref(), 150);
    v.max_length("email", req.email.as_deref(), 254);
    if let Some(email) = req.email.as_deref() {
        if !email.trim().is_empty() && !is_valid_email(email.trim()) {
            v.add("email", "Enter a valid email address.");
        }
    }
    if let (Some(password), Some(confirm)) = (&req.password, &req.confirm_password) {
        if password != confirm {
            v.add("confirm_password", "Passwords do not match.");
        }
    }
    v.finish()?;

    let email = req.email.as_deref().unwrap_or_default();
    if User::email_exists(pool.get_ref(), email).await? {
        info!("Email {} is already registered", email);
        return Err(ApiError::field("email", "User with this email already exists."));
    }

    let new = NewUser {
        email,
        password: req.password.as_deref().unwrap_or_default(),
        first_name: req.first_name.as_deref().unwrap_or_default(),
        last_name: req.last_name.as_deref().unwrap_or_default(),
        is_staff: false,
        is_superuser: false,
    };
    let (user, token) = register_user(pool.get_ref(), &new, config.bcrypt_cost).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        date_joined: user.date_joined,
        token: token.key,
    }))
}

// login logic, reuses the user's token if one was already issued
pub async fn login(
    pool: web::Data<SqlitePool>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    v.require("email", req.email.as_deref());
    v.require("password", req.password.as_deref());
    v.finish()?;

    let email = req.email.as_deref().unwrap_or_default();
    info!("Received login request for user: {}", email);

    let user = match authenticate(pool.get_ref(), email, req.password.as_deref().unwrap_or_default()).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials for user: {}", email);
            return Err(ApiError::Unauthorized("Incorrect email or password".into()));
        }
    };

    let token = AuthToken::get_or_create(pool.get_ref(), user.id).await?;
    info!("User {} logged in successfully", user.email);
    Ok(HttpResponse::Ok().json(LoginResponse { auth_token: token.key }))
}

pub async fn obtain_token(
    pool: web::Data<SqlitePool>,
    req: web::Json<ObtainTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut v = Validator::new();
    v.require("username", req.username.as_deref());
    v.require("password", req.password.as_deref());
    v.finish()?;

    let username = req.username.as_deref().unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    let user = authenticate(pool.get_ref(), username, password)
        .await?
        .ok_or_else(|| ApiError::BadCredentials("Unable to log in with provided credentials.".into()))?;

    let token = AuthToken::get_or_create(pool.get_ref(), user.id).await?;
    Ok(HttpResponse::Ok().json(ObtainTokenResponse { token: token.key }))
}

pub async fn logout(
    pool: web::Data<SqlitePool>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    AuthToken::delete_for_user(pool.get_ref(), user.id).await?;
    info!("Logout successful for user: {}", user.email);
    Ok(HttpResponse::Ok().json(LogoutResponse {
        success: true,
        message: "Logout successful".into(),
    }))
}

pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ProfileResponse::from(user))
}
