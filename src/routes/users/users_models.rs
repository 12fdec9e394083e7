use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

// Registration request and response
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
    pub token: String,
}


// Login request and response
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub auth_token: String,
}


// Token endpoint, username carries the email
#[derive(Deserialize)]
pub struct ObtainTokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct ObtainTokenResponse {
    pub token: String,
}


#[derive(Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: String,
}


#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        ProfileResponse {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_staff: user.is_staff || user.is_superuser,
            date_joined: user.date_joined,
            last_login: user.last_login,
        }
    }
}
