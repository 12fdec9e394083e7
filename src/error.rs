use std::collections::BTreeMap;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// Field name -> list of messages, rendered as `{"field": ["msg"]}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed: {0:?}")]
    Validation(FieldErrors),
    #[error("Bad credentials: {0}")]
    BadCredentials(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn field(name: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(name.to_string(), vec![message.into()]);
        ApiError::Validation(errors)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadCredentials(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Hash(_) | ApiError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::Validation(errors) => json!(errors),
            ApiError::BadCredentials(msg) => json!({ "non_field_errors": [msg] }),
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) | ApiError::NotFound(msg) => {
                json!({ "detail": msg })
            }
            ApiError::Database(_) | ApiError::Hash(_) | ApiError::Serialization(_) => {
                error!("{}", self);
                json!({ "detail": "Internal server error" })
            }
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Collects field errors while validating a request body.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn require(&mut self, field: &str, value: Option<&str>) {
        match value {
            None => self.add(field, "This field is required."),
            Some(v) if v.trim().is_empty() => self.add(field, "This field may not be blank."),
            Some(_) => {}
        }
    }

    pub fn max_length(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.add(
                    field,
                    format!("Ensure this field has no more than {} characters.", max),
                );
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map_or(false, |db_err| db_err.is_unique_violation())
}
