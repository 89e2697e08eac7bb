//! Request error taxonomy.
//!
//! Every failure a handler can surface maps to one variant here, and each
//! variant maps to a distinct HTTP status with a `{"detail": ...}` JSON body.
//! Store unavailability is fatal to the request and is not retried.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Authorization header absent or not a bearer credential
    #[error("Not authenticated")]
    Unauthenticated,

    /// Bearer credential does not resolve to any account
    #[error("Invalid token")]
    InvalidToken,

    /// Login credential check failed
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated but lacking entitlement (not enrolled, path traversal)
    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Course not found")]
    CourseNotFound,

    #[error("Content not found")]
    ContentNotFound,

    #[error("File not found on server")]
    FileMissing,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Already enrolled")]
    AlreadyEnrolled,

    #[error("Email already registered")]
    DuplicateEmail,

    /// Malformed or missing request input
    #[error("{0}")]
    BadRequest(String),

    /// A path parameter that should be an ObjectId hex string was not
    #[error("Invalid identifier")]
    InvalidId(#[from] bson::oid::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidToken | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::CourseNotFound
            | ApiError::ContentNotFound
            | ApiError::FileMissing
            | ApiError::StudentNotFound => StatusCode::NOT_FOUND,
            ApiError::AlreadyEnrolled
            | ApiError::DuplicateEmail
            | ApiError::BadRequest(_)
            | ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_)
            | ApiError::Serialization(_)
            | ApiError::Deserialization(_)
            | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
