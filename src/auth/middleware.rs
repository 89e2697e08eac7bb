//! Authentication extractors.
//!
//! Identity is re-resolved from the store on every request: the bearer
//! credential is looked up against the role's collection each time, and no
//! session state lives in the process.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::db;
use crate::domain::{Admin, Student};
use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)
}

/// Authenticated student context.
/// Add this as a handler parameter to require a student bearer token.
pub struct CurrentStudent(pub Student);

impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let student = db::students::find_by_token(&state.store, token)
            .await?
            .ok_or(ApiError::InvalidToken)?;
        Ok(Self(student))
    }
}

/// Authenticated admin context.
pub struct CurrentAdmin(pub Admin);

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let admin = db::admins::find_by_token(&state.store, token)
            .await?
            .ok_or(ApiError::InvalidToken)?;
        Ok(Self(admin))
    }
}
