//! Account handlers: registration, login, profile CRUD for both roles.
//!
//! Login issues a fresh token on every successful credential check and
//! overwrites the stored one unconditionally: concurrent logins both
//! succeed and the older token dies immediately (last write wins).

use axum::Json;
use axum::extract::State;
use bson::Document;
use bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Value, json};

use super::middleware::{CurrentAdmin, CurrentStudent};
use super::{generate_access_token, password};
use crate::config;
use crate::db;
use crate::domain::{Admin, AdminProfile, Student, StudentProfile};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: String,
    pub gender: String,
    pub security_question: String,
    pub security_answer: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileUpdateRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub security_question: Option<String>,
    pub security_answer: Option<String>,
}

/// Drop absent and blank values; blank strings never overwrite stored data.
fn provided(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn validate_registration(body: &RegisterRequest) -> ApiResult<()> {
    if body.password.len() < config::MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            config::MIN_PASSWORD_LENGTH
        )));
    }
    if body.email.trim().is_empty() {
        return Err(ApiError::BadRequest("Email is required".to_string()));
    }
    Ok(())
}

fn hash_or_bad_request(password: &str) -> ApiResult<String> {
    password::hash_password(password)
        .map_err(|e| ApiError::BadRequest(format!("Unusable password: {e}")))
}

/// Build the `$set` document for a profile update, hashing any new
/// password on the way through.
fn update_document(body: ProfileUpdateRequest) -> ApiResult<Document> {
    let mut fields = Document::new();
    if let Some(v) = provided(&body.full_name) {
        fields.insert("full_name", v);
    }
    if let Some(v) = provided(&body.email) {
        fields.insert("email", v);
    }
    if let Some(v) = provided(&body.password) {
        fields.insert("password_hash", hash_or_bad_request(v)?);
    }
    if let Some(v) = provided(&body.date_of_birth) {
        fields.insert("date_of_birth", v);
    }
    if let Some(v) = provided(&body.gender) {
        fields.insert("gender", v);
    }
    if let Some(v) = provided(&body.security_question) {
        fields.insert("security_question", v);
    }
    if let Some(v) = provided(&body.security_answer) {
        fields.insert("security_answer", v);
    }
    Ok(fields)
}

// ==================== Student Accounts ====================

pub async fn register_student(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<Value>> {
    validate_registration(&body)?;

    if db::students::find_by_email(&state.store, &body.email)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateEmail);
    }

    let student = Student {
        id: Some(ObjectId::new()),
        full_name: body.full_name,
        email: body.email,
        password_hash: hash_or_bad_request(&body.password)?,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
        security_question: body.security_question,
        security_answer: body.security_answer,
        access_token: None,
        enrolled_courses: Vec::new(),
        progress: Default::default(),
        certificates: Vec::new(),
        certificate_allowed: false,
    };
    db::students::insert(&state.store, &student).await?;

    tracing::info!("Registered student {}", student.email);
    Ok(Json(json!({
        "message": "Student registered successfully",
        "id": student.id.map(|id| id.to_hex()),
    })))
}

pub async fn login_student(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let student = db::students::find_by_email(&state.store, &body.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&body.password, &student.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let student_id = student.id.ok_or(ApiError::InvalidCredentials)?;
    let token = generate_access_token();
    db::students::set_access_token(&state.store, student_id, &token).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "student_id": student_id.to_hex(),
        "full_name": student.full_name,
        "access_token": token,
    })))
}

pub async fn student_profile(CurrentStudent(student): CurrentStudent) -> Json<StudentProfile> {
    Json(StudentProfile::from(&student))
}

pub async fn update_student_profile(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(body): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<Value>> {
    let fields = update_document(body)?;

    if let Ok(new_email) = fields.get_str("email")
        && new_email != student.email
        && db::students::find_by_email(&state.store, new_email)
            .await?
            .is_some()
    {
        return Err(ApiError::DuplicateEmail);
    }

    if !fields.is_empty() {
        let student_id = student.id.ok_or(ApiError::StudentNotFound)?;
        db::students::set_fields(&state.store, student_id, fields).await?;
    }
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

pub async fn delete_student_account(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let student_id = student.id.ok_or(ApiError::StudentNotFound)?;
    db::students::delete(&state.store, student_id).await?;
    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

// ==================== Admin Accounts ====================

pub async fn register_admin(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<Json<Value>> {
    validate_registration(&body)?;

    if db::admins::find_by_email(&state.store, &body.email)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateEmail);
    }

    let admin = Admin {
        id: Some(ObjectId::new()),
        full_name: body.full_name,
        email: body.email,
        password_hash: hash_or_bad_request(&body.password)?,
        date_of_birth: body.date_of_birth,
        gender: body.gender,
        security_question: body.security_question,
        security_answer: body.security_answer,
        access_token: None,
    };
    db::admins::insert(&state.store, &admin).await?;

    tracing::info!("Registered admin {}", admin.email);
    Ok(Json(json!({ "message": "Admin registered successfully" })))
}

pub async fn login_admin(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<Value>> {
    let admin = db::admins::find_by_email(&state.store, &body.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !password::verify_password(&body.password, &admin.password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let admin_id = admin.id.ok_or(ApiError::InvalidCredentials)?;
    let token = generate_access_token();
    db::admins::set_access_token(&state.store, admin_id, &token).await?;

    Ok(Json(json!({
        "message": "Login successful",
        "admin_id": admin_id.to_hex(),
        "full_name": admin.full_name,
        "access_token": token,
    })))
}

pub async fn admin_profile(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminProfile> {
    Json(AdminProfile::from(&admin))
}

pub async fn update_admin_profile(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(body): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<Value>> {
    let fields = update_document(body)?;

    if let Ok(new_email) = fields.get_str("email")
        && new_email != admin.email
        && db::admins::find_by_email(&state.store, new_email)
            .await?
            .is_some()
    {
        return Err(ApiError::DuplicateEmail);
    }

    if !fields.is_empty() {
        let admin_id = admin.id.ok_or(ApiError::InvalidToken)?;
        db::admins::set_fields(&state.store, admin_id, fields).await?;
    }
    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

pub async fn delete_admin_account(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let admin_id = admin.id.ok_or(ApiError::InvalidToken)?;
    db::admins::delete(&state.store, admin_id).await?;
    Ok(Json(json!({ "message": "Admin account deleted successfully" })))
}
