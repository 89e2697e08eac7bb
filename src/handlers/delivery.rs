//! File delivery endpoints: download and view.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bson::oid::ObjectId;

use crate::auth::CurrentStudent;
use crate::db;
use crate::delivery::{self, DeliveryMode};
use crate::domain::Student;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/student/course/{course_id}/download/{content_id}
pub async fn download_content(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path((course_id, content_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    serve(student, state, &course_id, &content_id, DeliveryMode::Download).await
}

/// GET /api/v1/student/course/{course_id}/view/{content_id}
pub async fn view_content(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path((course_id, content_id)): Path<(String, String)>,
) -> ApiResult<Response> {
    serve(student, state, &course_id, &content_id, DeliveryMode::View).await
}

async fn serve(
    student: Student,
    state: AppState,
    course_id: &str,
    content_id: &str,
    mode: DeliveryMode,
) -> ApiResult<Response> {
    let course_oid = ObjectId::parse_str(course_id)?;

    // Enrollment gate runs before the course lookup; an unenrolled learner
    // gets Forbidden whether or not the course exists.
    if !student.is_enrolled(&course_oid) {
        return Err(ApiError::Forbidden("Not enrolled in this course"));
    }

    let course = db::courses::find_by_id(&state.store, course_oid)
        .await?
        .ok_or(ApiError::CourseNotFound)?;

    let deliverable =
        delivery::resolve_deliverable(&student, &course, content_id, mode, &state.data_dir)?;

    tracing::debug!(file = %deliverable.path.display(), "serving course content");
    let bytes = std::fs::read(&deliverable.path)?;

    let headers = [
        (header::CONTENT_TYPE, deliverable.content_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            deliverable.disposition.header_value(&deliverable.filename),
        ),
    ];
    Ok((headers, bytes).into_response())
}
