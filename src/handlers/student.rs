//! Student-facing portal handlers: catalog, enrollment, progress,
//! certificates, messaging and reviews.

use axum::Json;
use axum::extract::{Path, State};
use bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::CurrentStudent;
use crate::db;
use crate::domain::course::normalize_for_delivery;
use crate::domain::message::StudentInboxMessage;
use crate::domain::progress::{is_course_completed, progress_percentage};
use crate::domain::review::ReviewSubmission;
use crate::domain::{CourseSummary, Message, PublicCourse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/courses/ - full catalog, content stripped
pub async fn list_courses(
    _student: CurrentStudent,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CourseSummary>>> {
    let courses = db::courses::list_all(&state.store).await?;
    Ok(Json(courses.iter().map(CourseSummary::from).collect()))
}

/// GET /api/v1/student/enrolled-courses - enrolled subset, content stripped
pub async fn enrolled_courses(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CourseSummary>>> {
    let courses = db::courses::find_by_ids(&state.store, &student.enrolled_courses).await?;
    Ok(Json(courses.iter().map(CourseSummary::from).collect()))
}

/// POST /api/v1/student/enroll/{course_id}
pub async fn enroll(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let course_oid = ObjectId::parse_str(&course_id)?;

    if db::courses::find_by_id(&state.store, course_oid)
        .await?
        .is_none()
    {
        return Err(ApiError::CourseNotFound);
    }
    if student.is_enrolled(&course_oid) {
        return Err(ApiError::AlreadyEnrolled);
    }

    // Existence check and enrollment are separate steps with no transaction
    // spanning them; a course deleted in between leaves a dangling id that
    // every reader tolerates.
    let student_id = student.id.ok_or(ApiError::StudentNotFound)?;
    db::students::enroll(&state.store, student_id, course_oid).await?;

    Ok(Json(json!({ "message": "Successfully enrolled." })))
}

#[derive(Debug, Deserialize)]
pub struct MarkCompleteRequest {
    pub content_id: String,
}

/// POST /api/v1/student/course/{course_id}/mark-complete
///
/// Adds to the completed set; marking twice is a no-op success. The id is
/// not checked against the course's content - a stale or foreign id is
/// stored and simply never counted on read.
pub async fn mark_complete(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(body): Json<MarkCompleteRequest>,
) -> ApiResult<Json<Value>> {
    let course_oid = ObjectId::parse_str(&course_id)?;
    let student_id = student.id.ok_or(ApiError::StudentNotFound)?;

    db::students::add_completed_content(&state.store, student_id, course_oid, &body.content_id)
        .await?;

    Ok(Json(json!({ "message": "Progress updated" })))
}

/// GET /api/v1/student/course/{course_id} - normalized course payload.
/// The enrollment gate is re-derived from the live set on every request.
pub async fn course_detail(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<PublicCourse>> {
    let course_oid = ObjectId::parse_str(&course_id)?;

    if !student.is_enrolled(&course_oid) {
        return Err(ApiError::Forbidden("Not enrolled in this course"));
    }

    let course = db::courses::find_by_id(&state.store, course_oid)
        .await?
        .ok_or(ApiError::CourseNotFound)?;

    Ok(Json(normalize_for_delivery(&course)))
}

/// GET /api/v1/student/progress - percentage per enrolled course,
/// recomputed fresh against the current content of each course
pub async fn progress_report(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Value>>> {
    let courses = db::courses::find_by_ids(&state.store, &student.enrolled_courses).await?;

    let rows = courses
        .iter()
        .filter_map(|course| {
            let course_id = course.id?;
            Some(json!({
                "course_id": course_id.to_hex(),
                "course_title": course.title,
                "percentage": progress_percentage(student.completed_ids(&course_id), course),
            }))
        })
        .collect();

    Ok(Json(rows))
}

/// GET /api/v1/student/dashboard-stats
pub async fn dashboard_stats(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let total = db::courses::count(&state.store).await?;
    let enrolled = db::courses::find_by_ids(&state.store, &student.enrolled_courses).await?;

    let completed = enrolled
        .iter()
        .filter(|course| match course.id {
            Some(course_id) => is_course_completed(student.completed_ids(&course_id), course),
            None => false,
        })
        .count();

    Ok(Json(json!({
        "total_courses_available": total,
        "enrolled_courses_count": student.enrolled_courses.len(),
        "completed_courses_count": completed,
    })))
}

/// GET /api/v1/student/certificates
pub async fn certificates(CurrentStudent(student): CurrentStudent) -> Json<Value> {
    let rows: Vec<Value> = student
        .certificates
        .iter()
        .map(|cert| {
            json!({
                "course_id": cert.course_id,
                "course_name": cert.course_name,
                "issued_date": cert.issued_date.to_rfc3339(),
            })
        })
        .collect();

    Json(json!({ "certificates": rows }))
}

#[derive(Debug, Deserialize)]
pub struct StudentMessageRequest {
    pub message: String,
}

/// POST /api/v1/student/messages
pub async fn send_message(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(body): Json<StudentMessageRequest>,
) -> ApiResult<Json<Value>> {
    let student_id = student.id.ok_or(ApiError::StudentNotFound)?;
    let message = Message::from_student(student_id, body.message);
    db::messages::insert(&state.store, &message).await?;

    Ok(Json(json!({ "message": "Message sent to admin successfully" })))
}

/// GET /api/v1/student/messages - admin messages addressed to this student
pub async fn inbox(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let student_id = student.id.ok_or(ApiError::StudentNotFound)?;
    let messages = db::messages::student_inbox(&state.store, student_id).await?;
    let rows: Vec<StudentInboxMessage> = messages.iter().map(StudentInboxMessage::from).collect();

    Ok(Json(json!({ "messages": rows })))
}

/// POST /api/v1/reviews/
pub async fn submit_review(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(body): Json<ReviewSubmission>,
) -> ApiResult<Json<Value>> {
    let student_id = student.id.ok_or(ApiError::StudentNotFound)?;
    let mut review = body.into_review(student_id)?;
    review.id = Some(ObjectId::new());
    db::reviews::insert(&state.store, &review).await?;

    Ok(Json(json!({
        "message": "Review submitted",
        "review_id": review.id.map(|id| id.to_hex()),
    })))
}
