//! Admin-facing handlers: course management, content upload, student
//! roster, certificate grants, fleet-wide statistics.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Form, Multipart, Path, State};
use axum::Json;
use bson::oid::ObjectId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth::CurrentAdmin;
use crate::db;
use crate::domain::course::normalize_for_delivery;
use crate::domain::message::AdminInboxMessage;
use crate::domain::progress::is_course_completed;
use crate::domain::review::ReviewView;
use crate::domain::{Certificate, ContentItem, Course, Message, PublicCourse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

// ==================== Dashboard & Roster ====================

/// GET /api/v1/admin/dashboard-stats
pub async fn dashboard_stats(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let total_students = db::students::count(&state.store).await?;
    let total_courses = db::courses::count(&state.store).await?;

    let students = db::students::list_all(&state.store).await?;
    let courses = db::courses::list_all(&state.store).await?;
    let courses_by_id: HashMap<ObjectId, &Course> = courses
        .iter()
        .filter_map(|course| course.id.map(|id| (id, course)))
        .collect();

    // Students with at least one fully completed course. Enrollments whose
    // course has been deleted count as nothing.
    let completed_students = students
        .iter()
        .filter(|student| {
            student.enrolled_courses.iter().any(|course_id| {
                courses_by_id.get(course_id).is_some_and(|course| {
                    is_course_completed(student.completed_ids(course_id), course)
                })
            })
        })
        .count();

    let trending_course = db::students::trending_course_title(&state.store)
        .await?
        .unwrap_or_else(|| "N/A".to_string());

    Ok(Json(json!({
        "total_students": total_students,
        "completed_students": completed_students,
        "total_courses": total_courses,
        "trending_course": trending_course,
    })))
}

/// Roster row: student annotated with enrollment and completion counts,
/// credentials and raw progress projected away.
#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub certificate_allowed: bool,
    pub enrolled_course_titles: Vec<String>,
    pub completed_courses_count: usize,
    pub total_enrolled_count: usize,
}

/// GET /api/v1/admin/students/
pub async fn student_roster(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RosterEntry>>> {
    let students = db::students::list_all(&state.store).await?;
    let courses = db::courses::list_all(&state.store).await?;
    let courses_by_id: HashMap<ObjectId, &Course> = courses
        .iter()
        .filter_map(|course| course.id.map(|id| (id, course)))
        .collect();

    let roster = students
        .iter()
        .map(|student| {
            let mut enrolled_course_titles = Vec::new();
            let mut completed_courses_count = 0;

            for course_id in &student.enrolled_courses {
                // Dangling enrollment: the course was deleted, skip it
                let Some(course) = courses_by_id.get(course_id) else {
                    continue;
                };
                enrolled_course_titles.push(course.title.clone());
                if is_course_completed(student.completed_ids(course_id), course) {
                    completed_courses_count += 1;
                }
            }

            RosterEntry {
                id: student.id.map(|id| id.to_hex()).unwrap_or_default(),
                full_name: student.full_name.clone(),
                email: student.email.clone(),
                date_of_birth: student.date_of_birth.clone(),
                gender: student.gender.clone(),
                certificate_allowed: student.certificate_allowed,
                enrolled_course_titles,
                completed_courses_count,
                total_enrolled_count: student.enrolled_courses.len(),
            }
        })
        .collect();

    Ok(Json(roster))
}

/// DELETE /api/v1/admin/students/{student_id}
pub async fn delete_student(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let student_oid = ObjectId::parse_str(&student_id)?;
    db::students::delete(&state.store, student_oid).await?;
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}

// ==================== Certificates ====================

#[derive(Debug, Deserialize)]
pub struct CertificateGrantForm {
    pub course_id: String,
}

/// POST /api/v1/admin/students/{student_id}/allow-certificate
///
/// Not gated on progress: a grant at 0% completion is valid. Repeated
/// grants append duplicate certificate records; they are not deduplicated.
pub async fn allow_certificate(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Form(form): Form<CertificateGrantForm>,
) -> ApiResult<Json<Value>> {
    let student_oid = ObjectId::parse_str(&student_id)?;
    let course_oid = ObjectId::parse_str(&form.course_id)?;

    let course = db::courses::find_by_id(&state.store, course_oid)
        .await?
        .ok_or(ApiError::CourseNotFound)?;

    let certificate = Certificate {
        course_id: course_oid.to_hex(),
        course_name: course.title,
        issued_date: Utc::now(),
    };

    if !db::students::grant_certificate(&state.store, student_oid, &certificate).await? {
        return Err(ApiError::StudentNotFound);
    }

    Ok(Json(json!({ "message": "Certificate access granted" })))
}

// ==================== Messaging & Reviews ====================

#[derive(Debug, Deserialize)]
pub struct AdminMessageRequest {
    pub student_id: String,
    pub message: String,
}

/// POST /api/v1/admin/messages
pub async fn send_message(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(body): Json<AdminMessageRequest>,
) -> ApiResult<Json<Value>> {
    let admin_id = admin.id.ok_or(ApiError::InvalidToken)?;
    let student_oid = ObjectId::parse_str(&body.student_id)?;

    if db::students::find_by_id(&state.store, student_oid)
        .await?
        .is_none()
    {
        return Err(ApiError::StudentNotFound);
    }

    let message = Message::from_admin(admin_id, student_oid, body.message);
    db::messages::insert(&state.store, &message).await?;

    Ok(Json(json!({ "message": "Message sent successfully" })))
}

/// GET /api/v1/admin/messages - student messages with sender names
pub async fn inbox(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AdminInboxMessage>>> {
    Ok(Json(db::messages::admin_inbox(&state.store).await?))
}

/// GET /api/v1/admin/reviews/ - all reviews with course titles attached
pub async fn list_reviews(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ReviewView>>> {
    Ok(Json(db::reviews::list_with_course_titles(&state.store).await?))
}

// ==================== Course Management ====================

/// GET /api/v1/admin/courses/ - full catalog including content
pub async fn list_courses(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PublicCourse>>> {
    let courses = db::courses::list_all(&state.store).await?;
    Ok(Json(courses.iter().map(normalize_for_delivery).collect()))
}

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// POST /api/v1/courses/no-file/ - create a course with no content yet
pub async fn create_course(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateCourseRequest>,
) -> ApiResult<Json<Value>> {
    let course = Course {
        id: Some(ObjectId::new()),
        title: body.title,
        description: body.description,
        created_at: Utc::now(),
        course_content: Vec::new(),
    };
    db::courses::insert(&state.store, &course).await?;

    tracing::info!("Created course '{}'", course.title);
    Ok(Json(json!({
        "message": "Course created successfully!",
        "course_id": course.id.map(|id| id.to_hex()),
    })))
}

/// DELETE /api/v1/admin/courses/{course_id}
///
/// Enrollments and progress keyed on the deleted id are left in place;
/// readers treat them as zero-content.
pub async fn delete_course(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let course_oid = ObjectId::parse_str(&course_id)?;
    db::courses::delete(&state.store, course_oid).await?;
    Ok(Json(json!({ "message": "Course deleted successfully" })))
}

// ==================== Content Upload ====================

fn bad_part(err: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Malformed multipart body: {err}"))
}

/// POST /api/v1/admin/upload - append one content item to a course.
///
/// Fields: `course_id`, then either a `content` file part or a
/// `youtube_link_upload` text field. File bytes are written once under the
/// upload root; the stored locator stays relative to the data directory.
pub async fn upload_content(
    _admin: CurrentAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut course_id: Option<String> = None;
    let mut upload: Option<(String, Bytes)> = None;
    let mut youtube_link: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_part)? {
        match field.name() {
            Some("course_id") => course_id = Some(field.text().await.map_err(bad_part)?),
            Some("content") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(bad_part)?;
                if !filename.is_empty() {
                    upload = Some((filename, data));
                }
            }
            Some("youtube_link_upload") => {
                let link = field.text().await.map_err(bad_part)?;
                if !link.trim().is_empty() {
                    youtube_link = Some(link);
                }
            }
            _ => {}
        }
    }

    let course_id =
        course_id.ok_or_else(|| ApiError::BadRequest("course_id is required".to_string()))?;
    let course_oid = ObjectId::parse_str(&course_id)?;

    if db::courses::find_by_id(&state.store, course_oid)
        .await?
        .is_none()
    {
        return Err(ApiError::CourseNotFound);
    }

    let item = match (upload, youtube_link) {
        (Some((filename, data)), _) => {
            let safe_name = sanitize_filename(&filename);
            if safe_name.is_empty() {
                return Err(ApiError::BadRequest("Unusable filename".to_string()));
            }

            let uploads_dir = state.uploads_dir();
            std::fs::create_dir_all(&uploads_dir)?;
            let stored_name = format!("{course_id}_{safe_name}");
            std::fs::write(uploads_dir.join(&stored_name), &data)?;
            tracing::info!("Stored upload {} ({} bytes)", stored_name, data.len());

            ContentItem::File {
                content_id: ObjectId::new().to_hex(),
                name: safe_name,
                path: format!("uploads/{stored_name}"),
                uploaded_at: Utc::now(),
            }
        }
        (None, Some(link)) => ContentItem::Youtube {
            content_id: ObjectId::new().to_hex(),
            url: link,
            uploaded_at: Utc::now(),
        },
        (None, None) => {
            return Err(ApiError::BadRequest(
                "File or YouTube link must be provided.".to_string(),
            ));
        }
    };

    db::courses::push_content(&state.store, course_oid, &item).await?;
    Ok(Json(json!({ "message": "Content uploaded successfully" })))
}

/// Keep alphanumerics, dot, underscore, hyphen and space; drop the rest.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("notes.pdf"), "notes.pdf");
        assert_eq!(sanitize_filename("week 1_intro-v2.docx"), "week 1_intro-v2.docx");
    }

    #[test]
    fn test_sanitize_strips_separators_and_specials() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "....etcpasswd");
        assert_eq!(sanitize_filename("a/b\\c.pdf"), "abc.pdf");
        assert_eq!(sanitize_filename("we'ird$(name).txt"), "weirdname.txt");
    }

    #[test]
    fn test_sanitize_trims_whitespace() {
        assert_eq!(sanitize_filename("  padded.pdf  "), "padded.pdf");
        assert_eq!(sanitize_filename("///"), "");
    }
}
