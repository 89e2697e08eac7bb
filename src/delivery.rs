//! Content delivery gateway.
//!
//! Resolves a (student, course, content-id) triple to a safely bounded file
//! location plus transfer semantics. The enrollment gate and the path
//! containment check run on every request; nothing is cached between them.

use std::path::{Component, Path, PathBuf};

use crate::domain::{ContentItem, Course, Student};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Always attachment, for any file type
    Download,
    /// Inline where the browser can render it; see `disposition_for`
    View,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Attachment,
    Inline,
}

impl Disposition {
    pub fn header_value(&self, filename: &str) -> String {
        match self {
            Disposition::Attachment => format!("attachment; filename=\"{filename}\""),
            Disposition::Inline => format!("inline; filename=\"{filename}\""),
        }
    }
}

/// A resolved, access-checked file ready to be emitted.
#[derive(Debug)]
pub struct Deliverable {
    pub path: PathBuf,
    pub filename: String,
    pub content_type: &'static str,
    pub disposition: Disposition,
}

/// Resolve a content reference to a deliverable file.
///
/// Contract: enrollment gate, then content lookup among file items only,
/// then path containment, then existence. A traversal attempt surfaces as
/// `Forbidden`, never as a not-found.
pub fn resolve_deliverable(
    student: &Student,
    course: &Course,
    content_id: &str,
    mode: DeliveryMode,
    data_dir: &Path,
) -> ApiResult<Deliverable> {
    let course_id = course.id.ok_or(ApiError::CourseNotFound)?;
    if !student.is_enrolled(&course_id) {
        return Err(ApiError::Forbidden("Not enrolled in this course"));
    }

    // Only file items are deliverable; an embed with a matching id is
    // still ContentNotFound here.
    let (name, stored_path) = match course.find_content_item(content_id) {
        Some(ContentItem::File { name, path, .. }) => (name.clone(), path.replace('\\', "/")),
        _ => return Err(ApiError::ContentNotFound),
    };

    let stored = Path::new(&stored_path);
    let resolved = if stored.is_absolute() {
        stored.to_path_buf()
    } else {
        data_dir.join(stored)
    };
    let resolved = normalize_path(&resolved);

    let upload_root = normalize_path(&data_dir.join("uploads"));
    if resolved == upload_root || !resolved.starts_with(&upload_root) {
        return Err(ApiError::Forbidden("Access denied"));
    }

    if !resolved.exists() {
        return Err(ApiError::FileMissing);
    }

    Ok(Deliverable {
        path: resolved,
        content_type: content_type_for(&name),
        disposition: disposition_for(&name, mode),
        filename: name,
    })
}

/// Lexical `.`/`..` resolution with no filesystem access.
///
/// The containment check needs a stored "uploads/../secrets" to normalize
/// before the prefix test, whether or not anything exists at the path.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

const WORD_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Content type for a delivered file: fixed mappings for the document
/// formats the portal cares about, extension table for the rest.
pub fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") | Some("docx") => WORD_MIME,
        Some(ext) => guess_content_type(ext),
        None => "application/octet-stream",
    }
}

/// Extension-based MIME lookup, defaulting to an opaque binary type.
fn guess_content_type(ext: &str) -> &'static str {
    match ext {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "zip" => "application/zip",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Disposition rules: download always forces attachment; view renders
/// inline for PDF only. DOC/DOCX in view mode still comes back as an
/// attachment because browsers cannot preview it inline.
pub fn disposition_for(filename: &str, mode: DeliveryMode) -> Disposition {
    match mode {
        DeliveryMode::Download => Disposition::Attachment,
        DeliveryMode::View => match extension_of(filename).as_deref() {
            Some("pdf") => Disposition::Inline,
            _ => Disposition::Attachment,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use chrono::Utc;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn student_enrolled_in(course_id: ObjectId) -> Student {
        Student {
            id: Some(ObjectId::new()),
            full_name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "h".into(),
            date_of_birth: String::new(),
            gender: String::new(),
            security_question: String::new(),
            security_answer: String::new(),
            access_token: None,
            enrolled_courses: vec![course_id],
            progress: HashMap::new(),
            certificates: vec![],
            certificate_allowed: false,
        }
    }

    fn course_with_file(course_id: ObjectId, name: &str, stored_path: &str) -> Course {
        Course {
            id: Some(course_id),
            title: "t".into(),
            description: String::new(),
            created_at: Utc::now(),
            course_content: vec![ContentItem::File {
                content_id: "c1".into(),
                name: name.into(),
                path: stored_path.into(),
                uploaded_at: Utc::now(),
            }],
        }
    }

    /// Data dir with one uploaded file, returning (dir, stored relative path)
    fn data_dir_with_file(name: &str) -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        let rel = format!("uploads/{name}");
        std::fs::write(dir.path().join(&rel), b"file-bytes").unwrap();
        (dir, rel)
    }

    #[test]
    fn test_resolves_enrolled_student_file() {
        let course_id = ObjectId::new();
        let (dir, rel) = data_dir_with_file("abc_notes.pdf");
        let course = course_with_file(course_id, "notes.pdf", &rel);
        let student = student_enrolled_in(course_id);

        let deliverable =
            resolve_deliverable(&student, &course, "c1", DeliveryMode::Download, dir.path())
                .unwrap();
        assert_eq!(deliverable.filename, "notes.pdf");
        assert_eq!(deliverable.content_type, "application/pdf");
        assert_eq!(deliverable.disposition, Disposition::Attachment);
        assert!(deliverable.path.exists());
    }

    #[test]
    fn test_not_enrolled_is_forbidden_even_for_valid_paths() {
        let course_id = ObjectId::new();
        let (dir, rel) = data_dir_with_file("abc_notes.pdf");
        let course = course_with_file(course_id, "notes.pdf", &rel);
        // Enrolled in a different course entirely
        let student = student_enrolled_in(ObjectId::new());

        let err = resolve_deliverable(&student, &course, "c1", DeliveryMode::View, dir.path())
            .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_traversal_is_forbidden_not_missing() {
        let course_id = ObjectId::new();
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        // A secret outside the upload root that the traversal aims at
        std::fs::write(dir.path().join("secrets.txt"), b"top secret").unwrap();

        let course = course_with_file(course_id, "secrets.txt", "uploads/../secrets.txt");
        let student = student_enrolled_in(course_id);

        let err =
            resolve_deliverable(&student, &course, "c1", DeliveryMode::Download, dir.path())
                .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_backslash_traversal_also_rejected() {
        let course_id = ObjectId::new();
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
        std::fs::write(dir.path().join("secrets.txt"), b"top secret").unwrap();

        let course = course_with_file(course_id, "secrets.txt", "uploads\\..\\secrets.txt");
        let student = student_enrolled_in(course_id);

        let err =
            resolve_deliverable(&student, &course, "c1", DeliveryMode::Download, dir.path())
                .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_missing_file_is_file_missing() {
        let course_id = ObjectId::new();
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("uploads")).unwrap();

        let course = course_with_file(course_id, "gone.pdf", "uploads/abc_gone.pdf");
        let student = student_enrolled_in(course_id);

        let err =
            resolve_deliverable(&student, &course, "c1", DeliveryMode::Download, dir.path())
                .unwrap_err();
        assert!(matches!(err, ApiError::FileMissing));
    }

    #[test]
    fn test_embed_item_is_not_deliverable() {
        let course_id = ObjectId::new();
        let dir = TempDir::new().unwrap();
        let course = Course {
            id: Some(course_id),
            title: "t".into(),
            description: String::new(),
            created_at: Utc::now(),
            course_content: vec![ContentItem::Youtube {
                content_id: "c1".into(),
                url: "dQw4w9WgXcQ".into(),
                uploaded_at: Utc::now(),
            }],
        };
        let student = student_enrolled_in(course_id);

        let err =
            resolve_deliverable(&student, &course, "c1", DeliveryMode::Download, dir.path())
                .unwrap_err();
        assert!(matches!(err, ApiError::ContentNotFound));
    }

    #[test]
    fn test_unknown_content_id() {
        let course_id = ObjectId::new();
        let (dir, rel) = data_dir_with_file("abc_notes.pdf");
        let course = course_with_file(course_id, "notes.pdf", &rel);
        let student = student_enrolled_in(course_id);

        let err =
            resolve_deliverable(&student, &course, "nope", DeliveryMode::Download, dir.path())
                .unwrap_err();
        assert!(matches!(err, ApiError::ContentNotFound));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("data/uploads/../uploads/./a.pdf")),
            PathBuf::from("data/uploads/a.pdf")
        );
        assert_eq!(
            normalize_path(Path::new("data/uploads/../../etc/passwd")),
            PathBuf::from("etc/passwd")
        );
        assert_eq!(normalize_path(Path::new("/a/../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.PDF"), "application/pdf");
        assert_eq!(content_type_for("a.doc"), WORD_MIME);
        assert_eq!(content_type_for("a.docx"), WORD_MIME);
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.unknownext"), "application/octet-stream");
        assert_eq!(content_type_for("no-extension"), "application/octet-stream");
    }

    #[test]
    fn test_download_always_attachment() {
        for name in ["a.pdf", "a.docx", "a.png", "a.bin"] {
            assert_eq!(
                disposition_for(name, DeliveryMode::Download),
                Disposition::Attachment
            );
        }
    }

    #[test]
    fn test_view_inline_only_for_pdf() {
        assert_eq!(
            disposition_for("a.pdf", DeliveryMode::View),
            Disposition::Inline
        );
        // DOC/DOCX can never render inline
        assert_eq!(
            disposition_for("a.docx", DeliveryMode::View),
            Disposition::Attachment
        );
        assert_eq!(
            disposition_for("a.doc", DeliveryMode::View),
            Disposition::Attachment
        );
    }

    #[test]
    fn test_disposition_header_value() {
        assert_eq!(
            Disposition::Attachment.header_value("notes.pdf"),
            "attachment; filename=\"notes.pdf\""
        );
        assert_eq!(
            Disposition::Inline.header_value("notes.pdf"),
            "inline; filename=\"notes.pdf\""
        );
    }
}
