//! Course documents and their learner-visible projections.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A course as stored in the catalog collection.
///
/// `course_content` is ordered and append-only: items are pushed, never
/// reordered or mutated in place, and `content_id` values are never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub course_content: Vec<ContentItem>,
}

/// One unit of course material: an uploaded file or an embedded video
/// reference. Closed sum type; `path` only exists on files and `url` only
/// on embeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    File {
        content_id: String,
        /// Original filename, display only
        name: String,
        /// Server-relative storage locator, e.g. "uploads/<course>_<file>"
        path: String,
        #[serde(with = "chrono_datetime_as_bson_datetime")]
        uploaded_at: DateTime<Utc>,
    },
    Youtube {
        content_id: String,
        /// Raw link or bare 11-character video-id token
        url: String,
        #[serde(with = "chrono_datetime_as_bson_datetime")]
        uploaded_at: DateTime<Utc>,
    },
}

impl ContentItem {
    pub fn content_id(&self) -> &str {
        match self {
            ContentItem::File { content_id, .. } => content_id,
            ContentItem::Youtube { content_id, .. } => content_id,
        }
    }
}

impl Course {
    /// Linear scan by `content_id`; first match wins.
    pub fn find_content_item(&self, content_id: &str) -> Option<&ContentItem> {
        self.course_content
            .iter()
            .find(|item| item.content_id() == content_id)
    }
}

/// Rewrite a bare video-id token into a canonical watch URL.
///
/// The token must be exactly 11 characters and, once hyphens and
/// underscores are dropped, non-empty and alphanumeric. Anything else
/// passes through unchanged. Best-effort heuristic, intentionally looser
/// than the real video-id alphabet.
pub fn canonical_youtube_url(url: &str) -> String {
    let stripped: String = url.chars().filter(|c| *c != '-' && *c != '_').collect();
    let looks_like_id = url.chars().count() == 11
        && !stripped.is_empty()
        && stripped.chars().all(char::is_alphanumeric);

    if looks_like_id {
        format!("https://www.youtube.com/watch?v={url}")
    } else {
        url.to_string()
    }
}

/// Catalog listing entry: a course with its content stripped.
#[derive(Debug, Serialize)]
pub struct CourseSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: course.title.clone(),
            description: course.description.clone(),
            created_at: course.created_at.to_rfc3339(),
        }
    }
}

/// Learner-visible course payload with per-item delivery derivations.
#[derive(Debug, Serialize)]
pub struct PublicCourse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub course_content: Vec<PublicContentItem>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PublicContentItem {
    File {
        content_id: String,
        name: String,
        path: String,
        uploaded_at: String,
        /// Derived at read time, never stored
        download_url: String,
        view_url: String,
    },
    Youtube {
        content_id: String,
        url: String,
        uploaded_at: String,
    },
}

/// Project a course into its learner-visible shape.
///
/// File items gain templated download/view URLs and forward-slash paths;
/// embed items get the canonical watch URL rewrite.
pub fn normalize_for_delivery(course: &Course) -> PublicCourse {
    let course_id = course.id.map(|id| id.to_hex()).unwrap_or_default();

    let course_content = course
        .course_content
        .iter()
        .map(|item| match item {
            ContentItem::File {
                content_id,
                name,
                path,
                uploaded_at,
            } => PublicContentItem::File {
                content_id: content_id.clone(),
                name: name.clone(),
                path: path.replace('\\', "/"),
                uploaded_at: uploaded_at.to_rfc3339(),
                download_url: format!(
                    "/api/v1/student/course/{course_id}/download/{content_id}"
                ),
                view_url: format!("/api/v1/student/course/{course_id}/view/{content_id}"),
            },
            ContentItem::Youtube {
                content_id,
                url,
                uploaded_at,
            } => PublicContentItem::Youtube {
                content_id: content_id.clone(),
                url: canonical_youtube_url(url),
                uploaded_at: uploaded_at.to_rfc3339(),
            },
        })
        .collect();

    PublicCourse {
        id: course_id,
        title: course.title.clone(),
        description: course.description.clone(),
        created_at: course.created_at.to_rfc3339(),
        course_content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_item(content_id: &str, name: &str) -> ContentItem {
        ContentItem::File {
            content_id: content_id.into(),
            name: name.into(),
            path: format!("uploads\\abc_{name}"),
            uploaded_at: Utc::now(),
        }
    }

    fn youtube_item(content_id: &str, url: &str) -> ContentItem {
        ContentItem::Youtube {
            content_id: content_id.into(),
            url: url.into(),
            uploaded_at: Utc::now(),
        }
    }

    fn course_with(items: Vec<ContentItem>) -> Course {
        Course {
            id: Some(ObjectId::new()),
            title: "Rust 101".into(),
            description: "intro".into(),
            created_at: Utc::now(),
            course_content: items,
        }
    }

    #[test]
    fn test_bare_video_id_rewritten() {
        assert_eq!(
            canonical_youtube_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_full_url_passes_through() {
        let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
        assert_eq!(canonical_youtube_url(url), url);
        assert_eq!(canonical_youtube_url("https://youtu.be/x"), "https://youtu.be/x");
    }

    #[test]
    fn test_eleven_chars_of_punctuation_not_rewritten() {
        // Dropping hyphens/underscores leaves nothing alphanumeric
        assert_eq!(canonical_youtube_url("-----------"), "-----------");
        assert_eq!(canonical_youtube_url("___________"), "___________");
        // Wrong length never rewrites
        assert_eq!(canonical_youtube_url("dQw4w9WgXc"), "dQw4w9WgXc");
        assert_eq!(canonical_youtube_url("dQw4w9WgXcQQ"), "dQw4w9WgXcQQ");
    }

    #[test]
    fn test_id_with_separators_rewritten() {
        assert_eq!(
            canonical_youtube_url("a-b_c1234De"),
            "https://www.youtube.com/watch?v=a-b_c1234De"
        );
    }

    #[test]
    fn test_find_content_item_first_match() {
        let course = course_with(vec![
            file_item("c1", "one.pdf"),
            youtube_item("c2", "dQw4w9WgXcQ"),
        ]);
        assert_eq!(course.find_content_item("c2").unwrap().content_id(), "c2");
        assert!(course.find_content_item("missing").is_none());
    }

    #[test]
    fn test_tagged_serialization() {
        let item = file_item("c1", "notes.pdf");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "file");
        assert_eq!(json["content_id"], "c1");
        assert!(json.get("url").is_none());

        let embed = youtube_item("c2", "dQw4w9WgXcQ");
        let json = serde_json::to_value(&embed).unwrap();
        assert_eq!(json["type"], "youtube");
        assert!(json.get("path").is_none());
    }

    #[test]
    fn test_normalize_derives_urls_and_slashes() {
        let course = course_with(vec![file_item("c1", "notes.pdf")]);
        let course_id = course.id.unwrap().to_hex();
        let public = normalize_for_delivery(&course);

        match &public.course_content[0] {
            PublicContentItem::File {
                path,
                download_url,
                view_url,
                ..
            } => {
                assert!(!path.contains('\\'));
                assert_eq!(
                    download_url,
                    &format!("/api/v1/student/course/{course_id}/download/c1")
                );
                assert_eq!(
                    view_url,
                    &format!("/api/v1/student/course/{course_id}/view/c1")
                );
            }
            other => panic!("expected file item, got {other:?}"),
        }
    }

    #[test]
    fn test_normalize_rewrites_embed_urls() {
        let course = course_with(vec![youtube_item("c1", "dQw4w9WgXcQ")]);
        let public = normalize_for_delivery(&course);
        match &public.course_content[0] {
            PublicContentItem::Youtube { url, .. } => {
                assert_eq!(url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
            }
            other => panic!("expected youtube item, got {other:?}"),
        }
    }
}
