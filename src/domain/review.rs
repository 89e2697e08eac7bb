//! Course reviews.
//!
//! Reviews have an independent lifecycle: they snapshot the student display
//! name and survive deletion of either the course or the author.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub course_id: ObjectId,
    pub student_id: ObjectId,
    /// Display-name snapshot, not a live reference
    pub student_name: String,
    pub rating: i32,
    pub comment: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Review submission payload.
#[derive(Debug, Deserialize)]
pub struct ReviewSubmission {
    pub course_id: String,
    pub student_name: String,
    pub rating: i32,
    pub comment: String,
}

impl ReviewSubmission {
    /// Validate and convert into a storable document for the given author.
    pub fn into_review(self, student_id: ObjectId) -> ApiResult<Review> {
        if !(1..=5).contains(&self.rating) {
            return Err(ApiError::BadRequest(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(Review {
            id: None,
            course_id: ObjectId::parse_str(&self.course_id)?,
            student_id,
            student_name: self.student_name,
            rating: self.rating,
            comment: self.comment,
            created_at: Utc::now(),
        })
    }
}

/// Admin listing row: review joined with its course title.
/// `course_title` is None when the course has since been deleted.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewView {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub course_title: Option<String>,
    pub student_name: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
}
