//! Student and admin account documents.
//!
//! Fields that may be absent on documents written by older versions use
//! serde defaults, so reads stay tolerant of the schemaless store.

use std::collections::HashMap;

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A learner account.
///
/// `enrolled_courses` has set semantics (mutated only via atomic add-to-set)
/// and `progress` maps course-id hex strings to the set of completed
/// content-item ids. Both may reference courses that have since been
/// deleted; readers tolerate the dangling ids and count them as nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub security_question: String,
    #[serde(default)]
    pub security_answer: String,
    /// Opaque bearer credential; single-valued, overwritten on every login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub enrolled_courses: Vec<ObjectId>,
    #[serde(default)]
    pub progress: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    /// Set only by an administrator action, never derived from progress
    #[serde(default)]
    pub certificate_allowed: bool,
}

impl Student {
    pub fn is_enrolled(&self, course_id: &ObjectId) -> bool {
        self.enrolled_courses.contains(course_id)
    }

    /// Completed content-item ids for a course (empty when never touched)
    pub fn completed_ids(&self, course_id: &ObjectId) -> &[String] {
        self.progress
            .get(&course_id.to_hex())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Certificate record appended by an administrator grant.
/// The course title is snapshotted, not a live reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub course_id: String,
    pub course_name: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub issued_date: DateTime<Utc>,
}

/// An administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub security_question: String,
    #[serde(default)]
    pub security_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Learner-visible profile: a projection that never carries the password
/// hash or the session token.
#[derive(Debug, Serialize)]
pub struct StudentProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub security_question: String,
    pub enrolled_courses: Vec<String>,
    pub certificate_allowed: bool,
}

impl From<&Student> for StudentProfile {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: student.full_name.clone(),
            email: student.email.clone(),
            date_of_birth: student.date_of_birth.clone(),
            gender: student.gender.clone(),
            security_question: student.security_question.clone(),
            enrolled_courses: student
                .enrolled_courses
                .iter()
                .map(|id| id.to_hex())
                .collect(),
            certificate_allowed: student.certificate_allowed,
        }
    }
}

/// Admin-visible profile projection, same credential-stripping rule.
#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub date_of_birth: String,
    pub gender: String,
    pub security_question: String,
}

impl From<&Admin> for AdminProfile {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id.map(|id| id.to_hex()).unwrap_or_default(),
            full_name: admin.full_name.clone(),
            email: admin.email.clone(),
            date_of_birth: admin.date_of_birth.clone(),
            gender: admin.gender.clone(),
            security_question: admin.security_question.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_student() -> Student {
        Student {
            id: Some(ObjectId::new()),
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            date_of_birth: "1815-12-10".into(),
            gender: "female".into(),
            security_question: "First algorithm?".into(),
            security_answer: "notes".into(),
            access_token: Some("token-123".into()),
            enrolled_courses: vec![],
            progress: HashMap::new(),
            certificates: vec![],
            certificate_allowed: false,
        }
    }

    #[test]
    fn test_profile_strips_credentials() {
        let student = sample_student();
        let profile = StudentProfile::from(&student);
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("token-123"));
        assert!(json.contains("ada@example.com"));
    }

    #[test]
    fn test_completed_ids_default_empty() {
        let student = sample_student();
        let course_id = ObjectId::new();
        assert!(student.completed_ids(&course_id).is_empty());
        assert!(!student.is_enrolled(&course_id));
    }

    #[test]
    fn test_deserializes_sparse_document() {
        // Documents written before progress tracking existed lack most fields
        let doc = bson::doc! {
            "_id": ObjectId::new(),
            "full_name": "Sparse",
            "email": "sparse@example.com",
            "password_hash": "h",
        };
        let student: Student = bson::from_document(doc).unwrap();
        assert!(student.enrolled_courses.is_empty());
        assert!(student.progress.is_empty());
        assert!(student.certificates.is_empty());
        assert!(!student.certificate_allowed);
        assert!(student.access_token.is_none());
    }

    #[test]
    fn test_insert_shape_omits_missing_token() {
        let mut student = sample_student();
        student.access_token = None;
        let doc = bson::to_document(&student).unwrap();
        assert!(!doc.contains_key("access_token"));
    }
}
