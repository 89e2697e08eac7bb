//! Messages between students and administrators.

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const SENDER_STUDENT: &str = "student";
pub const SENDER_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub sender_id: ObjectId,
    pub sender_type: String,
    /// Absent on student-to-admin messages (broadcast to the admin inbox)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<ObjectId>,
    pub recipient_type: String,
    pub message: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn from_student(sender_id: ObjectId, body: String) -> Self {
        Self {
            id: None,
            sender_id,
            sender_type: SENDER_STUDENT.to_string(),
            recipient_id: None,
            recipient_type: SENDER_ADMIN.to_string(),
            message: body,
            timestamp: Utc::now(),
        }
    }

    pub fn from_admin(sender_id: ObjectId, recipient_id: ObjectId, body: String) -> Self {
        Self {
            id: None,
            sender_id,
            sender_type: SENDER_ADMIN.to_string(),
            recipient_id: Some(recipient_id),
            recipient_type: SENDER_STUDENT.to_string(),
            message: body,
            timestamp: Utc::now(),
        }
    }
}

/// Student inbox row.
#[derive(Debug, Serialize)]
pub struct StudentInboxMessage {
    pub id: String,
    pub sender_id: String,
    pub message: String,
    pub timestamp: String,
}

impl From<&Message> for StudentInboxMessage {
    fn from(msg: &Message) -> Self {
        Self {
            id: msg.id.map(|id| id.to_hex()).unwrap_or_default(),
            sender_id: msg.sender_id.to_hex(),
            message: msg.message.clone(),
            timestamp: msg.timestamp.to_rfc3339(),
        }
    }
}

/// Admin inbox row: student message joined with the sender's name.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminInboxMessage {
    pub message_id: String,
    pub student_name: String,
    pub message: String,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_message_has_no_recipient() {
        let msg = Message::from_student(ObjectId::new(), "hello".into());
        assert_eq!(msg.sender_type, SENDER_STUDENT);
        assert_eq!(msg.recipient_type, SENDER_ADMIN);
        assert!(msg.recipient_id.is_none());

        let doc = bson::to_document(&msg).unwrap();
        assert!(!doc.contains_key("recipient_id"));
    }

    #[test]
    fn test_admin_message_is_addressed() {
        let recipient = ObjectId::new();
        let msg = Message::from_admin(ObjectId::new(), recipient, "hi".into());
        assert_eq!(msg.sender_type, SENDER_ADMIN);
        assert_eq!(msg.recipient_id, Some(recipient));
    }
}
