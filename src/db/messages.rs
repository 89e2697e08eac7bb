//! Message collection operations.

use bson::doc;
use bson::oid::ObjectId;
use futures_util::TryStreamExt;

use crate::db::{STUDENTS_COLLECTION, Store};
use crate::domain::Message;
use crate::domain::message::{AdminInboxMessage, SENDER_ADMIN, SENDER_STUDENT};
use crate::error::ApiResult;

pub async fn insert(store: &Store, message: &Message) -> ApiResult<()> {
    store.messages().insert_one(message).await?;
    Ok(())
}

/// Admin-sent messages addressed to one student, newest first.
pub async fn student_inbox(store: &Store, student_id: ObjectId) -> ApiResult<Vec<Message>> {
    Ok(store
        .messages()
        .find(doc! { "recipient_id": student_id, "sender_type": SENDER_ADMIN })
        .sort(doc! { "timestamp": -1 })
        .await?
        .try_collect()
        .await?)
}

/// Student-sent messages joined with each sender's name, newest first.
pub async fn admin_inbox(store: &Store) -> ApiResult<Vec<AdminInboxMessage>> {
    let pipeline = vec![
        doc! { "$match": { "sender_type": SENDER_STUDENT } },
        doc! { "$lookup": {
            "from": STUDENTS_COLLECTION,
            "localField": "sender_id",
            "foreignField": "_id",
            "as": "student_info",
        } },
        doc! { "$unwind": "$student_info" },
        doc! { "$sort": { "timestamp": -1 } },
        doc! { "$project": {
            "_id": 0,
            "message_id": { "$toString": "$_id" },
            "student_name": "$student_info.full_name",
            "message": "$message",
            "timestamp": { "$toString": "$timestamp" },
        } },
    ];

    let cursor = store.messages().aggregate(pipeline).await?;
    let rows: Vec<bson::Document> = cursor.try_collect().await?;
    rows.into_iter()
        .map(|doc| Ok(bson::from_document(doc)?))
        .collect()
}
