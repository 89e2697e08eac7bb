//! Student collection operations.

use bson::oid::ObjectId;
use bson::{Document, doc};
use futures_util::TryStreamExt;

use crate::db::{COURSES_COLLECTION, Store};
use crate::domain::{Certificate, Student};
use crate::error::ApiResult;

pub async fn find_by_token(store: &Store, token: &str) -> ApiResult<Option<Student>> {
    Ok(store
        .students()
        .find_one(doc! { "access_token": token })
        .await?)
}

pub async fn find_by_email(store: &Store, email: &str) -> ApiResult<Option<Student>> {
    Ok(store.students().find_one(doc! { "email": email }).await?)
}

pub async fn find_by_id(store: &Store, id: ObjectId) -> ApiResult<Option<Student>> {
    Ok(store.students().find_one(doc! { "_id": id }).await?)
}

/// Insert a new student document. The caller mints the `_id`.
pub async fn insert(store: &Store, student: &Student) -> ApiResult<()> {
    store.students().insert_one(student).await?;
    Ok(())
}

/// `$set` the given profile fields on one student.
pub async fn set_fields(store: &Store, id: ObjectId, fields: Document) -> ApiResult<()> {
    store
        .students()
        .update_one(doc! { "_id": id }, doc! { "$set": fields })
        .await?;
    Ok(())
}

/// Overwrite the stored session token unconditionally (last write wins;
/// a concurrent login's older token becomes invalid immediately).
pub async fn set_access_token(store: &Store, id: ObjectId, token: &str) -> ApiResult<()> {
    set_fields(store, id, doc! { "access_token": token }).await
}

pub async fn delete(store: &Store, id: ObjectId) -> ApiResult<()> {
    store.students().delete_one(doc! { "_id": id }).await?;
    Ok(())
}

/// Add a course to the enrolled set. Atomic add-to-set: racing requests on
/// the same student cannot lose updates or duplicate the entry.
pub async fn enroll(store: &Store, student_id: ObjectId, course_id: ObjectId) -> ApiResult<()> {
    store
        .students()
        .update_one(
            doc! { "_id": student_id },
            doc! { "$addToSet": { "enrolled_courses": course_id } },
        )
        .await?;
    Ok(())
}

/// Add a content id to the per-course completed set. Idempotent by
/// construction; membership of the id in the course is deliberately not
/// checked here (stale ids are tolerated and never counted on read).
pub async fn add_completed_content(
    store: &Store,
    student_id: ObjectId,
    course_id: ObjectId,
    content_id: &str,
) -> ApiResult<()> {
    let mut set = Document::new();
    set.insert(format!("progress.{}", course_id.to_hex()), content_id);

    store
        .students()
        .update_one(doc! { "_id": student_id }, doc! { "$addToSet": set })
        .await?;
    Ok(())
}

/// Grant certificate access: one atomic update that flips the flag and
/// appends the snapshot record. Repeated grants append duplicates; that is
/// accepted behavior, not deduplicated.
///
/// Returns false when no student document matched.
pub async fn grant_certificate(
    store: &Store,
    student_id: ObjectId,
    certificate: &Certificate,
) -> ApiResult<bool> {
    let update = doc! {
        "$set": { "certificate_allowed": true },
        "$push": { "certificates": bson::to_bson(certificate)? },
    };

    let result = store
        .students()
        .update_one(doc! { "_id": student_id }, update)
        .await?;
    Ok(result.matched_count > 0)
}

pub async fn list_all(store: &Store) -> ApiResult<Vec<Student>> {
    Ok(store.students().find(doc! {}).await?.try_collect().await?)
}

pub async fn count(store: &Store) -> ApiResult<u64> {
    Ok(store.students().count_documents(doc! {}).await?)
}

/// Title of the course with the highest enrollment count across all
/// students, or None when nobody is enrolled in anything. Ties resolve to
/// the first group the store emits.
pub async fn trending_course_title(store: &Store) -> ApiResult<Option<String>> {
    let pipeline = vec![
        doc! { "$unwind": "$enrolled_courses" },
        doc! { "$group": { "_id": "$enrolled_courses", "count": { "$sum": 1 } } },
        doc! { "$sort": { "count": -1 } },
        doc! { "$limit": 1 },
        doc! { "$lookup": {
            "from": COURSES_COLLECTION,
            "localField": "_id",
            "foreignField": "_id",
            "as": "course_details",
        } },
        doc! { "$unwind": "$course_details" },
        doc! { "$project": { "_id": 0, "title": "$course_details.title" } },
    ];

    let mut cursor = store.students().aggregate(pipeline).await?;
    match cursor.try_next().await? {
        Some(doc) => Ok(doc.get_str("title").ok().map(str::to_string)),
        None => Ok(None),
    }
}
