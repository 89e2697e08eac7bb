//! Course catalog operations.

use bson::oid::ObjectId;
use bson::doc;
use futures_util::TryStreamExt;

use crate::db::Store;
use crate::domain::{ContentItem, Course};
use crate::error::ApiResult;

pub async fn find_by_id(store: &Store, id: ObjectId) -> ApiResult<Option<Course>> {
    Ok(store.courses().find_one(doc! { "_id": id }).await?)
}

pub async fn list_all(store: &Store) -> ApiResult<Vec<Course>> {
    Ok(store.courses().find(doc! {}).await?.try_collect().await?)
}

/// Fetch only the courses in the given id set (a student's enrollments).
/// Ids of courses that no longer exist simply produce no row.
pub async fn find_by_ids(store: &Store, ids: &[ObjectId]) -> ApiResult<Vec<Course>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Ok(store
        .courses()
        .find(doc! { "_id": { "$in": ids.to_vec() } })
        .await?
        .try_collect()
        .await?)
}

pub async fn insert(store: &Store, course: &Course) -> ApiResult<()> {
    store.courses().insert_one(course).await?;
    Ok(())
}

/// Append one content item. The content sequence is append-only; nothing
/// ever rewrites or reorders existing entries.
pub async fn push_content(
    store: &Store,
    course_id: ObjectId,
    item: &ContentItem,
) -> ApiResult<()> {
    store
        .courses()
        .update_one(
            doc! { "_id": course_id },
            doc! { "$push": { "course_content": bson::to_bson(item)? } },
        )
        .await?;
    Ok(())
}

pub async fn delete(store: &Store, id: ObjectId) -> ApiResult<()> {
    store.courses().delete_one(doc! { "_id": id }).await?;
    Ok(())
}

pub async fn count(store: &Store) -> ApiResult<u64> {
    Ok(store.courses().count_documents(doc! {}).await?)
}
