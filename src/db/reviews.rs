//! Review collection operations.

use bson::doc;
use futures_util::TryStreamExt;

use crate::db::{COURSES_COLLECTION, Store};
use crate::domain::Review;
use crate::domain::review::ReviewView;
use crate::error::ApiResult;

pub async fn insert(store: &Store, review: &Review) -> ApiResult<()> {
    store.reviews().insert_one(review).await?;
    Ok(())
}

/// All reviews newest first, each joined with its course title. The unwind
/// preserves reviews whose course has been deleted (title comes back None).
pub async fn list_with_course_titles(store: &Store) -> ApiResult<Vec<ReviewView>> {
    let pipeline = vec![
        doc! { "$sort": { "created_at": -1 } },
        doc! { "$lookup": {
            "from": COURSES_COLLECTION,
            "localField": "course_id",
            "foreignField": "_id",
            "as": "course_info",
        } },
        doc! { "$unwind": { "path": "$course_info", "preserveNullAndEmptyArrays": true } },
        doc! { "$project": {
            "_id": { "$toString": "$_id" },
            "course_title": "$course_info.title",
            "student_name": "$student_name",
            "rating": "$rating",
            "comment": "$comment",
            "created_at": { "$toString": "$created_at" },
        } },
    ];

    let cursor = store.reviews().aggregate(pipeline).await?;
    let rows: Vec<bson::Document> = cursor.try_collect().await?;
    rows.into_iter()
        .map(|doc| Ok(bson::from_document(doc)?))
        .collect()
}
