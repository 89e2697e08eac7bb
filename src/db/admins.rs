//! Admin collection operations.

use bson::oid::ObjectId;
use bson::{Document, doc};

use crate::db::Store;
use crate::domain::Admin;
use crate::error::ApiResult;

pub async fn find_by_token(store: &Store, token: &str) -> ApiResult<Option<Admin>> {
    Ok(store
        .admins()
        .find_one(doc! { "access_token": token })
        .await?)
}

pub async fn find_by_email(store: &Store, email: &str) -> ApiResult<Option<Admin>> {
    Ok(store.admins().find_one(doc! { "email": email }).await?)
}

pub async fn insert(store: &Store, admin: &Admin) -> ApiResult<()> {
    store.admins().insert_one(admin).await?;
    Ok(())
}

pub async fn set_fields(store: &Store, id: ObjectId, fields: Document) -> ApiResult<()> {
    store
        .admins()
        .update_one(doc! { "_id": id }, doc! { "$set": fields })
        .await?;
    Ok(())
}

pub async fn set_access_token(store: &Store, id: ObjectId, token: &str) -> ApiResult<()> {
    set_fields(store, id, doc! { "access_token": token }).await
}

pub async fn delete(store: &Store, id: ObjectId) -> ApiResult<()> {
    store.admins().delete_one(doc! { "_id": id }).await?;
    Ok(())
}
