//! Document store access.
//!
//! One `Store` handle wraps the MongoDB client and exposes the typed
//! collections. Per-collection operations live in the submodules; every
//! learner-document mutation is a single atomic update (add-to-set / push),
//! and no operation spans documents transactionally.

pub mod admins;
pub mod courses;
pub mod messages;
pub mod reviews;
pub mod students;

use bson::doc;
use mongodb::{Client, Collection, Database};

use crate::domain::{Admin, Course, Message, Review, Student};

pub const STUDENTS_COLLECTION: &str = "students";
pub const ADMINS_COLLECTION: &str = "admins";
pub const COURSES_COLLECTION: &str = "courses";
pub const REVIEWS_COLLECTION: &str = "reviews";
pub const MESSAGES_COLLECTION: &str = "messages";

/// Cloneable store handle; the underlying client pools connections.
#[derive(Clone)]
pub struct Store {
    db: Database,
}

impl Store {
    /// Connect and verify the connection with a ping.
    ///
    /// A short server-selection timeout keeps startup from hanging on an
    /// unreachable instance.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, mongodb::error::Error> {
        tracing::info!("Connecting to MongoDB at {}", uri);

        let timeout_uri = if uri.contains('?') {
            format!("{uri}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        } else {
            format!("{uri}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000")
        };

        let client = Client::with_uri_str(&timeout_uri).await?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }).await?;

        tracing::info!("Connected to MongoDB database '{}'", db_name);
        Ok(Self { db })
    }

    pub fn students(&self) -> Collection<Student> {
        self.db.collection(STUDENTS_COLLECTION)
    }

    pub fn admins(&self) -> Collection<Admin> {
        self.db.collection(ADMINS_COLLECTION)
    }

    pub fn courses(&self) -> Collection<Course> {
        self.db.collection(COURSES_COLLECTION)
    }

    pub fn reviews(&self) -> Collection<Review> {
        self.db.collection(REVIEWS_COLLECTION)
    }

    pub fn messages(&self) -> Collection<Message> {
        self.db.collection(MESSAGES_COLLECTION)
    }
}
