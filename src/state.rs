//! Application state passed to all handlers.

use std::path::PathBuf;

use crate::db::Store;

#[derive(Clone)]
pub struct AppState {
    /// Shared document store handle
    pub store: Store,

    /// Base data directory; stored relative content paths resolve against it
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(store: Store, data_dir: PathBuf) -> Self {
        Self { store, data_dir }
    }

    /// Upload root directory (`<data_dir>/uploads`)
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }
}
