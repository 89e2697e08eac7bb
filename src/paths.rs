//! Project path functions - single source of truth for file locations.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//! - `PORT`: Override the server port (see config.rs)

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// Upload root: all course files live below this directory.
/// The delivery gateway rejects any resolved path that escapes it.
pub fn uploads_dir() -> PathBuf {
    PathBuf::from(data_dir()).join("uploads")
}

#[cfg(test)]
mod tests {
    use super::*;

    // OnceLock initializes once, so env override can't be exercised here;
    // these verify the default shape.

    #[test]
    fn test_data_dir_default() {
        let dir = data_dir();
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_uploads_dir_under_data_dir() {
        let dir = uploads_dir();
        assert!(dir.starts_with(data_dir()));
        assert!(dir.ends_with("uploads"));
    }
}
