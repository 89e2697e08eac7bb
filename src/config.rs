//! Application configuration.
//!
//! Values are resolved with the priority: config.toml > environment (.env
//! loaded first) > built-in default.

use serde::Deserialize;

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    uri: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    port: Option<u16>,
}

// ==================== Database Configuration ====================

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DB_NAME: &str = "online_course_portal";

fn file_config() -> Option<AppConfig> {
    let contents = std::fs::read_to_string("config.toml").ok()?;
    toml::from_str(&contents).ok()
}

/// MongoDB connection string, priority: config.toml > MONGODB_URI > default
pub fn mongodb_uri() -> String {
    let _ = dotenvy::dotenv();

    if let Some(uri) = file_config().and_then(|c| c.database).and_then(|d| d.uri) {
        tracing::info!("Using MongoDB URI from config.toml");
        return uri;
    }

    if let Ok(uri) = std::env::var("MONGODB_URI") {
        tracing::info!("Using MongoDB URI from MONGODB_URI env");
        return uri;
    }

    DEFAULT_MONGODB_URI.to_string()
}

/// Database name, priority: config.toml > MONGODB_DB > default
pub fn db_name() -> String {
    if let Some(name) = file_config().and_then(|c| c.database).and_then(|d| d.name) {
        return name;
    }

    std::env::var("MONGODB_DB").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string())
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Server port, priority: config.toml > PORT > default
pub fn server_port() -> u16 {
    if let Some(port) = file_config().and_then(|c| c.server).and_then(|s| s.port) {
        return port;
    }

    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, server_port())
}

// ==================== Auth Configuration ====================

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LENGTH: usize = 4;

/// Length of generated access tokens
pub const ACCESS_TOKEN_LENGTH: usize = 32;
