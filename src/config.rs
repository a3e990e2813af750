//! Application configuration constants.
//!
//! Centralizes the tunable values for sessions, paging and default
//! difficulty buckets, plus database path resolution.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            if let Some(db) = config.database {
                if let Some(path) = db.path {
                    tracing::info!("Using database from config.toml: {}", path);
                    return PathBuf::from(path);
                }
            }
        }
    }

    // Priority 2: .env DATABASE_PATH
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/cardbox.db");
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Session Configuration ====================

/// Absolute study-session lifetime in hours (fixed, not sliding)
pub const SESSION_EXPIRY_HOURS: i64 = 24;

/// Interval between background sweeps of expired sessions
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "study_session";

// ==================== Paging Configuration ====================

/// Smallest accepted page size for card issuance
pub const MIN_PAGE_LIMIT: usize = 1;

/// Largest accepted page size for card issuance
pub const MAX_PAGE_LIMIT: usize = 100;

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_LIMIT: usize = 10;

// ==================== Default Difficulty Buckets ====================

/// One entry of the default bucket template
pub struct BucketTemplate {
    pub name: &'static str,
    pub minutes: i64,
    /// Marks the canonical "mastered" tier
    pub is_mastery: bool,
}

/// Buckets created for every new enrollment. Users may retune the
/// minutes per enrollment afterwards; names and the mastery flag are
/// fixed at creation.
pub const DEFAULT_BUCKETS: [BucketTemplate; 4] = [
    BucketTemplate { name: "Easy", minutes: 10, is_mastery: true },
    BucketTemplate { name: "Medium", minutes: 20, is_mastery: false },
    BucketTemplate { name: "Hard", minutes: 30, is_mastery: false },
    BucketTemplate { name: "Very Hard", minutes: 60, is_mastery: false },
];
