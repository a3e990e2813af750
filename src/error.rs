//! Crate-wide error taxonomy for the study core.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbLockError;

#[derive(Debug)]
pub enum StudyError {
    /// Referenced study set, enrollment, flashcard or bucket does not
    /// exist, or a study set has no flashcards to start a session on.
    NotFound(String),
    /// Session token unknown or past its expiry; the caller must drop
    /// any held session reference and start again.
    SessionExpired,
    /// Malformed input, rejected before any mutation.
    Validation(String),
    /// A live session references an enrollment that cannot be found.
    /// Unreachable without a bug or manual data surgery.
    Inconsistency(String),
    Db(rusqlite::Error),
}

impl std::fmt::Display for StudyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "not found: {}", what),
            Self::SessionExpired => write!(f, "study session expired or unknown"),
            Self::Validation(msg) => write!(f, "invalid input: {}", msg),
            Self::Inconsistency(msg) => write!(f, "internal inconsistency: {}", msg),
            Self::Db(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StudyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Db(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StudyError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e)
    }
}

impl From<DbLockError> for StudyError {
    fn from(e: DbLockError) -> Self {
        Self::Inconsistency(e.to_string())
    }
}

impl IntoResponse for StudyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SessionExpired => StatusCode::GONE,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Inconsistency(_) | Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal details stay in the log, not in the response body
        let message = match &self {
            Self::Inconsistency(msg) => {
                tracing::error!("internal inconsistency: {}", msg);
                "internal server error".to_string()
            }
            Self::Db(e) => {
                tracing::error!("database error: {}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}
