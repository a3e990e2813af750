//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::DbPool;
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// Durable store: enrollments, review states, buckets, content
    pub db: DbPool,

    /// Ephemeral study sessions (injectable; swap for a shared cache
    /// when running more than one instance)
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(db: DbPool) -> Self {
        Self {
            db,
            sessions: Arc::new(SessionStore::new()),
        }
    }
}
