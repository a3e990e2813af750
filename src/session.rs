//! In-memory study-session storage.
//!
//! A session caches a fixed flashcard ordering plus a cursor for one
//! study run, keyed by an opaque random token. It is deliberately not
//! durable: everything in it can be rebuilt from the enrollment's
//! review-state rows, so losing a session only costs the client a fresh
//! start call. Sessions expire a fixed 24h after creation and are
//! dropped lazily on access plus by an hourly sweep (see main.rs).
//!
//! The store is injectable state rather than a module-level global so a
//! multi-instance deployment can swap it for a shared cache.

use crate::config;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// Snapshot of one study run: fixed card order plus cursor.
#[derive(Debug, Clone)]
pub struct StudySession {
  pub user_id: i64,
  pub study_set_id: i64,
  /// Flashcard ids in canonical order, frozen at session start.
  pub card_order: Vec<i64>,
  pub current_index: usize,
  pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
  // One lock for the whole map also serializes cursor updates for a
  // single session; racing next/prev on one token is last-writer-wins.
  sessions: Mutex<HashMap<String, StudySession>>,
}

impl SessionStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Snapshot `card_order` into a new session and hand back its token.
  ///
  /// The token is random and carries no enrollment information.
  pub fn create_session(&self, user_id: i64, study_set_id: i64, card_order: Vec<i64>) -> String {
    let token = generate_token();
    let session = StudySession {
      user_id,
      study_set_id,
      card_order,
      current_index: 0,
      expires_at: Utc::now() + Duration::hours(config::SESSION_EXPIRY_HOURS),
    };

    let mut sessions = self.sessions.lock().expect("Session store lock poisoned");
    sessions.insert(token.clone(), session);
    token
  }

  /// Look up a session, lazily deleting it if already expired.
  pub fn get_session(&self, token: &str) -> Option<StudySession> {
    let mut sessions = self.sessions.lock().expect("Session store lock poisoned");

    match sessions.get(token) {
      None => None,
      Some(session) if Utc::now() > session.expires_at => {
        sessions.remove(token);
        None
      }
      Some(session) => Some(session.clone()),
    }
  }

  /// Move the cursor. Returns false for an unknown token.
  pub fn update_index(&self, token: &str, new_index: usize) -> bool {
    let mut sessions = self.sessions.lock().expect("Session store lock poisoned");
    match sessions.get_mut(token) {
      Some(session) => {
        session.current_index = new_index;
        true
      }
      None => false,
    }
  }

  /// Explicit end of a study run.
  pub fn delete_session(&self, token: &str) {
    let mut sessions = self.sessions.lock().expect("Session store lock poisoned");
    sessions.remove(token);
  }

  /// Drop every expired session, returning how many were removed.
  /// Bounds memory growth from abandoned study runs.
  pub fn sweep(&self) -> usize {
    let mut sessions = self.sessions.lock().expect("Session store lock poisoned");
    let before = sessions.len();
    let now = Utc::now();
    sessions.retain(|_, session| now <= session.expires_at);
    before - sessions.len()
  }

  #[cfg(test)]
  pub fn force_expire(&self, token: &str) {
    let mut sessions = self.sessions.lock().expect("Session store lock poisoned");
    if let Some(session) = sessions.get_mut(token) {
      session.expires_at = Utc::now() - Duration::seconds(1);
    }
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.sessions.lock().expect("Session store lock poisoned").len()
  }
}

/// Generate a 32-character alphanumeric session token.
fn generate_token() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}
