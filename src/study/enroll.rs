//! Enrollment management: resolve or create the per-user, per-set
//! learning enrollment and open a fresh study session over it.

use rusqlite::Connection;
use serde::Serialize;

use crate::db;
use crate::domain::{Enrollment, EnrollmentStatus};
use crate::error::StudyError;
use crate::session::SessionStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartedStudy {
  pub session_token: String,
  pub enrollment_id: i64,
  pub total_cards: usize,
  pub current_index: usize,
}

/// Start a study run for (user, study set).
///
/// Bootstraps the enrollment on first contact (review rows + default
/// buckets, transactionally), resets a completed one, reuses an
/// in-progress one. Always mints a brand-new session; a resumed
/// enrollment seeds the session cursor from its processing index.
pub fn start_session(
  conn: &Connection,
  sessions: &SessionStore,
  user_id: i64,
  study_set_id: i64,
) -> Result<StartedStudy, StudyError> {
  let cards = db::get_flashcards(conn, study_set_id)?;
  if cards.is_empty() {
    return Err(StudyError::NotFound(format!(
      "study set {} has no flashcards",
      study_set_id
    )));
  }
  let card_ids: Vec<i64> = cards.iter().map(|c| c.id).collect();

  let enrollment = match db::find_enrollment(conn, user_id, study_set_id)? {
    None => {
      tracing::debug!(user_id, study_set_id, "bootstrapping new enrollment");
      bootstrap_enrollment(conn, user_id, study_set_id, &card_ids)?
    }
    Some(existing) if existing.status == EnrollmentStatus::Complete => {
      // Restart: reuse the old enrollment and its review rows/buckets
      db::reset_enrollment(conn, existing.id)?;
      Enrollment {
        processing_index: 0,
        status: EnrollmentStatus::InProgress,
        ..existing
      }
    }
    Some(existing) => existing,
  };

  let total_cards = card_ids.len();
  let token = sessions.create_session(user_id, study_set_id, card_ids);

  // Resume where the durable record left off. Clamp in case the set
  // shrank since the index was committed.
  let current_index = (enrollment.processing_index.max(0) as usize).min(total_cards);
  if current_index > 0 {
    sessions.update_index(&token, current_index);
  }

  Ok(StartedStudy {
    session_token: token,
    enrollment_id: enrollment.id,
    total_cards,
    current_index,
  })
}

/// Create the enrollment plus its review rows and default buckets as
/// one logical unit. A unique-constraint conflict means another call
/// won the race; its fully-bootstrapped row is fetched instead.
fn bootstrap_enrollment(
  conn: &Connection,
  user_id: i64,
  study_set_id: i64,
  card_ids: &[i64],
) -> Result<Enrollment, StudyError> {
  let tx = conn.unchecked_transaction()?;

  match db::insert_enrollment(&tx, user_id, study_set_id) {
    Ok(enrollment_id) => {
      db::bulk_insert_review_states(&tx, enrollment_id, card_ids)?;
      db::insert_default_buckets(&tx, enrollment_id)?;
      tx.commit()?;

      db::get_enrollment_by_id(conn, enrollment_id)?.ok_or_else(|| {
        StudyError::Inconsistency(format!(
          "enrollment {} vanished after bootstrap",
          enrollment_id
        ))
      })
    }
    Err(e) if is_unique_violation(&e) => {
      drop(tx);
      db::find_enrollment(conn, user_id, study_set_id)?.ok_or_else(|| {
        StudyError::Inconsistency(format!(
          "enrollment insert conflicted for user {} set {} but no row found",
          user_id, study_set_id
        ))
      })
    }
    Err(e) => Err(e.into()),
  }
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.code == rusqlite::ErrorCode::ConstraintViolation
  )
}
