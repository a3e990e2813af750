//! Review scheduling: a submitted difficulty rating pushes the card's
//! next eligible review out by the bucket's interval.

use chrono::{Duration, Utc};
use rusqlite::Connection;

use crate::db;
use crate::error::StudyError;

/// Record a difficulty rating for a reviewed card.
///
/// Stamps the review time, records the bucket and sets
/// `next_review_at = now + bucket.minutes`. A mastery-bucket submission
/// marks the card learned; any other bucket leaves the learned flag as
/// previously recorded. Resubmitting just re-extends from "now".
pub fn submit_review(
  conn: &Connection,
  user_id: i64,
  enrollment_id: i64,
  flashcard_id: i64,
  difficulty_id: i64,
) -> Result<(), StudyError> {
  let enrollment = db::get_enrollment_by_id(conn, enrollment_id)?
    .filter(|e| e.user_id == user_id)
    .ok_or_else(|| StudyError::NotFound(format!("enrollment {}", enrollment_id)))?;

  let bucket = db::get_bucket_by_id(conn, difficulty_id)?
    .ok_or_else(|| StudyError::NotFound(format!("difficulty bucket {}", difficulty_id)))?;
  if bucket.enrollment_id != enrollment.id {
    return Err(StudyError::Validation(format!(
      "difficulty bucket {} does not belong to enrollment {}",
      difficulty_id, enrollment_id
    )));
  }

  let now = Utc::now();
  let next_review_at = now + Duration::minutes(bucket.minutes);
  let applied = db::apply_review(
    conn,
    enrollment.id,
    flashcard_id,
    bucket.id,
    now,
    next_review_at,
    bucket.is_mastery,
  )?;
  if !applied {
    return Err(StudyError::NotFound(format!(
      "no review state for flashcard {} in enrollment {}",
      flashcard_id, enrollment_id
    )));
  }

  tracing::debug!(
    enrollment_id,
    flashcard_id,
    bucket = %bucket.name,
    minutes = bucket.minutes,
    "review scheduled"
  );
  Ok(())
}
