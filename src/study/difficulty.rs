//! Per-enrollment difficulty configuration.

use rusqlite::Connection;
use serde::Deserialize;

use crate::db;
use crate::domain::DifficultyBucket;
use crate::error::StudyError;

#[derive(Debug, Clone, Deserialize)]
pub struct DifficultyEntry {
  pub name: String,
  pub minutes: i64,
}

/// Retune bucket intervals for an enrollment.
///
/// Every entry is validated before anything is written. Each valid
/// entry patches the existing bucket of the same name; an entry naming
/// a bucket the enrollment does not have is a silent no-op and never
/// inserts a new row.
pub fn configure_difficulties(
  conn: &Connection,
  user_id: i64,
  enrollment_id: i64,
  entries: &[DifficultyEntry],
) -> Result<(), StudyError> {
  for entry in entries {
    if entry.name.trim().is_empty() {
      return Err(StudyError::Validation("difficulty name must not be empty".into()));
    }
    if entry.minutes < 1 {
      return Err(StudyError::Validation(format!(
        "minutes for '{}' must be a positive integer",
        entry.name
      )));
    }
  }

  db::get_enrollment_by_id(conn, enrollment_id)?
    .filter(|e| e.user_id == user_id)
    .ok_or_else(|| StudyError::NotFound(format!("enrollment {}", enrollment_id)))?;

  for entry in entries {
    let changed = db::update_bucket_minutes(conn, enrollment_id, &entry.name, entry.minutes)?;
    if changed == 0 {
      tracing::debug!(
        enrollment_id,
        name = %entry.name,
        "ignoring config entry for unknown difficulty bucket"
      );
    }
  }
  Ok(())
}

/// The enrollment's buckets, ordered by minutes ascending.
pub fn get_difficulties_config(
  conn: &Connection,
  user_id: i64,
  enrollment_id: i64,
) -> Result<Vec<DifficultyBucket>, StudyError> {
  db::get_enrollment_by_id(conn, enrollment_id)?
    .filter(|e| e.user_id == user_id)
    .ok_or_else(|| StudyError::NotFound(format!("enrollment {}", enrollment_id)))?;

  Ok(db::get_buckets(conn, enrollment_id)?)
}
