//! Enrollment persistence.
//!
//! One row per (user, study set), enforced by a unique constraint so a
//! racing pair of start calls degrades to insert-or-fetch.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::domain::{Enrollment, EnrollmentStatus};

pub fn insert_enrollment(conn: &Connection, user_id: i64, study_set_id: i64) -> Result<i64> {
  let now = Utc::now().to_rfc3339();
  conn.execute(
    r#"
    INSERT INTO enrollments (user_id, study_set_id, processing_index, status, created_at, updated_at)
    VALUES (?1, ?2, 0, 'in_progress', ?3, ?3)
    "#,
    params![user_id, study_set_id, now],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn find_enrollment(
  conn: &Connection,
  user_id: i64,
  study_set_id: i64,
) -> Result<Option<Enrollment>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, user_id, study_set_id, processing_index, status, created_at, updated_at
    FROM enrollments
    WHERE user_id = ?1 AND study_set_id = ?2
    "#,
  )?;

  let mut rows = stmt.query(params![user_id, study_set_id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_enrollment(row)?))
  } else {
    Ok(None)
  }
}

pub fn get_enrollment_by_id(conn: &Connection, id: i64) -> Result<Option<Enrollment>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, user_id, study_set_id, processing_index, status, created_at, updated_at
    FROM enrollments
    WHERE id = ?1
    "#,
  )?;

  let mut rows = stmt.query(params![id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_enrollment(row)?))
  } else {
    Ok(None)
  }
}

/// Commit the cursor position reached by the latest issued page.
pub fn update_processing_index(conn: &Connection, id: i64, index: i64) -> Result<()> {
  conn.execute(
    "UPDATE enrollments SET processing_index = ?1, updated_at = ?2 WHERE id = ?3",
    params![index, Utc::now().to_rfc3339(), id],
  )?;
  Ok(())
}

/// Reuse a completed enrollment for a fresh study run. Review rows and
/// buckets from the original run are kept as-is.
pub fn reset_enrollment(conn: &Connection, id: i64) -> Result<()> {
  conn.execute(
    "UPDATE enrollments SET processing_index = 0, status = 'in_progress', updated_at = ?1 WHERE id = ?2",
    params![Utc::now().to_rfc3339(), id],
  )?;
  Ok(())
}

pub fn mark_complete(conn: &Connection, id: i64) -> Result<()> {
  conn.execute(
    "UPDATE enrollments SET status = 'complete', updated_at = ?1 WHERE id = ?2",
    params![Utc::now().to_rfc3339(), id],
  )?;
  Ok(())
}

fn row_to_enrollment(row: &rusqlite::Row) -> Result<Enrollment> {
  let status_str: String = row.get(4)?;
  Ok(Enrollment {
    id: row.get(0)?,
    user_id: row.get(1)?,
    study_set_id: row.get(2)?,
    processing_index: row.get(3)?,
    status: EnrollmentStatus::from_str(&status_str).unwrap_or(EnrollmentStatus::InProgress),
    created_at: parse_timestamp(row.get::<_, String>(5)?),
    updated_at: parse_timestamp(row.get::<_, String>(6)?),
  })
}

fn parse_timestamp(s: String) -> DateTime<Utc> {
  DateTime::parse_from_rfc3339(&s)
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_insert_and_find() {
    let env = TestEnv::new().unwrap();
    let id = insert_enrollment(&env.conn, 1, 7).unwrap();

    let enrollment = find_enrollment(&env.conn, 1, 7).unwrap().unwrap();
    assert_eq!(enrollment.id, id);
    assert_eq!(enrollment.processing_index, 0);
    assert_eq!(enrollment.status, EnrollmentStatus::InProgress);
  }

  #[test]
  fn test_find_missing_returns_none() {
    let env = TestEnv::new().unwrap();
    assert!(find_enrollment(&env.conn, 1, 7).unwrap().is_none());
  }

  #[test]
  fn test_duplicate_insert_rejected() {
    let env = TestEnv::new().unwrap();
    insert_enrollment(&env.conn, 1, 7).unwrap();
    assert!(insert_enrollment(&env.conn, 1, 7).is_err());
  }

  #[test]
  fn test_same_user_different_sets_allowed() {
    let env = TestEnv::new().unwrap();
    insert_enrollment(&env.conn, 1, 7).unwrap();
    insert_enrollment(&env.conn, 1, 8).unwrap();
  }

  #[test]
  fn test_complete_then_reset() {
    let env = TestEnv::new().unwrap();
    let id = insert_enrollment(&env.conn, 1, 7).unwrap();
    update_processing_index(&env.conn, id, 4).unwrap();
    mark_complete(&env.conn, id).unwrap();

    let enrollment = get_enrollment_by_id(&env.conn, id).unwrap().unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::Complete);
    assert_eq!(enrollment.processing_index, 4);

    reset_enrollment(&env.conn, id).unwrap();
    let enrollment = get_enrollment_by_id(&env.conn, id).unwrap().unwrap();
    assert_eq!(enrollment.status, EnrollmentStatus::InProgress);
    assert_eq!(enrollment.processing_index, 0);
  }
}
