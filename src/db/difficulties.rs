//! Difficulty-bucket persistence. Buckets are scoped to one enrollment
//! and only their minutes are mutable after creation.

use rusqlite::{params, Connection, Result};

use crate::config;
use crate::domain::DifficultyBucket;

/// Insert the default bucket template for a fresh enrollment. Runs
/// inside the caller's bootstrap transaction.
pub fn insert_default_buckets(conn: &Connection, enrollment_id: i64) -> Result<()> {
  let mut stmt = conn.prepare(
    "INSERT INTO difficulties (enrollment_id, name, minutes, is_mastery) VALUES (?1, ?2, ?3, ?4)",
  )?;

  for bucket in &config::DEFAULT_BUCKETS {
    stmt.execute(params![enrollment_id, bucket.name, bucket.minutes, bucket.is_mastery])?;
  }
  Ok(())
}

/// All buckets of an enrollment, ordered by minutes ascending.
pub fn get_buckets(conn: &Connection, enrollment_id: i64) -> Result<Vec<DifficultyBucket>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, enrollment_id, name, minutes, is_mastery
    FROM difficulties
    WHERE enrollment_id = ?1
    ORDER BY minutes ASC
    "#,
  )?;

  let buckets = stmt
    .query_map(params![enrollment_id], row_to_bucket)?
    .collect::<Result<Vec<_>>>()?;
  Ok(buckets)
}

pub fn get_bucket_by_id(conn: &Connection, id: i64) -> Result<Option<DifficultyBucket>> {
  let mut stmt = conn.prepare(
    "SELECT id, enrollment_id, name, minutes, is_mastery FROM difficulties WHERE id = ?1",
  )?;

  let mut rows = stmt.query(params![id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_bucket(row)?))
  } else {
    Ok(None)
  }
}

/// Patch the interval of the bucket matching (enrollment, name).
/// Returns the number of rows touched; zero means no such bucket, which
/// configuration treats as a silent no-op rather than an insert.
pub fn update_bucket_minutes(
  conn: &Connection,
  enrollment_id: i64,
  name: &str,
  minutes: i64,
) -> Result<usize> {
  conn.execute(
    "UPDATE difficulties SET minutes = ?1 WHERE enrollment_id = ?2 AND name = ?3",
    params![minutes, enrollment_id, name],
  )
}

fn row_to_bucket(row: &rusqlite::Row) -> Result<DifficultyBucket> {
  Ok(DifficultyBucket {
    id: row.get(0)?,
    enrollment_id: row.get(1)?,
    name: row.get(2)?,
    minutes: row.get(3)?,
    is_mastery: row.get(4)?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::enrollments;
  use crate::testing::TestEnv;

  #[test]
  fn test_defaults_inserted_in_minutes_order() {
    let env = TestEnv::new().unwrap();
    let enrollment_id = enrollments::insert_enrollment(&env.conn, 1, 1).unwrap();
    insert_default_buckets(&env.conn, enrollment_id).unwrap();

    let buckets = get_buckets(&env.conn, enrollment_id).unwrap();
    let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["Easy", "Medium", "Hard", "Very Hard"]);
    let minutes: Vec<i64> = buckets.iter().map(|b| b.minutes).collect();
    assert_eq!(minutes, vec![10, 20, 30, 60]);
  }

  #[test]
  fn test_exactly_one_mastery_bucket() {
    let env = TestEnv::new().unwrap();
    let enrollment_id = enrollments::insert_enrollment(&env.conn, 1, 1).unwrap();
    insert_default_buckets(&env.conn, enrollment_id).unwrap();

    let buckets = get_buckets(&env.conn, enrollment_id).unwrap();
    let mastery: Vec<&str> = buckets
      .iter()
      .filter(|b| b.is_mastery)
      .map(|b| b.name.as_str())
      .collect();
    assert_eq!(mastery, vec!["Easy"]);
  }

  #[test]
  fn test_update_minutes_existing_bucket() {
    let env = TestEnv::new().unwrap();
    let enrollment_id = enrollments::insert_enrollment(&env.conn, 1, 1).unwrap();
    insert_default_buckets(&env.conn, enrollment_id).unwrap();

    let changed = update_bucket_minutes(&env.conn, enrollment_id, "Easy", 5).unwrap();
    assert_eq!(changed, 1);

    let buckets = get_buckets(&env.conn, enrollment_id).unwrap();
    let easy = buckets.iter().find(|b| b.name == "Easy").unwrap();
    assert_eq!(easy.minutes, 5);
    // Mastery flag survives reconfiguration
    assert!(easy.is_mastery);
  }

  #[test]
  fn test_update_minutes_unknown_bucket_is_noop() {
    let env = TestEnv::new().unwrap();
    let enrollment_id = enrollments::insert_enrollment(&env.conn, 1, 1).unwrap();
    insert_default_buckets(&env.conn, enrollment_id).unwrap();

    let changed = update_bucket_minutes(&env.conn, enrollment_id, "Impossible", 1).unwrap();
    assert_eq!(changed, 0);
    // No new row appeared
    assert_eq!(get_buckets(&env.conn, enrollment_id).unwrap().len(), 4);
  }

  #[test]
  fn test_buckets_scoped_per_enrollment() {
    let env = TestEnv::new().unwrap();
    let a = enrollments::insert_enrollment(&env.conn, 1, 1).unwrap();
    let b = enrollments::insert_enrollment(&env.conn, 2, 1).unwrap();
    insert_default_buckets(&env.conn, a).unwrap();
    insert_default_buckets(&env.conn, b).unwrap();

    update_bucket_minutes(&env.conn, a, "Hard", 90).unwrap();

    let hard_b = get_buckets(&env.conn, b)
      .unwrap()
      .into_iter()
      .find(|bucket| bucket.name == "Hard")
      .unwrap();
    assert_eq!(hard_b.minutes, 30);
  }
}
