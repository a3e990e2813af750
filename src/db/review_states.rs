//! Review-state persistence: the durable per-card progress of an
//! enrollment, one row per (enrollment, flashcard).

use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Result};

use crate::domain::ReviewState;

/// One review state joined with its flashcard content, as needed by
/// card issuance.
#[derive(Debug, Clone)]
pub struct WindowCard {
  pub flashcard_id: i64,
  pub position: i64,
  pub term: String,
  pub definition: String,
  pub image_url: Option<String>,
  pub is_learned: bool,
  pub next_review_at: Option<DateTime<Utc>>,
}

impl WindowCard {
  /// Due-or-new check, same rule as `ReviewState::is_due`.
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    match self.next_review_at {
      None => true,
      Some(at) => at <= now,
    }
  }
}

/// Create the all-null review rows for a fresh enrollment, one per
/// flashcard. Runs inside the caller's bootstrap transaction.
pub fn bulk_insert_review_states(
  conn: &Connection,
  enrollment_id: i64,
  flashcard_ids: &[i64],
) -> Result<()> {
  let mut stmt = conn.prepare(
    r#"
    INSERT INTO review_states (enrollment_id, flashcard_id, is_learned, difficulty_id, next_review_at, last_reviewed_at)
    VALUES (?1, ?2, 0, NULL, NULL, NULL)
    "#,
  )?;

  for flashcard_id in flashcard_ids {
    stmt.execute(params![enrollment_id, flashcard_id])?;
  }
  Ok(())
}

pub fn count_review_states(conn: &Connection, enrollment_id: i64) -> Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM review_states WHERE enrollment_id = ?1",
    params![enrollment_id],
    |row| row.get(0),
  )
}

pub fn get_review_state(
  conn: &Connection,
  enrollment_id: i64,
  flashcard_id: i64,
) -> Result<Option<ReviewState>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, enrollment_id, flashcard_id, is_learned, difficulty_id, next_review_at, last_reviewed_at
    FROM review_states
    WHERE enrollment_id = ?1 AND flashcard_id = ?2
    "#,
  )?;

  let mut rows = stmt.query(params![enrollment_id, flashcard_id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_review_state(row)?))
  } else {
    Ok(None)
  }
}

/// Load review states joined with flashcard content (and media, when
/// present) for the given window of flashcard ids. Row order is
/// unspecified; the issuance engine re-imposes the card-order sequence.
pub fn get_cards_in_window(
  conn: &Connection,
  enrollment_id: i64,
  flashcard_ids: &[i64],
) -> Result<Vec<WindowCard>> {
  if flashcard_ids.is_empty() {
    return Ok(Vec::new());
  }

  let placeholders = flashcard_ids
    .iter()
    .map(|_| "?")
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    r#"
    SELECT rs.flashcard_id, f.position, f.term, f.definition, m.image_url, rs.is_learned, rs.next_review_at
    FROM review_states rs
    JOIN flashcards f ON f.id = rs.flashcard_id
    LEFT JOIN media m ON m.id = f.media_id
    WHERE rs.enrollment_id = ? AND rs.flashcard_id IN ({})
    "#,
    placeholders
  );

  let mut stmt = conn.prepare(&sql)?;
  let bound = std::iter::once(enrollment_id).chain(flashcard_ids.iter().copied());

  let cards = stmt
    .query_map(params_from_iter(bound), |row| {
      let next_review_at: Option<String> = row.get(6)?;
      Ok(WindowCard {
        flashcard_id: row.get(0)?,
        position: row.get(1)?,
        term: row.get(2)?,
        definition: row.get(3)?,
        image_url: row.get(4)?,
        is_learned: row.get(5)?,
        next_review_at: next_review_at.and_then(parse_timestamp),
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

/// Commit one review: stamp the review time, record the chosen bucket
/// and push the next eligible time out by the bucket interval. The
/// learned flag only ever moves to true here (mastery submissions);
/// non-mastery submissions leave it as previously recorded.
///
/// Returns false when no row matched (enrollment, flashcard).
pub fn apply_review(
  conn: &Connection,
  enrollment_id: i64,
  flashcard_id: i64,
  difficulty_id: i64,
  reviewed_at: DateTime<Utc>,
  next_review_at: DateTime<Utc>,
  mastery: bool,
) -> Result<bool> {
  let changed = conn.execute(
    r#"
    UPDATE review_states
    SET difficulty_id = ?1,
        last_reviewed_at = ?2,
        next_review_at = ?3,
        is_learned = CASE WHEN ?4 THEN 1 ELSE is_learned END
    WHERE enrollment_id = ?5 AND flashcard_id = ?6
    "#,
    params![
      difficulty_id,
      reviewed_at.to_rfc3339(),
      next_review_at.to_rfc3339(),
      mastery,
      enrollment_id,
      flashcard_id,
    ],
  )?;
  Ok(changed > 0)
}

fn row_to_review_state(row: &rusqlite::Row) -> Result<ReviewState> {
  let next_review_at: Option<String> = row.get(5)?;
  let last_reviewed_at: Option<String> = row.get(6)?;

  Ok(ReviewState {
    id: row.get(0)?,
    enrollment_id: row.get(1)?,
    flashcard_id: row.get(2)?,
    is_learned: row.get(3)?,
    difficulty_id: row.get(4)?,
    next_review_at: next_review_at.and_then(parse_timestamp),
    last_reviewed_at: last_reviewed_at.and_then(parse_timestamp),
  })
}

fn parse_timestamp(s: String) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(&s)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
}
