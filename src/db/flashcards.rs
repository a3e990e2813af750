//! Read access to study-set content.
//!
//! Study-set and flashcard CRUD belongs to the content service; this
//! module only implements the provider contract the study core needs:
//! ordered card reads and media URL resolution.

use rusqlite::{params, Connection, Result};

use crate::domain::Flashcard;

/// All flashcards of a study set, ordered by position.
pub fn get_flashcards(conn: &Connection, study_set_id: i64) -> Result<Vec<Flashcard>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, study_set_id, position, term, definition, media_id
    FROM flashcards
    WHERE study_set_id = ?1
    ORDER BY position ASC
    "#,
  )?;

  let cards = stmt
    .query_map(params![study_set_id], row_to_flashcard)?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

/// Resolve a media id to its URL. Absent media never blocks issuance.
pub fn resolve_media_url(conn: &Connection, media_id: i64) -> Result<Option<String>> {
  let result = conn.query_row(
    "SELECT image_url FROM media WHERE id = ?1",
    params![media_id],
    |row| row.get(0),
  );

  match result {
    Ok(url) => Ok(Some(url)),
    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
    Err(e) => Err(e),
  }
}

pub fn insert_flashcard(conn: &Connection, card: &Flashcard) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO flashcards (study_set_id, position, term, definition, media_id)
    VALUES (?1, ?2, ?3, ?4, ?5)
    "#,
    params![
      card.study_set_id,
      card.position,
      card.term,
      card.definition,
      card.media_id,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn insert_media(conn: &Connection, image_url: &str) -> Result<i64> {
  conn.execute("INSERT INTO media (image_url) VALUES (?1)", params![image_url])?;
  Ok(conn.last_insert_rowid())
}

fn row_to_flashcard(row: &rusqlite::Row) -> Result<Flashcard> {
  Ok(Flashcard {
    id: row.get(0)?,
    study_set_id: row.get(1)?,
    position: row.get(2)?,
    term: row.get(3)?,
    definition: row.get(4)?,
    media_id: row.get(5)?,
  })
}
