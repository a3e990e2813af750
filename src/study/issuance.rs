//! Card issuance: turn a session cursor plus a page request into the
//! next slice of due cards.

use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use crate::config;
use crate::db;
use crate::domain::{CardView, PageDirection};
use crate::error::StudyError;
use crate::session::SessionStore;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPage {
  pub data: Vec<CardView>,
  pub current_index: usize,
  /// Length of the fixed ordering, not the count of eligible cards, so
  /// clients can render a stable progress bar.
  pub total_cards: usize,
}

/// Issue one page of cards to a study session.
///
/// The candidate window is the slice of the fixed ordering crossed by
/// the cursor move, whichever the direction. Cards whose next review
/// lies in the future are skipped from the output but still consume
/// cursor space: the cursor lands on `new_index` even for an all-blank
/// page. That trade-off keeps paging through long not-yet-due runs
/// bounded, at the cost of the occasional empty page.
pub fn get_page_of_cards(
  conn: &Connection,
  sessions: &SessionStore,
  token: &str,
  direction: PageDirection,
  limit: usize,
) -> Result<CardPage, StudyError> {
  if !(config::MIN_PAGE_LIMIT..=config::MAX_PAGE_LIMIT).contains(&limit) {
    return Err(StudyError::Validation(format!(
      "limit must be between {} and {}",
      config::MIN_PAGE_LIMIT,
      config::MAX_PAGE_LIMIT
    )));
  }

  let session = sessions.get_session(token).ok_or(StudyError::SessionExpired)?;

  // A live session implies the enrollment exists; a miss here is a bug
  // or manual data surgery, not a caller mistake.
  let enrollment = db::find_enrollment(conn, session.user_id, session.study_set_id)?
    .ok_or_else(|| {
      StudyError::Inconsistency(format!(
        "session for user {} set {} has no enrollment",
        session.user_id, session.study_set_id
      ))
    })?;

  let total_cards = session.card_order.len();
  let current = session.current_index.min(total_cards);
  let new_index = match direction {
    PageDirection::Next => (current + limit).min(total_cards),
    PageDirection::Prev => current.saturating_sub(limit),
  };

  let (lo, hi) = if new_index >= current {
    (current, new_index)
  } else {
    (new_index, current)
  };
  let window = &session.card_order[lo..hi];

  let rows = db::get_cards_in_window(conn, enrollment.id, window)?;
  let mut by_id: HashMap<i64, db::WindowCard> =
    rows.into_iter().map(|c| (c.flashcard_id, c)).collect();

  // Re-impose the card-order sequence, then drop not-yet-due cards
  let now = Utc::now();
  let data: Vec<CardView> = window
    .iter()
    .filter_map(|id| by_id.remove(id))
    .filter(|card| card.is_due(now))
    .map(|card| CardView {
      flashcard_id: card.flashcard_id,
      position: card.position,
      term: card.term,
      definition: card.definition,
      image_url: card.image_url,
      is_learned: card.is_learned,
    })
    .collect();

  // Commit the move unconditionally, to both the session cursor and
  // the enrollment's durable processing index
  sessions.update_index(token, new_index);
  db::update_processing_index(conn, enrollment.id, new_index as i64)?;

  Ok(CardPage {
    data,
    current_index: new_index,
    total_cards,
  })
}
