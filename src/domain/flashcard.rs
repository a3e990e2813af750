use serde::{Deserialize, Serialize};

/// A term/definition card inside a study set.
///
/// Content CRUD lives outside this crate; we only read cards in
/// position order to build enrollments and card views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
  pub id: i64,
  pub study_set_id: i64,
  pub position: i64,
  pub term: String,
  pub definition: String,
  pub media_id: Option<i64>,
}
