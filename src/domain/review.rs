use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-card progress record, one row per (enrollment, flashcard).
///
/// All nullable fields stay null until the first review of the card.
/// A card is eligible for issuance iff `next_review_at` is None or
/// has passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewState {
  pub id: i64,
  pub enrollment_id: i64,
  pub flashcard_id: i64,
  pub is_learned: bool,
  pub difficulty_id: Option<i64>,
  pub next_review_at: Option<DateTime<Utc>>,
  pub last_reviewed_at: Option<DateTime<Utc>>,
}

impl ReviewState {
  /// Due-or-new check against the given instant.
  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    match self.next_review_at {
      None => true,
      Some(at) => at <= now,
    }
  }
}

/// A named review interval owned by one enrollment.
///
/// `is_mastery` flags the canonical "mastered" tier: submitting it sets
/// the card's learned flag. The flag is seeded from the default bucket
/// template and survives interval reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyBucket {
  pub id: i64,
  #[serde(skip_serializing)]
  pub enrollment_id: i64,
  pub name: String,
  pub minutes: i64,
  #[serde(skip_serializing)]
  pub is_mastery: bool,
}

/// Review state joined with flashcard content, as issued to a study page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
  pub flashcard_id: i64,
  pub position: i64,
  pub term: String,
  pub definition: String,
  pub image_url: Option<String>,
  pub is_learned: bool,
}

/// Paging direction for card issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
  Next,
  Prev,
}

impl PageDirection {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "next" => Some(Self::Next),
      "prev" => Some(Self::Prev),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Next => "next",
      Self::Prev => "prev",
    }
  }
}
