use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnrollmentStatus {
  InProgress,
  Complete,
}

impl EnrollmentStatus {
  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "in_progress" => Some(Self::InProgress),
      "complete" => Some(Self::Complete),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::InProgress => "in_progress",
      Self::Complete => "complete",
    }
  }
}

/// A user's ongoing study relationship with one study set.
///
/// At most one row exists per (user, study set) pair; a completed
/// enrollment is reset and reused on restart, never duplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub id: i64,
  pub user_id: i64,
  pub study_set_id: i64,
  /// Last committed position in the canonical card ordering.
  pub processing_index: i64,
  pub status: EnrollmentStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}
