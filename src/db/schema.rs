use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS media (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      image_url TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS flashcards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      study_set_id INTEGER NOT NULL,
      position INTEGER NOT NULL,
      term TEXT NOT NULL,
      definition TEXT NOT NULL,
      media_id INTEGER,
      FOREIGN KEY (media_id) REFERENCES media(id)
    );

    CREATE TABLE IF NOT EXISTS enrollments (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      user_id INTEGER NOT NULL,
      study_set_id INTEGER NOT NULL,
      processing_index INTEGER NOT NULL DEFAULT 0,
      status TEXT NOT NULL DEFAULT 'in_progress',
      created_at TEXT NOT NULL,
      updated_at TEXT NOT NULL,
      UNIQUE (user_id, study_set_id)
    );

    CREATE TABLE IF NOT EXISTS difficulties (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      enrollment_id INTEGER NOT NULL,
      name TEXT NOT NULL,
      minutes INTEGER NOT NULL,
      is_mastery INTEGER NOT NULL DEFAULT 0,
      FOREIGN KEY (enrollment_id) REFERENCES enrollments(id),
      UNIQUE (enrollment_id, name)
    );

    CREATE TABLE IF NOT EXISTS review_states (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      enrollment_id INTEGER NOT NULL,
      flashcard_id INTEGER NOT NULL,
      is_learned INTEGER NOT NULL DEFAULT 0,
      difficulty_id INTEGER,
      next_review_at TEXT,
      last_reviewed_at TEXT,
      FOREIGN KEY (enrollment_id) REFERENCES enrollments(id),
      FOREIGN KEY (flashcard_id) REFERENCES flashcards(id),
      FOREIGN KEY (difficulty_id) REFERENCES difficulties(id),
      UNIQUE (enrollment_id, flashcard_id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_flashcards_study_set ON flashcards(study_set_id, position);
    CREATE INDEX IF NOT EXISTS idx_enrollments_user_set ON enrollments(user_id, study_set_id);
    CREATE INDEX IF NOT EXISTS idx_review_states_enrollment ON review_states(enrollment_id);
    CREATE INDEX IF NOT EXISTS idx_review_states_next_review ON review_states(next_review_at);
    CREATE INDEX IF NOT EXISTS idx_difficulties_enrollment ON difficulties(enrollment_id);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: mastery used to be inferred from the bucket name
  add_column_if_missing(conn, "difficulties", "is_mastery", "INTEGER NOT NULL DEFAULT 0")?;
  conn.execute(
    "UPDATE difficulties SET is_mastery = 1
     WHERE name = 'Easy' AND enrollment_id NOT IN
       (SELECT enrollment_id FROM difficulties WHERE is_mastery = 1)",
    [],
  )?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
