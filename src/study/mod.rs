//! The study core: enrollment bootstrap, session-backed card issuance,
//! review scheduling and difficulty configuration.

pub mod difficulty;
pub mod enroll;
pub mod issuance;
pub mod schedule;

pub use difficulty::{configure_difficulties, get_difficulties_config, DifficultyEntry};
pub use enroll::{start_session, StartedStudy};
pub use issuance::{get_page_of_cards, CardPage};
pub use schedule::submit_review;
