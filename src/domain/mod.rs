pub mod enrollment;
pub mod flashcard;
pub mod review;

pub use enrollment::{Enrollment, EnrollmentStatus};
pub use flashcard::Flashcard;
pub use review::{CardView, DifficultyBucket, PageDirection, ReviewState};
