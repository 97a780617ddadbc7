//! Extraction of structured facts from contract text

pub mod entities;
pub mod numeric;

pub use entities::EntityExtractor;
pub use numeric::{extract_deadlines, Deadline, DeadlineUnit};
