mod catalog;
mod question;
mod result;
mod stats;

pub use catalog::{Catalog, CatalogError, Quiz};
pub use question::{Difficulty, DifficultyParseError, PointsTable, Question};
pub use result::{DifficultyBreakdown, DifficultyTally, QuizResult, ResultError};
pub use stats::{LifetimeStats, format_clock};
