#![forbid(unsafe_code)]

pub mod catalog_service;
pub mod error;
pub mod events;
pub mod sessions;
pub mod source;
pub mod ticker;

pub use trivia_core::Clock;

pub use catalog_service::CatalogService;
pub use error::{FetchError, SessionError};
pub use events::{EventSink, NullSink, QuizEvent};
pub use sessions::{
    Advance, AdvanceOutcome, Direction, QuestionView, QuizLoopService, SessionEngine,
    SessionPhase, StatsLedger,
};
pub use source::{OpenTriviaClient, QuestionSource};
pub use ticker::Ticker;
