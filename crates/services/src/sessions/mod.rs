mod engine;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use engine::{Advance, Direction, SessionEngine, SessionPhase};
pub use view::QuestionView;
pub use workflow::{AdvanceOutcome, QuizLoopService, StatsLedger};
