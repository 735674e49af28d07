use trivia_core::model::{LifetimeStats, QuizResult};

/// State-change notifications for the presentation collaborator.
///
/// The core never renders; whoever owns the screen subscribes here.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizEvent {
    /// The session moved onto question `index` (0-based) of `total`.
    QuestionEntered { index: usize, total: usize },

    /// The session completed and was scored.
    SessionCompleted { result: QuizResult },

    /// Lifetime statistics were folded and persisted.
    StatsUpdated { stats: LifetimeStats },
}

pub trait EventSink: Send + Sync {
    fn publish(&self, event: QuizEvent);
}

/// Sink that drops every event, for headless use and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: QuizEvent) {}
}
