use std::sync::Arc;

use storage::repository::StatsRepository;
use trivia_core::Clock;
use trivia_core::model::{Catalog, LifetimeStats, PointsTable, QuizResult};

use crate::error::SessionError;
use crate::events::{EventSink, NullSink, QuizEvent};
use crate::ticker::Ticker;

use super::engine::{Advance, Direction, SessionEngine};

/// Storage key the lifetime stats record lives under.
const STATS_KEY: &str = "stats";

/// Lifetime statistics with their persistence backing.
///
/// Loaded once at startup (absent record means the zero default) and written
/// back after every fold.
pub struct StatsLedger {
    repo: Arc<dyn StatsRepository>,
    key: String,
    current: LifetimeStats,
}

impl StatsLedger {
    /// Load the ledger from storage, or start from the zero default when no
    /// record was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` for connection or decoding failures.
    pub async fn load(repo: Arc<dyn StatsRepository>) -> Result<Self, SessionError> {
        Self::load_with_key(repo, STATS_KEY).await
    }

    async fn load_with_key(repo: Arc<dyn StatsRepository>, key: &str) -> Result<Self, SessionError> {
        let current = repo.load(key).await?.unwrap_or_default();
        Ok(Self {
            repo,
            key: key.to_owned(),
            current,
        })
    }

    #[must_use]
    pub fn current(&self) -> &LifetimeStats {
        &self.current
    }

    /// Fold a completed-session result in and persist the updated record.
    ///
    /// The in-memory value only moves forward once the save succeeded, so a
    /// storage failure leaves the ledger at its previous state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when persisting fails.
    pub async fn fold_and_save(
        &mut self,
        result: &QuizResult,
    ) -> Result<&LifetimeStats, SessionError> {
        let updated = self.current.fold(result);
        self.repo.save(&self.key, &updated).await?;
        self.current = updated;
        log::info!(
            "stats updated: {} quizzes played, avg answer time {}",
            self.current.quizzes_played(),
            self.current.avg_answer_time()
        );
        Ok(&self.current)
    }
}

/// Outcome of one play-loop advance.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Moved {
        index: usize,
    },
    /// The session finished: scored, folded into the ledger, persisted, and
    /// the engine reset back to idle.
    Finished {
        result: QuizResult,
        stats: LifetimeStats,
    },
}

/// Orchestrates one attempt end to end: quiz selection, navigation, and the
/// completion sequence.
///
/// The completion order is fixed: compute the result, fold it into the
/// ledger, persist, and only then reset the engine.
pub struct QuizLoopService {
    clock: Clock,
    points: PointsTable,
    sink: Arc<dyn EventSink>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            points: PointsTable::default(),
            sink: Arc::new(NullSink),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: PointsTable) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn points(&self) -> &PointsTable {
        &self.points
    }

    /// Start playing the catalog quiz at `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Catalog` for a bad index and the engine's state
    /// errors when a session is already running.
    pub fn start_quiz(
        &self,
        engine: &mut SessionEngine,
        catalog: &Catalog,
        index: usize,
    ) -> Result<(), SessionError> {
        let quiz = catalog.get(index)?;
        engine.start(index, quiz, &self.points, self.clock, Ticker::spawn())?;
        self.sink.publish(QuizEvent::QuestionEntered {
            index: 0,
            total: quiz.len(),
        });
        Ok(())
    }

    /// Record a tentative pick for the current question.
    ///
    /// # Errors
    ///
    /// Propagates the engine's sequencing errors; state stays unchanged.
    pub fn choose(&self, engine: &mut SessionEngine, option: &str) -> Result<(), SessionError> {
        engine.choose_answer(option)
    }

    /// Navigate the session; on completion run the full scoring sequence.
    ///
    /// # Errors
    ///
    /// Propagates engine sequencing errors, scoring errors, and storage
    /// failures from persisting the folded stats.
    pub async fn advance(
        &self,
        engine: &mut SessionEngine,
        ledger: &mut StatsLedger,
        direction: Direction,
    ) -> Result<AdvanceOutcome, SessionError> {
        match engine.advance(direction)? {
            Advance::Moved { index } => {
                let total = engine.total_questions().unwrap_or(0);
                self.sink
                    .publish(QuizEvent::QuestionEntered { index, total });
                Ok(AdvanceOutcome::Moved { index })
            }
            Advance::Finished => {
                let done = engine.completed().ok_or(SessionError::NotActive)?;
                log::debug!(
                    "quiz {} completed, ran {} to {}",
                    done.quiz_index(),
                    done.started_at(),
                    done.completed_at()
                );
                let result = QuizResult::compute(
                    done.questions(),
                    done.chosen_log(),
                    &self.points,
                    done.elapsed_seconds(),
                )?;
                self.sink.publish(QuizEvent::SessionCompleted {
                    result: result.clone(),
                });

                let stats = ledger.fold_and_save(&result).await?.clone();
                self.sink
                    .publish(QuizEvent::StatsUpdated { stats: stats.clone() });

                // The result is computed and folded above; only now may the
                // session data be cleared.
                engine.reset();
                Ok(AdvanceOutcome::Finished { result, stats })
            }
        }
    }
}
