use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

use trivia_core::Clock;
use trivia_core::model::{PointsTable, Question, Quiz};

use crate::error::SessionError;
use crate::ticker::Ticker;

use super::view::QuestionView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Outcome of a successful `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { index: usize },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Completed,
}

/// One live attempt: pointer, picks, committed log, timer.
struct Attempt {
    quiz_index: usize,
    questions: Vec<Question>,
    views: Vec<QuestionView>,
    current: usize,
    /// Tentative pick per question; survives backward navigation.
    picks: Vec<Option<String>>,
    /// Answers committed by forward navigation, one per question advanced
    /// past. Never longer than `current`.
    log: Vec<String>,
    started_at: DateTime<Utc>,
    clock: Clock,
    ticker: Ticker,
}

/// Frozen data of a finished attempt, read by the scoring workflow.
pub struct CompletedAttempt {
    quiz_index: usize,
    questions: Vec<Question>,
    log: Vec<String>,
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    elapsed_seconds: u64,
}

impl CompletedAttempt {
    #[must_use]
    pub fn quiz_index(&self) -> usize {
        self.quiz_index
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn chosen_log(&self) -> &[String] {
        &self.log
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }
}

enum EngineState {
    Idle,
    Active(Attempt),
    Completed(CompletedAttempt),
}

/// State machine for one quiz attempt: `Idle -> Active -> Completed -> Idle`.
///
/// One live instance at a time; every transition is driven by an explicit
/// call, and the elapsed-time ticker is stopped exactly once, either at
/// completion or on an abrupt reset.
pub struct SessionEngine {
    state: EngineState,
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: EngineState::Idle,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match self.state {
            EngineState::Idle => SessionPhase::Idle,
            EngineState::Active(_) => SessionPhase::Active,
            EngineState::Completed(_) => SessionPhase::Completed,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, EngineState::Active(_))
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, EngineState::Completed(_))
    }

    /// Begin an attempt at the given quiz: index to 0, empty log, timer at 0.
    ///
    /// Each question's options are merged and shuffled here, once; navigation
    /// never re-shuffles them.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` while a session is running and
    /// `SessionError::Completed` when a finished session has not been reset.
    pub fn start(
        &mut self,
        quiz_index: usize,
        quiz: &Quiz,
        points: &PointsTable,
        clock: Clock,
        ticker: Ticker,
    ) -> Result<(), SessionError> {
        match self.state {
            EngineState::Active(_) => return Err(SessionError::AlreadyActive),
            EngineState::Completed(_) => return Err(SessionError::Completed),
            EngineState::Idle => {}
        }

        let questions = quiz.questions().to_vec();
        let total = questions.len();
        let mut rng = rand::rng();
        let views = questions
            .iter()
            .enumerate()
            .map(|(i, question)| {
                let mut options = question.options();
                options.shuffle(&mut rng);
                QuestionView::new(i, total, question, points, options)
            })
            .collect();

        self.state = EngineState::Active(Attempt {
            quiz_index,
            questions,
            views,
            current: 0,
            picks: vec![None; total],
            log: Vec::with_capacity(total),
            started_at: clock.now(),
            clock,
            ticker,
        });
        Ok(())
    }

    /// Record a tentative pick for the current question, replacing any
    /// earlier pick. Only the latest pick at advance time counts.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` / `SessionError::Completed` outside
    /// the active state, and `SessionError::UnknownOption` when the text is
    /// not one of the current question's options; state stays unchanged.
    pub fn choose_answer(&mut self, option: &str) -> Result<(), SessionError> {
        let attempt = self.active_mut()?;
        if !attempt.views[attempt.current].has_option(option) {
            return Err(SessionError::UnknownOption(option.to_owned()));
        }
        attempt.picks[attempt.current] = Some(option.to_owned());
        Ok(())
    }

    /// Move backward or forward through the quiz.
    ///
    /// `Previous` at question 0 is a no-op, not an error. `Next` commits the
    /// current pick to the log and, past the final question, completes the
    /// session: the ticker stops and the elapsed seconds freeze.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoAnswerChosen` for `Next` without a pick, and
    /// the usual state errors outside `Active`.
    pub fn advance(&mut self, direction: Direction) -> Result<Advance, SessionError> {
        let attempt = self.active_mut()?;
        match direction {
            Direction::Previous => {
                if attempt.current > 0 {
                    attempt.current -= 1;
                    attempt.log.truncate(attempt.current);
                }
                Ok(Advance::Moved {
                    index: attempt.current,
                })
            }
            Direction::Next => {
                let pick = attempt.picks[attempt.current]
                    .clone()
                    .ok_or(SessionError::NoAnswerChosen)?;
                attempt.log.truncate(attempt.current);
                attempt.log.push(pick);

                if attempt.current + 1 < attempt.questions.len() {
                    attempt.current += 1;
                    return Ok(Advance::Moved {
                        index: attempt.current,
                    });
                }

                self.complete();
                Ok(Advance::Finished)
            }
        }
    }

    /// Clear the session back to `Idle`.
    ///
    /// From `Completed` this is the normal end of the fold-then-reset
    /// sequence; from `Active` it is the abrupt abort path and stops the
    /// ticker. From `Idle` it is a no-op.
    pub fn reset(&mut self) {
        if let EngineState::Active(attempt) = &mut self.state {
            attempt.ticker.stop();
        }
        self.state = EngineState::Idle;
    }

    /// Seconds counted so far: live while `Active`, frozen once `Completed`,
    /// zero when `Idle`.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        match &self.state {
            EngineState::Idle => 0,
            EngineState::Active(attempt) => attempt.ticker.elapsed_seconds(),
            EngineState::Completed(done) => done.elapsed_seconds,
        }
    }

    #[must_use]
    pub fn quiz_index(&self) -> Option<usize> {
        match &self.state {
            EngineState::Idle => None,
            EngineState::Active(attempt) => Some(attempt.quiz_index),
            EngineState::Completed(done) => Some(done.quiz_index),
        }
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            EngineState::Active(attempt) => Some(attempt.current),
            _ => None,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> Option<usize> {
        match &self.state {
            EngineState::Idle => None,
            EngineState::Active(attempt) => Some(attempt.questions.len()),
            EngineState::Completed(done) => Some(done.questions.len()),
        }
    }

    /// View of the question at the current pointer.
    #[must_use]
    pub fn current_view(&self) -> Option<&QuestionView> {
        match &self.state {
            EngineState::Active(attempt) => attempt.views.get(attempt.current),
            _ => None,
        }
    }

    /// Tentative pick for the current question, if any.
    #[must_use]
    pub fn current_pick(&self) -> Option<&str> {
        match &self.state {
            EngineState::Active(attempt) => {
                attempt.picks[attempt.current].as_deref()
            }
            _ => None,
        }
    }

    /// Answers committed so far by forward navigation.
    #[must_use]
    pub fn chosen_log(&self) -> &[String] {
        match &self.state {
            EngineState::Idle => &[],
            EngineState::Active(attempt) => &attempt.log,
            EngineState::Completed(done) => &done.log,
        }
    }

    /// The frozen attempt data, available once `Completed`.
    #[must_use]
    pub fn completed(&self) -> Option<&CompletedAttempt> {
        match &self.state {
            EngineState::Completed(done) => Some(done),
            _ => None,
        }
    }

    fn active_mut(&mut self) -> Result<&mut Attempt, SessionError> {
        match &mut self.state {
            EngineState::Active(attempt) => Ok(attempt),
            EngineState::Completed(_) => Err(SessionError::Completed),
            EngineState::Idle => Err(SessionError::NotActive),
        }
    }

    fn complete(&mut self) {
        let mut attempt = match std::mem::replace(&mut self.state, EngineState::Idle) {
            EngineState::Active(attempt) => attempt,
            other => {
                self.state = other;
                return;
            }
        };

        let elapsed_seconds = attempt.ticker.stop();
        self.state = EngineState::Completed(CompletedAttempt {
            quiz_index: attempt.quiz_index,
            questions: std::mem::take(&mut attempt.questions),
            log: std::mem::take(&mut attempt.log),
            started_at: attempt.started_at,
            completed_at: attempt.clock.now(),
            elapsed_seconds,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::Difficulty;
    use trivia_core::time::fixed_clock;

    fn quiz(n: usize) -> Quiz {
        let questions = (0..n)
            .map(|i| {
                Question::new(
                    "Sports",
                    Difficulty::Easy,
                    format!("Q{i}"),
                    format!("right{i}"),
                    vec![format!("wrong{i}a"), format!("wrong{i}b")],
                )
            })
            .collect();
        Quiz::new(questions).unwrap()
    }

    fn started(n: usize) -> SessionEngine {
        let mut engine = SessionEngine::new();
        engine
            .start(0, &quiz(n), &PointsTable::default(), fixed_clock(), Ticker::manual())
            .unwrap();
        engine
    }

    fn answer_current(engine: &mut SessionEngine, correct: bool) {
        let view = engine.current_view().unwrap().clone();
        let index = view.number() - 1;
        let option = if correct {
            format!("right{index}")
        } else {
            format!("wrong{index}a")
        };
        engine.choose_answer(&option).unwrap();
    }

    #[test]
    fn start_resets_pointer_log_and_timer() {
        let engine = started(3);
        assert_eq!(engine.phase(), SessionPhase::Active);
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(engine.chosen_log().len(), 0);
        assert_eq!(engine.elapsed_seconds(), 0);
    }

    #[test]
    fn start_rejects_while_active() {
        let mut engine = started(2);
        let err = engine
            .start(1, &quiz(2), &PointsTable::default(), fixed_clock(), Ticker::manual())
            .unwrap_err();
        assert!(matches!(err, SessionError::AlreadyActive));
        assert_eq!(engine.current_index(), Some(0));
    }

    #[test]
    fn options_are_shuffled_once_and_stable_across_navigation() {
        let mut engine = started(3);
        let before = engine.current_view().unwrap().options().to_vec();

        answer_current(&mut engine, true);
        engine.advance(Direction::Next).unwrap();
        engine.advance(Direction::Previous).unwrap();

        assert_eq!(engine.current_view().unwrap().options(), &before[..]);
    }

    #[test]
    fn next_without_a_pick_is_rejected_and_state_unchanged() {
        let mut engine = started(2);
        let err = engine.advance(Direction::Next).unwrap_err();
        assert!(matches!(err, SessionError::NoAnswerChosen));
        assert_eq!(engine.current_index(), Some(0));
        assert_eq!(engine.chosen_log().len(), 0);
    }

    #[test]
    fn previous_at_zero_is_a_noop() {
        let mut engine = started(2);
        let advance = engine.advance(Direction::Previous).unwrap();
        assert_eq!(advance, Advance::Moved { index: 0 });
        assert_eq!(engine.chosen_log().len(), 0);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut engine = started(2);
        let err = engine.choose_answer("not an option").unwrap_err();
        assert!(matches!(err, SessionError::UnknownOption(_)));
        assert_eq!(engine.current_pick(), None);
    }

    #[test]
    fn latest_pick_before_advance_wins() {
        let mut engine = started(1);
        engine.choose_answer("wrong0a").unwrap();
        engine.choose_answer("right0").unwrap();
        assert_eq!(engine.current_pick(), Some("right0"));

        engine.advance(Direction::Next).unwrap();
        assert_eq!(engine.chosen_log(), ["right0".to_owned()]);
    }

    #[test]
    fn log_never_exceeds_current_index() {
        let mut engine = started(3);

        answer_current(&mut engine, true);
        engine.advance(Direction::Next).unwrap();
        assert_eq!(engine.chosen_log().len(), 1);
        assert_eq!(engine.current_index(), Some(1));

        engine.advance(Direction::Previous).unwrap();
        assert!(engine.chosen_log().len() <= engine.current_index().unwrap());
    }

    #[test]
    fn backward_navigation_keeps_the_tentative_pick() {
        let mut engine = started(2);
        engine.choose_answer("wrong0a").unwrap();
        engine.advance(Direction::Next).unwrap();
        engine.advance(Direction::Previous).unwrap();

        // The earlier pick is still there and can be replaced before
        // re-advancing.
        assert_eq!(engine.current_pick(), Some("wrong0a"));
        engine.choose_answer("right0").unwrap();
        engine.advance(Direction::Next).unwrap();
        assert_eq!(engine.chosen_log(), ["right0".to_owned()]);
    }

    #[test]
    fn single_question_quiz_completes_on_first_advance() {
        let mut engine = started(1);
        answer_current(&mut engine, true);
        assert_eq!(engine.advance(Direction::Next).unwrap(), Advance::Finished);
        assert_eq!(engine.phase(), SessionPhase::Completed);
    }

    #[test]
    fn completion_freezes_elapsed_time_and_log() {
        let mut engine = SessionEngine::new();
        let mut ticker = Ticker::manual();
        ticker.advance(0);
        engine
            .start(2, &quiz(2), &PointsTable::default(), fixed_clock(), ticker)
            .unwrap();

        answer_current(&mut engine, true);
        engine.advance(Direction::Next).unwrap();
        answer_current(&mut engine, false);
        engine.advance(Direction::Next).unwrap();

        assert_eq!(engine.phase(), SessionPhase::Completed);
        let done = engine.completed().unwrap();
        assert_eq!(done.quiz_index(), 2);
        assert_eq!(done.chosen_log().len(), 2);
        assert_eq!(done.elapsed_seconds(), engine.elapsed_seconds());
        assert_eq!(done.completed_at(), done.started_at());
    }

    #[test]
    fn choose_after_completion_fails() {
        let mut engine = started(1);
        answer_current(&mut engine, true);
        engine.advance(Direction::Next).unwrap();

        let err = engine.choose_answer("right0").unwrap_err();
        assert!(matches!(err, SessionError::Completed));
    }

    #[test]
    fn reset_returns_to_idle_from_either_state() {
        let mut engine = started(1);
        engine.reset();
        assert_eq!(engine.phase(), SessionPhase::Idle);
        assert_eq!(engine.elapsed_seconds(), 0);

        let mut engine = started(1);
        answer_current(&mut engine, true);
        engine.advance(Direction::Next).unwrap();
        engine.reset();
        assert_eq!(engine.phase(), SessionPhase::Idle);
    }

    #[test]
    fn restart_allowed_after_reset() {
        let mut engine = started(1);
        answer_current(&mut engine, true);
        engine.advance(Direction::Next).unwrap();

        let err = engine
            .start(0, &quiz(1), &PointsTable::default(), fixed_clock(), Ticker::manual())
            .unwrap_err();
        assert!(matches!(err, SessionError::Completed));

        engine.reset();
        engine
            .start(0, &quiz(1), &PointsTable::default(), fixed_clock(), Ticker::manual())
            .unwrap();
        assert!(engine.is_active());
    }
}
