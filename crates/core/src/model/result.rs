use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Difficulty, PointsTable, Question};
use crate::model::stats::format_clock;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("cannot score a quiz with no questions")]
    EmptyQuiz,

    #[error("chosen log has {chosen} answers for {questions} questions")]
    AnswerCountMismatch { chosen: usize, questions: usize },
}

/// Per-difficulty bucket: how many questions it held and how many were right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyTally {
    pub total: u32,
    pub correct: u32,
}

/// Tallies for every difficulty bucket of one completed quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyBreakdown {
    easy: DifficultyTally,
    medium: DifficultyTally,
    hard: DifficultyTally,
}

impl DifficultyBreakdown {
    #[must_use]
    pub fn tally(&self, difficulty: Difficulty) -> DifficultyTally {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    fn tally_mut(&mut self, difficulty: Difficulty) -> &mut DifficultyTally {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Scored outcome of one completed session. Created once at completion,
/// immutable thereafter, folded into `LifetimeStats` and then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    points: u32,
    max_points: u32,
    correct_answers: u32,
    total_questions: u32,
    score: u32,
    elapsed_seconds: u64,
    time_display: String,
    breakdown: DifficultyBreakdown,
}

impl QuizResult {
    /// Score a completed attempt: chosen answers against correct answers,
    /// weighted by difficulty.
    ///
    /// Comparison is exact string equality per question index. Every question
    /// counts toward its difficulty bucket's `total`; a match adds the point
    /// weight and bumps the bucket's `correct`.
    ///
    /// # Errors
    ///
    /// Returns `ResultError::EmptyQuiz` if `questions` is empty (the question
    /// source contract makes this unreachable, but the division is guarded
    /// here regardless) and `ResultError::AnswerCountMismatch` when the chosen
    /// log does not cover every question.
    pub fn compute(
        questions: &[Question],
        chosen: &[String],
        points: &PointsTable,
        elapsed_seconds: u64,
    ) -> Result<Self, ResultError> {
        if questions.is_empty() {
            return Err(ResultError::EmptyQuiz);
        }
        if chosen.len() != questions.len() {
            return Err(ResultError::AnswerCountMismatch {
                chosen: chosen.len(),
                questions: questions.len(),
            });
        }

        let mut earned = 0_u32;
        let mut max_points = 0_u32;
        let mut correct_answers = 0_u32;
        let mut breakdown = DifficultyBreakdown::default();

        for (question, answer) in questions.iter().zip(chosen) {
            let difficulty = question.difficulty();
            let weight = points.points_for(difficulty);
            max_points += weight;

            let tally = breakdown.tally_mut(difficulty);
            tally.total += 1;
            if answer == question.correct_answer() {
                earned += weight;
                correct_answers += 1;
                tally.correct += 1;
            }
        }

        let total_questions = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        let score =
            (f64::from(correct_answers) * 100.0 / f64::from(total_questions)).round() as u32;

        Ok(Self {
            points: earned,
            max_points,
            correct_answers,
            total_questions,
            score,
            elapsed_seconds,
            time_display: format_clock(elapsed_seconds),
            breakdown,
        })
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn max_points(&self) -> u32 {
        self.max_points
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.total_questions - self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    /// Score percentage in `[0, 100]`, `round(100 * correct / total)`.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Elapsed time as `MM:SS`.
    #[must_use]
    pub fn time_display(&self) -> &str {
        &self.time_display
    }

    #[must_use]
    pub fn breakdown(&self) -> &DifficultyBreakdown {
        &self.breakdown
    }
}
