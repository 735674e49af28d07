use serde::{Deserialize, Serialize};

use crate::model::QuizResult;

/// Format whole seconds as a zero-padded `MM:SS` clock string.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Cumulative outcome counters across every completed session, persisted
/// between runs.
///
/// Mutation happens only by folding a `QuizResult` in, which produces a fresh
/// value rather than updating fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifetimeStats {
    quizzes_played: u32,
    questions_answered: u32,
    total_seconds: u64,
    correct_answers: u32,
    wrong_answers: u32,
    avg_answer_time: String,
}

impl Default for LifetimeStats {
    fn default() -> Self {
        Self {
            quizzes_played: 0,
            questions_answered: 0,
            total_seconds: 0,
            correct_answers: 0,
            wrong_answers: 0,
            avg_answer_time: format_clock(0),
        }
    }
}

impl LifetimeStats {
    /// Rehydrate stats from persisted storage.
    ///
    /// The average-time string is preserved verbatim so a persisted record
    /// round-trips exactly.
    #[must_use]
    pub fn from_persisted(
        quizzes_played: u32,
        questions_answered: u32,
        total_seconds: u64,
        correct_answers: u32,
        wrong_answers: u32,
        avg_answer_time: String,
    ) -> Self {
        Self {
            quizzes_played,
            questions_answered,
            total_seconds,
            correct_answers,
            wrong_answers,
            avg_answer_time,
        }
    }

    /// Fold one completed-session result into the lifetime counters,
    /// returning the updated stats.
    ///
    /// The derived average answering time is `total_seconds / quizzes_played`
    /// with integer truncation, formatted as `MM:SS`.
    #[must_use]
    pub fn fold(&self, result: &QuizResult) -> Self {
        let quizzes_played = self.quizzes_played + 1;
        let total_seconds = self.total_seconds + result.elapsed_seconds();

        Self {
            quizzes_played,
            questions_answered: self.questions_answered + result.total_questions(),
            total_seconds,
            correct_answers: self.correct_answers + result.correct_answers(),
            wrong_answers: self.wrong_answers + result.wrong_answers(),
            avg_answer_time: format_clock(total_seconds / u64::from(quizzes_played)),
        }
    }

    #[must_use]
    pub fn quizzes_played(&self) -> u32 {
        self.quizzes_played
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn wrong_answers(&self) -> u32 {
        self.wrong_answers
    }

    /// Derived average answering time per quiz, `MM:SS`.
    #[must_use]
    pub fn avg_answer_time(&self) -> &str {
        &self.avg_answer_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, PointsTable, Question, QuizResult};

    fn result(total: usize, correct: usize, elapsed_seconds: u64) -> QuizResult {
        let questions: Vec<Question> = (0..total)
            .map(|i| {
                Question::new(
                    "Film",
                    Difficulty::Easy,
                    format!("Q{i}"),
                    "yes",
                    vec!["no".into()],
                )
            })
            .collect();
        let chosen: Vec<String> = (0..total)
            .map(|i| if i < correct { "yes".into() } else { "no".into() })
            .collect();
        QuizResult::compute(&questions, &chosen, &PointsTable::default(), elapsed_seconds)
            .unwrap()
    }

    #[test]
    fn format_clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(42), "00:42");
        assert_eq!(format_clock(61), "01:01");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn folding_first_result_into_fresh_stats() {
        let stats = LifetimeStats::default().fold(&result(5, 3, 42));

        assert_eq!(stats.quizzes_played(), 1);
        assert_eq!(stats.questions_answered(), 5);
        assert_eq!(stats.total_seconds(), 42);
        assert_eq!(stats.correct_answers(), 3);
        assert_eq!(stats.wrong_answers(), 2);
        assert_eq!(stats.avg_answer_time(), "00:42");
    }

    #[test]
    fn identical_sessions_keep_the_same_average() {
        let mut stats = LifetimeStats::default();
        for _ in 0..4 {
            stats = stats.fold(&result(3, 2, 90));
        }
        assert_eq!(stats.avg_answer_time(), format_clock(90));
        assert_eq!(stats.total_seconds(), 360);
    }

    #[test]
    fn average_truncates_the_quotient() {
        // 100 + 25 seconds over two quizzes: 62.5 truncates to 62.
        let stats = LifetimeStats::default()
            .fold(&result(2, 1, 100))
            .fold(&result(2, 2, 25));
        assert_eq!(stats.avg_answer_time(), "01:02");
    }

    #[test]
    fn fold_does_not_mutate_the_input() {
        let before = LifetimeStats::default();
        let _ = before.fold(&result(1, 1, 10));
        assert_eq!(before, LifetimeStats::default());
    }
}
