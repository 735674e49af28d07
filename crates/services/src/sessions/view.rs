use trivia_core::model::{Difficulty, PointsTable, Question};

/// Presentation-ready view of one question within a session.
///
/// Built once at session start: the correct and incorrect answers are merged
/// into `options` in shuffled order and never re-shuffled on navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    number: usize,
    total: usize,
    category: String,
    difficulty: Difficulty,
    points: u32,
    text: String,
    options: Vec<String>,
}

impl QuestionView {
    pub(crate) fn new(
        index: usize,
        total: usize,
        question: &Question,
        points: &PointsTable,
        options: Vec<String>,
    ) -> Self {
        Self {
            number: index + 1,
            total,
            category: question.category().to_owned(),
            difficulty: question.difficulty(),
            points: points.points_for(question.difficulty()),
            text: question.text().to_owned(),
            options,
        }
    }

    /// 1-based question number, as shown to the player.
    #[must_use]
    pub fn number(&self) -> usize {
        self.number
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Point weight of this question.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Answer options in their session-fixed shuffled order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }
}
