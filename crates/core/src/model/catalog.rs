use thiserror::Error;

use crate::model::{PointsTable, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("a quiz must contain at least one question")]
    EmptyQuiz,

    #[error("no quizzes loaded")]
    EmptyCatalog,

    #[error("no quiz at index {index}")]
    NotFound { index: usize },
}

/// An ordered set of questions, fixed at fetch time.
///
/// The question order defines question numbering for the whole session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    questions: Vec<Question>,
}

impl Quiz {
    /// Build a quiz from fetched questions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyQuiz` if `questions` is empty. The question
    /// source contract guarantees at least one question per batch; enforcing
    /// it here keeps scoring structurally safe from empty division.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::EmptyQuiz);
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Category label for listing, taken from the first question.
    #[must_use]
    pub fn category(&self) -> &str {
        self.questions[0].category()
    }

    /// Sum of point weights over all questions.
    #[must_use]
    pub fn max_points(&self, points: &PointsTable) -> u32 {
        self.questions
            .iter()
            .map(|q| points.points_for(q.difficulty()))
            .sum()
    }
}

/// Quizzes fetched for this run, append-only during the fetch phase and
/// read-only afterward, so an index stays valid for the lifetime of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    quizzes: Vec<Quiz>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a quiz to the catalog.
    pub fn add_quiz(&mut self, quiz: Quiz) {
        self.quizzes.push(quiz);
    }

    /// Fetch a quiz by index.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` when the index is out of range.
    pub fn get(&self, index: usize) -> Result<&Quiz, CatalogError> {
        self.quizzes
            .get(index)
            .ok_or(CatalogError::NotFound { index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quiz> {
        self.quizzes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;

    fn question(text: &str) -> Question {
        Question::new(
            "Science",
            Difficulty::Medium,
            text,
            "right",
            vec!["wrong".into()],
        )
    }

    #[test]
    fn quiz_rejects_empty_question_list() {
        assert_eq!(Quiz::new(Vec::new()).unwrap_err(), CatalogError::EmptyQuiz);
    }

    #[test]
    fn catalog_get_checks_range() {
        let mut catalog = Catalog::new();
        catalog.add_quiz(Quiz::new(vec![question("Q1")]).unwrap());

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(0).is_ok());
        assert_eq!(
            catalog.get(1).unwrap_err(),
            CatalogError::NotFound { index: 1 }
        );
    }

    #[test]
    fn max_points_sums_weights() {
        let questions = vec![
            Question::new("C", Difficulty::Easy, "Q1", "a", vec!["b".into()]),
            Question::new("C", Difficulty::Hard, "Q2", "a", vec!["b".into()]),
        ];
        let quiz = Quiz::new(questions).unwrap();
        assert_eq!(quiz.max_points(&PointsTable::default()), 6);
    }
}
