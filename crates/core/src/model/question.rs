use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Difficulty level of a single question, as reported by the question source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// All difficulties in weight order, for iteration over breakdown buckets.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown difficulty: {0}")]
pub struct DifficultyParseError(pub String);

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(DifficultyParseError(other.to_owned())),
        }
    }
}

/// A single trivia question, immutable once fetched.
///
/// `incorrect_answers` keeps the source order; merging and shuffling the
/// options happens once per session start, in the services layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    category: String,
    difficulty: Difficulty,
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl Question {
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        difficulty: Difficulty,
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            category: category.into(),
            difficulty,
            text: text.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
        }
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    /// Correct + incorrect answers in stored (unshuffled) order.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(1 + self.incorrect_answers.len());
        options.push(self.correct_answer.clone());
        options.extend(self.incorrect_answers.iter().cloned());
        options
    }
}

/// Fixed difficulty-to-points weighting, never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsTable {
    easy: u32,
    medium: u32,
    hard: u32,
}

impl PointsTable {
    #[must_use]
    pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    /// Point weight for a question of the given difficulty.
    #[must_use]
    pub fn points_for(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for PointsTable {
    fn default() -> Self {
        Self::new(1, 3, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_lowercase_names() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("medium".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!("hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
    }

    #[test]
    fn default_points_match_weighting() {
        let points = PointsTable::default();
        assert_eq!(points.points_for(Difficulty::Easy), 1);
        assert_eq!(points.points_for(Difficulty::Medium), 3);
        assert_eq!(points.points_for(Difficulty::Hard), 5);
    }

    #[test]
    fn options_start_with_correct_answer() {
        let question = Question::new(
            "History",
            Difficulty::Easy,
            "Q?",
            "yes",
            vec!["no".into(), "maybe".into()],
        );
        assert_eq!(question.options(), vec!["yes", "no", "maybe"]);
    }
}
