use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use trivia_core::model::Question;

use crate::error::FetchError;

/// Contract for the external question supplier.
///
/// A batch always holds at least one question on success; failures must be
/// surfaced to the caller rather than swallowed.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch one batch of `amount` questions from the given category.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the source is unreachable, answers with a
    /// non-success status, or sends malformed question data.
    async fn fetch_batch(&self, amount: u8, category: u32) -> Result<Vec<Question>, FetchError>;
}

const DEFAULT_BASE_URL: &str = "https://opentdb.com/api.php";

/// HTTP client for the Open Trivia DB JSON API.
#[derive(Clone)]
pub struct OpenTriviaClient {
    client: Client,
    base_url: String,
}

impl Default for OpenTriviaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenTriviaClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (tests, mirrors).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl QuestionSource for OpenTriviaClient {
    async fn fetch_batch(&self, amount: u8, category: u32) -> Result<Vec<Question>, FetchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("amount", u32::from(amount)), ("category", category)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: ApiResponse = response.json().await?;
        body.into_questions()
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: u8,
    results: Vec<QuestionDto>,
}

impl ApiResponse {
    fn into_questions(self) -> Result<Vec<Question>, FetchError> {
        if self.response_code != 0 {
            return Err(FetchError::ApiResponse(self.response_code));
        }
        self.results.into_iter().map(QuestionDto::into_question).collect()
    }
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    category: String,
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl QuestionDto {
    fn into_question(self) -> Result<Question, FetchError> {
        let difficulty = self
            .difficulty
            .parse()
            .map_err(|e: trivia_core::model::DifficultyParseError| {
                FetchError::InvalidQuestion(e.to_string())
            })?;
        Ok(Question::new(
            self.category,
            difficulty,
            self.question,
            self.correct_answer,
            self.incorrect_answers,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trivia_core::model::Difficulty;

    const SAMPLE: &str = r#"{
        "response_code": 0,
        "results": [
            {
                "category": "Science & Nature",
                "type": "multiple",
                "difficulty": "medium",
                "question": "What is the unit of electrical resistance?",
                "correct_answer": "Ohm",
                "incorrect_answers": ["Watt", "Volt", "Ampere"]
            }
        ]
    }"#;

    #[test]
    fn decodes_api_payload() {
        let body: ApiResponse = serde_json::from_str(SAMPLE).unwrap();
        let questions = body.into_questions().unwrap();

        assert_eq!(questions.len(), 1);
        let q = &questions[0];
        assert_eq!(q.category(), "Science & Nature");
        assert_eq!(q.difficulty(), Difficulty::Medium);
        assert_eq!(q.correct_answer(), "Ohm");
        assert_eq!(q.incorrect_answers().len(), 3);
    }

    #[test]
    fn non_zero_response_code_is_an_error() {
        let body: ApiResponse =
            serde_json::from_str(r#"{"response_code": 1, "results": []}"#).unwrap();
        assert!(matches!(
            body.into_questions().unwrap_err(),
            FetchError::ApiResponse(1)
        ));
    }

    #[test]
    fn unknown_difficulty_is_an_error() {
        let dto = QuestionDto {
            category: "History".into(),
            difficulty: "legendary".into(),
            question: "Q?".into(),
            correct_answer: "a".into(),
            incorrect_answers: vec!["b".into()],
        };
        assert!(matches!(
            dto.into_question().unwrap_err(),
            FetchError::InvalidQuestion(_)
        ));
    }
}
