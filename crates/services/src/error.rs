//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use trivia_core::model::{CatalogError, ResultError};

/// Errors emitted by the question source adapter.
///
/// A fetch failure is reported to the caller and skips that batch only; it
/// never aborts the other in-flight batch fetches.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("question request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("question source answered with response code {0}")]
    ApiResponse(u8),

    #[error("question source sent an invalid question: {0}")]
    InvalidQuestion(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by the session engine and the play workflow.
///
/// The sequencing variants (`AlreadyActive`, `NotActive`, `NoAnswerChosen`,
/// `UnknownOption`) are recoverable user-input errors; they reject the call
/// and leave the session state unchanged.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("a session is already active")]
    AlreadyActive,

    #[error("session already completed")]
    Completed,

    #[error("no active session")]
    NotActive,

    #[error("no answer chosen for the current question")]
    NoAnswerChosen,

    #[error("not an option for the current question: {0}")]
    UnknownOption(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Score(#[from] ResultError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
