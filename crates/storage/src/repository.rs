use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use trivia_core::model::LifetimeStats;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for persisted lifetime statistics.
///
/// Values are stored as a flat record under a caller-chosen key and must
/// round-trip exactly: counters lossless, the formatted average-time string
/// verbatim.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Persist or replace the stats record stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save(&self, key: &str, stats: &LifetimeStats) -> Result<(), StorageError>;

    /// Fetch the stats record stored under `key`.
    ///
    /// Returns `None` when no record has been saved yet; callers substitute
    /// the zero-valued default rather than treating this as a failure.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for connection or decoding failures.
    async fn load(&self, key: &str) -> Result<Option<LifetimeStats>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStatsStore {
    records: Arc<Mutex<HashMap<String, LifetimeStats>>>,
}

impl InMemoryStatsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsStore {
    async fn save(&self, key: &str, stats: &LifetimeStats) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), stats.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<LifetimeStats>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stats: Arc<dyn StatsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            stats: Arc::new(InMemoryStatsStore::new()),
        }
    }
}
