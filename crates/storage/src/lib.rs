#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryStatsStore, StatsRepository, Storage, StorageError};
pub use sqlite::SqliteInitError;
