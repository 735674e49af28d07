use async_trait::async_trait;
use sqlx::Row;
use trivia_core::model::LifetimeStats;

use super::SqliteRepository;
use crate::repository::{StatsRepository, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u64_from_i64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn i64_from_u64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn map_stats_row(row: &sqlx::sqlite::SqliteRow) -> Result<LifetimeStats, StorageError> {
    let quizzes_played = u32_from_i64(
        "quizzes_played",
        row.try_get::<i64, _>("quizzes_played").map_err(ser)?,
    )?;
    let questions_answered = u32_from_i64(
        "questions_answered",
        row.try_get::<i64, _>("questions_answered").map_err(ser)?,
    )?;
    let total_seconds = u64_from_i64(
        "total_seconds",
        row.try_get::<i64, _>("total_seconds").map_err(ser)?,
    )?;
    let correct_answers = u32_from_i64(
        "correct_answers",
        row.try_get::<i64, _>("correct_answers").map_err(ser)?,
    )?;
    let wrong_answers = u32_from_i64(
        "wrong_answers",
        row.try_get::<i64, _>("wrong_answers").map_err(ser)?,
    )?;
    let avg_answer_time: String = row.try_get("avg_answer_time").map_err(ser)?;

    Ok(LifetimeStats::from_persisted(
        quizzes_played,
        questions_answered,
        total_seconds,
        correct_answers,
        wrong_answers,
        avg_answer_time,
    ))
}

#[async_trait]
impl StatsRepository for SqliteRepository {
    async fn save(&self, key: &str, stats: &LifetimeStats) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO lifetime_stats (
                    key, quizzes_played, questions_answered, total_seconds,
                    correct_answers, wrong_answers, avg_answer_time
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(key) DO UPDATE SET
                    quizzes_played = excluded.quizzes_played,
                    questions_answered = excluded.questions_answered,
                    total_seconds = excluded.total_seconds,
                    correct_answers = excluded.correct_answers,
                    wrong_answers = excluded.wrong_answers,
                    avg_answer_time = excluded.avg_answer_time
            ",
        )
        .bind(key)
        .bind(i64::from(stats.quizzes_played()))
        .bind(i64::from(stats.questions_answered()))
        .bind(i64_from_u64("total_seconds", stats.total_seconds())?)
        .bind(i64::from(stats.correct_answers()))
        .bind(i64::from(stats.wrong_answers()))
        .bind(stats.avg_answer_time())
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<LifetimeStats>, StorageError> {
        let row = sqlx::query("SELECT * FROM lifetime_stats WHERE key = ?1")
            .bind(key)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_stats_row).transpose()
    }
}
