use crate::stats::{DailySummary, QuestionStat};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod blackhole;
pub mod memory;

pub use blackhole::BlackholeStatsStore;
pub use memory::MemoryStatsStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Not found")]
    NotFound,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One account's stamped analytics for one day
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub account: String,
    pub date: NaiveDate,
    pub summary: DailySummary,
    pub questions: Vec<QuestionStat>,
}

impl DailyRecord {
    /// Ids addressing the question rows of this batch
    pub fn question_ids(&self) -> Vec<i64> {
        self.questions.iter().map(|q| q.question_id).collect()
    }
}

/// Persistence for synced analytics
///
/// Writes are upserts keyed by account + date (+ question id), so a retried
/// sync can rewrite a day without duplicating rows.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Store the summary and replace the question batch for `record.account` on `record.date`
    async fn save_daily(&self, record: &DailyRecord) -> StorageResult<()>;

    /// Whether a summary already exists for the account on that day
    async fn has_daily(&self, account: &str, date: NaiveDate) -> StorageResult<bool>;

    async fn get_daily(&self, account: &str, date: NaiveDate)
    -> StorageResult<Option<DailyRecord>>;
}
