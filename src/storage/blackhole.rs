use super::{DailyRecord, StatsStore, StorageResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

/// Blackhole stats storage - discards all writes and returns empty results for reads
/// Used when persistence is disabled in configuration
#[derive(Default)]
pub struct BlackholeStatsStore;

impl BlackholeStatsStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StatsStore for BlackholeStatsStore {
    async fn save_daily(&self, record: &DailyRecord) -> StorageResult<()> {
        debug!(
            account = %record.account,
            date = %record.date,
            "Discarding daily stats"
        );
        Ok(())
    }

    async fn has_daily(&self, _account: &str, _date: NaiveDate) -> StorageResult<bool> {
        // Nothing is ever stored
        Ok(false)
    }

    async fn get_daily(
        &self,
        _account: &str,
        _date: NaiveDate,
    ) -> StorageResult<Option<DailyRecord>> {
        Ok(None)
    }
}
