use super::{DailyRecord, StatsStore, StorageResult};
use crate::stats::{DailySummary, QuestionStat};
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

type DayKey = (String, NaiveDate);
type QuestionKey = (String, NaiveDate, i64);

/// In-memory stats storage
#[derive(Clone, Default)]
pub struct MemoryStatsStore {
    summaries: Arc<DashMap<DayKey, DailySummary>>,
    questions: Arc<DashMap<QuestionKey, QuestionStat>>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save_daily` calls served so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn summary_count(&self) -> usize {
        self.summaries.len()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn save_daily(&self, record: &DailyRecord) -> StorageResult<()> {
        let account = record.account.clone();
        let date = record.date;

        self.summaries
            .insert((account.clone(), date), record.summary.clone());

        // Drop rows from an earlier write of the same day that this batch no longer has
        let question_ids = record.question_ids();
        self.questions.retain(|(a, d, id), _| {
            !(a == &account && *d == date && !question_ids.contains(id))
        });

        for stat in &record.questions {
            self.questions
                .insert((account.clone(), date, stat.question_id), stat.clone());
        }

        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn has_daily(&self, account: &str, date: NaiveDate) -> StorageResult<bool> {
        Ok(self.summaries.contains_key(&(account.to_string(), date)))
    }

    async fn get_daily(
        &self,
        account: &str,
        date: NaiveDate,
    ) -> StorageResult<Option<DailyRecord>> {
        let Some(summary) = self
            .summaries
            .get(&(account.to_string(), date))
            .map(|s| s.value().clone())
        else {
            return Ok(None);
        };

        let mut questions: Vec<QuestionStat> = self
            .questions
            .iter()
            .filter(|entry| {
                let (a, d, _) = entry.key();
                a == account && *d == date
            })
            .map(|entry| entry.value().clone())
            .collect();
        questions.sort_by_key(|q| q.question_id);

        Ok(Some(DailyRecord {
            account: account.to_string(),
            date,
            summary,
            questions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(account: &str, date: NaiveDate, ids: &[i64]) -> DailyRecord {
        let questions: Vec<QuestionStat> = ids
            .iter()
            .map(|id| {
                let mut q = QuestionStat::new(*id);
                q.page_views = *id * 10;
                q.stamp(date);
                q
            })
            .collect();
        let mut summary = DailySummary {
            sessions: 5,
            ..Default::default()
        };
        summary.stamp(date);

        DailyRecord {
            account: account.to_string(),
            date,
            summary,
            questions,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[tokio::test]
    async fn test_save_and_get_daily() {
        let store = MemoryStatsStore::new();
        store.save_daily(&record("A", day(1), &[101, 102])).await.unwrap();

        let saved = store.get_daily("A", day(1)).await.unwrap().unwrap();
        assert_eq!(saved.question_ids(), vec![101, 102]);
        assert_eq!(saved.questions[1].page_views, 1020);
        assert!(store.has_daily("A", day(1)).await.unwrap());
        assert!(!store.has_daily("A", day(2)).await.unwrap());
        assert!(store.get_daily("B", day(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_daily_is_idempotent() {
        let store = MemoryStatsStore::new();
        let rec = record("A", day(1), &[101, 102]);

        store.save_daily(&rec).await.unwrap();
        store.save_daily(&rec).await.unwrap();

        assert_eq!(store.write_count(), 2);
        assert_eq!(store.summary_count(), 1);
        assert_eq!(store.question_count(), 2);
    }

    #[tokio::test]
    async fn test_rewrite_replaces_question_batch() {
        let store = MemoryStatsStore::new();
        store.save_daily(&record("A", day(1), &[101, 102])).await.unwrap();
        store.save_daily(&record("A", day(2), &[101])).await.unwrap();
        store.save_daily(&record("A", day(1), &[102, 103])).await.unwrap();

        let first = store.get_daily("A", day(1)).await.unwrap().unwrap();
        assert_eq!(first.question_ids(), vec![102, 103]);

        let second = store.get_daily("A", day(2)).await.unwrap().unwrap();
        assert_eq!(second.question_ids(), vec![101]);
    }
}
