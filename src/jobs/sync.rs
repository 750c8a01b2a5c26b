use super::{Job, JobResult, SyncConfig};
use crate::{
    clock::{Clock, SystemClock, start_of_day},
    error::{AppError, StatsResult},
    metrics::{track_provider_call, track_sync_attempt, track_sync_run},
    providers::AnalyticsProvider,
    stats::Account,
    storage::{DailyRecord, StatsStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Day being synced and the provider window that feeds it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncWindow {
    /// Date stamped on every record of the invocation
    pub date: NaiveDate,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl SyncWindow {
    /// Window `[day(now) - 1 day, day(now))`
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let date = now.date_naive();
        let to = start_of_day(date);
        Self {
            date,
            from: to - Duration::days(1),
            to,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Done,
    /// Every allowed pass failed
    Failed { last_error: String },
}

/// What one invocation of [`SyncJob::run`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub sync_date: NaiveDate,
    /// Passes executed, including the successful one
    pub attempts: u32,
    pub outcome: SyncOutcome,
    /// Counters of the last pass
    pub accounts_synced: usize,
    pub accounts_skipped: usize,
    pub questions_saved: usize,
}

impl SyncReport {
    pub fn is_done(&self) -> bool {
        self.outcome == SyncOutcome::Done
    }
}

#[derive(Debug, Default)]
struct PassTally {
    synced: usize,
    skipped: usize,
    questions: usize,
}

/// Daily analytics sync over every configured account.
///
/// A pass walks the accounts in configuration order and stops at the first
/// error. A failed pass is rerun from the first account until it succeeds or
/// `max_retries` extra passes have failed.
pub struct SyncJob {
    accounts: Vec<Account>,
    analytics: Arc<dyn AnalyticsProvider>,
    store: Arc<dyn StatsStore>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
}

impl SyncJob {
    pub fn new(
        accounts: Vec<Account>,
        analytics: Arc<dyn AnalyticsProvider>,
        store: Arc<dyn StatsStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            accounts,
            analytics,
            store,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the sync with retries. Never fails; a terminal failure is logged
    /// and reported in the returned [`SyncReport`].
    pub async fn run(&self) -> SyncReport {
        let started = Instant::now();
        let window = SyncWindow::ending_at(self.clock.now());
        let mut retry = 0u32;

        info!(
            "Starting analytics sync for {} ({} accounts)",
            window.date,
            self.accounts.len()
        );

        loop {
            match self.run_pass(&window).await {
                Ok(tally) => {
                    track_sync_attempt(true);
                    let attempts = retry + 1;
                    track_sync_run(true, attempts, started.elapsed());
                    info!(
                        "Analytics sync for {} completed after {} attempt(s)",
                        window.date, attempts
                    );
                    return SyncReport {
                        sync_date: window.date,
                        attempts,
                        outcome: SyncOutcome::Done,
                        accounts_synced: tally.synced,
                        accounts_skipped: tally.skipped,
                        questions_saved: tally.questions,
                    };
                }
                Err(e) => {
                    track_sync_attempt(false);
                    retry += 1;
                    warn!(error = %e, retry, "Analytics sync pass failed");

                    if retry > self.config.max_retries {
                        track_sync_run(false, retry, started.elapsed());
                        error!(
                            error = %e,
                            attempts = retry,
                            "Analytics sync for {} gave up",
                            window.date
                        );
                        return SyncReport {
                            sync_date: window.date,
                            attempts: retry,
                            outcome: SyncOutcome::Failed {
                                last_error: e.to_string(),
                            },
                            accounts_synced: 0,
                            accounts_skipped: 0,
                            questions_saved: 0,
                        };
                    }

                    let delay = self.config.backoff.delay_for(retry);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn run_pass(&self, window: &SyncWindow) -> StatsResult<PassTally> {
        let mut tally = PassTally::default();

        for account in &self.accounts {
            info!(account = %account.key, provider_id = %account.provider_id, "Updating");

            if self.config.skip_synced && self.store.has_daily(&account.key, window.date).await? {
                info!(account = %account.key, "Already synced, skipping");
                tally.skipped += 1;
                continue;
            }

            let summary = self
                .analytics
                .summary(&account.provider_id, window.from, window.to)
                .await;
            track_provider_call("analytics", "summary", summary.is_ok());
            let mut summary = summary?;
            summary.stamp(window.date);
            info!(account = %account.key, "Summary received");

            let breakdown = self
                .analytics
                .question_breakdown(&account.provider_id, window.from, window.to)
                .await;
            track_provider_call("analytics", "question_breakdown", breakdown.is_ok());
            let breakdown = breakdown?;
            info!(account = %account.key, count = breakdown.len(), "Questions received");

            // The breakdown key addresses the row, whatever the provider left in the stat
            let questions = breakdown
                .into_iter()
                .map(|(id, mut stat)| {
                    stat.question_id = id;
                    stat.stamp(window.date);
                    stat
                })
                .collect();

            let record = DailyRecord {
                account: account.key.clone(),
                date: window.date,
                summary,
                questions,
            };
            self.store.save_daily(&record).await?;
            info!(account = %account.key, "Analytics stats saved");

            tally.synced += 1;
            tally.questions += record.questions.len();
        }

        Ok(tally)
    }
}

#[async_trait]
impl Job for SyncJob {
    fn name(&self) -> &str {
        "analytics_sync"
    }

    async fn execute(&self) -> Result<JobResult, AppError> {
        let report = self.run().await;

        Ok(match report.outcome {
            SyncOutcome::Done => JobResult::success_with_count(
                (report.accounts_synced + report.questions_saved) as u64,
            ),
            SyncOutcome::Failed { last_error } => JobResult::failure(format!(
                "Analytics sync for {} failed after {} attempts: {}",
                report.sync_date, report.attempts, last_error
            )),
        })
    }
}
