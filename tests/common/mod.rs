use side_stats::{
    Config, SideStats, SyncJob,
    jobs::BackoffConfig,
    providers::mock::{MockAnalytics, MockBuildSystem, MockPerformanceMonitor},
    stats::Account,
    storage::MemoryStatsStore,
};
use std::sync::Arc;

/// Unified test harness wiring mocks into the sync job and facade
pub struct TestHarness {
    pub config: Config,
    pub analytics: Arc<MockAnalytics>,
    pub store: Arc<MemoryStatsStore>,
}

impl TestHarness {
    /// Harness over accounts `(key, provider_id)` with immediate retries
    pub fn new(accounts: &[(&str, &str)], analytics: MockAnalytics) -> Self {
        let mut config = Config::default();
        config.stats.accounts = accounts
            .iter()
            .map(|(key, id)| Account::new(*key, *id))
            .collect();
        config.jobs.analytics_sync.backoff = BackoffConfig::none();

        Self {
            config,
            analytics: Arc::new(analytics),
            store: Arc::new(MemoryStatsStore::new()),
        }
    }

    #[allow(dead_code)]
    pub fn sync_job(&self) -> SyncJob {
        SyncJob::new(
            self.config.stats.accounts.clone(),
            self.analytics.clone(),
            self.store.clone(),
            self.config.jobs.analytics_sync.clone(),
        )
    }

    #[allow(dead_code)]
    pub fn side_stats(
        &self,
        monitor: Arc<MockPerformanceMonitor>,
        builds: Arc<MockBuildSystem>,
    ) -> SideStats {
        SideStats::new(
            self.config.stats.accounts.clone(),
            self.config.stats.realtime_account.clone(),
            self.analytics.clone(),
            monitor,
            builds,
        )
    }
}
