use super::Account;
use crate::{
    error::{StatsError, StatsResult},
    metrics::track_provider_call,
    providers::{
        AnalyticsProvider, BuildSystemProvider, PerformanceMonitorProvider, ProjectStatus,
        ServerStatus,
    },
};
use std::sync::Arc;
use tracing::debug;

/// Single entry point for realtime, server health and build project stats.
///
/// Every call is exactly one provider request: no retries, no caching and no
/// reshaping of the result.
#[derive(Clone)]
pub struct SideStats {
    accounts: Arc<[Account]>,
    realtime_account: String,
    analytics: Arc<dyn AnalyticsProvider>,
    monitor: Arc<dyn PerformanceMonitorProvider>,
    builds: Arc<dyn BuildSystemProvider>,
}

impl SideStats {
    pub fn new(
        accounts: Vec<Account>,
        realtime_account: impl Into<String>,
        analytics: Arc<dyn AnalyticsProvider>,
        monitor: Arc<dyn PerformanceMonitorProvider>,
        builds: Arc<dyn BuildSystemProvider>,
    ) -> Self {
        Self {
            accounts: accounts.into(),
            realtime_account: realtime_account.into(),
            analytics,
            monitor,
            builds,
        }
    }

    /// Active users right now on the realtime-tracking account
    pub async fn realtime(&self) -> StatsResult<i64> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.key == self.realtime_account)
            .ok_or_else(|| {
                StatsError::Configuration(format!(
                    "No analytics account configured for key '{}'",
                    self.realtime_account
                ))
            })?;

        debug!(account = %account.key, "Fetching realtime stats");
        let result = self.analytics.realtime(&account.provider_id).await;
        track_provider_call("analytics", "realtime", result.is_ok());
        Ok(result?)
    }

    pub async fn server_health(&self) -> StatsResult<Vec<ServerStatus>> {
        let result = self.monitor.server_health().await;
        track_provider_call("performance_monitor", "server_health", result.is_ok());
        Ok(result?)
    }

    pub async fn project_status(&self) -> StatsResult<Vec<ProjectStatus>> {
        let result = self.builds.project_status().await;
        track_provider_call("build_system", "project_status", result.is_ok());
        Ok(result?)
    }
}
