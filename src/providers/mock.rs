use super::{
    AnalyticsProvider, BuildSystemProvider, PerformanceMonitorProvider, ProjectStatus,
    ProviderError, ProviderResult, ServerStatus,
};
use crate::stats::{DailySummary, QuestionStat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use tokio::sync::Mutex;

/// Provider call recorded by [`MockAnalytics`], in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Realtime(String),
    Summary(String),
    Breakdown(String),
}

/// Scriptable analytics provider for tests
///
/// Each provider id can be given canned data and a number of leading calls
/// that fail before the provider turns healthy.
pub struct MockAnalytics {
    realtime_count: i64,
    latency: Option<Duration>,
    summaries: DashMap<String, DailySummary>,
    breakdowns: DashMap<String, BTreeMap<i64, QuestionStat>>,
    summary_failures: DashMap<String, usize>,
    breakdown_failures: DashMap<String, usize>,
    realtime_failures: AtomicUsize,
    calls: Mutex<Vec<MockCall>>,
}

impl MockAnalytics {
    pub fn new() -> Self {
        Self {
            realtime_count: 0,
            latency: None,
            summaries: DashMap::new(),
            breakdowns: DashMap::new(),
            summary_failures: DashMap::new(),
            breakdown_failures: DashMap::new(),
            realtime_failures: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_realtime(mut self, count: i64) -> Self {
        self.realtime_count = count;
        self
    }

    /// Sleep this long inside every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_summary(self, provider_id: &str, summary: DailySummary) -> Self {
        self.summaries.insert(provider_id.to_string(), summary);
        self
    }

    pub fn with_breakdown<I>(self, provider_id: &str, stats: I) -> Self
    where
        I: IntoIterator<Item = QuestionStat>,
    {
        let breakdown = stats.into_iter().map(|s| (s.question_id, s)).collect();
        self.breakdowns.insert(provider_id.to_string(), breakdown);
        self
    }

    /// Fail the first `times` summary calls for `provider_id`
    pub fn fail_summary(self, provider_id: &str, times: usize) -> Self {
        self.summary_failures.insert(provider_id.to_string(), times);
        self
    }

    /// Fail the first `times` breakdown calls for `provider_id`
    pub fn fail_breakdown(self, provider_id: &str, times: usize) -> Self {
        self.breakdown_failures.insert(provider_id.to_string(), times);
        self
    }

    pub fn fail_realtime(self, times: usize) -> Self {
        self.realtime_failures.store(times, Ordering::SeqCst);
        self
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    pub async fn summary_calls(&self, provider_id: &str) -> usize {
        self.count(|call| matches!(call, MockCall::Summary(id) if id == provider_id))
            .await
    }

    pub async fn breakdown_calls(&self, provider_id: &str) -> usize {
        self.count(|call| matches!(call, MockCall::Breakdown(id) if id == provider_id))
            .await
    }

    pub async fn realtime_calls(&self) -> usize {
        self.count(|call| matches!(call, MockCall::Realtime(_))).await
    }

    async fn count(&self, predicate: impl Fn(&MockCall) -> bool) -> usize {
        self.calls.lock().await.iter().filter(|c| predicate(*c)).count()
    }

    async fn record(&self, call: MockCall) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.calls.lock().await.push(call);
    }

    fn take_failure(failures: &DashMap<String, usize>, provider_id: &str) -> bool {
        match failures.get_mut(provider_id) {
            Some(mut remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

impl Default for MockAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalyticsProvider for MockAnalytics {
    async fn realtime(&self, provider_id: &str) -> ProviderResult<i64> {
        self.record(MockCall::Realtime(provider_id.to_string())).await;

        let failed = self
            .realtime_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ProviderError::Unavailable("mock realtime failure".to_string()));
        }

        Ok(self.realtime_count)
    }

    async fn summary(
        &self,
        provider_id: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> ProviderResult<DailySummary> {
        self.record(MockCall::Summary(provider_id.to_string())).await;

        if Self::take_failure(&self.summary_failures, provider_id) {
            return Err(ProviderError::Network(format!(
                "mock summary failure for {provider_id}"
            )));
        }

        Ok(self
            .summaries
            .get(provider_id)
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }

    async fn question_breakdown(
        &self,
        provider_id: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
    ) -> ProviderResult<BTreeMap<i64, QuestionStat>> {
        self.record(MockCall::Breakdown(provider_id.to_string())).await;

        if Self::take_failure(&self.breakdown_failures, provider_id) {
            return Err(ProviderError::MalformedResponse(format!(
                "mock breakdown failure for {provider_id}"
            )));
        }

        Ok(self
            .breakdowns
            .get(provider_id)
            .map(|b| b.value().clone())
            .unwrap_or_default())
    }
}

/// Performance monitor returning a fixed server list or a fixed error
pub struct MockPerformanceMonitor {
    response: ProviderResult<Vec<ServerStatus>>,
    calls: AtomicUsize,
}

impl MockPerformanceMonitor {
    pub fn new(servers: Vec<ServerStatus>) -> Self {
        Self {
            response: Ok(servers),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PerformanceMonitorProvider for MockPerformanceMonitor {
    async fn server_health(&self) -> ProviderResult<Vec<ServerStatus>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Build system returning a fixed project list or a fixed error
pub struct MockBuildSystem {
    response: ProviderResult<Vec<ProjectStatus>>,
    calls: AtomicUsize,
}

impl MockBuildSystem {
    pub fn new(projects: Vec<ProjectStatus>) -> Self {
        Self {
            response: Ok(projects),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BuildSystemProvider for MockBuildSystem {
    async fn project_status(&self) -> ProviderResult<Vec<ProjectStatus>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_summary_failures_then_success() {
        let mock = MockAnalytics::new().fail_summary("ga-A", 2);
        let now = Utc::now();

        assert!(mock.summary("ga-A", now, now).await.is_err());
        assert!(mock.summary("ga-A", now, now).await.is_err());
        assert!(mock.summary("ga-A", now, now).await.is_ok());
        assert!(mock.summary("ga-B", now, now).await.is_ok());

        assert_eq!(mock.summary_calls("ga-A").await, 3);
        assert_eq!(mock.summary_calls("ga-B").await, 1);
    }

    #[tokio::test]
    async fn test_realtime_failure_is_consumed() {
        let mock = MockAnalytics::new().with_realtime(17).fail_realtime(1);

        assert!(mock.realtime("ga-A").await.is_err());
        assert_eq!(mock.realtime("ga-A").await, Ok(17));
        assert_eq!(mock.realtime_calls().await, 2);
    }
}
