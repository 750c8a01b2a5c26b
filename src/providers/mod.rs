//! Capability traits for the external stats providers
//!
//! Concrete HTTP clients live outside this crate; everything here talks to
//! them through these traits.

pub mod mock;

use crate::stats::{DailySummary, QuestionStat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Web analytics service
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Number of active users right now
    async fn realtime(&self, provider_id: &str) -> ProviderResult<i64>;

    /// Aggregated metrics for the window `[from, to)`
    async fn summary(
        &self,
        provider_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ProviderResult<DailySummary>;

    /// Per-question metrics for the window `[from, to)`, keyed by question id
    async fn question_breakdown(
        &self,
        provider_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> ProviderResult<BTreeMap<i64, QuestionStat>>;
}

/// Application performance monitoring service
#[async_trait]
pub trait PerformanceMonitorProvider: Send + Sync {
    async fn server_health(&self) -> ProviderResult<Vec<ServerStatus>>;
}

/// Continuous integration service
#[async_trait]
pub trait BuildSystemProvider: Send + Sync {
    async fn project_status(&self) -> ProviderResult<Vec<ProjectStatus>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Green,
    Orange,
    Red,
    Gray,
    Unknown,
}

/// Host health as reported by the performance monitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub id: i64,
    pub name: String,
    pub host: String,
    pub health_status: HealthStatus,
    pub reporting: bool,
    pub last_reported_at: Option<DateTime<Utc>>,
    pub cpu_percent: Option<f64>,
    pub memory_percent: Option<f64>,
    pub disk_io_percent: Option<f64>,
    pub fullest_disk_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Success,
    Failure,
    Running,
    Unknown,
}

/// Build project as reported by the CI server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub archived: bool,
    pub last_build: BuildState,
    pub web_url: Option<String>,
}
