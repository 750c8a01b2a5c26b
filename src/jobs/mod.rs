pub mod scheduler;
pub mod sync;

use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use scheduler::JobScheduler;
pub use sync::{SyncJob, SyncOutcome, SyncReport};

/// Configuration for the job system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Enable/disable internal job scheduler
    pub enabled: bool,

    /// Daily analytics sync job configuration
    pub analytics_sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Cron schedule expression
    pub schedule: String,
    /// Additional passes after the first failed one
    pub max_retries: u32,
    /// Skip accounts whose day is already stored
    #[serde(default)]
    pub skip_synced: bool,
    #[serde(default)]
    pub backoff: BackoffConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            schedule: "0 0 4 * * *".to_string(), // Daily at 4 AM
            max_retries: 5,
            skip_synced: false,
            backoff: BackoffConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Retry immediately
    None,
    /// Double the delay after every failed pass
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    pub strategy: BackoffStrategy,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl BackoffConfig {
    pub fn none() -> Self {
        Self {
            strategy: BackoffStrategy::None,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        match self.strategy {
            BackoffStrategy::None => Duration::ZERO,
            BackoffStrategy::Exponential => {
                let factor = 1u64
                    .checked_shl(retry.saturating_sub(1))
                    .unwrap_or(u64::MAX);
                let delay_ms = self
                    .initial_delay_ms
                    .saturating_mul(factor)
                    .min(self.max_delay_ms);
                Duration::from_millis(delay_ms)
            }
        }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            strategy: BackoffStrategy::Exponential,
            initial_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            analytics_sync: SyncConfig::default(),
        }
    }
}

/// Result of job execution
#[derive(Debug, Clone)]
pub struct JobResult {
    pub success: bool,
    pub message: String,
    pub items_processed: u64,
}

impl JobResult {
    pub fn success_with_count(count: u64) -> Self {
        Self {
            success: true,
            message: format!("Successfully processed {count} items"),
            items_processed: count,
        }
    }

    pub fn success() -> Self {
        Self {
            success: true,
            message: "Job completed successfully".to_string(),
            items_processed: 0,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message,
            items_processed: 0,
        }
    }
}

/// Trait for executable jobs
#[async_trait]
pub trait Job: Send + Sync {
    /// Get the job name for logging and identification
    fn name(&self) -> &str;

    /// Execute the job and return the result
    async fn execute(&self) -> Result<JobResult, AppError>;
}
