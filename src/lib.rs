pub mod clock;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod providers;
pub mod stats;
pub mod storage;

pub use config::Config;
pub use error::{AppError, StatsError};
pub use jobs::{SyncJob, SyncReport};
pub use stats::SideStats;
