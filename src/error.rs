use crate::{providers::ProviderError, storage::StorageError};
use std::fmt;
use thiserror::Error;

/// Errors surfaced by stats operations and a single sync pass
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type StatsResult<T> = Result<T, StatsError>;

#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    Stats(StatsError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "Configuration error: {}", err),
            AppError::Stats(err) => write!(f, "Stats error: {}", err),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Stats(err) => Some(err),
            AppError::Internal(_) => None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<StatsError> for AppError {
    fn from(err: StatsError) -> Self {
        AppError::Stats(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let config_err = AppError::Config(config::ConfigError::NotFound("test".to_string()));
        assert!(config_err.to_string().contains("Configuration error"));

        let stats_err = AppError::Stats(StatsError::Configuration("no key".to_string()));
        assert_eq!(
            stats_err.to_string(),
            "Stats error: Configuration error: no key"
        );

        let internal_err = AppError::Internal("test message".to_string());
        assert_eq!(internal_err.to_string(), "Internal error: test message");
    }

    #[test]
    fn test_stats_error_from_provider_error() {
        let err: StatsError = ProviderError::Network("connection reset".to_string()).into();
        assert!(matches!(err, StatsError::Provider(ProviderError::Network(_))));
        assert_eq!(err.to_string(), "Provider error: Network error: connection reset");
    }

    #[test]
    fn test_stats_error_from_storage_error() {
        let err: StatsError = StorageError::Database("disk full".to_string()).into();
        assert!(matches!(err, StatsError::Persistence(_)));
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = config::ConfigError::NotFound("test".to_string()).into();
        assert!(matches!(app_err, AppError::Config(_)));
    }
}
