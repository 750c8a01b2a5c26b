use crate::{
    error::AppError,
    jobs::{JobsConfig, scheduler::parse_schedule},
    stats::Account,
};
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub stats: StatsConfig,
    pub providers: ProvidersConfig,
    pub jobs: JobsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Account key used for realtime stats
    pub realtime_account: String,
    /// Analytics properties to sync, in sync order
    pub accounts: Vec<Account>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            realtime_account: "TheQuestion".to_string(),
            accounts: Vec::new(),
        }
    }
}

/// Credentials and endpoints handed to the provider clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub google_service_key_file: Option<String>,
    pub new_relic_api_key: Option<String>,
    pub teamcity_address: Option<String>,
    /// Ad-server network id per account key
    pub google_dfp_network_ids: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stats: StatsConfig::default(),
            providers: ProvidersConfig::default(),
            jobs: JobsConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SIDE_STATS")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix("SIDE_STATS")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    /// Reject configurations the sync job or facade cannot work with
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = HashSet::new();
        for account in &self.stats.accounts {
            if account.provider_id.trim().is_empty() {
                return Err(AppError::Internal(format!(
                    "Analytics account '{}' has an empty provider id",
                    account.key
                )));
            }
            if !seen.insert(account.key.as_str()) {
                return Err(AppError::Internal(format!(
                    "Duplicate analytics account key '{}'",
                    account.key
                )));
            }
        }

        parse_schedule(&self.jobs.analytics_sync.schedule)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::BackoffStrategy;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.stats.realtime_account, "TheQuestion");
        assert!(config.stats.accounts.is_empty());
        assert!(config.jobs.enabled);
        assert_eq!(config.jobs.analytics_sync.max_retries, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_config_load_from_yaml_file() {
        let yaml_content = r#"
stats:
  realtime_account: "Main"
  accounts:
    - key: "Main"
      provider_id: "ga-100"
    - key: "Blog"
      provider_id: "ga-200"
providers:
  teamcity_address: "http://ci.internal:8111"
  google_dfp_network_ids:
    Main: "4215"
jobs:
  enabled: false
  analytics_sync:
    schedule: "0 30 3 * * *"
    max_retries: 2
    skip_synced: true
    backoff:
      strategy: none
      initial_delay_ms: 0
      max_delay_ms: 0
logging:
  level: "warn"
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.stats.realtime_account, "Main");
        assert_eq!(
            config.stats.accounts,
            vec![Account::new("Main", "ga-100"), Account::new("Blog", "ga-200")]
        );
        assert_eq!(
            config.providers.teamcity_address.as_deref(),
            Some("http://ci.internal:8111")
        );
        assert_eq!(
            config.providers.google_dfp_network_ids.get("Main").map(String::as_str),
            Some("4215")
        );
        assert!(!config.jobs.enabled);
        assert_eq!(config.jobs.analytics_sync.schedule, "0 30 3 * * *");
        assert_eq!(config.jobs.analytics_sync.max_retries, 2);
        assert!(config.jobs.analytics_sync.skip_synced);
        assert_eq!(
            config.jobs.analytics_sync.backoff.strategy,
            BackoffStrategy::None
        );
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let yaml_content = r#"
logging:
  level: "warn"
"#;
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        // SAFETY: serialized with the other env-reading tests
        unsafe {
            std::env::set_var("SIDE_STATS_LOGGING__LEVEL", "debug");
            std::env::set_var("SIDE_STATS_JOBS__ANALYTICS_SYNC__MAX_RETRIES", "9");
        }
        let config = Config::load_from_file(temp_file.path());
        unsafe {
            std::env::remove_var("SIDE_STATS_LOGGING__LEVEL");
            std::env::remove_var("SIDE_STATS_JOBS__ANALYTICS_SYNC__MAX_RETRIES");
        }

        let config = config.unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.jobs.analytics_sync.max_retries, 9);
    }

    #[test]
    #[serial]
    fn test_config_load_nonexistent_file() {
        let config = Config::load_from_file("nonexistent.yaml").unwrap();

        assert_eq!(config.stats.realtime_account, "TheQuestion");
        assert!(config.stats.accounts.is_empty());
        assert!(config.providers.google_dfp_network_ids.is_empty());
        assert_eq!(config.jobs.analytics_sync.schedule, "0 0 4 * * *");
    }

    #[test]
    #[serial]
    fn test_config_load_without_any_source() {
        assert!(!Path::new("config.yaml").exists());

        let config = Config::load().unwrap();

        assert_eq!(config.stats.realtime_account, "TheQuestion");
        assert!(config.stats.accounts.is_empty());
        assert!(config.providers.teamcity_address.is_none());
        assert_eq!(config.jobs.analytics_sync.max_retries, 5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_file_without_accounts_keeps_defaults() {
        let yaml_content = r#"
stats:
  realtime_account: "Main"
"#;
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.stats.realtime_account, "Main");
        assert!(config.stats.accounts.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let mut config = Config::default();
        config.stats.accounts = vec![Account::new("A", "ga-1"), Account::new("A", "ga-2")];

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate analytics account key 'A'"));
    }

    #[test]
    fn test_validate_rejects_empty_provider_id() {
        let mut config = Config::default();
        config.stats.accounts = vec![Account::new("A", "  ")];

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_schedule() {
        let mut config = Config::default();
        config.jobs.analytics_sync.schedule = "every day".to_string();

        assert!(matches!(config.validate(), Err(AppError::Internal(_))));
    }
}
