//! Configuration loading and typed config structures.
//!
//! A deployment is described by `hrs-config.yaml`:
//!
//! ```yaml
//! deployment:
//!   owner: "0190c6c4-0000-7000-8000-000000000000"
//!   principal: "0190c6c4-0000-7000-8000-000000000001"
//!   hierarchy:
//!     superior_to_inferiors:
//!       - ["<A>", ["<B>", "<C>"]]
//!     inferior_to_superior:
//!       - ["<B>", "<A>"]
//!       - ["<C>", "<A>"]
//!     levels:
//!       - ["<A>", 0]
//!       - ["<B>", 1]
//!       - ["<C>", 1]
//! subscriptions:
//!   default_term_days: 30
//! rewards:
//!   require_principal: false
//! notifications:
//!   capacity: 256
//! logging:
//!   level: info
//!   json: false
//! ```
//!
//! Every section except `deployment` is optional and falls back to the
//! defaults shown above.

use std::path::Path;

use serde::Deserialize;

use hrs_types::{AgentId, HierarchySnapshot};

use crate::notify::DEFAULT_CAPACITY;

/// Seconds in one day.
const SECONDS_PER_DAY: u64 = 86_400;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HrsConfig {
    /// Construction parameters of the organization.
    pub deployment: DeploymentConfig,

    /// Subscription defaults.
    #[serde(default)]
    pub subscriptions: SubscriptionConfig,

    /// Reward cascade access.
    #[serde(default)]
    pub rewards: RewardConfig,

    /// Notification channel sizing.
    #[serde(default)]
    pub notifications: NotificationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HrsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `HRS_LOG_LEVEL` overrides `logging.level`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// `HRS_LOG_LEVEL` overrides `logging.level`.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Identities and initial hierarchy supplied by the deployment tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeploymentConfig {
    /// Deployer identity, reported by `get_owner`.
    pub owner: AgentId,
    /// The only identity allowed to restructure the hierarchy and catalog.
    pub principal: AgentId,
    /// Initial hierarchy.
    pub hierarchy: HierarchySnapshot,
}

/// Subscription defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SubscriptionConfig {
    /// Term granted by policies registered without an explicit term.
    #[serde(default = "default_term_days")]
    pub default_term_days: u64,
}

impl SubscriptionConfig {
    /// The default term in seconds, saturating on absurd values.
    pub const fn default_term_seconds(&self) -> u64 {
        self.default_term_days.saturating_mul(SECONDS_PER_DAY)
    }
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            default_term_days: default_term_days(),
        }
    }
}

/// Reward cascade access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RewardConfig {
    /// Restrict `reward` to the principal. Off by default: rewards are open
    /// to any caller.
    #[serde(default)]
    pub require_principal: bool,
}

/// Notification channel sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NotificationConfig {
    /// Notifications buffered per lagging listener.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Apply `HRS_LOG_LEVEL` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HRS_LOG_LEVEL") {
            self.level = val;
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_term_days() -> u64 {
    30
}

const fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
deployment:
  owner: "0190c6c4-0000-7000-8000-00000000000a"
  principal: "0190c6c4-0000-7000-8000-00000000000b"
  hierarchy:
    superior_to_inferiors:
      - ["0190c6c4-0000-7000-8000-000000000001", ["0190c6c4-0000-7000-8000-000000000002"]]
    inferior_to_superior:
      - ["0190c6c4-0000-7000-8000-000000000002", "0190c6c4-0000-7000-8000-000000000001"]
    levels:
      - ["0190c6c4-0000-7000-8000-000000000001", 0]
      - ["0190c6c4-0000-7000-8000-000000000002", 1]
"#;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let config = HrsConfig::parse(MINIMAL);
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(config.deployment.hierarchy.levels.len(), 2);
            assert_eq!(config.subscriptions.default_term_days, 30);
            assert_eq!(config.subscriptions.default_term_seconds(), 30 * 86_400);
            assert!(!config.rewards.require_principal);
            assert_eq!(config.notifications.capacity, DEFAULT_CAPACITY);
            assert!(!config.logging.json);
        }
    }

    #[test]
    fn sections_override_defaults() {
        let yaml = format!(
            "{MINIMAL}\nsubscriptions:\n  default_term_days: 7\nrewards:\n  require_principal: true\nnotifications:\n  capacity: 16\n"
        );
        let config = HrsConfig::parse(&yaml);
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(config.subscriptions.default_term_days, 7);
            assert!(config.rewards.require_principal);
            assert_eq!(config.notifications.capacity, 16);
        }
    }

    #[test]
    fn missing_deployment_is_an_error() {
        assert!(matches!(
            HrsConfig::parse("logging:\n  level: debug\n"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            HrsConfig::from_file(Path::new("/nonexistent/hrs-config.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
