//! Runtime configuration
//!
//! Loaded from TOML. Every field has a default, so an empty document is a
//! valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::coerce::parse_integer;
use crate::errors::{NovaError, Result};
use crate::logging_facility::Profile;
use crate::policy::SafetyInput;

/// Shortest accepted headless job timeout
pub const MIN_TIMEOUT_SEC: i64 = 30;
/// Longest accepted headless job timeout
pub const MAX_TIMEOUT_SEC: i64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NovaConfig {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub headless: HeadlessConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    /// Safety input used when a caller supplies none
    #[serde(default)]
    pub safety: SafetyInput,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// How long a dispatched command stays leased (default: 120000)
    #[serde(default = "default_lease_ms")]
    pub lease_ms: u64,
    /// Commands retained before completed ones are pruned (default: 10000)
    #[serde(default = "default_max_retention")]
    pub max_retention: usize,
    /// Dispatch batch size when the client names none (default: 20)
    #[serde(default = "default_dispatch_limit")]
    pub dispatch_limit: usize,
}

fn default_lease_ms() -> u64 {
    120_000
}

fn default_max_retention() -> usize {
    10_000
}

fn default_dispatch_limit() -> usize {
    20
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            lease_ms: default_lease_ms(),
            max_retention: default_max_retention(),
            dispatch_limit: default_dispatch_limit(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadlessConfig {
    /// Store size above which pruning kicks in (default: 1000)
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
    /// Jobs kept by a prune (default: 500)
    #[serde(default = "default_keep_jobs")]
    pub keep_jobs: usize,
    /// Timeout for jobs that do not request one (default: 1800)
    #[serde(default = "default_timeout_sec")]
    pub default_timeout_sec: u64,
}

fn default_max_jobs() -> usize {
    1000
}

fn default_keep_jobs() -> usize {
    500
}

fn default_timeout_sec() -> u64 {
    1800
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            max_jobs: default_max_jobs(),
            keep_jobs: default_keep_jobs(),
            default_timeout_sec: default_timeout_sec(),
        }
    }
}

impl HeadlessConfig {
    /// Timeout for a job request, clamped to `[30, 86400]`
    pub fn resolve_timeout_sec(&self, requested: Option<&Value>) -> u64 {
        let fallback = i64::try_from(self.default_timeout_sec).unwrap_or(MAX_TIMEOUT_SEC);
        let secs = parse_integer(requested, fallback, MIN_TIMEOUT_SEC, MAX_TIMEOUT_SEC);
        u64::try_from(secs).unwrap_or(default_timeout_sec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Plan length cap when the caller names none (default: 20)
    #[serde(default = "default_max_commands")]
    pub default_max_commands: usize,
}

fn default_max_commands() -> usize {
    20
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_max_commands: default_max_commands(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub profile: Profile,
}

impl NovaConfig {
    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the document does not parse or fails
    /// validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: NovaConfig = toml::from_str(raw).map_err(|e| NovaError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise as
    /// [`NovaConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(NovaError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.queue.lease_ms == 0 {
            return invalid("queue.lease_ms must be positive");
        }
        if self.queue.max_retention == 0 {
            return invalid("queue.max_retention must be positive");
        }
        if !(1..=100).contains(&self.queue.dispatch_limit) {
            return invalid("queue.dispatch_limit must be within [1, 100]");
        }
        if self.headless.keep_jobs > self.headless.max_jobs {
            return invalid("headless.keep_jobs must not exceed headless.max_jobs");
        }
        if !(1..=100).contains(&self.planner.default_max_commands) {
            return invalid("planner.default_max_commands must be within [1, 100]");
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `Serialization` if a value has no TOML form.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| NovaError::Serialization {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = NovaConfig::from_toml_str("").unwrap();
        assert_eq!(config, NovaConfig::default());
        assert_eq!(config.queue.lease_ms, 120_000);
        assert_eq!(config.queue.max_retention, 10_000);
        assert_eq!(config.headless.max_jobs, 1000);
        assert_eq!(config.headless.keep_jobs, 500);
        assert_eq!(config.planner.default_max_commands, 20);
        assert_eq!(config.logging.profile, Profile::Development);
    }

    #[test]
    fn test_partial_sections() {
        let config = NovaConfig::from_toml_str(
            r#"
            [queue]
            lease_ms = 5000

            [safety]
            mode = "strict"
            allow_dangerous = true

            [logging]
            profile = "production"
            "#,
        )
        .unwrap();

        assert_eq!(config.queue.lease_ms, 5000);
        assert_eq!(config.queue.dispatch_limit, 20);
        assert_eq!(config.safety.mode, Some(json!("strict")));
        assert_eq!(config.safety.allow_dangerous, Some(json!(true)));
        assert_eq!(config.logging.profile, Profile::Production);
    }

    #[test]
    fn test_keep_jobs_above_max_jobs_rejected() {
        let err = NovaConfig::from_toml_str(
            r#"
            [headless]
            max_jobs = 10
            keep_jobs = 20
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, NovaError::InvalidConfig { .. }));
    }

    #[test]
    fn test_malformed_toml_is_invalid_config() {
        let err = NovaConfig::from_toml_str("[queue\nlease_ms = ").unwrap_err();
        assert!(matches!(err, NovaError::InvalidConfig { .. }));
    }

    #[test]
    fn test_resolve_timeout_clamps() {
        let headless = HeadlessConfig::default();
        assert_eq!(headless.resolve_timeout_sec(None), 1800);
        assert_eq!(headless.resolve_timeout_sec(Some(&json!(5))), 30);
        assert_eq!(headless.resolve_timeout_sec(Some(&json!("999999"))), 86_400);
        assert_eq!(headless.resolve_timeout_sec(Some(&json!("soon"))), 1800);
    }
}
