//! Container configuration.
//!
//! The defaults are lenient: failures are logged, not raised. Each policy
//! can be overridden in code, from environment variables, or (with the
//! `config` feature) from JSON.

use std::env;
use std::str::FromStr;

use crate::error::{DiError, DiResult};

/// Environment variable selecting [`EagerFailurePolicy`].
pub const ENV_EAGER_FAILURES: &str = "WIRING_EAGER_FAILURES";
/// Environment variable selecting [`MissingNamePolicy`].
pub const ENV_MISSING_NAMES: &str = "WIRING_MISSING_NAMES";
/// Environment variable toggling `cache_failures`.
pub const ENV_CACHE_FAILURES: &str = "WIRING_CACHE_FAILURES";

/// What `finalize` does when eager builds fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum EagerFailurePolicy {
    /// Log each failure and still return the container.
    #[default]
    Ignore,
    /// Fail `finalize` with every eager failure once all eager builds settle.
    Abort,
}

/// What `get` does for a name with no entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum MissingNamePolicy {
    /// Log and resolve to `None`.
    #[default]
    Absent,
    /// Fail with `DiError::NotFound`.
    Error,
}

impl FromStr for EagerFailurePolicy {
    type Err = DiError;

    fn from_str(s: &str) -> DiResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "abort" => Ok(Self::Abort),
            other => Err(DiError::Config(format!("unknown eager failure policy '{}'", other))),
        }
    }
}

impl FromStr for MissingNamePolicy {
    type Err = DiError;

    fn from_str(s: &str) -> DiResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absent" => Ok(Self::Absent),
            "error" => Ok(Self::Error),
            other => Err(DiError::Config(format!("unknown missing name policy '{}'", other))),
        }
    }
}

/// Resolution policies for one container.
///
/// # Examples
///
/// ```
/// use ferrous_wiring::{ContainerBuilder, ContainerConfig, EagerFailurePolicy, MissingNamePolicy};
///
/// let config = ContainerConfig::default()
///     .with_eager_failures(EagerFailurePolicy::Abort)
///     .with_missing_names(MissingNamePolicy::Error);
///
/// let builder = ContainerBuilder::new().with_config(config);
/// assert_eq!(builder.config().eager_failures, EagerFailurePolicy::Abort);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerConfig {
    pub eager_failures: EagerFailurePolicy,
    pub missing_names: MissingNamePolicy,
    /// Keep a failed singleton build cached, so retries return the same failure.
    pub cache_failures: bool,
}

impl ContainerConfig {
    pub fn with_eager_failures(mut self, policy: EagerFailurePolicy) -> Self {
        self.eager_failures = policy;
        self
    }

    pub fn with_missing_names(mut self, policy: MissingNamePolicy) -> Self {
        self.missing_names = policy;
        self
    }

    pub fn with_cache_failures(mut self, enabled: bool) -> Self {
        self.cache_failures = enabled;
        self
    }

    /// Defaults overridden by any `WIRING_*` variables that are set.
    pub fn from_env() -> DiResult<Self> {
        let mut config = Self::default();
        if let Ok(value) = env::var(ENV_EAGER_FAILURES) {
            config.eager_failures = value.parse()?;
        }
        if let Ok(value) = env::var(ENV_MISSING_NAMES) {
            config.missing_names = value.parse()?;
        }
        if let Ok(value) = env::var(ENV_CACHE_FAILURES) {
            config.cache_failures = value.trim().parse().map_err(|_| {
                DiError::Config(format!("{} must be true or false, got '{}'", ENV_CACHE_FAILURES, value))
            })?;
        }
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Config(format!("invalid JSON configuration: {}", e)))
    }

    /// Reads and parses a JSON configuration file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> DiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(ENV_EAGER_FAILURES);
        env::remove_var(ENV_MISSING_NAMES);
        env::remove_var(ENV_CACHE_FAILURES);
    }

    #[test]
    fn defaults_are_lenient() {
        let config = ContainerConfig::default();
        assert_eq!(config.eager_failures, EagerFailurePolicy::Ignore);
        assert_eq!(config.missing_names, MissingNamePolicy::Absent);
        assert!(!config.cache_failures);
    }

    #[test]
    fn policies_parse_case_insensitively() {
        assert_eq!(" Abort ".parse::<EagerFailurePolicy>().unwrap(), EagerFailurePolicy::Abort);
        assert_eq!("ERROR".parse::<MissingNamePolicy>().unwrap(), MissingNamePolicy::Error);
        assert!("sometimes".parse::<EagerFailurePolicy>().is_err());
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        clear_env();
        env::set_var(ENV_EAGER_FAILURES, "abort");
        env::set_var(ENV_CACHE_FAILURES, "true");

        let config = ContainerConfig::from_env().unwrap();
        assert_eq!(config.eager_failures, EagerFailurePolicy::Abort);
        assert_eq!(config.missing_names, MissingNamePolicy::Absent);
        assert!(config.cache_failures);
        clear_env();
    }

    #[test]
    #[serial]
    fn from_env_rejects_bad_values() {
        clear_env();
        env::set_var(ENV_CACHE_FAILURES, "maybe");

        let err = ContainerConfig::from_env().unwrap_err();
        assert!(matches!(err, DiError::Config(_)));
        clear_env();
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = ContainerConfig::from_json_str(r#"{ "missing_names": "error" }"#).unwrap();
        assert_eq!(config.missing_names, MissingNamePolicy::Error);
        assert_eq!(config.eager_failures, EagerFailurePolicy::Ignore);
        assert!(ContainerConfig::from_json_str("{ nope").is_err());
    }
}
