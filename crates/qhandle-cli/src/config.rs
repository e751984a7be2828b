//! Configuration management for the qhandle CLI.
//!
//! Supports loading configuration from:
//! 1. A YAML file (`--config PATH`, or `~/.qhandle/config.yaml` when present)
//! 2. Environment variables (with `QHANDLE_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values
//!
//! ```yaml
//! platform: lab
//! poll_interval_ms: 2000
//! platforms:
//!   lab:
//!     kind: rest
//!     endpoint: https://jobs.example.com/v1
//!     num_qpus: 4
//!   mock:
//!     remote: false
//!     seed: 7
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use qhandle_hal::PlatformConfig;

/// Environment variable selecting the default platform.
pub const ENV_PLATFORM: &str = "QHANDLE_PLATFORM";
/// Environment variable overriding the selected platform's endpoint.
pub const ENV_ENDPOINT: &str = "QHANDLE_ENDPOINT";
/// Environment variable overriding the selected platform's token.
pub const ENV_TOKEN: &str = "QHANDLE_TOKEN";
/// Environment variable overriding the poll interval, in milliseconds.
pub const ENV_POLL_INTERVAL_MS: &str = "QHANDLE_POLL_INTERVAL_MS";

/// Complete CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Platform used when `--platform` is not given.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Interval between status queries of a pending job.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-platform settings, keyed by the name used on the command line.
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSection>,
}

/// Settings for one named platform.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct PlatformSection {
    /// Registered platform kind (`mock`, `rest`). Defaults to the section name.
    #[serde(default)]
    pub kind: Option<String>,

    /// Service endpoint URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token (set via QHANDLE_TOKEN to keep it out of the file).
    #[serde(default)]
    pub token: Option<String>,

    /// Kind-specific options passed through to the platform factory.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for PlatformSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSection")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("token", &"[REDACTED]")
            .field("extra", &self.extra)
            .finish()
    }
}

fn default_platform() -> String {
    "mock".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            poll_interval_ms: default_poll_interval_ms(),
            platforms: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {e}", path.display())))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        config.validate()?;
        Ok(config)
    }

    /// Default location of the configuration file (`~/.qhandle/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".qhandle").join("config.yaml"))
    }

    /// Load configuration with the following precedence:
    /// 1. Load from `config_file` if provided, else from the default path if it exists
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Config::default(),
            },
        };

        let config = config.merge_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// `lookup` returns the value of a variable, or `None` when unset.
    /// Endpoint and token overrides apply to the selected platform.
    pub fn merge_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_PLATFORM) {
            self.platform = v;
        }
        if let Some(v) = lookup(ENV_POLL_INTERVAL_MS) {
            if let Ok(ms) = v.parse() {
                self.poll_interval_ms = ms;
            }
        }

        let endpoint = lookup(ENV_ENDPOINT);
        let token = lookup(ENV_TOKEN);
        if endpoint.is_some() || token.is_some() {
            let section = self.platforms.entry(self.platform.clone()).or_default();
            if endpoint.is_some() {
                section.endpoint = endpoint;
            }
            if token.is_some() {
                section.token = token;
            }
        }

        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.platform.is_empty() {
            return Err(ConfigError::ValidationError(
                "platform must not be empty".to_string(),
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }

        for (name, section) in &self.platforms {
            if section.token.as_deref() == Some("") {
                return Err(ConfigError::ValidationError(format!(
                    "platforms.{name}.token must not be empty; omit the field instead"
                )));
            }
        }

        Ok(())
    }

    /// Interval between status queries of a pending job.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Registered kind of the named platform.
    pub fn kind_of(&self, name: &str) -> String {
        self.platforms
            .get(name)
            .and_then(|section| section.kind.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// Build the factory configuration for the named platform.
    pub fn platform_config(&self, name: &str) -> PlatformConfig {
        let mut config = PlatformConfig::new(name);
        if let Some(section) = self.platforms.get(name) {
            config.endpoint.clone_from(&section.endpoint);
            config.token.clone_from(&section.token);
            config.extra = section.extra.clone();
        }
        config
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"
platform: lab
poll_interval_ms: 2000
platforms:
  lab:
    kind: rest
    endpoint: https://jobs.example.com/v1
    num_qpus: 4
  mock:
    seed: 7
";

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: Vec<(String, String)> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| {
            vars.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.platform, "mock");
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let config: Config = serde_yaml_ng::from_str(SAMPLE).unwrap();
        assert_eq!(config.platform, "lab");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.kind_of("lab"), "rest");
        assert_eq!(config.kind_of("mock"), "mock");

        let lab = config.platform_config("lab");
        assert_eq!(lab.name, "lab");
        assert_eq!(lab.endpoint.as_deref(), Some("https://jobs.example.com/v1"));
        assert_eq!(lab.extra_u64("num_qpus"), Some(4));
        assert_eq!(config.platform_config("mock").extra_u64("seed"), Some(7));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_yaml_ng::from_str("platforms: {}").unwrap();
        assert_eq!(config.platform, "mock");
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn test_env_overrides_file() {
        let config: Config = serde_yaml_ng::from_str(SAMPLE).unwrap();
        let config = config.merge_env(env(&[
            (ENV_ENDPOINT, "http://localhost:8080"),
            (ENV_TOKEN, "t0k3n"),
            (ENV_POLL_INTERVAL_MS, "50"),
        ]));

        assert_eq!(config.poll_interval_ms, 50);
        let lab = config.platform_config("lab");
        assert_eq!(lab.endpoint.as_deref(), Some("http://localhost:8080"));
        assert_eq!(lab.token.as_deref(), Some("t0k3n"));
        assert_eq!(lab.extra_u64("num_qpus"), Some(4));
    }

    #[test]
    fn test_env_platform_selects_section_for_overrides() {
        let config = Config::default().merge_env(env(&[
            (ENV_PLATFORM, "rest"),
            (ENV_ENDPOINT, "http://localhost:8080"),
        ]));
        assert_eq!(config.platform, "rest");
        assert_eq!(
            config.platform_config("rest").endpoint.as_deref(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_unparsable_env_value_is_ignored() {
        let config = Config::default().merge_env(env(&[(ENV_POLL_INTERVAL_MS, "soon")]));
        assert_eq!(config.poll_interval_ms, 500);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let config = Config::default().merge_env(env(&[(ENV_TOKEN, "")]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config::default().merge_env(env(&[(ENV_TOKEN, "s3cret")]));
        assert!(!format!("{config:?}").contains("s3cret"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.platform, "lab");

        let missing = Config::from_file(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_from_file_rejects_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "poll_interval_ms: [not a number").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
