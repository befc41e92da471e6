//! # Service Configuration
//!
//! Settings for `ratio-service`, read from a YAML file and overridden by
//! environment variables prefixed with [`ENV_PREFIX`], using `__` between
//! nesting levels:
//!
//! ```text
//! RATIO_SERVICE__HTTP_SERVER__ADDRESS=0.0.0.0:9000
//! RATIO_SERVICE__HTTP_SERVER__RATE_LIMIT__LIMIT=10
//! ```
//!
//! Durations use humantime syntax (`"5s"`, `"1m"`, `"250ms"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "RATIO_SERVICE";

/// Separator between nesting levels in override variable names.
pub const ENV_SEPARATOR: &str = "__";

/// Message returned to callers over their quota when none is configured.
pub const DEFAULT_RATE_LIMIT_MSG: &str = "Слишком много запросов.";

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("config file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read or deserialized.
    #[error("cannot read config: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is outside its allowed range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Deployment environment; selects the logging setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    /// Developer machine: text logs in a file.
    Local,
    /// Shared development: JSON logs, debug level.
    Dev,
    /// Production: JSON logs, info level.
    Prod,
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Local => "local",
            Self::Dev => "dev",
            Self::Prod => "prod",
        };
        f.write_str(name)
    }
}

/// Admission gate algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStrategy {
    /// Weighted count over the current and previous fixed windows.
    #[default]
    SlidingWindow,
    /// GCRA token bucket.
    TokenBucket,
}

/// Per-caller admission limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum requests per caller per interval.
    pub limit: u32,
    /// Length of the counting interval.
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Message returned to rejected callers.
    pub msg: String,
    /// HTTP status returned to rejected callers.
    pub status: u16,
    /// Admission algorithm.
    pub strategy: GateStrategy,
    /// Use the `X-Real-IP` header as the caller key.
    pub trust_real_ip: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            interval: Duration::from_secs(60),
            msg: DEFAULT_RATE_LIMIT_MSG.to_owned(),
            status: 429,
            strategy: GateStrategy::default(),
            trust_real_ip: false,
        }
    }
}

impl RateLimitConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::Invalid("rate_limit.limit must be positive".into()));
        }
        if self.interval.is_zero() {
            return Err(ConfigError::Invalid(
                "rate_limit.interval must be positive".into(),
            ));
        }
        if !(400..600).contains(&self.status) {
            return Err(ConfigError::Invalid(format!(
                "rate_limit.status must be a 4xx or 5xx code, got {}",
                self.status
            )));
        }
        Ok(())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Listen address, `host:port`.
    pub address: String,
    /// Per-request timeout.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    /// How long a keep-alive connection may wait for its next request.
    #[serde(default = "default_idle_timeout", with = "humantime_serde")]
    pub idle_timeout: Duration,
    /// Grace period for in-flight requests on shutdown.
    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,
    /// Admission limits.
    #[serde(default, alias = "rate limit")]
    pub rate_limit: RateLimitConfig,
}

fn default_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_idle_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_stop_timeout() -> Duration {
    Duration::from_millis(1)
}

/// Root configuration of `ratio-service`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Deployment environment.
    pub env: AppEnv,
    /// HTTP listener settings.
    pub http_server: HttpServerConfig,
}

impl ServiceConfig {
    /// Loads the file at `path`, applying `RATIO_SERVICE__*` overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unparsable, lacks a
    /// required key, or holds an out-of-range value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, environment())
    }

    /// Loads the file at `path` with an explicit environment source.
    ///
    /// # Errors
    ///
    /// Same as [`ServiceConfig::load`].
    pub fn load_with(
        path: impl AsRef<Path>,
        overrides: config::Environment,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Yaml)
                    .required(true),
            )
            .add_source(overrides)
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` on the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http_server.address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "http_server.address must not be empty".into(),
            ));
        }
        if self.http_server.timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "http_server.timeout must be positive".into(),
            ));
        }
        if self.http_server.idle_timeout.is_zero() {
            return Err(ConfigError::Invalid(
                "http_server.idle_timeout must be positive".into(),
            ));
        }
        self.http_server.rate_limit.validate()
    }
}

/// Environment source for `RATIO_SERVICE__*` variables.
#[must_use]
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
