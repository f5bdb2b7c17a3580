//! Configuration types for envirocar-client

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variable overriding [`Config::base_url`]
pub const ENV_BASE_URL: &str = "ENVIROCAR_BASE_URL";
/// Environment variable providing [`Config::username`]
pub const ENV_USERNAME: &str = "ENVIROCAR_USERNAME";
/// Environment variable providing [`Config::password`]
pub const ENV_PASSWORD: &str = "ENVIROCAR_PASSWORD";
/// Environment variable overriding [`Config::pool_size`]
pub const ENV_POOL_SIZE: &str = "ENVIROCAR_POOL_SIZE";
/// Environment variable overriding [`Config::timeout`] (seconds)
pub const ENV_TIMEOUT_SECS: &str = "ENVIROCAR_TIMEOUT_SECS";

/// Client configuration
///
/// Every field has a default, so `Config::default()` talks to the public
/// enviroCar API anonymously with 10 concurrent fetches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Root that request paths are resolved against (default: public stable API)
    ///
    /// A trailing `/` is significant for relative resolution; [`Config::base`]
    /// adds one when missing.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Basic-auth username (only used when `password` is also set)
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password (only used when `username` is also set)
    #[serde(default)]
    pub password: Option<String>,

    /// Maximum number of concurrent fetches in one batch (default: 10)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: None,
            password: None,
            pool_size: default_pool_size(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Build a configuration from defaults overlaid with `ENVIROCAR_*` variables
    ///
    /// Unparseable numeric values are reported as configuration errors rather
    /// than silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reading from an arbitrary lookup
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        config.username = lookup(ENV_USERNAME).filter(|u| !u.is_empty());
        config.password = lookup(ENV_PASSWORD).filter(|p| !p.is_empty());

        if let Some(pool_size) = lookup(ENV_POOL_SIZE) {
            config.pool_size = pool_size.trim().parse().map_err(|_| Error::Config {
                message: format!("{} is not a positive integer: {}", ENV_POOL_SIZE, pool_size),
                key: Some("pool_size".to_string()),
            })?;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| Error::Config {
                message: format!("{} is not a number of seconds: {}", ENV_TIMEOUT_SECS, secs),
                key: Some("timeout".to_string()),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can be used to build a client
    pub fn validate(&self) -> Result<()> {
        self.base()?;
        if self.pool_size == 0 {
            return Err(Error::Config {
                message: "pool_size must be at least 1".to_string(),
                key: Some("pool_size".to_string()),
            });
        }
        Ok(())
    }

    /// Parsed base URL, normalized to end with `/`
    pub fn base(&self) -> Result<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| Error::Config {
            message: format!("invalid base_url '{}': {}", self.base_url, e),
            key: Some("base_url".to_string()),
        })
    }

    /// Basic-auth credentials, present only when both halves are configured
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) => Some((user, pass)),
            _ => None,
        }
    }

    /// Whether requests will carry basic-auth credentials
    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }
}

fn default_base_url() -> String {
    "https://envirocar.org/api/stable/".to_string()
}

fn default_pool_size() -> usize {
    10
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("envirocar-client/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
