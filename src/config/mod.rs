//! Configuration system (layered: defaults < config file < env).

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use bon::Builder;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChatError, Result};

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_MIN_PORT: u16 = 3000;
pub const DEFAULT_MAX_PORT: u16 = 3100;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const ENV_HOST: &str = "GOOSE_CHAT_HOST";
pub const ENV_PORT: &str = "GOOSE_SERVER__PORT";
pub const ENV_MIN_PORT: &str = "GOOSE_CHAT_MIN_PORT";
pub const ENV_MAX_PORT: &str = "GOOSE_CHAT_MAX_PORT";
pub const ENV_TIMEOUT_MS: &str = "GOOSE_CHAT_TIMEOUT_MS";

/// Where the backend lives and how long to wait for it.
///
/// ```
/// use goose_stream::config::ChatEnvironment;
///
/// let env = ChatEnvironment::builder().port(3005).build();
/// assert_eq!(env.base_url().unwrap(), "http://localhost:3005");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct ChatEnvironment {
    #[builder(into, default = String::from(DEFAULT_HOST))]
    pub host: String,
    /// Port the backend listens on; unset until a backend is assigned one.
    pub port: Option<u16>,
    /// Range searched when allocating a port for a new backend.
    #[builder(default = DEFAULT_MIN_PORT)]
    pub min_port: u16,
    #[builder(default = DEFAULT_MAX_PORT)]
    pub max_port: u16,
    #[builder(default = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}

impl Default for ChatEnvironment {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: None,
            min_port: DEFAULT_MIN_PORT,
            max_port: DEFAULT_MAX_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

impl ChatEnvironment {
    /// Defaults overridden by environment variables (and `.env`, if present).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut env = Self::default();
        env.apply_env();
        env
    }

    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// `config.toml` in the platform configuration directory.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "goose-stream").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default config file (if any), then the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_config_path().as_deref())
    }

    /// Load from `path` (skipped when absent), apply environment overrides
    /// and validate the result.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();
        let mut env = match path {
            Some(path) if path.exists() => {
                debug!(path = %path.display(), "loading config file");
                Self::from_file(path)?
            }
            _ => Self::default(),
        };
        env.apply_env();
        env.validate()?;
        Ok(env)
    }

    /// Override fields from environment variables. Unparsable values are
    /// ignored.
    pub fn apply_env(&mut self) {
        if let Ok(host) = std::env::var(ENV_HOST) {
            if !host.trim().is_empty() {
                self.host = host.trim().to_string();
            }
        }
        if let Some(port) = env_parse(ENV_PORT) {
            self.port = Some(port);
        }
        if let Some(min_port) = env_parse(ENV_MIN_PORT) {
            self.min_port = min_port;
        }
        if let Some(max_port) = env_parse(ENV_MAX_PORT) {
            self.max_port = max_port;
        }
        if let Some(timeout_ms) = env_parse(ENV_TIMEOUT_MS) {
            self.timeout_ms = timeout_ms;
        }
    }

    pub fn validate(&self) -> Result<()> {
        const VALID_PORTS: std::ops::RangeInclusive<u16> = 1024..=65535;

        if !VALID_PORTS.contains(&self.min_port) {
            return Err(ChatError::Configuration(
                "Min port must be between 1024 and 65535".into(),
            ));
        }
        if !VALID_PORTS.contains(&self.max_port) {
            return Err(ChatError::Configuration(
                "Max port must be between 1024 and 65535".into(),
            ));
        }
        if self.min_port >= self.max_port {
            return Err(ChatError::Configuration(
                "Min port must be less than max port".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ChatError::Configuration("Timeout must be positive".into()));
        }
        if let Some(port) = self.port {
            if !VALID_PORTS.contains(&port) {
                return Err(ChatError::Configuration(
                    "Backend port must be between 1024 and 65535".into(),
                ));
            }
        }
        if self.host.is_empty() {
            return Err(ChatError::Configuration("Host must not be empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `http://{host}:{port}` of the backend.
    pub fn base_url(&self) -> Result<String> {
        let port = self.port.ok_or_else(|| {
            ChatError::Configuration(format!("backend port is not configured (set {ENV_PORT})"))
        })?;
        Ok(format!("http://{}:{}", self.host, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let env = ChatEnvironment::default();
        assert!(env.validate().is_ok());
        assert_eq!(env.host, "localhost");
        assert_eq!(env.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn builder_matches_default() {
        assert_eq!(ChatEnvironment::builder().build(), ChatEnvironment::default());
    }

    #[test]
    fn toml_overrides_only_given_keys() {
        let env = ChatEnvironment::from_toml_str("host = \"127.0.0.1\"\nport = 3042\n").unwrap();
        assert_eq!(env.host, "127.0.0.1");
        assert_eq!(env.port, Some(3042));
        assert_eq!(env.min_port, DEFAULT_MIN_PORT);
        assert_eq!(env.base_url().unwrap(), "http://127.0.0.1:3042");
    }

    #[test]
    fn rejects_inverted_port_range() {
        let env = ChatEnvironment::builder().min_port(4000).max_port(3000).build();
        let err = env.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Min port must be less than max port"
        );
    }

    #[test]
    fn rejects_privileged_ports() {
        let env = ChatEnvironment::builder().min_port(80).build();
        assert!(env.validate().is_err());
        let env = ChatEnvironment::builder().port(443).build();
        assert!(env.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let env = ChatEnvironment::builder().timeout_ms(0).build();
        assert!(env.validate().is_err());
    }

    #[test]
    fn base_url_requires_port() {
        assert!(matches!(
            ChatEnvironment::default().base_url(),
            Err(ChatError::Configuration(_))
        ));
    }
}
