//! User configuration: where sessions live and which judge to talk to.

use std::path::{Path, PathBuf};
use std::time::Duration;

use aoj_auth::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, GatewayConfig};
use aoj_core::{Error, Result};
use aoj_store::StoreConfig;
use serde::Deserialize;

/// Directory under the home directory used when none is given.
pub const DEFAULT_CONFIG_DIR: &str = ".aoj-cli";

/// Optional overrides file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Settings for one local account.
///
/// Every field in `config.toml` is optional:
///
/// ```toml
/// base_url = "https://judgeapi.u-aizu.ac.jp"
/// request_timeout_secs = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AojConfig {
    /// Root of the session store. Not read from the file; it is the
    /// directory the file was loaded from.
    #[serde(skip)]
    pub config_dir: PathBuf,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

/// `~/.aoj-cli`, or `./.aoj-cli` when no home directory is known.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
}

impl Default for AojConfig {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl AojConfig {
    /// Loads `<config_dir>/config.toml`, falling back to defaults when the
    /// file does not exist. `None` means [`default_config_dir`].
    ///
    /// # Errors
    /// [`ErrorKind::InvalidInput`](aoj_core::ErrorKind::InvalidInput) if
    /// the file is not valid TOML for this shape or sets a zero timeout;
    /// [`ErrorKind::InternalServer`](aoj_core::ErrorKind::InternalServer)
    /// if it exists but cannot be read.
    pub fn load(config_dir: Option<PathBuf>) -> Result<Self> {
        let dir = config_dir.unwrap_or_else(default_config_dir);
        let mut config = Self::load_file(&dir.join(CONFIG_FILE))?;
        config.config_dir = dir;
        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::internal("failed to read config file").with_source(e));
            }
        };
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::invalid_input("invalid config file").with_source(e))?;
        if config.request_timeout_secs == 0 {
            return Err(Error::invalid_input(
                "request_timeout_secs must be greater than zero",
            ));
        }
        Ok(config)
    }

    /// Overrides the judge base URL (command-line or environment).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.config_dir)
    }

    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
