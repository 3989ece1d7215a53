use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default user agent sent with every retrieval.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ImageVerifier/1.0)";

/// Default ceiling on buffered response bodies (64 MiB).
pub const DEFAULT_MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// libcurl reads a zero timeout as "wait forever", so no deadline goes below this.
const MIN_TIMEOUT_SECS: u64 = 1;

/// Settings for the verification handler, optionally loaded from
/// `~/.config/imgverify/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Deadline for the whole retrieval (connect + transfer), in seconds.
    pub timeout_secs: u64,
    /// Deadline for establishing the connection, in seconds. Never exceeds `timeout_secs`.
    pub connect_timeout_secs: u64,
    /// `User-Agent` header value.
    pub user_agent: String,
    /// Maximum number of redirects followed before giving up.
    pub max_redirects: u32,
    /// Responses with a larger body are abandoned mid-transfer.
    pub max_body_bytes: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            connect_timeout_secs: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_redirects: 10,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl VerifierConfig {
    /// Total deadline, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(MIN_TIMEOUT_SECS))
    }

    /// Connect deadline, at least one second and never above [`Self::timeout`].
    pub fn connect_timeout(&self) -> Duration {
        let total = self.timeout_secs.max(MIN_TIMEOUT_SECS);
        Duration::from_secs(self.connect_timeout_secs.clamp(MIN_TIMEOUT_SECS, total))
    }

    /// Rejects values that would switch a limit off.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1");
        }
        if self.connect_timeout_secs == 0 {
            return Err("connect_timeout_secs must be at least 1");
        }
        if self.max_body_bytes == 0 {
            return Err("max_body_bytes must be at least 1");
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: &'static str },
    #[error("cannot locate config directory: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

pub fn config_path() -> Result<PathBuf, ConfigError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgverify")?;
    Ok(xdg_dirs.get_config_file("config.toml"))
}

/// Load configuration from an explicit TOML file.
pub fn load_from(path: &Path) -> Result<VerifierConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: VerifierConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate().map_err(|reason| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(cfg)
}

/// Load configuration from the XDG config dir, falling back to defaults when
/// no file exists. Nothing is written to disk.
pub fn load_or_default() -> Result<VerifierConfig, ConfigError> {
    load_or_default_from(&config_path()?)
}

fn load_or_default_from(path: &Path) -> Result<VerifierConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(VerifierConfig::default());
    }
    let cfg = load_from(path)?;
    tracing::info!("loaded config from {}", path.display());
    Ok(cfg)
}
