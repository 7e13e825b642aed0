use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per segment (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/partfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartfetchConfig {
    /// Segment count used when the command line does not give one.
    pub default_segments: usize,
    /// Maximum segment downloads in flight at once (None = one per segment).
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    /// TCP/TLS connect timeout per request, in seconds.
    pub connect_timeout_secs: u64,
    /// Abort a request whose throughput stays below this many bytes/s ...
    pub low_speed_limit_bytes: u32,
    /// ... for this many seconds.
    pub low_speed_time_secs: u64,
    /// Hard wall-clock cap per request, in seconds.
    pub request_timeout_secs: u64,
    /// Deadline for collecting every segment result (None = no deadline).
    #[serde(default)]
    pub overall_timeout_secs: Option<u64>,
    /// Largest resource accepted, in bytes; the body is held in memory until saved.
    #[serde(default = "default_max_in_memory_bytes")]
    pub max_in_memory_bytes: u64,
    /// User-Agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_max_in_memory_bytes() -> u64 {
    4 << 30
}

fn default_user_agent() -> String {
    concat!("partfetch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for PartfetchConfig {
    fn default() -> Self {
        Self {
            default_segments: 4,
            max_concurrent: Some(8),
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            request_timeout_secs: 3600,
            overall_timeout_secs: None,
            max_in_memory_bytes: default_max_in_memory_bytes(),
            user_agent: default_user_agent(),
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("partfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PartfetchConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<PartfetchConfig> {
    if !path.exists() {
        let default_cfg = PartfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("write default config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: PartfetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
