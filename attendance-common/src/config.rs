//! Configuration loading and cache folder resolution
//!
//! Bootstrap configuration comes from a TOML file with three sections:
//! `[remote]` (dataset repositories and credential fragments), `[cache]`
//! (freshness window) and `[logging]`. A missing default config file is not
//! an error: compiled defaults are used and a warning is logged.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. Environment variables (`ATTENDANCE_*`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Application directory name used under platform config/cache dirs
pub const APP_DIR_NAME: &str = "student-attendance";

/// Environment variable overriding the cache folder
pub const ENV_CACHE_DIR: &str = "ATTENDANCE_CACHE_DIR";
/// Environment variable carrying the credential prefix fragment
pub const ENV_TOKEN_PREFIX: &str = "ATTENDANCE_TOKEN_PREFIX";
/// Environment variable carrying the credential suffix fragment
pub const ENV_TOKEN_SUFFIX: &str = "ATTENDANCE_TOKEN_SUFFIX";
/// Environment variable overriding the remote API base URL
pub const ENV_API_BASE: &str = "ATTENDANCE_API_BASE";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "ATTENDANCE_LOG_LEVEL";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Folder holding cached datasets (optional)
    ///
    /// If not specified, will attempt CLI → environment → OS default
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Remote dataset repositories
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Local cache behaviour
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote repository addressing and credential fragments.
///
/// Primary and backup differ only by repository name.
#[derive(Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// API host, e.g. `https://api.github.com`
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Repository owner
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Repository tried first (raw content)
    #[serde(default = "default_primary_repo")]
    pub primary_repo: String,

    /// Repository tried when the primary fails (JSON envelope)
    #[serde(default = "default_backup_repo")]
    pub backup_repo: String,

    /// Branch to read from
    #[serde(default = "default_branch")]
    pub branch: String,

    /// First half of the access token
    #[serde(default)]
    pub token_prefix: Option<String>,

    /// Second half of the access token
    #[serde(default)]
    pub token_suffix: Option<String>,

    /// Upper bound on a single provider attempt, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Local cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum cache age in hours; 0 disables the age check
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_owner() -> String {
    "MohammadHamdi11".to_string()
}

fn default_primary_repo() -> String {
    "RN-E-studentsattendancedashboard".to_string()
}

fn default_backup_repo() -> String {
    "RN-E-attendancerecorderapp".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_max_age_hours() -> u64 {
    24
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            owner: default_owner(),
            primary_repo: default_primary_repo(),
            backup_repo: default_backup_repo(),
            branch: default_branch(),
            token_prefix: None,
            token_suffix: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// Token fragments stay out of Debug output.
impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_base", &self.api_base)
            .field("owner", &self.owner)
            .field("primary_repo", &self.primary_repo)
            .field("backup_repo", &self.backup_repo)
            .field("branch", &self.branch)
            .field("has_token", &self.has_token())
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl RemoteConfig {
    /// Whether any credential fragment is configured
    pub fn has_token(&self) -> bool {
        [&self.token_prefix, &self.token_suffix]
            .iter()
            .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Per-attempt timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
        }
    }
}

impl CacheConfig {
    /// Maximum cache age as Duration (zero disables the age check)
    pub fn max_age(&self) -> Duration {
        crate::time::hours_to_duration(self.max_age_hours)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Apply `ATTENDANCE_*` environment overrides on top of file values
    pub fn apply_env_overrides(&mut self) {
        if let Some(prefix) = non_empty_env(ENV_TOKEN_PREFIX) {
            self.remote.token_prefix = Some(prefix);
        }
        if let Some(suffix) = non_empty_env(ENV_TOKEN_SUFFIX) {
            self.remote.token_suffix = Some(suffix);
        }
        if let Some(api_base) = non_empty_env(ENV_API_BASE) {
            info!("Remote API base overridden from environment: {}", api_base);
            self.remote.api_base = api_base;
        }
        if let Some(level) = non_empty_env(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the platform default
/// (`<config_dir>/student-attendance/config.toml`) is tried; if it is absent
/// the compiled defaults are used. Environment overrides apply either way.
pub fn load_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let mut config = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            read_config_file(path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path)?,
            Some(path) => {
                warn!(
                    "No config file at {}, using built-in defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using built-in defaults");
                TomlConfig::default()
            }
        },
    };

    config.apply_env_overrides();
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = TomlConfig::from_toml_str(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Platform default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

/// Cache folder resolution priority:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_cache_dir(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Some(path) = non_empty_env(ENV_CACHE_DIR) {
        return PathBuf::from(path);
    }

    if let Some(path) = &config.cache_dir {
        return path.clone();
    }

    default_cache_dir()
}

/// Get OS-dependent default cache folder path
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(dirs::data_local_dir)
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./attendance_cache"))
}

/// Create the cache folder if missing
pub fn ensure_cache_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
        info!("Created cache folder: {}", path.display());
    }
    Ok(())
}
