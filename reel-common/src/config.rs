//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. Every field has a
//! compiled default, so a missing or partial file never stops startup.
//!
//! Root folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `REEL_ROOT_FOLDER`
//! 3. TOML config file `root_folder`
//! 4. OS-dependent compiled default (fallback)

use crate::storage::write_atomic;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "REEL_ROOT_FOLDER";

/// Default bound on remote/fallback reads
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;

/// Admin secret baked in at build time (`REEL_ADMIN_PASSWORD` at compile time)
///
/// This is a cosmetic gate with no real access control: the value ships
/// inside the binary, exactly as it shipped inside the site script.
pub const BUILD_ADMIN_PASSWORD: &str = match option_env!("REEL_ADMIN_PASSWORD") {
    Some(password) => password,
    None => "mickey2025",
};

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the local cache and exports
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Where the catalog is read from at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Remote shared document URL (raw JSON)
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Bundled fallback document on disk
    #[serde(default)]
    pub fallback_path: Option<PathBuf>,

    /// Bundled fallback document URL (used when no path is set)
    #[serde(default)]
    pub fallback_url: Option<String>,

    /// Timeout for each remote/fallback read
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            fallback_path: None,
            fallback_url: None,
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

impl SourcesConfig {
    pub fn read_timeout(&self) -> Duration {
        crate::time::millis_to_duration(self.read_timeout_ms)
    }
}

/// Remote write endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// File name of the catalog inside the remote document
    #[serde(default = "default_document_file")]
    pub document_file: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            document_file: default_document_file(),
        }
    }
}

/// Admin gate configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Overrides the build-time admin password
    #[serde(default)]
    pub password: Option<String>,
}

impl AdminConfig {
    pub fn secret(&self) -> String {
        self.password
            .clone()
            .unwrap_or_else(|| BUILD_ADMIN_PASSWORD.to_string())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_document_file() -> String {
    "videos.json".to_string()
}

impl TomlConfig {
    /// Parse configuration text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load `path`; a missing file yields defaults with a warning
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                info!("Loaded config from {}", path.display());
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!(
                "Read {} failed: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Local cache file inside the resolved root folder
    pub fn cache_path(root_folder: &Path) -> PathBuf {
        root_folder.join("cache.json")
    }

    /// Directory for downloaded export artifacts
    pub fn exports_dir(root_folder: &Path) -> PathBuf {
        root_folder.join("exports")
    }
}

/// Write `config` to `path` atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    write_atomic(path, content.as_bytes())
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    // Priority 4: OS-dependent compiled default
    default_root_folder()
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reel").join("config.toml"))
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/reel
        dirs::data_local_dir()
            .map(|d| d.join("reel"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/reel"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/reel
        dirs::data_dir()
            .map(|d| d.join("reel"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/reel"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\reel
        dirs::data_local_dir()
            .map(|d| d.join("reel"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\reel"))
    } else {
        PathBuf::from("./reel_data")
    }
}
