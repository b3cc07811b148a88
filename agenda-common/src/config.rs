//! Bootstrap configuration and root folder resolution
//!
//! Configuration is minimal: everything needed to open the database and bind
//! the HTTP listener. All values have built-in defaults, and a missing TOML
//! file is never fatal.
//!
//! # Root folder priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `AGENDA_ROOT_FOLDER`
//! 3. TOML config file (`root_folder`)
//! 4. OS-dependent compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "AGENDA_ROOT_FOLDER";

/// Environment variable supplying the bootstrap admin password
pub const ADMIN_PASSWORD_ENV: &str = "AGENDA_ADMIN_PASSWORD";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "agenda.db";

/// Photo upload directory inside the root folder
pub const UPLOADS_DIR: &str = "uploads";

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change while the server runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and uploads (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address the listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Maximum accepted request body (photo uploads), in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Session inactivity timeout
    #[serde(default = "default_session_timeout_minutes")]
    pub session_timeout_minutes: i64,

    /// Mark the session cookie `Secure` (HTTPS deployments)
    #[serde(default)]
    pub secure_cookies: bool,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Bootstrap login account (optional)
    #[serde(default)]
    pub admin: Option<AdminConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Account ensured at startup so a fresh install can log in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_name")]
    pub name: String,
    pub email: String,
    /// Plain password; `AGENDA_ADMIN_PASSWORD` takes precedence
    #[serde(default)]
    pub password: Option<String>,
}

fn default_port() -> u16 {
    5780
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_max_upload_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_session_timeout_minutes() -> i64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_admin_name() -> String {
    "Administrador".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            port: default_port(),
            bind_address: default_bind_address(),
            max_upload_bytes: default_max_upload_bytes(),
            session_timeout_minutes: default_session_timeout_minutes(),
            secure_cookies: false,
            logging: LoggingConfig::default(),
            admin: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Outcome of [`TomlConfig::load_or_default`]
#[derive(Debug)]
pub enum ConfigSource {
    /// Parsed from this file
    File(PathBuf),
    /// No config file exists
    Defaults,
    /// A config file exists but could not be read or parsed
    Fallback(Error),
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config: {}", path.display()),
            ConfigSource::Defaults => info!("No config file found, using built-in defaults"),
            ConfigSource::Fallback(e) => warn!("{} (using built-in defaults)", e),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load from `explicit` or the platform config path, falling back to defaults
    ///
    /// Never fails. The returned [`ConfigSource`] says where the values came
    /// from; callers log it once tracing is installed.
    pub fn load_or_default(explicit: Option<&Path>) -> (Self, ConfigSource) {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let Some(path) = path else {
            return (Self::default(), ConfigSource::Defaults);
        };

        match Self::load(&path) {
            Ok(config) => (config, ConfigSource::File(path)),
            Err(e) => (Self::default(), ConfigSource::Fallback(e)),
        }
    }

    /// Admin account with its password resolved (env before TOML)
    ///
    /// `None` unless both an email and a password are available.
    pub fn admin_account(&self) -> Option<AdminConfig> {
        let admin = self.admin.as_ref()?;
        let password = std::env::var(ADMIN_PASSWORD_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .or_else(|| admin.password.clone())?;
        Some(AdminConfig {
            password: Some(password),
            ..admin.clone()
        })
    }
}

/// Locate the config file for the platform
///
/// `<config_dir>/agenda/config.toml`, then `/etc/agenda/config.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("agenda").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/agenda/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Resolve the root folder following the documented priority order
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
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

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("agenda"))
        .unwrap_or_else(|| PathBuf::from("./agenda_data"))
}

/// Creates the root folder layout and hands out paths inside it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create root and uploads directories if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            info!("Creating root folder: {}", self.root_folder.display());
        }
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.uploads_path())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE)
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.root_folder.join(UPLOADS_DIR)
    }
}
