// crates/rowledger-config/src/model.rs
// ============================================================================
// Module: Configuration Model
// Description: Typed sections of rowledger.toml with strict validation.
// Purpose: Reject malformed or out-of-bounds configuration before startup.
// Dependencies: rowledger-core, serde, thiserror, toml
// ============================================================================

//! ## Overview
//! The configuration model mirrors the `rowledger.toml` layout section for
//! section. Every section derives strict deserialization (unknown fields
//! denied) and carries defaults matching production behavior, so an empty
//! file yields a working in-memory deployment. [`RowledgerConfig::load`]
//! guards the file path, size, and encoding before parsing; `validate`
//! enforces the numeric bounds and cross-field requirements.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use rowledger_core::runtime::DEFAULT_TTL_DAYS;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Environment variable overriding the configuration path.
pub const CONFIG_PATH_VAR: &str = "ROWLEDGER_CONFIG";
/// Default configuration file name, resolved against the working directory.
const DEFAULT_CONFIG_PATH: &str = "rowledger.toml";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_BYTES: u64 = 1_048_576;
/// Maximum configuration path length in bytes.
const MAX_PATH_LENGTH: usize = 4_096;
/// Maximum length of a single path component in bytes.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Bounds for HTTP request timeouts in milliseconds.
const TIMEOUT_MS_RANGE: (u64, u64) = (100, 60_000);
/// Bounds for the HTTP response size limit in bytes.
const RESPONSE_BYTES_RANGE: (usize, usize) = (1_024, 16 * 1_024 * 1_024);
/// Bounds for the sweeper interval in milliseconds.
const SWEEP_INTERVAL_MS_RANGE: (u64, u64) = (1_000, 86_400_000);
/// Bounds for the pending-record TTL in days.
const TTL_DAYS_RANGE: (u16, u16) = (1, 3_650);
/// Bounds for the watcher poll interval in milliseconds.
const POLL_INTERVAL_MS_RANGE: (u64, u64) = (100, 3_600_000);
/// Bounds for the watcher quiet period in milliseconds.
const QUIET_PERIOD_MS_RANGE: (u64, u64) = (1_000, 86_400_000);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("config io failure: {0}")]
    Io(String),
    /// The configuration file could not be parsed.
    #[error("config parse failure: {0}")]
    Parse(String),
    /// The configuration failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Root Model
// ============================================================================

/// Root configuration for the Rowledger proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RowledgerConfig {
    /// Durable store backend selection and settings.
    pub store: StoreConfig,
    /// Credential source for the store session.
    pub credentials: CredentialsConfig,
    /// Staleness sweeper settings.
    pub sweeper: SweeperConfig,
    /// Draft inactivity watcher settings.
    pub watcher: WatcherConfig,
    /// Audit event routing.
    pub audit: AuditConfig,
}

impl RowledgerConfig {
    /// Loads and validates configuration from disk.
    ///
    /// The path is taken from the argument, else the `ROWLEDGER_CONFIG`
    /// environment variable, else `rowledger.toml` in the working
    /// directory. A missing file at the default path yields the default
    /// configuration; an explicitly named file must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, exceeds the
    /// size limit, is not UTF-8, fails to parse, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_override = std::env::var(CONFIG_PATH_VAR).ok();
        let (path, explicit) = match (path, env_override.as_deref()) {
            (Some(path), _) => (path.to_path_buf(), true),
            (None, Some(env_path)) => (PathBuf::from(env_path), true),
            (None, None) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        validate_config_path(&path)?;
        if !path.exists() {
            if explicit {
                return Err(ConfigError::Io(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        let metadata =
            std::fs::metadata(&path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = std::fs::read(&path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::parse(&text)?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section against its bounds and cross-field rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        self.credentials.validate(self.store.backend)?;
        self.sweeper.validate()?;
        self.watcher.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

/// Guards the configuration path length and component sizes.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().len() > MAX_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Store Section
// ============================================================================

/// Store backend selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-memory grid; state is lost on restart.
    #[default]
    Memory,
    /// Remote grid service over HTTP.
    Http,
    /// Local `SQLite` database.
    Sqlite,
}

/// `[store]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct StoreConfig {
    /// Selected backend.
    pub backend: StoreBackend,
    /// HTTP backend settings, required when `backend = "http"`.
    pub http: Option<HttpStoreConfig>,
    /// `SQLite` backend settings, required when `backend = "sqlite"`.
    pub sqlite: Option<SqliteBackendConfig>,
}

impl StoreConfig {
    /// Validates backend selection against its settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            StoreBackend::Memory => Ok(()),
            StoreBackend::Http => self
                .http
                .as_ref()
                .ok_or_else(|| {
                    ConfigError::Invalid("http backend requires [store.http]".to_string())
                })?
                .validate(),
            StoreBackend::Sqlite => self
                .sqlite
                .as_ref()
                .ok_or_else(|| {
                    ConfigError::Invalid("sqlite backend requires [store.sqlite]".to_string())
                })?
                .validate(),
        }
    }
}

/// `[store.http]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HttpStoreConfig {
    /// Base URL of the grid service.
    pub base_url: String,
    /// Allow cleartext HTTP.
    pub allow_http: bool,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size in bytes.
    pub max_response_bytes: usize,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            allow_http: false,
            timeout_ms: 5_000,
            max_response_bytes: 4 * 1_024 * 1_024,
        }
    }
}

impl HttpStoreConfig {
    /// Validates the HTTP backend settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("store base_url must not be empty".to_string()));
        }
        check_range("store timeout_ms", self.timeout_ms, TIMEOUT_MS_RANGE)?;
        let (min, max) = RESPONSE_BYTES_RANGE;
        if self.max_response_bytes < min || self.max_response_bytes > max {
            return Err(ConfigError::Invalid(format!(
                "store max_response_bytes must be between {min} and {max}"
            )));
        }
        Ok(())
    }
}

/// `[store.sqlite]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SqliteBackendConfig {
    /// Filesystem path of the database.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            busy_timeout_ms: 5_000,
        }
    }
}

impl SqliteBackendConfig {
    /// Validates the `SQLite` backend settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("sqlite path must not be empty".to_string()));
        }
        check_range("sqlite busy_timeout_ms", self.busy_timeout_ms, TIMEOUT_MS_RANGE)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Credentials Section
// ============================================================================

/// Credential source selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// No credential; valid only for local backends.
    #[default]
    None,
    /// Base64 service-account blob in an environment variable.
    Env,
    /// Literal token in the configuration file.
    Static,
}

/// `[credentials]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CredentialsConfig {
    /// Selected credential source.
    pub source: CredentialSource,
    /// Environment variable name, required when `source = "env"`.
    pub env_variable: Option<String>,
    /// Literal token, required when `source = "static"`.
    pub static_token: Option<String>,
}

impl CredentialsConfig {
    /// Validates the credential source against the selected backend.
    fn validate(&self, backend: StoreBackend) -> Result<(), ConfigError> {
        match self.source {
            CredentialSource::None => {
                if backend == StoreBackend::Http {
                    return Err(ConfigError::Invalid(
                        "http backend requires a credential source".to_string(),
                    ));
                }
            }
            CredentialSource::Env => {
                let variable = self.env_variable.as_deref().unwrap_or_default();
                if variable.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "env credential source requires env_variable".to_string(),
                    ));
                }
            }
            CredentialSource::Static => {
                let token = self.static_token.as_deref().unwrap_or_default();
                if token.trim().is_empty() {
                    return Err(ConfigError::Invalid(
                        "static credential source requires static_token".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Sweeper Section
// ============================================================================

/// `[sweeper]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SweeperConfig {
    /// Whether the background sweeper runs.
    pub enabled: bool,
    /// Pending-record TTL in days.
    pub ttl_days: u16,
    /// Sweep cycle interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_days: DEFAULT_TTL_DAYS,
            interval_ms: 3_600_000,
        }
    }
}

impl SweeperConfig {
    /// Validates the sweeper bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = TTL_DAYS_RANGE;
        if self.ttl_days < min || self.ttl_days > max {
            return Err(ConfigError::Invalid(format!(
                "sweeper ttl_days must be between {min} and {max}"
            )));
        }
        check_range("sweeper interval_ms", self.interval_ms, SWEEP_INTERVAL_MS_RANGE)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Watcher Section
// ============================================================================

/// `[watcher]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WatcherConfig {
    /// Whether the inactivity watcher runs.
    pub enabled: bool,
    /// Quiet period before an idle notification, in milliseconds.
    pub quiet_period_ms: u64,
    /// Poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quiet_period_ms: 600_000,
            poll_interval_ms: 60_000,
        }
    }
}

impl WatcherConfig {
    /// Validates the watcher bounds and interval ordering.
    fn validate(&self) -> Result<(), ConfigError> {
        check_range("watcher quiet_period_ms", self.quiet_period_ms, QUIET_PERIOD_MS_RANGE)?;
        check_range("watcher poll_interval_ms", self.poll_interval_ms, POLL_INTERVAL_MS_RANGE)?;
        if self.poll_interval_ms > self.quiet_period_ms {
            return Err(ConfigError::Invalid(
                "watcher poll_interval_ms must not exceed quiet_period_ms".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Audit Section
// ============================================================================

/// Audit sink selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// JSON lines to standard error.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit events discarded.
    None,
}

/// `[audit]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct AuditConfig {
    /// Selected sink.
    pub sink: AuditSinkKind,
    /// Log file path, required when `sink = "file"`.
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates the audit routing.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.sink == AuditSinkKind::File
            && self.path.as_ref().is_none_or(|path| path.as_os_str().is_empty())
        {
            return Err(ConfigError::Invalid("file audit sink requires path".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects values outside an inclusive bound pair.
fn check_range(name: &str, value: u64, (min, max): (u64, u64)) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::Invalid(format!("{name} must be between {min} and {max}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::RowledgerConfig;
    use super::StoreBackend;

    #[test]
    fn empty_config_yields_working_defaults() {
        let config = RowledgerConfig::parse("").map_err(|err| err.to_string());
        assert!(matches!(
            config,
            Ok(config) if config.store.backend == StoreBackend::Memory && config.sweeper.enabled
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(RowledgerConfig::parse("[store]\nbackends = \"memory\"\n").is_err());
    }

    #[test]
    fn unknown_backend_label_is_rejected() {
        assert!(RowledgerConfig::parse("[store]\nbackend = \"postgres\"\n").is_err());
    }
}
