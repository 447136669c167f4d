//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides. Request
//! parameters sit above both: resolution order is request parameter, then
//! environment/file value, then built-in default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub samples: SamplesConfig,

    #[serde(default)]
    pub objects: ObjectsConfig,

    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sample log configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SamplesConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_db_path() -> String {
    dirs::data_local_dir()
        .map(|p| {
            p.join("bucketscope")
                .join("samples.db")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./bucketscope_data/samples.db".to_string())
}

impl Default for SamplesConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Object store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectsConfig {
    /// Root directory holding one subdirectory per container
    #[serde(default = "default_objects_root")]
    pub root_dir: String,
}

fn default_objects_root() -> String {
    dirs::data_local_dir()
        .map(|p| {
            p.join("bucketscope")
                .join("containers")
                .to_string_lossy()
                .to_string()
        })
        .unwrap_or_else(|| "./bucketscope_data/containers".to_string())
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self {
            root_dir: default_objects_root(),
        }
    }
}

/// API server configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Container charted when a plot request names none
    #[serde(default)]
    pub default_bucket: Option<String>,

    /// Window used when a plot request names none, in seconds
    #[serde(default = "default_window_seconds")]
    pub default_window_seconds: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_window_seconds() -> u64 {
    10
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_bucket: None,
            default_window_seconds: default_window_seconds(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("bucketscope").join("config.toml")),
            Some(PathBuf::from("/etc/bucketscope/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(db_path) = std::env::var("BUCKETSCOPE_DB_PATH") {
            self.samples.db_path = db_path;
        }

        if let Ok(root_dir) = std::env::var("BUCKETSCOPE_OBJECTS_ROOT") {
            self.objects.root_dir = root_dir;
        }

        if let Ok(host) = std::env::var("BUCKETSCOPE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("BUCKETSCOPE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }
        if let Ok(bucket) = std::env::var("BUCKETSCOPE_BUCKET") {
            self.api.default_bucket = Some(bucket);
        }
        if let Ok(window) = std::env::var("BUCKETSCOPE_WINDOW_SECONDS") {
            if let Ok(w) = window.parse() {
                self.api.default_window_seconds = w;
            }
        }

        if let Ok(level) = std::env::var("BUCKETSCOPE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("BUCKETSCOPE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Bucketscope Configuration
#
# Environment variables override these settings:
# - BUCKETSCOPE_DB_PATH
# - BUCKETSCOPE_OBJECTS_ROOT
# - BUCKETSCOPE_API_HOST
# - BUCKETSCOPE_API_PORT
# - BUCKETSCOPE_BUCKET
# - BUCKETSCOPE_WINDOW_SECONDS
# - BUCKETSCOPE_LOG_LEVEL
# - BUCKETSCOPE_LOG_FORMAT

[samples]
# SQLite database file holding the sample log
db_path = "~/.local/share/bucketscope/samples.db"

[objects]
# Root directory holding one subdirectory per monitored container
root_dir = "~/.local/share/bucketscope/containers"

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Container charted when a plot request names none
# default_bucket = "my-bucket"

# Window used when a plot request names none (seconds)
default_window_seconds = 10

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.api.default_window_seconds, 10);
        assert!(config.api.default_bucket.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            [api]
            port = 9000
            default_bucket = "metrics"
            default_window_seconds = 30

            [samples]
            db_path = "/tmp/samples.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.default_bucket.as_deref(), Some("metrics"));
        assert_eq!(config.api.default_window_seconds, 30);
        assert_eq!(config.samples.db_path, "/tmp/samples.db");
        // Unset sections fall back to defaults
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_default_config_parses() {
        let content = generate_default_config();
        let config: Config = toml::from_str(&content).unwrap();
        assert_eq!(config.api.default_window_seconds, 10);
    }
}
