//! Multi-tier TOML configuration for dynasql.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use dynasql_session::DuplicatePolicy;
use dynasql_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default key used to order top-level rows before comparison.
pub const DEFAULT_ORDER_BY: &str = "id";

/// Resolved configuration for a keyword library instance.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Region used when a session is created without one.
    pub default_region: Option<String>,
    pub order_by: String,
    pub duplicate_labels: DuplicatePolicy,
    pub config_dir: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            default_region: None,
            order_by: DEFAULT_ORDER_BY.to_string(),
            duplicate_labels: DuplicatePolicy::default(),
            config_dir: config_dir(),
        }
    }
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub compare: CompareSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    pub default_region: Option<String>,
    pub duplicate_labels: Option<DuplicatePolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareSettings {
    pub order_by: Option<String>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub region: Option<String>,
    pub order_by: Option<String>,
    /// Explicit settings file. Unlike the default file, it must parse.
    pub config_file: Option<PathBuf>,
}

impl LibraryConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (`DYNASQL_REGION`, `DYNASQL_ORDER_BY`)
    /// 3. Config file (`--config`, or ~/.dynasql/config.toml)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        let config_dir = config_dir();
        let settings = match &overrides.config_file {
            Some(path) => read_settings_file(path)?,
            None => load_settings_file(&config_dir.join("config.toml")),
        };
        Self::resolve(overrides, settings, config_dir, |key| std::env::var(key).ok())
    }

    fn resolve(
        overrides: CliOverrides,
        settings: SettingsFile,
        config_dir: PathBuf,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let default_region = overrides
            .region
            .or_else(|| env("DYNASQL_REGION"))
            .or(settings.session.default_region);

        let order_by = overrides
            .order_by
            .or_else(|| env("DYNASQL_ORDER_BY"))
            .or(settings.compare.order_by)
            .unwrap_or_else(|| DEFAULT_ORDER_BY.to_string());
        if order_by.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "compare.order_by".into(),
                message: "must not be empty".into(),
            });
        }

        Ok(LibraryConfig {
            default_region,
            order_by,
            duplicate_labels: settings.session.duplicate_labels.unwrap_or_default(),
            config_dir,
        })
    }
}

/// Get the dynasql config directory path (~/.dynasql/).
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DYNASQL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dynasql")
}

/// Read and parse a TOML settings file, failing on any error.
pub fn read_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    let parse_error = |message: String| ConfigError::Parse {
        path: path.display().to_string(),
        message,
    };
    let content = std::fs::read_to_string(path).map_err(|e| parse_error(e.to_string()))?;
    toml::from_str(&content).map_err(|e| parse_error(e.to_string()))
}

/// Load and parse a TOML settings file, returning defaults on any error.
fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}
