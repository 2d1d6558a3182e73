//! Workbench configuration
//!
//! [`DeskConfig`] is read from TOML or YAML (chosen by file extension), then
//! selected values can be overridden from the environment:
//! - `FCST_API_BASE_URL`: collaborator base URL
//! - `FCST_API_PREFIX`: collaborator path prefix
//! - `FCST_LOG`: log filter directive

use crate::error::ConfigError;
use crate::quick_entry::RegionTable;
use fcst_edit::EditConfig;
use fcst_grid::{Pagination, PaginationError, DEFAULT_PAGE_SIZES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Cell edit behaviour
    pub edit: EditConfig,
    /// Page sizes
    pub pagination: PaginationConfig,
    /// Collaborator endpoint
    pub api: ApiConfig,
    /// Logging
    pub log: LogConfig,
    /// Region to sales-owner table for quick entry
    pub regions: RegionTable,
}

/// Page size settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Allowed page sizes
    pub sizes: Vec<usize>,
    /// Initial page size
    pub default_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_PAGE_SIZES.to_vec(),
            default_size: DEFAULT_PAGE_SIZES[0],
        }
    }
}

impl PaginationConfig {
    /// Build pagination state
    ///
    /// # Errors
    /// Returns `PaginationError` if the default size is not allowed.
    pub fn build(&self) -> Result<Pagination, PaginationError> {
        Pagination::new(self.sizes.clone(), self.default_size)
    }
}

/// Collaborator endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL
    pub base_url: String,
    /// Path prefix
    pub prefix: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            prefix: "/api/v1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    /// Base URL joined with the prefix
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.prefix.trim_start_matches('/')
        )
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl DeskConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With edit settings
    #[inline]
    #[must_use]
    pub fn with_edit(mut self, edit: EditConfig) -> Self {
        self.edit = edit;
        self
    }

    /// With page sizes
    #[inline]
    #[must_use]
    pub fn with_pagination(mut self, sizes: Vec<usize>, default_size: usize) -> Self {
        self.pagination = PaginationConfig {
            sizes,
            default_size,
        };
        self
    }

    /// With region table
    #[inline]
    #[must_use]
    pub fn with_regions(mut self, regions: RegionTable) -> Self {
        self.regions = regions;
        self
    }

    /// Load, apply environment overrides, and validate
    ///
    /// # Errors
    /// Any `ConfigError` from reading, parsing or validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a file as TOML (`.toml`) or YAML (`.yaml`, `.yml`)
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::UnsupportedFormat` for other extensions
    /// - `ConfigError::Parse` for malformed content
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("yaml" | "yml") => Self::from_yaml_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&content)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse TOML
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed content.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            format: "toml",
            message: e.to_string(),
        })
    }

    /// Parse YAML
    ///
    /// # Errors
    /// `ConfigError::Parse` for malformed content.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            format: "yaml",
            message: e.to_string(),
        })
    }

    /// Apply `FCST_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Apply `FCST_*` overrides from an arbitrary lookup
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("FCST_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(prefix) = non_empty("FCST_API_PREFIX") {
            self.api.prefix = prefix;
        }
        if let Some(filter) = non_empty("FCST_LOG") {
            self.log.filter = filter;
        }
    }

    /// Check the configuration
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pagination
            .build()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.edit
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}
