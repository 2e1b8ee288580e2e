//! Configuration management for the markup text replacer.
//!
//! Parses `mtr.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! backend = "lossless"
//! dialect = "html"
//!
//! [logging]
//! important = true
//! ```
//!
//! Every value has a default, so an empty file (or no file at all) yields
//! the lossless backend with all logging disabled.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mtr.toml";

/// Replacer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which parse path filters markup.
    pub backend: Backend,
    /// Markup dialect, only consulted by the DOM backend.
    pub dialect: Dialect,
    /// Per-severity logging toggles.
    pub logging: LogConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Parse path used to filter markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hand-built lexer, tokenizer and tree. Output is byte-identical to the
    /// input except for filtered values.
    #[default]
    Lossless,
    /// Event-stream DOM path. Attribute values and text are unescaped before
    /// filtering and re-escaped on output.
    Dom,
}

/// Markup dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// HTML: void elements never take children or closing tags.
    #[default]
    Html,
    /// XML: every element closes explicitly or self-closes.
    Xml,
}

/// Logging toggles, one per severity.
///
/// Disabled severities are checked before any message is formatted.
/// All severities are disabled by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Character-level scanning detail (lookahead, tag-name detection).
    pub debug: bool,
    /// Per-character and per-token decisions.
    pub trivial: bool,
    /// Session-level progress.
    pub info: bool,
    /// Recoveries from malformed markup.
    pub important: bool,
}

impl LogConfig {
    /// All severities disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            debug: false,
            trivial: false,
            info: false,
            important: false,
        }
    }

    /// All severities enabled.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            debug: true,
            trivial: true,
            info: true,
            important: true,
        }
    }

    /// Toggle a single severity.
    #[must_use]
    pub const fn with_level(mut self, level: LogLevel, enabled: bool) -> Self {
        match level {
            LogLevel::Debug => self.debug = enabled,
            LogLevel::Trivial => self.trivial = enabled,
            LogLevel::Info => self.info = enabled,
            LogLevel::Important => self.important = enabled,
        }
        self
    }

    /// Whether the given severity is enabled.
    #[must_use]
    pub const fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Debug => self.debug,
            LogLevel::Trivial => self.trivial,
            LogLevel::Info => self.info,
            LogLevel::Important => self.important,
        }
    }
}

/// Logging severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Scanning detail.
    Debug,
    /// Per-character and per-token decisions.
    Trivial,
    /// Session progress.
    Info,
    /// Malformed markup recoveries.
    Important,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mtr.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        match Self::discover_config() {
            Some(discovered) => Self::load_from_file(&discovered),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if the TOML is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the parse backend.
    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the markup dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Set the logging toggles.
    #[must_use]
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, Backend::Lossless);
        assert_eq!(config.dialect, Dialect::Html);
        assert_eq!(config.logging, LogConfig::none());
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
backend = "dom"
dialect = "xml"

[logging]
trivial = true
important = true
"#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.backend, Backend::Dom);
        assert_eq!(config.dialect, Dialect::Xml);
        assert_eq!(
            config.logging,
            LogConfig {
                debug: false,
                trivial: true,
                info: false,
                important: true,
            }
        );
    }

    #[test]
    fn test_parse_unknown_backend_fails() {
        let err = Config::from_toml_str(r#"backend = "regex""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
    }

    #[test]
    fn test_log_config_toggles() {
        let logging = LogConfig::none()
            .with_level(LogLevel::Info, true)
            .with_level(LogLevel::Debug, true)
            .with_level(LogLevel::Debug, false);

        assert!(logging.is_enabled(LogLevel::Info));
        assert!(!logging.is_enabled(LogLevel::Debug));
        assert!(!logging.is_enabled(LogLevel::Trivial));
        assert!(!logging.is_enabled(LogLevel::Important));
        assert!(!LogConfig::all().with_level(LogLevel::Trivial, false).trivial);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_backend(Backend::Dom)
            .with_dialect(Dialect::Xml)
            .with_logging(LogConfig::all());
        assert_eq!(config.backend, Backend::Dom);
        assert_eq!(config.dialect, Dialect::Xml);
        assert_eq!(config.logging, LogConfig::all());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[logging]\ninfo = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.logging.info);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }
}
