//! Configuration loader
//!
//! `defaults/pyi.default.toml` is embedded into the crate so that docs and runtime
//! behavior stay in sync. Callers layer their own files and CLI overrides on top of
//! those defaults via [`Loader`] before deserializing into [`PyiConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/pyi.default.toml");

static VERSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+){0,2}$").expect("version pattern is valid"));

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PyiConfig {
    pub target: TargetConfig,
    pub output: OutputConfig,
}

/// The Python target that `if` blocks are resolved against
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TargetConfig {
    pub python_version: String,
    pub platform: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: String,
}

impl TargetConfig {
    pub fn new(python_version: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            python_version: python_version.into(),
            platform: platform.into(),
        }
    }

    /// The version as a tuple, e.g. `"3.8"` -> `[3, 8]`
    pub fn version(&self) -> Vec<i64> {
        self.python_version
            .split('.')
            .filter_map(|part| part.parse().ok())
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !VERSION_RE.is_match(&self.python_version) {
            return Err(ConfigError::Message(format!(
                "invalid target.python_version {:?}: expected major[.minor[.micro]]",
                self.python_version
            )));
        }
        if self.platform.is_empty() {
            return Err(ConfigError::Message(
                "target.platform must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::new("3.8", "linux")
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize, deserialize and validate the configuration.
    pub fn build(self) -> Result<PyiConfig, ConfigError> {
        let config: PyiConfig = self.builder.build()?.try_deserialize()?;
        config.target.validate()?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PyiConfig, ConfigError> {
    Loader::new().build()
}
