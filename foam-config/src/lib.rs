//! Shared configuration loader for the OpenFOAM language server.
//!
//! `defaults/foam.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. The server layers user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`FoamConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/foam.default.toml");

/// Top-level configuration consumed by the language server.
#[derive(Debug, Clone, Deserialize)]
pub struct FoamConfig {
    pub logging: LoggingConfig,
    pub diagnostics: DiagnosticsConfig,
    pub completion: CompletionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when neither the CLI nor `RUST_LOG` set one.
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiagnosticsConfig {
    pub source: String,
}

/// Static parts of every completion item.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub detail: String,
    pub trigger_characters: Vec<String>,
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

    /// Layer a configuration file that must exist, such as one named by `--config`.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), true)
    }

    /// Layer a file that may be absent, such as a per-case `.foam-lsp.toml`.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(path.as_ref(), false)
    }

    fn layer(mut self, path: &Path, required: bool) -> Self {
        let source = File::from(path).format(FileFormat::Toml).required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override. Overrides beat every file layer.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Pin `logging.filter` to a command-line directive, if one was given.
    pub fn with_log_filter(self, filter: Option<&str>) -> Result<Self, ConfigError> {
        match filter {
            Some(directive) => self.set_override("logging.filter", directive),
            None => Ok(self),
        }
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<FoamConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<FoamConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.diagnostics.source, "openfoam-lsp");
        assert_eq!(config.completion.detail, "OpenFOAM keyword");
        assert_eq!(config.completion.trigger_characters, vec![".", "\"", " "]);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("diagnostics.source", "foam")
            .expect("override to apply")
            .set_override("logging.filter", "foam_lsp=debug")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.diagnostics.source, "foam");
        assert_eq!(config.logging.filter, "foam_lsp=debug");
        assert_eq!(config.completion.detail, "OpenFOAM keyword");
    }

    #[test]
    fn layers_user_file_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[completion]\ndetail = \"foam\"").unwrap();
        let config = Loader::new()
            .with_file(file.path())
            .build()
            .expect("config to build");
        assert_eq!(config.completion.detail, "foam");
        assert_eq!(config.completion.trigger_characters.len(), 3);
    }

    #[test]
    fn log_filter_beats_file_layer() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "[logging]\nfilter = \"warn\"").unwrap();

        let from_file = Loader::new()
            .with_file(file.path())
            .with_log_filter(None)
            .expect("no override")
            .build()
            .expect("config to build");
        assert_eq!(from_file.logging.filter, "warn");

        let from_cli = Loader::new()
            .with_file(file.path())
            .with_log_filter(Some("foam_lsp=trace"))
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(from_cli.logging.filter, "foam_lsp=trace");
    }

    #[test]
    fn optional_file_may_be_missing() {
        let config = Loader::new()
            .with_optional_file("/nonexistent/foam-lsp.toml")
            .build()
            .expect("missing optional file is ignored");
        assert_eq!(config.diagnostics.source, "openfoam-lsp");
    }

    #[test]
    fn required_file_must_exist() {
        let result = Loader::new()
            .with_file("/nonexistent/foam-lsp.toml")
            .build();
        assert!(result.is_err());
    }
}
