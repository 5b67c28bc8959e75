//! Command line configuration.
//!
//! Loaded via the `config` crate from an optional `botflow.toml` in the
//! working directory (or the file passed with `--config`), overridden by
//! environment variables such as `BOTFLOW_STRICT=true`.

use serde::Deserialize;
use std::path::Path;

/// File looked up (without extension) when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "botflow";

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// Pretty-print emitted JSON.
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,

    /// Make `validate` fail when any warning is produced.
    #[serde(default)]
    pub strict: bool,

    /// Template used by `new` when none is named.
    #[serde(default = "default_template")]
    pub default_template: String,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_pretty_json() -> bool {
    true
}

fn default_template() -> String {
    "Simple Command".to_string()
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            pretty_json: default_pretty_json(),
            strict: false,
            default_template: default_template(),
            log_filter: default_log_filter(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from the optional file and the environment.
    ///
    /// An explicit `path` must exist; the default file is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value has the wrong type.
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("BOTFLOW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cli_config_has_correct_defaults() {
        let config = CliConfig::default();
        assert!(config.pretty_json);
        assert!(!config.strict);
        assert_eq!(config.default_template, "Simple Command");
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn loads_values_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("temp file");
        writeln!(file, "strict = true\ndefault_template = \"Counter\"").expect("write");

        let config = CliConfig::load(Some(file.path())).expect("load");
        assert!(config.strict);
        assert_eq!(config.default_template, "Counter");
        assert!(config.pretty_json);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.toml");
        assert!(CliConfig::load(Some(&missing)).is_err());
    }
}
