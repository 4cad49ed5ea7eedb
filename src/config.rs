//! taskbook configuration.
//!
//! Loaded from `~/.taskbook/config.toml`. The file is optional — defaults
//! apply when it is missing — but a present, malformed file is an error.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// taskbook configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Where the database lives. Defaults to `~/.taskbook/`.
    pub data_dir: Option<PathBuf>,

    /// Log level for stderr diagnostics. Defaults to `info`;
    /// the `RUST_LOG` env var overrides both.
    pub log_level: Option<String>,
}

impl Config {
    /// Load config from `~/.taskbook/config.toml`, defaulting when absent.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.taskbook/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".taskbook").join("config.toml"))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let config: Config =
            toml::from_str("data-dir = \"/srv/taskbook\"\nlog-level = \"debug\"").unwrap();
        assert_eq!(config.data_dir.as_deref(), Some("/srv/taskbook".as_ref()));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn defaults_when_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.data_dir.is_none());
        assert_eq!(config.log_level(), "info");
    }
}
