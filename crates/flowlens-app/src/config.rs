//! Configuration loading from `.flowlens/config.toml`
//!
//! A missing file yields defaults; a malformed file logs a warning and
//! yields defaults. Configuration never aborts startup.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

/// Relative path of the config file, looked up from the working directory.
pub const CONFIG_PATH: &str = ".flowlens/config.toml";

/// User-tunable settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum flows retained; oldest unpinned flows are pruned beyond this.
    pub max_flows: usize,
    /// Start with the pinned-only filter enabled.
    pub pinned_only: bool,
    /// Rows skipped per PageUp/PageDown.
    pub page_step: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_flows: 1000,
            pinned_only: false,
            page_step: 10,
        }
    }
}

impl Config {
    /// Load from the default location.
    pub fn load() -> Config {
        Self::load_from(Path::new(CONFIG_PATH))
    }

    /// Load from an explicit path. Absence and parse failures both
    /// degrade to defaults.
    pub fn load_from(path: &Path) -> Config {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return Config::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "malformed config, using defaults");
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_flows, 1000);
        assert!(!config.pinned_only);
        assert_eq!(config.page_step, 10);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "max_flows = 50").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.max_flows, 50);
        assert_eq!(config.page_step, 10);
    }

    #[test]
    fn test_malformed_file_degrades_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_flows = \"not a number").unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config, Config::default());
    }
}
