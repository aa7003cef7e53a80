//! Configuration for turnstile

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(default)]
    pub log_level: Option<String>,

    /// File receiving the bare interleaved stream
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Echo symbols to stdout
    #[serde(default = "default_console")]
    pub console: bool,

    /// Pause after each handoff, in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Give up waiting for a turn after this many milliseconds (unset = wait forever)
    #[serde(default)]
    pub turn_timeout_ms: Option<u64>,

    /// Upper bound for the odd/even counter
    #[serde(default = "default_odd_even_max")]
    pub odd_even_max: u64,
}

fn default_console() -> bool {
    true
}

fn default_odd_even_max() -> u64 {
    crate::DEFAULT_ODD_EVEN_MAX
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: None,
            output_path: None,
            console: default_console(),
            delay_ms: 0,
            turn_timeout_ms: None,
            odd_even_max: default_odd_even_max(),
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from(config_path);
        }

        for path in Self::default_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        debug!("Config::load: no config file found, using defaults");
        Ok(Config::default())
    }

    fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Config::load_from: reading");
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config file: {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("turnstile").join("turnstile.yml")),
            Some(PathBuf::from("turnstile.yml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are ignored here; the full load reports them afterwards.
    pub fn load_log_level(path: Option<&PathBuf>) -> Option<String> {
        Self::load(path).ok().and_then(|config| config.log_level)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        self.turn_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.console);
        assert_eq!(config.odd_even_max, 100);
        assert_eq!(config.delay(), Duration::ZERO);
        assert_eq!(config.turn_timeout(), None);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("turn_timeout_ms: 500\noutput_path: out.txt\n").unwrap();
        assert_eq!(config.turn_timeout(), Some(Duration::from_millis(500)));
        assert_eq!(config.output_path, Some(PathBuf::from("out.txt")));
        assert!(config.console);
        assert_eq!(config.odd_even_max, 100);
    }

    #[test]
    fn test_save_and_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("turnstile.yml");

        let config = Config {
            log_level: Some("DEBUG".to_string()),
            console: false,
            delay_ms: 10,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(Config::load_log_level(Some(&path)), Some("DEBUG".to_string()));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }
}
