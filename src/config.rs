//! Configuration for the reorganizer.
//!
//! Loaded from a TOML file; every field carries a default so a missing file
//! or section still yields a working setup.

use crate::utils::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub backup: BackupConfig,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory names the repository scan never descends into
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Backup directory; relative paths resolve against the scan root
    #[serde(default = "default_backup_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_exclude() -> Vec<String> {
    ["node_modules", "target", "vendor", ".venv", "__pycache__"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(".tidytree/backups")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: default_exclude(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| EngineError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Absolute backup directory for a given scan root
    pub fn backup_dir(&self, root: &Path) -> PathBuf {
        if self.backup.dir.is_absolute() {
            self.backup.dir.clone()
        } else {
            root.join(&self.backup.dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.backup.dir, PathBuf::from(".tidytree/backups"));
        assert!(config.scan.exclude.contains(&"node_modules".to_string()));
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.log.level, "debug");
        assert_eq!(config.backup.dir, PathBuf::from(".tidytree/backups"));
    }

    #[test]
    fn test_backup_dir_resolution() {
        let mut config = Config::default();
        assert_eq!(
            config.backup_dir(Path::new("/work/mono")),
            PathBuf::from("/work/mono/.tidytree/backups")
        );

        config.backup.dir = PathBuf::from("/var/backups/tidytree");
        assert_eq!(
            config.backup_dir(Path::new("/work/mono")),
            PathBuf::from("/var/backups/tidytree")
        );
    }
}
