use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error_handling::types::ConfigError;

fn default_op_timeout_secs() -> u64 {
    5
}

/// Runtime parameters of the owning process.
///
/// # Fields Overview
///
/// - `database_path`: where the SQLite database lives; created on first open
/// - `op_timeout_secs`: upper bound for any single storage operation, after
///   which it fails instead of hanging
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_path: PathBuf,

    #[serde(default = "default_op_timeout_secs")]
    pub op_timeout_secs: u64,
}

impl Config {
    /// Reads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&raw).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.op_timeout_secs == 0 {
            return Err(ConfigError::NotInRange(
                "op_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::DirectoryDoesNotExist(
                "database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_secs(self.op_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_full_config_parses() {
        let file = write_config(
            r#"
            database_path = "/var/lib/biomon/biomon.sqlite3"
            op_timeout_secs = 10
            "#,
        );
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.database_path,
            PathBuf::from("/var/lib/biomon/biomon.sqlite3")
        );
        assert_eq!(config.op_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_defaults_when_absent() {
        let file = write_config(r#"database_path = "biomon.sqlite3""#);
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.op_timeout_secs, 5);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let file = write_config(
            r#"
            database_path = "biomon.sqlite3"
            op_timeout_secs = 0
            "#,
        );
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::NotInRange(_))
        ));
    }

    #[test]
    fn test_garbage_toml_is_rejected() {
        let file = write_config("database_path = [");
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::TomlError(_))
        ));
    }
}
