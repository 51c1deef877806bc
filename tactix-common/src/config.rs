//! Configuration loading and config file resolution
//!
//! Bootstrap settings come from a small TOML file. The file is located in
//! priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TACTIX_CONFIG`)
//! 3. Per-user config directory (`<config dir>/tactix/config.toml`)
//! 4. Compiled defaults (no file)
//!
//! A missing file is not an error: startup continues with defaults. A file
//! that exists but does not parse is. Loading happens before logging is set
//! up, so [`load_config`] reports where the values came from and the caller
//! logs it. Range checks run in [`TomlConfig::validate`] once command-line
//! overrides are applied.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "TACTIX_CONFIG";

/// Sequence length cap used by the reference deployment
pub const DEFAULT_SEQUENCE_CAP: usize = 21;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// SQLite database file; defaults to `<local data dir>/tactix/tactix.db`
    pub database_path: Option<PathBuf>,
    pub bind_addr: String,
    pub port: u16,
    pub sequence: SequenceConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            bind_addr: "127.0.0.1".to_string(),
            port: 5001,
            sequence: SequenceConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Sequencing settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// Maximum entries in each returned list
    pub cap: usize,
    /// Fixed RNG seed; every request then produces the same random order
    pub seed: Option<u64>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            cap: DEFAULT_SEQUENCE_CAP,
            seed: None,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { token_ttl_hours: 24 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text; values are range-checked later by [`Self::validate`]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.sequence.cap == 0 {
            return Err(Error::Config("sequence.cap must be at least 1".to_string()));
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(Error::Config(
                "auth.token_ttl_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured database path, or the platform default
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(default_database_path)
    }
}

/// Locate the config file following the priority order above
///
/// Returns `None` when no candidate exists; the caller then uses defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    dirs::config_dir()
        .map(|d| d.join("tactix").join("config.toml"))
        .filter(|p| p.exists())
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from this file
    File(PathBuf),
    /// This file was named but does not exist; compiled defaults used
    Missing(PathBuf),
    /// No file was named or found; compiled defaults used
    Defaults,
}

impl ConfigSource {
    /// Emit the startup log line for this source
    ///
    /// A named file that is missing is a warning: the operator asked for it.
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded config from {}", path.display()),
            ConfigSource::Missing(path) => warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            ),
            ConfigSource::Defaults => info!("No config file found, using compiled defaults"),
        }
    }
}

/// Load configuration, falling back to defaults when the file is absent
pub fn load_config(path: Option<&Path>) -> Result<(TomlConfig, ConfigSource)> {
    let Some(path) = path else {
        return Ok((TomlConfig::default(), ConfigSource::Defaults));
    };

    match std::fs::read_to_string(path) {
        Ok(content) => Ok((
            TomlConfig::from_toml_str(&content)?,
            ConfigSource::File(path.to_path_buf()),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok((
            TomlConfig::default(),
            ConfigSource::Missing(path.to_path_buf()),
        )),
        Err(e) => Err(Error::Io(e)),
    }
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("tactix"))
        .unwrap_or_else(|| PathBuf::from("./tactix_data"))
        .join("tactix.db")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 5001);
        assert_eq!(config.sequence.cap, 21);
        assert_eq!(config.sequence.seed, None);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.logging.level, "info");
        assert!(config.database_path().ends_with("tactix.db"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 8080

            [sequence]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.sequence.cap, 21);
        assert_eq!(config.sequence.seed, Some(42));
    }

    #[test]
    fn test_zero_cap_rejected_by_validate() {
        let config = TomlConfig::from_toml_str("[sequence]\ncap = 0\n").unwrap();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_cap_in_file_fixed_by_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[sequence]\ncap = 0\n").unwrap();

        // Loading does not range-check; the command-line value is applied first
        let (mut config, _) = load_config(Some(&path)).unwrap();
        config.sequence.cap = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_rejected() {
        assert!(TomlConfig::from_toml_str("port = \"not a number\"").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let (config, source) = load_config(Some(&absent)).unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(source, ConfigSource::Missing(absent));
    }

    #[test]
    fn test_no_path_uses_defaults() {
        let (config, source) = load_config(None).unwrap();
        assert_eq!(config, TomlConfig::default());
        assert_eq!(source, ConfigSource::Defaults);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "database_path = \"/tmp/puzzles.db\"\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/puzzles.db"));
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    #[serial]
    fn test_cli_path_beats_env_var() {
        std::env::set_var("TACTIX_TEST_CONFIG", "/from/env.toml");
        let resolved = resolve_config_path(Some(Path::new("/from/cli.toml")), "TACTIX_TEST_CONFIG");
        assert_eq!(resolved, Some(PathBuf::from("/from/cli.toml")));
        std::env::remove_var("TACTIX_TEST_CONFIG");
    }

    #[test]
    #[serial]
    fn test_env_var_used_without_cli() {
        std::env::set_var("TACTIX_TEST_CONFIG", "/from/env.toml");
        let resolved = resolve_config_path(None, "TACTIX_TEST_CONFIG");
        assert_eq!(resolved, Some(PathBuf::from("/from/env.toml")));
        std::env::remove_var("TACTIX_TEST_CONFIG");
    }
}
