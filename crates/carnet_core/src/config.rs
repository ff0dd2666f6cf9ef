//! Application configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. an optional JSON file
//! 3. `CARNET_*` environment variables

use crate::logging::{default_log_level, LoggingConfig};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_LOG_LEVEL: &str = "CARNET_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CARNET_LOG_DIR";
pub const ENV_DB_PATH: &str = "CARNET_DB_PATH";
pub const ENV_LOG_STDERR: &str = "CARNET_LOG_STDERR";

const DEFAULT_DB_FILE_NAME: &str = "carnet.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub db_path: PathBuf,
    pub log_stderr: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_stderr: false,
        }
    }
}

impl AppConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Defaults, then `file` when given, then the process environment.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match file {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `CARNET_*` overrides read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.db_path = PathBuf::from(path);
        }
        if let Some(flag) = lookup(ENV_LOG_STDERR) {
            self.log_stderr = parse_bool(ENV_LOG_STDERR, &flag)?;
        }
        Ok(self)
    }

    /// Logger settings, or `None` when no log directory is configured.
    pub fn logging(&self) -> Result<Option<LoggingConfig>, ConfigError> {
        let Some(dir) = &self.log_dir else {
            return Ok(None);
        };
        LoggingConfig::new(&self.log_level, dir, self.log_stderr)
            .map(Some)
            .map_err(|message| ConfigError::InvalidValue {
                key: "log_level/log_dir",
                message,
            })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key,
            message: format!("expected a boolean, got `{other}`"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, ENV_DB_PATH, ENV_LOG_STDERR};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn json_fields_fall_back_to_defaults() {
        let config = AppConfig::from_json_str(r#"{ "db_path": "/data/carnet.db" }"#).unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/carnet.db"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.log_level, AppConfig::default().log_level);
    }

    #[test]
    fn unknown_json_keys_are_rejected() {
        let err = AppConfig::from_json_str(r#"{ "db": "x" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn environment_overrides_win() {
        let env: HashMap<&str, &str> = [(ENV_DB_PATH, "/tmp/other.db"), (ENV_LOG_STDERR, "yes")]
            .into_iter()
            .collect();
        let config = AppConfig::default()
            .with_overrides(|key| env.get(key).map(|value| value.to_string()))
            .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert!(config.log_stderr);
    }

    #[test]
    fn bad_boolean_override_is_reported() {
        let err = AppConfig::default()
            .with_overrides(|key| (key == ENV_LOG_STDERR).then(|| "sometimes".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CARNET_LOG_STDERR"));
    }

    #[test]
    fn logging_is_disabled_without_directory() {
        assert_eq!(AppConfig::default().logging().unwrap(), None);

        let config = AppConfig {
            log_dir: Some(PathBuf::from("relative/logs")),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.logging(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
