//! Settings files (namecall.toml, ~/.namecall/config.toml)
//!
//! Both files share one schema. Every field is optional; unset fields fall
//! through to the next source.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name searched for in the project tree
pub const PROJECT_FILE_NAME: &str = "namecall.toml";

/// Directory under the home directory holding the global file
pub const GLOBAL_DIR_NAME: &str = ".namecall";

/// File name of the global file
pub const GLOBAL_FILE_NAME: &str = "config.toml";

/// Log levels accepted by `logging.level`
pub const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Contents of one settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Shell behaviour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shell: Option<ShellSection>,

    /// Diagnostics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,
}

/// `[shell]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ShellSection {
    /// Prompt printed before each line (default: "> ")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Write results as `{len}:{content}` (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framing: Option<bool>,

    /// Keep line history in interactive mode (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<bool>,

    /// History file (default: ~/.namecall/history)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Print the welcome banner (default: true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<bool>,
}

/// `[logging]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl SettingsFile {
    /// Load and validate a settings file
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::IoError(e)
            }
        })?;

        let settings: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            file: path.to_path_buf(),
            error: e,
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate field values
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(shell) = &self.shell {
            if let Some(prompt) = &shell.prompt {
                if prompt.contains(['\n', '\r']) {
                    return Err(ConfigError::InvalidValue {
                        field: "shell.prompt".to_string(),
                        reason: "must be a single line".to_string(),
                    });
                }
            }
            if let Some(file) = &shell.history_file {
                if file.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "shell.history_file".to_string(),
                        reason: "must not be empty".to_string(),
                    });
                }
            }
        }

        if let Some(level) = self.logging.as_ref().and_then(|l| l.level.as_deref()) {
            validate_log_level("logging.level", level)?;
        }

        Ok(())
    }

    /// Get the global settings path (~/.namecall/config.toml)
    pub fn global_config_path() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(GLOBAL_DIR_NAME).join(GLOBAL_FILE_NAME))
    }

    /// Merge another file into this one, field by field
    /// Other file takes precedence for non-None values
    pub fn merge(&mut self, other: &SettingsFile) {
        if let Some(theirs) = &other.shell {
            let ours = self.shell.get_or_insert_with(Default::default);
            if theirs.prompt.is_some() {
                ours.prompt = theirs.prompt.clone();
            }
            if theirs.framing.is_some() {
                ours.framing = theirs.framing;
            }
            if theirs.history.is_some() {
                ours.history = theirs.history;
            }
            if theirs.history_file.is_some() {
                ours.history_file = theirs.history_file.clone();
            }
            if theirs.banner.is_some() {
                ours.banner = theirs.banner;
            }
        }
        if let Some(level) = other.logging.as_ref().and_then(|l| l.level.clone()) {
            self.logging.get_or_insert_with(Default::default).level = Some(level);
        }
    }
}

/// Validate a log level name
pub(crate) fn validate_log_level(field: &str, value: &str) -> ConfigResult<()> {
    if !LOG_LEVELS.contains(&value.to_ascii_lowercase().as_str()) {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            reason: format!("must be one of {}, got '{}'", LOG_LEVELS.join(", "), value),
        });
    }
    Ok(())
}
