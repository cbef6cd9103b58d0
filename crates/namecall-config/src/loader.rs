//! Configuration Loader
//!
//! Handles loading and merging configuration from multiple sources with proper precedence.

use crate::settings::{self, SettingsFile, GLOBAL_DIR_NAME, PROJECT_FILE_NAME};
use crate::{ConfigError, ConfigResult};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable overriding `shell.framing`
pub const ENV_FRAMING: &str = "NAMECALL_FRAMING";
/// Environment variable overriding `shell.prompt`
pub const ENV_PROMPT: &str = "NAMECALL_PROMPT";
/// Environment variable disabling `shell.history` when truthy
pub const ENV_NO_HISTORY: &str = "NAMECALL_NO_HISTORY";
/// Environment variable overriding `shell.history_file`
pub const ENV_HISTORY_FILE: &str = "NAMECALL_HISTORY_FILE";

const DEFAULT_PROMPT: &str = "> ";
const HISTORY_FILE_NAME: &str = "history";

/// Configuration loader
///
/// Loads configuration from multiple sources and merges them with proper precedence:
/// 1. Global config (~/.namecall/config.toml) - lowest priority
/// 2. Project config (./namecall.toml) - overrides global
/// 3. Environment variables (NAMECALL_*) - overrides project
/// 4. CLI flags - highest priority (handled by caller)
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Resolved shell settings
#[derive(Debug, Clone, PartialEq)]
pub struct ShellSettings {
    pub prompt: String,
    pub framing: bool,
    pub history: bool,
    /// `None` when no home directory is available and none was configured
    pub history_file: Option<PathBuf>,
    pub banner: bool,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            framing: true,
            history: true,
            history_file: ConfigLoader::global_config_dir()
                .ok()
                .map(|dir| dir.join(HISTORY_FILE_NAME)),
            banner: true,
        }
    }
}

/// Log level from `logging.level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        settings::validate_log_level("logging.level", s)?;
        Ok(match s.to_ascii_lowercase().as_str() {
            "off" => LogLevel::Off,
            "error" => LogLevel::Error,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Warn,
        })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Shell behaviour
    pub shell: ShellSettings,

    /// Default log level (overridden by NAMECALL_LOG at subscriber setup)
    pub log_level: LogLevel,

    /// Project root directory (where namecall.toml was found)
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Read the global settings from `path` instead of ~/.namecall/config.toml
    pub fn with_global_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree to find namecall.toml, layers it over the
    /// global settings, then applies environment overrides.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let mut merged = self.load_global_config()?;

        let (project_root, project) = find_project_config(start_dir)?;
        merged.merge(&project);

        let mut config = resolve(&merged)?;
        config.set_project_root(project_root);
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Load configuration from a specific project settings file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let mut merged = self.load_global_config()?;
        merged.merge(&SettingsFile::load_from_file(config_path)?);

        let mut config = resolve(&merged)?;
        config.set_project_root(config_path.parent().map(|p| p.to_path_buf()));
        apply_env_overrides(&mut config)?;
        Ok(config)
    }

    /// Load global settings from ~/.namecall/config.toml
    fn load_global_config(&mut self) -> ConfigResult<SettingsFile> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match SettingsFile::global_config_path() {
                Ok(path) => {
                    self.global_config_path = Some(path.clone());
                    path
                }
                // No home directory means no global file
                Err(ConfigError::HomeNotFound) => return Ok(SettingsFile::default()),
                Err(e) => return Err(e),
            },
        };

        // Global config is optional - if it doesn't exist, return default
        if !path.exists() {
            return Ok(SettingsFile::default());
        }

        SettingsFile::load_from_file(&path)
    }

    /// Get the global configuration directory (~/.namecall)
    pub fn global_config_dir() -> ConfigResult<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
        Ok(home.join(GLOBAL_DIR_NAME))
    }
}

/// Find project settings by walking up the directory tree
///
/// Returns (project_root, settings); the settings are empty when no file is found.
fn find_project_config(start_dir: &Path) -> ConfigResult<(Option<PathBuf>, SettingsFile)> {
    for dir in start_dir.ancestors() {
        let config_path = dir.join(PROJECT_FILE_NAME);
        if config_path.is_file() {
            let settings = SettingsFile::load_from_file(&config_path)?;
            return Ok((Some(dir.to_path_buf()), settings));
        }
    }
    Ok((None, SettingsFile::default()))
}

/// Fill unset fields with defaults
fn resolve(merged: &SettingsFile) -> ConfigResult<Config> {
    let mut shell = ShellSettings::default();
    if let Some(section) = &merged.shell {
        if let Some(prompt) = &section.prompt {
            shell.prompt = prompt.clone();
        }
        if let Some(framing) = section.framing {
            shell.framing = framing;
        }
        if let Some(history) = section.history {
            shell.history = history;
        }
        if let Some(file) = &section.history_file {
            shell.history_file = Some(file.clone());
        }
        if let Some(banner) = section.banner {
            shell.banner = banner;
        }
    }

    let log_level = match merged.logging.as_ref().and_then(|l| l.level.as_deref()) {
        Some(level) => level.parse()?,
        None => LogLevel::default(),
    };

    Ok(Config {
        shell,
        log_level,
        project_root: None,
    })
}

/// Apply NAMECALL_* environment overrides
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Ok(framing) = env::var(ENV_FRAMING) {
        config.shell.framing = parse_env_bool(ENV_FRAMING, &framing)?;
    }

    if let Ok(prompt) = env::var(ENV_PROMPT) {
        config.shell.prompt = prompt;
    }

    if let Ok(no_history) = env::var(ENV_NO_HISTORY) {
        if parse_env_bool(ENV_NO_HISTORY, &no_history)? {
            config.shell.history = false;
        }
    }

    if let Ok(file) = env::var(ENV_HISTORY_FILE) {
        if !file.is_empty() {
            config.shell.history_file = Some(PathBuf::from(file));
        }
    }

    Ok(())
}

fn parse_env_bool(name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: name.to_string(),
            reason: format!("expected a boolean, got '{}'", value),
        }),
    }
}

impl Config {
    /// Record the project root; a relative `history_file` is anchored there
    fn set_project_root(&mut self, root: Option<PathBuf>) {
        if let (Some(root), Some(file)) = (&root, &self.shell.history_file) {
            if file.is_relative() {
                self.shell.history_file = Some(root.join(file));
            }
        }
        self.project_root = root;
    }

    /// Get the project root directory
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Check if a project file was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }

    /// History file to use, if history is enabled
    pub fn history_path(&self) -> Option<&Path> {
        if self.shell.history {
            self.shell.history_file.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn create_config_file(dir: &Path, content: &str) -> PathBuf {
        let config_path = dir.join(PROJECT_FILE_NAME);
        fs::write(&config_path, content).unwrap();
        config_path
    }

    fn isolated_loader(dir: &TempDir) -> ConfigLoader {
        ConfigLoader::new().with_global_config_path(dir.path().join("no-global.toml"))
    }

    #[test]
    #[serial]
    fn test_load_project_config() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[shell]
prompt = "$ "
"#,
        );

        let config = isolated_loader(&temp_dir)
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.shell.prompt, "$ ");
        assert!(config.is_project());
    }

    #[test]
    #[serial]
    fn test_find_config_in_parent() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[shell]
banner = false
"#,
        );

        let sub_dir = temp_dir.path().join("subdir");
        fs::create_dir(&sub_dir).unwrap();

        let config = isolated_loader(&temp_dir)
            .load_from_directory(&sub_dir)
            .unwrap();

        assert!(!config.shell.banner);
        assert_eq!(config.project_root(), Some(temp_dir.path()));
    }

    #[test]
    #[serial]
    fn test_env_override_framing() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[shell]
framing = true
"#,
        );

        env::set_var(ENV_FRAMING, "false");
        let config = isolated_loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var(ENV_FRAMING);

        assert!(!config.unwrap().shell.framing);
    }

    #[test]
    #[serial]
    fn test_env_bad_boolean() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(ENV_NO_HISTORY, "sometimes");
        let result = isolated_loader(&temp_dir).load_from_directory(temp_dir.path());
        env::remove_var(ENV_NO_HISTORY);

        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    #[serial]
    fn test_relative_history_file_is_anchored_at_project_root() {
        let temp_dir = TempDir::new().unwrap();
        create_config_file(
            temp_dir.path(),
            r#"
[shell]
history_file = ".namecall_history"
"#,
        );
        let sub_dir = temp_dir.path().join("nested");
        fs::create_dir(&sub_dir).unwrap();

        let config = isolated_loader(&temp_dir)
            .load_from_directory(&sub_dir)
            .unwrap();

        assert_eq!(
            config.history_path(),
            Some(temp_dir.path().join(".namecall_history").as_path())
        );
    }

    #[test]
    #[serial]
    fn test_absolute_history_file_is_kept() {
        let temp_dir = TempDir::new().unwrap();
        let absolute = temp_dir.path().join("elsewhere").join("history");
        create_config_file(
            temp_dir.path(),
            &format!("[shell]\nhistory_file = {:?}\n", absolute.display().to_string()),
        );

        let config = isolated_loader(&temp_dir)
            .load_from_directory(temp_dir.path())
            .unwrap();

        assert_eq!(config.history_path(), Some(absolute.as_path()));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn test_history_path_respects_toggle() {
        let mut config = Config::default();
        config.shell.history_file = Some(PathBuf::from("/tmp/h"));
        assert_eq!(config.history_path(), Some(Path::new("/tmp/h")));

        config.shell.history = false;
        assert_eq!(config.history_path(), None);
    }
}
