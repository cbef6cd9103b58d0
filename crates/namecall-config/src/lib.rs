//! namecall Configuration System
//!
//! Provides configuration for the namecall shell:
//! - Settings files (`namecall.toml`, `~/.namecall/config.toml`)
//! - Environment overrides (`NAMECALL_*`)
//! - Resolution into concrete shell and logging settings
//!
//! # Configuration Hierarchy
//!
//! Sources are merged in the following order (later overrides earlier):
//! 1. Global config (~/.namecall/config.toml)
//! 2. Project config (./namecall.toml, searched upward)
//! 3. Environment variables (NAMECALL_*)
//! 4. CLI flags (applied by the caller)
//!
//! # Example
//!
//! ```no_run
//! use namecall_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! println!("prompt: {:?}", config.shell.prompt);
//! ```

pub mod loader;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

// Re-export main types
pub use loader::{Config, ConfigLoader, LogLevel, ShellSettings};
pub use settings::{LoggingSection, SettingsFile, ShellSection};
