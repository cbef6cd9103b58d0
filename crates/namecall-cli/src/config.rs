//! CLI configuration
//!
//! Settings files and `NAMECALL_*` variables are resolved by
//! `namecall-config`; command-line flags are layered on top here.

use crate::ShellFlags;
use anyhow::{Context, Result};
use namecall_config::{Config, ConfigLoader};
use std::path::Path;

/// Load configuration, then apply command-line flags
pub fn load(config_path: Option<&Path>, flags: &ShellFlags) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    let mut config = match config_path {
        Some(path) => loader
            .load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            let cwd = std::env::current_dir()?;
            loader.load_from_directory(&cwd)?
        }
    };

    apply_flags(&mut config, flags);
    Ok(config)
}

/// Flags only ever switch features off or replace the prompt
fn apply_flags(config: &mut Config, flags: &ShellFlags) {
    if let Some(prompt) = &flags.prompt {
        config.shell.prompt = prompt.clone();
    }
    if flags.no_framing {
        config.shell.framing = false;
    }
    if flags.no_history {
        config.shell.history = false;
    }
    if flags.no_banner {
        config.shell.banner = false;
    }
}
