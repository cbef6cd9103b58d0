//! One-shot call command

use super::shell::render_error;
use anyhow::{anyhow, Result};
use namecall_runtime::Registry;

/// Call `name` with `tokens` and print the result
pub fn run(registry: &Registry, name: &str, tokens: &[String]) -> Result<()> {
    let value = registry
        .call(name, tokens)
        .map_err(|err| anyhow!(render_error(&err)))?;
    println!("{}", value);
    Ok(())
}
