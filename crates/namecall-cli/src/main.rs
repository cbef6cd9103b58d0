use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod demo;
mod logging;

/// Call registered functions by name with text arguments.
///
/// Every registered function is reachable by its name; the remaining words
/// of a command line are its arguments. The shell reads one call per line
/// and prints each result, framed as `{len}:{content}` unless disabled.
///
/// EXAMPLES:
///     namecall                        Start the shell
///     namecall call sum 3 5           Call one function and exit
///     namecall list                   List registered functions
///     echo "greet Ada" | namecall     Run calls from a pipe
///
/// ENVIRONMENT VARIABLES:
///     NAMECALL_LOG           Log filter (e.g. 'debug', 'namecall_runtime=trace')
///     NAMECALL_FRAMING       Set to '0' to print results without length prefix
///     NAMECALL_PROMPT        Shell prompt
///     NAMECALL_NO_HISTORY    Set to '1' to disable shell history
///     NAMECALL_HISTORY_FILE  Custom history file
#[derive(Parser)]
#[command(name = "namecall")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file to use instead of searching for namecall.toml
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log filter directive
    #[arg(long, global = true, env = "NAMECALL_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive shell (default)
    ///
    /// Reads one call per line: the first word names the function, the
    /// rest are its arguments. `exit` or an empty line ends the session.
    ///
    /// EXAMPLES:
    ///     namecall shell                  Start the shell
    ///     namecall shell --no-framing     Print bare results
    ///     namecall shell --no-history     Disable history persistence
    #[command(visible_alias = "s")]
    Shell(ShellFlags),

    /// Call one function and print its result
    ///
    /// Exits with status 1 when the call fails.
    ///
    /// EXAMPLES:
    ///     namecall call sum 3 5
    ///     namecall call help
    Call {
        /// Function name
        name: String,
        /// Arguments, passed verbatim
        #[arg(allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// List registered functions
    #[command(visible_alias = "ls")]
    List,
}

/// Flags overriding the `[shell]` settings
#[derive(Args, Debug, Default, Clone)]
pub struct ShellFlags {
    /// Prompt shown before each line
    #[arg(long)]
    pub prompt: Option<String>,
    /// Print results without the `{len}:` prefix
    #[arg(long)]
    pub no_framing: bool,
    /// Disable history persistence
    #[arg(long)]
    pub no_history: bool,
    /// Skip the welcome banner
    #[arg(long)]
    pub no_banner: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let flags = match &cli.command {
        Some(Commands::Shell(flags)) => flags.clone(),
        _ => ShellFlags::default(),
    };
    let config = config::load(cli.config.as_deref(), &flags)?;
    logging::init(config.log_level, cli.log.as_deref())?;
    match config.project_root() {
        Some(root) => tracing::debug!(root = %root.display(), "using project settings"),
        None => tracing::debug!("no project settings found"),
    }

    let registry = namecall_runtime::registry::install(demo::registry())?;

    match cli.command {
        None | Some(Commands::Shell(_)) => commands::shell::run(registry, &config)?,
        Some(Commands::Call { name, tokens }) => commands::call::run(registry, &name, &tokens)?,
        Some(Commands::List) => commands::list::run(registry),
    }

    Ok(())
}
