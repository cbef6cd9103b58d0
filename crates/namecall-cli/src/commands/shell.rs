//! Shell command implementation
//!
//! One call per line. The first word names the function and the remaining
//! words are its arguments. Terminals get a `rustyline` editor with history;
//! piped input is read line by line without prompts.

use anyhow::Result;
use namecall_config::Config;
use namecall_runtime::{CallError, Registry};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::borrow::Cow;
use std::io::{self, BufRead, IsTerminal, Write};

/// Line that ends the session (an empty line does too)
pub const EXIT: &str = "exit";

pub const BANNER: &str = "Welcome to the shell. Run 'help' to get the list of available commands.\n\
Usage example: 'sum 3 5'. Type 'exit' or an empty line to quit.";

/// What one input line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Reply(String),
    Exit,
}

/// Execute one input line against `registry`
///
/// Errors become reply text; nothing here ends the session except an exact
/// `exit` and an empty line. A line of only whitespace names no function.
pub fn execute_line(registry: &Registry, line: &str) -> Step {
    if line.is_empty() || line == EXIT {
        return Step::Exit;
    }

    let mut words = line.split_whitespace();
    let name = words.next().unwrap_or("");
    let tokens: Vec<&str> = words.collect();

    match registry.call(name, &tokens) {
        Ok(value) => Step::Reply(value.into_string()),
        Err(err) => {
            tracing::debug!(name, error = %err, "call failed");
            Step::Reply(render_error(&err))
        }
    }
}

/// Drop the `\n` or `\r\n` terminator
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Shell wording for a failed call
pub fn render_error(err: &CallError) -> String {
    match err {
        CallError::NotFound { name } => format!(
            "Function '{}' not found. Type 'help' for the list of supported functions.",
            name
        ),
        other => other.to_string(),
    }
}

/// `{len}:{content}` where `len` is the byte length of `content`
pub fn frame(content: &str) -> String {
    format!("{}:{}", content.len(), content)
}

/// A shell session over a registry
pub struct Session<'a> {
    registry: &'a Registry,
    config: &'a Config,
}

impl<'a> Session<'a> {
    pub fn new(registry: &'a Registry, config: &'a Config) -> Self {
        Self { registry, config }
    }

    fn format(&self, reply: &str) -> String {
        if self.config.shell.framing {
            frame(reply)
        } else {
            reply.to_string()
        }
    }

    fn banner<W: Write>(&self, output: &mut W) -> io::Result<()> {
        if self.config.shell.banner {
            writeln!(output, "{}\n", BANNER)?;
        }
        Ok(())
    }

    /// Serve lines from `input` until `exit`, an empty line, or end of input
    ///
    /// Bytes that are not UTF-8 are replaced rather than ending the session.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, output: &mut W) -> io::Result<()> {
        self.banner(output)?;
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(strip_line_ending(&buf));
            if let Cow::Owned(_) = line {
                tracing::debug!("input line is not valid UTF-8");
            }
            match execute_line(self.registry, &line) {
                Step::Exit => break,
                Step::Reply(reply) => writeln!(output, "{}", self.format(&reply))?,
            }
            output.flush()?;
        }
        output.flush()
    }

    /// Serve an interactive terminal with line editing
    pub fn run_interactive(&self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;

        // Load history from file (unless disabled)
        let history_path = self.config.history_path().map(|p| p.to_path_buf());
        if let Some(path) = &history_path {
            let _ = rl.load_history(path); // Missing file on first run
        }

        self.banner(&mut io::stdout())?;

        loop {
            match rl.readline(&self.config.shell.prompt) {
                Ok(line) => {
                    let step = execute_line(self.registry, &line);
                    if step == Step::Exit {
                        break;
                    }
                    let _ = rl.add_history_entry(line.as_str());
                    if let Step::Reply(reply) = step {
                        println!("{}", self.format(&reply));
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    println!("^C");
                    println!("Type '{}' or an empty line to quit", EXIT);
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        // Save history to file (unless disabled)
        if let Some(path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(err) = rl.save_history(&path) {
                tracing::warn!(path = %path.display(), error = %err, "could not save history");
            }
        }

        Ok(())
    }
}

/// Run the shell on stdin
pub fn run(registry: &Registry, config: &Config) -> Result<()> {
    let session = Session::new(registry, config);
    if io::stdin().is_terminal() {
        session.run_interactive()
    } else {
        let stdin = io::stdin();
        let mut stdout = io::stdout().lock();
        session.run(stdin.lock(), &mut stdout)?;
        Ok(())
    }
}
