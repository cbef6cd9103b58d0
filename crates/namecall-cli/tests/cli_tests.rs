//! CLI integration tests
//!
//! Runs the `namecall` binary with an isolated home and working directory so
//! no user settings leak in.

use predicates::prelude::*;
use std::fs;
use assert_cmd::Command;
use tempfile::TempDir;

fn namecall_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("namecall").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("NAMECALL_LOG")
        .env_remove("NAMECALL_FRAMING")
        .env_remove("NAMECALL_PROMPT")
        .env_remove("NAMECALL_NO_HISTORY")
        .env_remove("NAMECALL_HISTORY_FILE");
    cmd
}

// ============================================================================
// Help
// ============================================================================

#[test]
fn test_main_help_shows_commands_and_environment() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shell"))
        .stdout(predicate::str::contains("call"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("ENVIRONMENT VARIABLES"))
        .stdout(predicate::str::contains("NAMECALL_FRAMING"));
}

// ============================================================================
// One-shot commands
// ============================================================================

#[test]
fn test_call_sum() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["call", "sum", "3", "5"])
        .assert()
        .success()
        .stdout("The result is 8\n");
}

#[test]
fn test_call_negative_argument() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["call", "sum", "-3", "5"])
        .assert()
        .success()
        .stdout("The result is 2\n");
}

#[test]
fn test_call_unknown_function_fails() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["call", "frobnicate"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Function 'frobnicate' not found"));
}

#[test]
fn test_call_missing_argument_fails() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["call", "greet"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Not enough arguments passed to function greet(name: string): expected 1, got 0",
        ));
}

#[test]
fn test_list() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("List of supported functions:\n"))
        .stdout(predicate::str::contains("  greet(name: string)\n"))
        .stdout(predicate::str::contains("  help()\n"));
}

// ============================================================================
// Shell over a pipe
// ============================================================================

#[test]
fn test_piped_shell_framed() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["shell", "--no-banner"])
        .write_stdin("sum 3 5\ngreet Ada\nexit\ngreet Bob\n")
        .assert()
        .success()
        .stdout("15:The result is 8\n11:Hello, Ada!\n");
}

#[test]
fn test_piped_shell_survives_invalid_utf8() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["shell", "--no-banner", "--no-framing"])
        .write_stdin(&b"greet \xff\n   \ngreet Ada\n"[..])
        .assert()
        .success()
        .stdout(predicate::str::contains("Function '' not found"))
        .stdout(predicate::str::ends_with("Hello, Ada!\n"));
}

#[test]
fn test_default_command_is_shell() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .write_stdin("greet Ada\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Welcome to the shell."))
        .stdout(predicate::str::ends_with("11:Hello, Ada!\n"));
}

#[test]
fn test_no_framing_flag() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .args(["shell", "--no-banner", "--no-framing"])
        .write_stdin("frobnicate\n")
        .assert()
        .success()
        .stdout(
            "Function 'frobnicate' not found. Type 'help' for the list of supported functions.\n",
        );
}

#[test]
fn test_framing_env_override() {
    let home = TempDir::new().unwrap();
    namecall_cmd(&home)
        .env("NAMECALL_FRAMING", "0")
        .args(["shell", "--no-banner"])
        .write_stdin("greet Ada\n")
        .assert()
        .success()
        .stdout("Hello, Ada!\n");
}

#[test]
fn test_project_settings_file() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("namecall.toml"),
        "[shell]\nframing = false\nbanner = false\n",
    )
    .unwrap();

    namecall_cmd(&home)
        .write_stdin("sum 1 2\n")
        .assert()
        .success()
        .stdout("The result is 3\n");
}

#[test]
fn test_invalid_settings_file_fails() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("namecall.toml"), "[shell]\nunknown = 1\n").unwrap();

    namecall_cmd(&home)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("namecall.toml"));
}

#[test]
fn test_handles_across_lines() {
    let home = TempDir::new().unwrap();
    let output = namecall_cmd(&home)
        .args(["shell", "--no-banner", "--no-framing"])
        .write_stdin("string_new abcdef\n")
        .output()
        .unwrap();
    let handle = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert!(!handle.is_empty());

    // A fresh process has its own handle table
    namecall_cmd(&home)
        .args(["call", "string_len", &handle])
        .assert()
        .failure();
}
