//! CLI command execution helpers
//!
//! Wraps the `snapsweep` binary with an isolated environment: the
//! variables the CLI reads are cleared and the config directory points
//! at a temp dir, so the host's settings never leak into a test.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Environment variables the CLI reads
const CLEARED_ENV: &[&str] = &[
    "LONGHORN_URL",
    "DELETE_AGE_DAYS",
    "DELETE_AGE_DAY",
    "DELETE_STRINGS",
    "MISSING_TIMESTAMP",
    "LOG_LEVEL",
    "log_level",
    "SNAPSWEEP_CONFIG",
    "RUST_LOG",
];

/// CLI command builder
pub struct SweepCommand {
    binary_path: PathBuf,
    config_home: TempDir,
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl SweepCommand {
    pub fn new() -> Self {
        Self {
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_snapsweep")),
            config_home: tempfile::tempdir().expect("failed to create config dir"),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set environment variable
    pub fn env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Execute command and capture its output
    pub fn execute(&self) -> Result<CommandResult> {
        let mut command = Command::new(&self.binary_path);
        for key in CLEARED_ENV {
            command.env_remove(key);
        }
        command
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("HOME", self.config_home.path())
            .args(&self.args)
            .envs(&self.env);

        let output = command.output().context("Failed to execute command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Check if command succeeded
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains text
    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    /// Check if stderr contains text
    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}
