//! Common utilities for toolchat CLI integration tests

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Environment variables that would leak the developer's setup into a test run
const ISOLATED_VARS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "RUST_LOG",
    "TOOLCHAT_DEFAULT_MODEL",
    "TOOLCHAT_MAX_ROUNDS",
    "TOOLCHAT_LOG_TO_FILE",
];

/// Test configuration for integration tests
pub struct TestConfig {
    pub temp_dir: TempDir,
    pub toolchat_binary: PathBuf,
}

impl TestConfig {
    /// Create a new test configuration with a temporary HOME directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        Self {
            temp_dir,
            toolchat_binary: PathBuf::from(env!("CARGO_BIN_EXE_toolchat")),
        }
    }

    pub fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Command with a clean environment and HOME pointed at the temp dir
    pub fn toolchat_command(&self) -> Command {
        let mut command = Command::new(&self.toolchat_binary);
        for var in ISOLATED_VARS {
            command.env_remove(var);
        }
        command.env("HOME", self.home());
        // Keep any accidental web search off the network.
        command.args(["--search-endpoint", "http://127.0.0.1:1/"]);
        command
    }

    /// Run with the given stdin and extra environment
    pub fn run_with_stdin(&self, args: &[&str], envs: &[(&str, &str)], stdin: &str) -> Output {
        let mut command = self.toolchat_command();
        command
            .args(args)
            .envs(envs.iter().copied())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().expect("Failed to spawn toolchat");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes())
            .expect("Failed to write stdin");
        child.wait_with_output().expect("Failed to wait for toolchat")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::new();
        assert!(config.home().exists());
        assert!(config.toolchat_binary.file_name().is_some());
    }
}
