//! Shared fixture for CLI integration tests.
#![cfg(test)]
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A throwaway config file whose logs land inside the temp dir
pub struct TestFixture {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        let log_dir = temp_dir.path().join("logs");
        fs::write(
            &config_path,
            format!("log_dir = {:?}\nlog_level = \"debug\"\n", log_dir.display().to_string()),
        )
        .expect("Failed to write config");

        Self {
            temp_dir,
            config_path,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn log_file(&self) -> PathBuf {
        self.temp_dir.path().join("logs").join("brutus.log")
    }

    #[allow(deprecated)]
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("brutus").expect("Failed to find binary");
        cmd.env("BRUTUS_CONFIG", &self.config_path);
        cmd.env_remove("RUST_LOG");
        cmd
    }
}
