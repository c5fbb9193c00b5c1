#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway home directory, config dir, and fake icon tool.
pub struct Sandbox {
    pub temp: TempDir,
    pub home: PathBuf,
    pub config_dir: PathBuf,
    pub tool: PathBuf,
    pub tool_log: PathBuf,
}

impl Sandbox {
    pub fn new(user: &str) -> Self {
        let temp = tempfile::Builder::new()
            .prefix("foldicon-cli")
            .tempdir()
            .expect("tempdir");
        let home = temp.path().join("home").join(user);
        fs::create_dir_all(&home).expect("home");
        let config_dir = temp.path().join("config");
        let tool_log = temp.path().join("fileicon.log");
        let tool = temp.path().join("fake-fileicon");
        write_script(&tool, &format!("echo \"$@\" >> '{}'", tool_log.display()));
        Self {
            temp,
            home,
            config_dir,
            tool,
            tool_log,
        }
    }

    pub fn cmd(&self) -> Command {
        self.command(&self.home, &self.config_dir)
    }

    /// A command run by another account on the same machine, with its own
    /// home and config.
    pub fn cmd_as(&self, user: &str) -> Command {
        let home = self.user_home(user);
        let config_dir = self.temp.path().join(format!("config-{user}"));
        self.command(&home, &config_dir)
    }

    pub fn user_home(&self, user: &str) -> PathBuf {
        let home = self.temp.path().join("home").join(user);
        fs::create_dir_all(&home).expect("home");
        home
    }

    fn command(&self, home: &Path, config_dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("foldicon");
        cmd.env("HOME", home)
            .env("FOLDICON_CONFIG_DIR", config_dir)
            .env("FOLDICON_ICON_TOOL", &self.tool)
            .env("FOLDICON_FALLBACK_ICON", "")
            .env("NO_COLOR", "1")
            .env_remove("FOLDICON_WORKSPACE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Runs `foldicon --json <args>` and parses the envelope.
    pub fn json(&self, args: &[&str]) -> (i32, Value) {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run foldicon");
        let payload: Value = serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
            panic!(
                "invalid JSON ({err}): {}\nstderr: {}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            )
        });
        (output.status.code().unwrap_or(-1), payload)
    }

    pub fn folder(&self, name: &str) -> PathBuf {
        let path = self.home.join(name);
        fs::create_dir_all(&path).expect("folder");
        path
    }

    pub fn icon(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.temp.path().join(name);
        fs::write(&path, bytes).expect("icon");
        path
    }

    pub fn default_workspace(&self) -> PathBuf {
        self.home.join("Documents/themes/folder-icons")
    }

    pub fn tool_calls(&self) -> Vec<String> {
        fs::read_to_string(&self.tool_log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn break_tool(&self) {
        write_script(&self.tool, "echo 'cannot set icon' >&2; exit 3");
    }
}

pub fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).expect("chmod");
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}
