//! Data models shared by the locator, terminator and launcher
//!
//! Process handles are snapshots of OS state. The OS owns the process and may
//! reap it at any moment, so nothing here is expected to stay valid.

use crate::config::{
    APP_BARE_NAMES, APP_BUNDLE_NAME, APP_DISPLAY_NAME, APP_EXE_NAME, MACOS_MAIN_BINARY,
    POSIX_LAUNCHER, POSIX_MAIN_BINARY, WINDOWS_INSTALL_DIR, WINDOWS_MAIN_BINARY,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type Pid = u32;

/// Identity of the desktop application being automated.
///
/// Every field has a Claude Desktop default; `settings.json` may override any
/// of them under the `app` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetApp {
    /// Process name on macOS and the substring matched on other POSIX systems.
    pub display_name: String,
    /// macOS bundle directory name (`Claude.app`).
    pub bundle_name: String,
    /// Windows executable name (`Claude.exe`).
    pub exe_name: String,
    /// Lower-case process names accepted by the parent-chain fallback.
    pub bare_names: Vec<String>,
    pub macos_main_binary: String,
    pub windows_main_binary: String,
    pub posix_main_binary: String,
    /// Install directory under `%LOCALAPPDATA%` on Windows.
    pub windows_install_dir: String,
    /// Launcher program looked up on `PATH` on POSIX systems other than macOS.
    pub posix_launcher: String,
}

impl Default for TargetApp {
    fn default() -> Self {
        Self {
            display_name: APP_DISPLAY_NAME.to_string(),
            bundle_name: APP_BUNDLE_NAME.to_string(),
            exe_name: APP_EXE_NAME.to_string(),
            bare_names: APP_BARE_NAMES.iter().map(|name| name.to_string()).collect(),
            macos_main_binary: MACOS_MAIN_BINARY.to_string(),
            windows_main_binary: WINDOWS_MAIN_BINARY.to_string(),
            posix_main_binary: POSIX_MAIN_BINARY.to_string(),
            windows_install_dir: WINDOWS_INSTALL_DIR.to_string(),
            posix_launcher: POSIX_LAUNCHER.to_string(),
        }
    }
}

impl TargetApp {
    /// Case-insensitive match against the bare app names.
    pub fn is_bare_name(&self, process_name: &str) -> bool {
        let lowered = process_name.to_lowercase();
        self.bare_names.iter().any(|name| name.to_lowercase() == lowered)
    }
}

/// Cached view of one OS process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: Pid,
    pub name: Option<String>,
    pub cmdline: Vec<String>,
    pub executable_path: Option<PathBuf>,
    pub parent: Option<Pid>,
}

impl ProcessHandle {
    pub fn new(pid: Pid) -> Self {
        Self {
            pid,
            name: None,
            cmdline: Vec::new(),
            executable_path: None,
            parent: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cmdline(mut self, cmdline: Vec<String>) -> Self {
        self.cmdline = cmdline;
        self
    }

    pub fn with_executable_path(mut self, path: Option<PathBuf>) -> Self {
        self.executable_path = path;
        self
    }

    pub fn with_parent(mut self, parent: Option<Pid>) -> Self {
        self.parent = parent;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unknown>")
    }
}

/// A root process and the descendants it had when the snapshot was taken.
///
/// Children spawned after enumeration are not tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessTreeSnapshot {
    pub root: Pid,
    pub children: Vec<Pid>,
}

impl ProcessTreeSnapshot {
    pub fn new(root: Pid, children: Vec<Pid>) -> Self {
        Self { root, children }
    }

    /// Root first, then children in enumeration order.
    pub fn all_pids(&self) -> Vec<Pid> {
        let mut pids = Vec::with_capacity(self.children.len() + 1);
        pids.push(self.root);
        pids.extend(self.children.iter().copied());
        pids
    }
}
