//! Platform strategies
//!
//! Everything that differs between macOS, Windows and the other POSIX systems
//! lives behind [`PlatformStrategy`]: how the target app is recognised, how it
//! is asked to quit, how it is launched, and whether `fork` is available. The
//! strategy is picked once at startup by [`detect`].

mod macos;
mod posix;
#[cfg(unix)]
pub mod unix;
mod win32;

pub use macos::MacOsPlatform;
pub use posix::PosixPlatform;
pub use win32::WindowsPlatform;

use crate::core::models::TargetApp;
use crate::error::AutoApproveResult;
use std::fmt;
use std::io;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformKind {
    MacOs,
    Windows,
    Posix,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::MacOs => f.write_str("macos"),
            PlatformKind::Windows => f.write_str("windows"),
            PlatformKind::Posix => f.write_str("posix"),
        }
    }
}

pub trait PlatformStrategy: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Whether a process with this name and command line is the target app.
    fn matches_target(&self, app: &TargetApp, name: &str, cmdline: &[String]) -> bool;

    /// Path fragment that only the real application binary carries.
    fn main_binary_fragment<'a>(&self, app: &'a TargetApp) -> &'a str;

    /// OS-native quit command, if this platform has one.
    fn graceful_quit_command(&self, app: &TargetApp) -> Option<Command>;

    /// Runs the native quit command. `None` when the platform has none,
    /// `Some(Err(_))` when the command could not be started. The exit status
    /// of the command is not inspected.
    fn graceful_quit(&self, app: &TargetApp) -> Option<io::Result<()>> {
        let mut command = self.graceful_quit_command(app)?;
        Some(
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|_| ()),
        )
    }

    /// Command that starts the app with its remote debugging port enabled.
    fn launch_command(&self, app: &TargetApp, port: u16) -> AutoApproveResult<Command>;

    fn supports_fork(&self) -> bool;
}

/// Strategy for the platform this binary was compiled for.
pub fn detect() -> Box<dyn PlatformStrategy> {
    if cfg!(target_os = "macos") {
        Box::new(MacOsPlatform)
    } else if cfg!(windows) {
        Box::new(WindowsPlatform)
    } else {
        Box::new(PosixPlatform)
    }
}

pub(crate) fn cmdline_mentions(cmdline: &[String], needle: &str) -> bool {
    cmdline.iter().any(|arg| arg.contains(needle))
}

pub(crate) fn debug_port_arg(port: u16) -> String {
    format!("{}={}", crate::config::DEBUG_PORT_FLAG, port)
}
