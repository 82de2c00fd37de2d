use super::{cmdline_mentions, debug_port_arg, PlatformKind, PlatformStrategy};
use crate::config::MACOS_LAUNCHER;
use crate::core::models::TargetApp;
use crate::error::AutoApproveResult;
use std::process::Command;

/// macOS: the app is a bundle, quit goes through an AppleScript event and
/// launching goes through `open` so LaunchServices starts the right binary.
pub struct MacOsPlatform;

impl PlatformStrategy for MacOsPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::MacOs
    }

    fn matches_target(&self, app: &TargetApp, name: &str, cmdline: &[String]) -> bool {
        name == app.display_name || cmdline_mentions(cmdline, &app.bundle_name)
    }

    fn main_binary_fragment<'a>(&self, app: &'a TargetApp) -> &'a str {
        &app.macos_main_binary
    }

    fn graceful_quit_command(&self, app: &TargetApp) -> Option<Command> {
        let mut command = Command::new("osascript");
        command
            .arg("-e")
            .arg(format!("tell application \"{}\" to quit", app.display_name));
        Some(command)
    }

    fn launch_command(&self, app: &TargetApp, port: u16) -> AutoApproveResult<Command> {
        let mut command = Command::new(MACOS_LAUNCHER);
        command
            .arg("-a")
            .arg(&app.display_name)
            .arg("--args")
            .arg(debug_port_arg(port));
        Ok(command)
    }

    fn supports_fork(&self) -> bool {
        true
    }
}
