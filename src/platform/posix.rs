use super::{cmdline_mentions, debug_port_arg, PlatformKind, PlatformStrategy};
use crate::core::models::TargetApp;
use crate::error::{errors, AutoApproveResult};
use std::process::Command;

/// Linux and other POSIX systems: no native quit event, so termination goes
/// straight to signals.
pub struct PosixPlatform;

impl PlatformStrategy for PosixPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Posix
    }

    fn matches_target(&self, app: &TargetApp, name: &str, cmdline: &[String]) -> bool {
        name.contains(&app.display_name) || cmdline_mentions(cmdline, &app.display_name)
    }

    fn main_binary_fragment<'a>(&self, app: &'a TargetApp) -> &'a str {
        &app.posix_main_binary
    }

    fn graceful_quit_command(&self, _app: &TargetApp) -> Option<Command> {
        None
    }

    fn launch_command(&self, app: &TargetApp, port: u16) -> AutoApproveResult<Command> {
        let launcher = which::which(&app.posix_launcher).map_err(|err| {
            errors::process_error_with_source(
                "launch",
                format!("'{}' not found in PATH", app.posix_launcher),
                err,
            )
        })?;

        let mut command = Command::new(launcher);
        command.arg(debug_port_arg(port));
        Ok(command)
    }

    fn supports_fork(&self) -> bool {
        true
    }
}
