use super::{cmdline_mentions, debug_port_arg, PlatformKind, PlatformStrategy};
use crate::core::models::TargetApp;
use crate::error::{errors, AutoApproveResult};
use std::process::Command;

/// Windows: no fork, `taskkill` takes the whole tree down, the app lives in
/// the per-user install directory.
pub struct WindowsPlatform;

impl PlatformStrategy for WindowsPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Windows
    }

    fn matches_target(&self, app: &TargetApp, name: &str, cmdline: &[String]) -> bool {
        name.contains(&app.exe_name) || cmdline_mentions(cmdline, &app.exe_name)
    }

    fn main_binary_fragment<'a>(&self, app: &'a TargetApp) -> &'a str {
        &app.windows_main_binary
    }

    fn graceful_quit_command(&self, app: &TargetApp) -> Option<Command> {
        let mut command = Command::new("taskkill");
        command.args(["/IM", app.exe_name.as_str(), "/T", "/F"]);
        Some(command)
    }

    fn launch_command(&self, app: &TargetApp, port: u16) -> AutoApproveResult<Command> {
        let install_dir = dirs::data_local_dir()
            .ok_or_else(|| errors::config_error("Cannot find local application data directory"))?
            .join(&app.windows_install_dir);
        let executable = install_dir.join(app.exe_name.to_lowercase());
        if !executable.exists() {
            return Err(errors::process_error(
                "launch",
                format!("{} not found", executable.display()),
            ));
        }

        let mut command = Command::new(executable);
        command.arg(debug_port_arg(port));
        Ok(command)
    }

    fn supports_fork(&self) -> bool {
        false
    }
}
