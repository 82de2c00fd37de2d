//! Decides whether the target app has to be (re)started before serving

use crate::core::terminator::TargetTerminator;
use crate::launcher::AppLauncher;
use crate::probe::PortProbe;
use tracing::{error, info, warn};

/// What `ensure_target_ready` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Debug port was already reachable; nothing was touched.
    AlreadyRunning,
    /// App was restarted and its debug port came up.
    Launched,
    TimedOut,
    Failed(String),
}

impl LaunchOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, LaunchOutcome::AlreadyRunning | LaunchOutcome::Launched)
    }
}

pub struct Orchestrator<'a> {
    probe: &'a dyn PortProbe,
    terminator: &'a dyn TargetTerminator,
    launcher: &'a dyn AppLauncher,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        probe: &'a dyn PortProbe,
        terminator: &'a dyn TargetTerminator,
        launcher: &'a dyn AppLauncher,
    ) -> Self {
        Self {
            probe,
            terminator,
            launcher,
        }
    }

    pub fn ensure_target_ready(&self, port: u16) -> LaunchOutcome {
        if self.probe.is_port_open(port) {
            info!("Debug port {} already open, skipping restart", port);
            return LaunchOutcome::AlreadyRunning;
        }

        info!("Debug port {} closed, restarting target app", port);
        if self.terminator.terminate_target() {
            info!("Existing app instance terminated");
        } else {
            info!("No running app instance was terminated");
        }

        match self.launcher.launch(port) {
            Ok(()) => LaunchOutcome::Launched,
            Err(err) if err.is_timeout() => {
                error!("Timed out waiting for debug port {}: {}", port, err);
                LaunchOutcome::TimedOut
            }
            Err(err) => {
                warn!("Failed to launch target app: {}", err);
                LaunchOutcome::Failed(err.to_string())
            }
        }
    }
}
