//! Starting the target app with its debug port enabled

use crate::config::{LAUNCH_ATTEMPTS_DEFAULT, LAUNCH_INTERVAL_DEFAULT};
use crate::core::models::TargetApp;
use crate::error::{errors, AutoApproveResult};
use crate::platform::PlatformStrategy;
use crate::probe::PortProbe;
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Starts the app and returns once its debug port answers. Timeouts are
/// reported as [`crate::error::AutoApproveError::Timeout`].
pub trait AppLauncher {
    fn launch(&self, port: u16) -> AutoApproveResult<()>;
}

pub struct DebugPortLauncher<'a> {
    platform: &'a dyn PlatformStrategy,
    app: &'a TargetApp,
    probe: &'a dyn PortProbe,
    attempts: u32,
    interval: Duration,
}

impl<'a> DebugPortLauncher<'a> {
    pub fn new(
        platform: &'a dyn PlatformStrategy,
        app: &'a TargetApp,
        probe: &'a dyn PortProbe,
    ) -> Self {
        Self {
            platform,
            app,
            probe,
            attempts: LAUNCH_ATTEMPTS_DEFAULT,
            interval: LAUNCH_INTERVAL_DEFAULT,
        }
    }

    pub fn with_retry(mut self, attempts: u32, interval: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.interval = interval;
        self
    }

    fn spawn(&self, port: u16) -> AutoApproveResult<()> {
        let mut command = self.platform.launch_command(self.app, port)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // keep the app out of our process group so it survives us
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let program = command.get_program().to_string_lossy().into_owned();
        let mut child = command.spawn().map_err(|err| {
            errors::process_error_with_source(
                "launch",
                format!("failed to start {}", program),
                err,
            )
        })?;
        debug!("started {} pid={}", program, child.id());
        // reap the launcher when it exits so it does not linger as a zombie
        thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    fn wait_for_port(&self, port: u16) -> AutoApproveResult<()> {
        for attempt in 1..=self.attempts {
            if self.probe.is_port_open(port) {
                info!("{} debug port {} is live", self.app.display_name, port);
                return Ok(());
            }
            debug!(
                "port {} not open yet (attempt {}/{})",
                port, attempt, self.attempts
            );
            if attempt < self.attempts {
                thread::sleep(self.interval);
            }
        }

        let waited = self.interval.saturating_mul(self.attempts.saturating_sub(1));
        Err(errors::timeout_error(
            format!(
                "Failed to connect to port {} after {} attempts",
                port, self.attempts
            ),
            waited.as_millis() as u64,
        ))
    }
}

impl AppLauncher for DebugPortLauncher<'_> {
    fn launch(&self, port: u16) -> AutoApproveResult<()> {
        self.spawn(port)?;
        self.wait_for_port(port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::platform::PlatformKind;
    use std::cell::Cell;
    use std::process::Command;

    struct CountingProbe {
        opens_after: u32,
        calls: Cell<u32>,
    }

    impl PortProbe for CountingProbe {
        fn is_port_open(&self, _port: u16) -> bool {
            let calls = self.calls.get() + 1;
            self.calls.set(calls);
            calls > self.opens_after
        }
    }

    /// Launches a harmless program instead of the real app.
    struct StubPlatform {
        program: &'static str,
    }

    impl PlatformStrategy for StubPlatform {
        fn kind(&self) -> PlatformKind {
            PlatformKind::Posix
        }

        fn matches_target(&self, _app: &TargetApp, _name: &str, _cmdline: &[String]) -> bool {
            false
        }

        fn main_binary_fragment<'a>(&self, app: &'a TargetApp) -> &'a str {
            &app.posix_main_binary
        }

        fn graceful_quit_command(&self, _app: &TargetApp) -> Option<Command> {
            None
        }

        fn launch_command(&self, _app: &TargetApp, _port: u16) -> AutoApproveResult<Command> {
            Ok(Command::new(self.program))
        }

        fn supports_fork(&self) -> bool {
            true
        }
    }

    #[cfg(unix)]
    #[test]
    fn succeeds_once_port_opens() {
        let platform = StubPlatform { program: "true" };
        let app = TargetApp::default();
        let probe = CountingProbe {
            opens_after: 2,
            calls: Cell::new(0),
        };

        let launcher = DebugPortLauncher::new(&platform, &app, &probe)
            .with_retry(5, Duration::from_millis(1));
        launcher.launch(19222).expect("port opens on third probe");
        assert_eq!(probe.calls.get(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn reports_timeout_when_port_never_opens() {
        let platform = StubPlatform { program: "true" };
        let app = TargetApp::default();
        let probe = CountingProbe {
            opens_after: u32::MAX,
            calls: Cell::new(0),
        };

        let err = DebugPortLauncher::new(&platform, &app, &probe)
            .with_retry(3, Duration::from_millis(1))
            .launch(19222)
            .expect_err("port never opens");
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert_eq!(probe.calls.get(), 3);
    }

    #[test]
    fn spawn_failure_is_not_a_timeout() {
        let platform = StubPlatform {
            program: "/nonexistent/claude-desktop-binary",
        };
        let app = TargetApp::default();
        let probe = CountingProbe {
            opens_after: 0,
            calls: Cell::new(0),
        };

        let err = DebugPortLauncher::new(&platform, &app, &probe)
            .launch(19222)
            .expect_err("spawn should fail");
        assert_eq!(err.category(), ErrorCategory::Process);
        assert_eq!(probe.calls.get(), 0);
    }
}
