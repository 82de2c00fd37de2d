//! Top-level run flow
//!
//! parse → (detach) → make sure Claude listens on the debug port → inject →
//! serve MCP over stdio. Everything before the session is blocking; the tokio
//! runtime only exists inside [`StdioSession`].

use crate::commands::Cli;
use crate::core::process_table::SystemProcessTable;
use crate::core::terminator::ProcessTerminator;
use crate::daemon::{Detacher, Detachment, SystemDetacher};
use crate::desktop_config::DesktopConfig;
use crate::error::{errors, AutoApproveResult};
use crate::inject::{CommandInjector, ScriptInjector};
use crate::launcher::DebugPortLauncher;
use crate::mcp::AutoApproveMcpServer;
use crate::orchestrator::{LaunchOutcome, Orchestrator};
use crate::platform;
use crate::probe::TcpPortProbe;
use crate::utils::config_paths::{ConfigPaths, Settings};
use crate::utils::logger::init_logger;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// `--daemon`: a detached copy took over, this process did nothing else.
    Backgrounded,
    /// Claude never came up on the debug port; no server was started. Only the
    /// error log tells this apart from a normal exit.
    LaunchFailed(LaunchOutcome),
    /// The MCP session ran and its client disconnected.
    Served,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Backgrounded | RunOutcome::LaunchFailed(_) | RunOutcome::Served => 0,
        }
    }
}

/// Injection plus the MCP server, once the app is reachable.
pub trait SessionRunner {
    fn run_session(&self, port: u16) -> AutoApproveResult<()>;
}

pub struct StdioSession {
    config: Arc<DesktopConfig>,
    injector: Box<dyn ScriptInjector>,
}

impl StdioSession {
    pub fn new(config: Arc<DesktopConfig>, injector: Box<dyn ScriptInjector>) -> Self {
        Self { config, injector }
    }

    async fn run_async(&self, port: u16) -> AutoApproveResult<()> {
        if let Err(err) = self.injector.inject(port).await {
            warn!("{}; serving without injection", err.user_message());
        }

        AutoApproveMcpServer::new(Arc::clone(&self.config))
            .run()
            .await
            .map_err(|err| errors::server_error(err.to_string()))
    }
}

impl SessionRunner for StdioSession {
    fn run_session(&self, port: u16) -> AutoApproveResult<()> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| errors::server_error(format!("Failed to build tokio runtime: {err}")))?
            .block_on(self.run_async(port))
    }
}

pub struct App<'a> {
    detacher: &'a dyn Detacher,
    orchestrator: Orchestrator<'a>,
    session: &'a dyn SessionRunner,
}

impl<'a> App<'a> {
    pub fn new(
        detacher: &'a dyn Detacher,
        orchestrator: Orchestrator<'a>,
        session: &'a dyn SessionRunner,
    ) -> Self {
        Self {
            detacher,
            orchestrator,
            session,
        }
    }

    pub fn run(&self, cli: &Cli) -> AutoApproveResult<RunOutcome> {
        info!("Starting Claude Auto-Approve MCP on port {}...", cli.port);

        if cli.daemon {
            match self.detacher.detach()? {
                Detachment::Original => return Ok(RunOutcome::Backgrounded),
                Detachment::Daemon => {}
            }
        }

        let outcome = self.orchestrator.ensure_target_ready(cli.port);
        if !outcome.is_ready() {
            error!("Claude Desktop is not reachable on port {}, not starting the server", cli.port);
            return Ok(RunOutcome::LaunchFailed(outcome));
        }

        self.session.run_session(cli.port)?;
        Ok(RunOutcome::Served)
    }
}

/// Wires the real collaborators together and runs.
pub fn run(cli: Cli) -> anyhow::Result<RunOutcome> {
    let paths = ConfigPaths::new()?;
    let settings = paths.load_settings();
    let log_file = cli.daemon.then(|| paths.log_file.clone());
    let log_level = settings
        .as_ref()
        .ok()
        .and_then(|settings| settings.log_level.clone());
    init_logger(log_level.as_deref(), log_file)?;

    // logging is up only now, so a broken settings file is reported here
    let settings = settings.unwrap_or_else(|err| {
        warn!("Ignoring settings file: {}", err);
        Settings::default()
    });

    let desktop_path = match settings.desktop_config_path() {
        Some(path) => path,
        None => DesktopConfig::default_path()?,
    };
    let desktop_config = Arc::new(DesktopConfig::load(&desktop_path)?);

    let platform = platform::detect();
    let table = SystemProcessTable::new();
    let probe = TcpPortProbe;
    let app = &settings.app;

    let terminator = ProcessTerminator::new(&table, platform.as_ref(), app);
    let launcher = DebugPortLauncher::new(platform.as_ref(), app, &probe)
        .with_retry(settings.launch.attempts, settings.launch.interval());
    let orchestrator = Orchestrator::new(&probe, &terminator, &launcher);

    let injector = CommandInjector::new(settings.injector.program.clone())
        .with_args(settings.injector.args.clone())
        .with_timeout(settings.injector.timeout());
    let session = StdioSession::new(desktop_config, Box::new(injector));
    let detacher = SystemDetacher::new(platform.supports_fork());

    Ok(App::new(&detacher, orchestrator, &session).run(&cli)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::terminator::TargetTerminator;
    use crate::launcher::AppLauncher;
    use crate::probe::PortProbe;
    use std::cell::Cell;

    struct FixedProbe(bool);

    impl PortProbe for FixedProbe {
        fn is_port_open(&self, _port: u16) -> bool {
            self.0
        }
    }

    struct NothingToTerminate;

    impl TargetTerminator for NothingToTerminate {
        fn terminate_target(&self) -> bool {
            false
        }
    }

    struct TimingOutLauncher;

    impl AppLauncher for TimingOutLauncher {
        fn launch(&self, _port: u16) -> AutoApproveResult<()> {
            Err(errors::timeout_error("never came up", 10))
        }
    }

    struct ScriptedDetacher(Detachment);

    impl Detacher for ScriptedDetacher {
        fn detach(&self) -> AutoApproveResult<Detachment> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct CountingSession {
        runs: Cell<u32>,
    }

    impl SessionRunner for CountingSession {
        fn run_session(&self, _port: u16) -> AutoApproveResult<()> {
            self.runs.set(self.runs.get() + 1);
            Ok(())
        }
    }

    fn cli(daemon: bool) -> Cli {
        Cli {
            port: 19222,
            daemon,
        }
    }

    #[test]
    fn daemon_original_returns_without_serving() {
        let session = CountingSession::default();
        let probe = FixedProbe(true);
        let orchestrator = Orchestrator::new(&probe, &NothingToTerminate, &TimingOutLauncher);
        let detacher = ScriptedDetacher(Detachment::Original);

        let outcome = App::new(&detacher, orchestrator, &session)
            .run(&cli(true))
            .expect("run");
        assert_eq!(outcome, RunOutcome::Backgrounded);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(session.runs.get(), 0);
    }

    #[test]
    fn daemon_side_serves() {
        let session = CountingSession::default();
        let probe = FixedProbe(true);
        let orchestrator = Orchestrator::new(&probe, &NothingToTerminate, &TimingOutLauncher);
        let detacher = ScriptedDetacher(Detachment::Daemon);

        let outcome = App::new(&detacher, orchestrator, &session)
            .run(&cli(true))
            .expect("run");
        assert_eq!(outcome, RunOutcome::Served);
        assert_eq!(session.runs.get(), 1);
    }

    #[test]
    fn launch_failure_skips_server_and_still_exits_zero() {
        let session = CountingSession::default();
        let probe = FixedProbe(false);
        let orchestrator = Orchestrator::new(&probe, &NothingToTerminate, &TimingOutLauncher);
        let detacher = ScriptedDetacher(Detachment::Daemon);

        let outcome = App::new(&detacher, orchestrator, &session)
            .run(&cli(false))
            .expect("run");
        assert_eq!(outcome, RunOutcome::LaunchFailed(LaunchOutcome::TimedOut));
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(session.runs.get(), 0);
    }
}
