//! Target app termination
//!
//! Graceful first, then SIGTERM to the whole tree snapshot, then SIGKILL to
//! whatever is still alive once the wait bound expires.

use crate::config::{TERMINATE_POLL_INTERVAL, TERMINATE_WAIT};
use crate::core::locator::ProcessLocator;
use crate::core::models::{Pid, ProcessTreeSnapshot, TargetApp};
use crate::core::process_table::{tolerate, ProcessQueryError, ProcessTable};
use crate::platform::PlatformStrategy;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Anything able to take the target app down. `true` means a termination path
/// was taken, not that the app is confirmed dead.
pub trait TargetTerminator {
    fn terminate_target(&self) -> bool;
}

pub struct ProcessTerminator<'a, T: ProcessTable + ?Sized> {
    table: &'a T,
    platform: &'a dyn PlatformStrategy,
    app: &'a TargetApp,
    wait_bound: Duration,
    poll_interval: Duration,
}

impl<'a, T: ProcessTable + ?Sized> ProcessTerminator<'a, T> {
    pub fn new(table: &'a T, platform: &'a dyn PlatformStrategy, app: &'a TargetApp) -> Self {
        Self {
            table,
            platform,
            app,
            wait_bound: TERMINATE_WAIT,
            poll_interval: TERMINATE_POLL_INTERVAL,
        }
    }

    pub fn with_wait_bound(mut self, wait_bound: Duration) -> Self {
        self.wait_bound = wait_bound;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    fn terminate_tree(&self) -> Result<bool, ProcessQueryError> {
        let locator = ProcessLocator::new(self.table, self.platform, self.app);
        let process = match locator.find_main_process()? {
            Some(process) => process,
            None => match locator.find_target_process()? {
                Some(process) => process,
                None => {
                    debug!("no {} process found", self.app.display_name);
                    return Ok(false);
                }
            },
        };

        // the main process found by the parent walk is one of our ancestors
        let current = self.table.current_pid();
        if process.pid == current {
            debug!("matched process is ourselves, nothing to terminate");
            return Ok(false);
        }
        let children = self
            .table
            .descendants(process.pid)?
            .into_iter()
            .filter(|pid| *pid != current)
            .collect();
        let snapshot = ProcessTreeSnapshot::new(process.pid, children);

        for child in &snapshot.children {
            info!("Terminating child process {}...", child);
            tolerate(self.table.terminate(*child))?;
        }
        info!(
            "Terminating main {} process {}...",
            self.app.display_name, snapshot.root
        );
        tolerate(self.table.terminate(snapshot.root))?;

        let alive = self.wait_for_exit(&snapshot.all_pids());
        if !alive.is_empty() {
            warn!("Force killing remaining processes: {:?}...", alive);
            for pid in alive {
                tolerate(self.table.kill(pid))?;
            }
        }

        Ok(true)
    }

    /// Polls until every pid is gone or the bound expires; returns the survivors.
    ///
    /// The deadline is checked between individual liveness checks, since a
    /// single check can be slow.
    fn wait_for_exit(&self, pids: &[Pid]) -> Vec<Pid> {
        let deadline = Instant::now() + self.wait_bound;
        let mut alive: Vec<Pid> = pids.to_vec();

        loop {
            let mut survivors = Vec::with_capacity(alive.len());
            for (index, pid) in alive.iter().enumerate() {
                if Instant::now() >= deadline {
                    survivors.extend_from_slice(&alive[index..]);
                    return survivors;
                }
                if self.table.is_alive(*pid) {
                    survivors.push(*pid);
                }
            }
            alive = survivors;
            if alive.is_empty() {
                return alive;
            }
            let now = Instant::now();
            if now >= deadline {
                return alive;
            }
            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

impl<T: ProcessTable + ?Sized> TargetTerminator for ProcessTerminator<'_, T> {
    fn terminate_target(&self) -> bool {
        match self.platform.graceful_quit(self.app) {
            Some(Ok(())) => {
                info!(
                    "Asked {} to quit via {} native mechanism",
                    self.app.display_name,
                    self.platform.kind()
                );
                return true;
            }
            Some(Err(err)) => {
                warn!("Native quit for {} failed: {}", self.platform.kind(), err);
            }
            None => {}
        }

        match self.terminate_tree() {
            Ok(terminated) => terminated,
            Err(err) => {
                error!("Error killing {} process: {}", self.app.display_name, err);
                false
            }
        }
    }
}
