//! Target process discovery
//!
//! Two searches are offered:
//! - a flat scan of the process table using the platform predicate
//! - a walk up the parent chain of the current process, used when this server
//!   was itself started by the target app and the real app binary has to be
//!   told apart from its helper and renderer processes

use crate::config::MAX_ANCESTRY_DEPTH;
use crate::core::models::{Pid, ProcessHandle, TargetApp};
use crate::core::process_table::{tolerate, ProcessQueryError, ProcessTable};
use crate::platform::PlatformStrategy;
use std::collections::HashSet;
use tracing::debug;

pub struct ProcessLocator<'a, T: ProcessTable + ?Sized> {
    table: &'a T,
    platform: &'a dyn PlatformStrategy,
    app: &'a TargetApp,
}

impl<'a, T: ProcessTable + ?Sized> ProcessLocator<'a, T> {
    pub fn new(table: &'a T, platform: &'a dyn PlatformStrategy, app: &'a TargetApp) -> Self {
        Self {
            table,
            platform,
            app,
        }
    }

    /// First process in OS order that the platform predicate accepts.
    ///
    /// Candidates that vanish, are hidden, or are zombies are skipped.
    pub fn find_target_process(&self) -> Result<Option<ProcessHandle>, ProcessQueryError> {
        let current = self.table.current_pid();
        for pid in self.table.pids()? {
            // our own command line may mention the app when it spawned us
            if pid == current {
                continue;
            }
            let Some(handle) = tolerate(self.table.handle(pid))? else {
                continue;
            };
            if self
                .platform
                .matches_target(self.app, handle.display_name(), &handle.cmdline)
            {
                debug!(
                    "matched target process pid={} name={}",
                    handle.pid,
                    handle.display_name()
                );
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }

    /// Nearest ancestor running the real application binary, else the topmost
    /// ancestor carrying the bare app name.
    pub fn find_main_process(&self) -> Result<Option<ProcessHandle>, ProcessQueryError> {
        let fragment = self.platform.main_binary_fragment(self.app);
        let chain = self.ancestry()?;

        for pid in &chain {
            let exe = tolerate(self.table.exe(*pid))?
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_default();
            if exe.contains(fragment) {
                debug!("main process pid={} runs {}", pid, exe);
                return self.capture(*pid);
            }
        }

        let mut candidate = None;
        for pid in &chain {
            if let Some(name) = tolerate(self.table.name(*pid))? {
                if self.app.is_bare_name(&name) {
                    candidate = Some(*pid);
                }
            }
        }

        match candidate {
            Some(pid) => {
                debug!("falling back to topmost ancestor named like the app, pid={}", pid);
                self.capture(pid)
            }
            None => Ok(None),
        }
    }

    /// Current process followed by its ancestors, nearest first.
    ///
    /// Stops at the root, at a missing parent, at a self-parent, on a pid seen
    /// before, or after a fixed depth.
    fn ancestry(&self) -> Result<Vec<Pid>, ProcessQueryError> {
        let mut current = self.table.current_pid();
        let mut chain = vec![current];
        let mut seen = HashSet::from([current]);

        for _ in 0..MAX_ANCESTRY_DEPTH {
            let parent = match tolerate(self.table.parent(current))? {
                Some(Some(parent)) => parent,
                _ => break,
            };
            if parent == 0 || !seen.insert(parent) {
                // We've reached the root or found a loop
                break;
            }
            chain.push(parent);
            current = parent;
        }

        Ok(chain)
    }

    fn capture(&self, pid: Pid) -> Result<Option<ProcessHandle>, ProcessQueryError> {
        match tolerate(self.table.handle(pid))? {
            Some(handle) => Ok(Some(handle)),
            // Name unreadable but the process was matched; keep the bare pid
            None if self.table.is_alive(pid) => Ok(Some(ProcessHandle::new(pid))),
            None => Ok(None),
        }
    }
}
