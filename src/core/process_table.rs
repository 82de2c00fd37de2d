//! Access to the OS process table
//!
//! Platform strategy:
//! - Linux/macOS: psutil for process attributes, nix for signals
//! - Windows: sysinfo snapshot for attributes and termination
//!
//! Every read can fail because the process exited, belongs to another user,
//! or is a zombie. [`tolerate`] is the single place where those three
//! conditions are turned into "skip this candidate".

use crate::core::models::{Pid, ProcessHandle};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use thiserror::Error;
use tracing::trace;

#[cfg(unix)]
use crate::platform::unix;
#[cfg(windows)]
use parking_lot::Mutex;
#[cfg(windows)]
use sysinfo::{ProcessesToUpdate, System};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessQueryError {
    #[error("Process not found: {0}")]
    NoSuchProcess(Pid),
    #[error("Permission denied accessing process: {0}")]
    AccessDenied(Pid),
    #[error("Process {0} is a zombie")]
    Zombie(Pid),
    #[error("Failed to query process {pid}: {message}")]
    Other { pid: Pid, message: String },
}

impl ProcessQueryError {
    /// The three conditions that only mean "this candidate is gone or hidden".
    pub fn is_tolerated(&self) -> bool {
        matches!(
            self,
            ProcessQueryError::NoSuchProcess(_)
                | ProcessQueryError::AccessDenied(_)
                | ProcessQueryError::Zombie(_)
        )
    }
}

#[cfg(unix)]
impl From<psutil::process::ProcessError> for ProcessQueryError {
    fn from(err: psutil::process::ProcessError) -> Self {
        use psutil::process::ProcessError;
        match err {
            ProcessError::NoSuchProcess { pid } => ProcessQueryError::NoSuchProcess(pid),
            ProcessError::AccessDenied { pid } => ProcessQueryError::AccessDenied(pid),
            ProcessError::ZombieProcess { pid } => ProcessQueryError::Zombie(pid),
            ProcessError::PsutilError { pid, source } => ProcessQueryError::Other {
                pid,
                message: source.to_string(),
            },
        }
    }
}

/// Converts the tolerated failure kinds into `Ok(None)`; anything else is
/// returned to the caller.
pub fn tolerate<T>(result: Result<T, ProcessQueryError>) -> Result<Option<T>, ProcessQueryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_tolerated() => {
            trace!("skipping process: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Read and signal access to OS processes.
pub trait ProcessTable {
    /// Every pid visible right now, in OS order.
    fn pids(&self) -> Result<Vec<Pid>, ProcessQueryError>;

    fn current_pid(&self) -> Pid;

    fn name(&self, pid: Pid) -> Result<String, ProcessQueryError>;

    fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessQueryError>;

    fn exe(&self, pid: Pid) -> Result<PathBuf, ProcessQueryError>;

    fn parent(&self, pid: Pid) -> Result<Option<Pid>, ProcessQueryError>;

    fn is_alive(&self, pid: Pid) -> bool;

    /// Polite termination request (SIGTERM or equivalent).
    fn terminate(&self, pid: Pid) -> Result<(), ProcessQueryError>;

    /// Unconditional kill (SIGKILL or equivalent).
    fn kill(&self, pid: Pid) -> Result<(), ProcessQueryError>;

    /// Builds a handle with whatever attributes are readable. Only fails when
    /// the process itself cannot be found or a read fails in an unexpected way.
    fn handle(&self, pid: Pid) -> Result<ProcessHandle, ProcessQueryError> {
        let name = self.name(pid)?;
        let cmdline = tolerate(self.cmdline(pid))?.unwrap_or_default();
        let exe = tolerate(self.exe(pid))?;
        let parent = tolerate(self.parent(pid))?.flatten();
        Ok(ProcessHandle::new(pid)
            .with_name(name)
            .with_cmdline(cmdline)
            .with_executable_path(exe)
            .with_parent(parent))
    }

    /// Recursive descendants of `root`, breadth first. A one-time snapshot.
    fn descendants(&self, root: Pid) -> Result<Vec<Pid>, ProcessQueryError> {
        let mut by_parent: HashMap<Pid, Vec<Pid>> = HashMap::new();
        for pid in self.pids()? {
            if let Some(Some(parent)) = tolerate(self.parent(pid))? {
                if parent != pid {
                    by_parent.entry(parent).or_default().push(pid);
                }
            }
        }

        let mut seen = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        let mut children = Vec::new();
        while let Some(pid) = queue.pop_front() {
            for child in by_parent.get(&pid).into_iter().flatten() {
                if seen.insert(*child) {
                    children.push(*child);
                    queue.push_back(*child);
                }
            }
        }
        Ok(children)
    }
}

/// The live OS process table.
#[derive(Default)]
pub struct SystemProcessTable {
    #[cfg(windows)]
    system: Mutex<Option<System>>,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(unix)]
impl SystemProcessTable {
    fn open(pid: Pid) -> Result<psutil::process::Process, ProcessQueryError> {
        Ok(psutil::process::Process::new(pid)?)
    }
}

#[cfg(unix)]
impl ProcessTable for SystemProcessTable {
    fn pids(&self) -> Result<Vec<Pid>, ProcessQueryError> {
        psutil::process::pids().map_err(|err| ProcessQueryError::Other {
            pid: 0,
            message: err.to_string(),
        })
    }

    fn current_pid(&self) -> Pid {
        std::process::id()
    }

    fn name(&self, pid: Pid) -> Result<String, ProcessQueryError> {
        Ok(Self::open(pid)?.name()?)
    }

    fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessQueryError> {
        Ok(Self::open(pid)?.cmdline_vec()?.unwrap_or_default())
    }

    fn exe(&self, pid: Pid) -> Result<PathBuf, ProcessQueryError> {
        Ok(Self::open(pid)?.exe()?)
    }

    fn parent(&self, pid: Pid) -> Result<Option<Pid>, ProcessQueryError> {
        Ok(Self::open(pid)?.ppid()?)
    }

    fn is_alive(&self, pid: Pid) -> bool {
        if !unix::process_alive(pid) {
            return false;
        }
        // kill(pid, 0) succeeds on zombies, which have already exited
        match Self::open(pid).and_then(|process| Ok(process.status()?)) {
            Ok(status) => !matches!(status, psutil::process::Status::Zombie),
            Err(ProcessQueryError::NoSuchProcess(_)) | Err(ProcessQueryError::Zombie(_)) => false,
            Err(_) => true,
        }
    }

    fn terminate(&self, pid: Pid) -> Result<(), ProcessQueryError> {
        unix::send_signal(pid, nix::sys::signal::Signal::SIGTERM)
    }

    fn kill(&self, pid: Pid) -> Result<(), ProcessQueryError> {
        unix::send_signal(pid, nix::sys::signal::Signal::SIGKILL)
    }
}

#[cfg(windows)]
impl SystemProcessTable {
    fn with_process<T>(
        &self,
        pid: Pid,
        read: impl FnOnce(&sysinfo::Process) -> Result<T, ProcessQueryError>,
    ) -> Result<T, ProcessQueryError> {
        let mut guard = self.system.lock();
        let system = guard.get_or_insert_with(|| {
            let mut system = System::new();
            system.refresh_processes(ProcessesToUpdate::All, true);
            system
        });
        let sys_pid = sysinfo::Pid::from_u32(pid);
        if system.process(sys_pid).is_none() {
            system.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
        }
        match system.process(sys_pid) {
            Some(process) => read(process),
            None => Err(ProcessQueryError::NoSuchProcess(pid)),
        }
    }
}

#[cfg(windows)]
impl ProcessTable for SystemProcessTable {
    fn pids(&self) -> Result<Vec<Pid>, ProcessQueryError> {
        let mut guard = self.system.lock();
        let system = guard.get_or_insert_with(System::new);
        system.refresh_processes(ProcessesToUpdate::All, true);
        Ok(system.processes().keys().map(|pid| pid.as_u32()).collect())
    }

    fn current_pid(&self) -> Pid {
        std::process::id()
    }

    fn name(&self, pid: Pid) -> Result<String, ProcessQueryError> {
        self.with_process(pid, |process| {
            Ok(process.name().to_string_lossy().into_owned())
        })
    }

    fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessQueryError> {
        self.with_process(pid, |process| {
            Ok(process
                .cmd()
                .iter()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect())
        })
    }

    fn exe(&self, pid: Pid) -> Result<PathBuf, ProcessQueryError> {
        self.with_process(pid, |process| {
            process
                .exe()
                .map(|path| path.to_path_buf())
                .ok_or(ProcessQueryError::AccessDenied(pid))
        })
    }

    fn parent(&self, pid: Pid) -> Result<Option<Pid>, ProcessQueryError> {
        if pid == 0 {
            return Ok(None);
        }
        self.with_process(pid, |process| {
            Ok(process
                .parent()
                .map(|parent| parent.as_u32())
                .filter(|parent| *parent != pid))
        })
    }

    fn is_alive(&self, pid: Pid) -> bool {
        let sys_pid = sysinfo::Pid::from_u32(pid);
        let mut guard = self.system.lock();
        let system = guard.get_or_insert_with(System::new);
        system.refresh_processes(ProcessesToUpdate::Some(&[sys_pid]), true);
        system.process(sys_pid).is_some()
    }

    fn terminate(&self, pid: Pid) -> Result<(), ProcessQueryError> {
        self.with_process(pid, |process| {
            // Windows has no SIGTERM; sysinfo reports None and we fall back to kill
            let sent = process
                .kill_with(sysinfo::Signal::Term)
                .unwrap_or_else(|| process.kill());
            if sent {
                Ok(())
            } else {
                Err(ProcessQueryError::AccessDenied(pid))
            }
        })
    }

    fn kill(&self, pid: Pid) -> Result<(), ProcessQueryError> {
        self.with_process(pid, |process| {
            if process.kill() {
                Ok(())
            } else {
                Err(ProcessQueryError::AccessDenied(pid))
            }
        })
    }
}
