//! In-memory process table for unit tests

use crate::core::models::Pid;
use crate::core::process_table::{ProcessQueryError, ProcessTable};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Vanished,
    Denied,
    Zombie,
    Broken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentSignal {
    Terminate,
    Kill,
}

#[derive(Debug, Clone)]
pub struct FakeProcess {
    pub pid: Pid,
    pub name: String,
    pub cmdline: Vec<String>,
    pub exe: PathBuf,
    pub parent: Option<Pid>,
    failure: Option<Failure>,
    exe_denied: bool,
    ignores_terminate: bool,
}

impl FakeProcess {
    pub fn new(pid: Pid, name: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            cmdline: vec![name.to_string()],
            exe: PathBuf::from(format!("/usr/bin/{name}")),
            parent: None,
            failure: None,
            exe_denied: false,
            ignores_terminate: false,
        }
    }

    pub fn with_parent(mut self, parent: Pid) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_cmdline(mut self, args: &[&str]) -> Self {
        self.cmdline = args.iter().map(|arg| arg.to_string()).collect();
        self
    }

    pub fn with_exe(mut self, exe: &str) -> Self {
        self.exe = PathBuf::from(exe);
        self
    }

    pub fn vanished(mut self) -> Self {
        self.failure = Some(Failure::Vanished);
        self
    }

    pub fn denied(mut self) -> Self {
        self.failure = Some(Failure::Denied);
        self
    }

    pub fn zombie(mut self) -> Self {
        self.failure = Some(Failure::Zombie);
        self
    }

    pub fn broken(mut self) -> Self {
        self.failure = Some(Failure::Broken);
        self
    }

    pub fn denied_exe(mut self) -> Self {
        self.exe_denied = true;
        self
    }

    /// SIGTERM is recorded but the process keeps running.
    pub fn stubborn(mut self) -> Self {
        self.ignores_terminate = true;
        self
    }

    fn check(&self) -> Result<(), ProcessQueryError> {
        match self.failure {
            None => Ok(()),
            Some(Failure::Vanished) => Err(ProcessQueryError::NoSuchProcess(self.pid)),
            Some(Failure::Denied) => Err(ProcessQueryError::AccessDenied(self.pid)),
            Some(Failure::Zombie) => Err(ProcessQueryError::Zombie(self.pid)),
            Some(Failure::Broken) => Err(ProcessQueryError::Other {
                pid: self.pid,
                message: "simulated failure".to_string(),
            }),
        }
    }
}

pub struct FakeProcessTable {
    current: Pid,
    processes: BTreeMap<Pid, FakeProcess>,
    dead: RefCell<HashSet<Pid>>,
    signals: RefCell<Vec<(Pid, SentSignal)>>,
    liveness_delay: Duration,
}

impl FakeProcessTable {
    pub fn new(current: Pid) -> Self {
        Self {
            current,
            processes: BTreeMap::new(),
            dead: RefCell::new(HashSet::new()),
            signals: RefCell::new(Vec::new()),
            liveness_delay: Duration::ZERO,
        }
    }

    /// Every `is_alive` call sleeps this long, like a sysinfo refresh.
    pub fn with_liveness_delay(mut self, delay: Duration) -> Self {
        self.liveness_delay = delay;
        self
    }

    pub fn insert(&mut self, process: FakeProcess) {
        self.processes.insert(process.pid, process);
    }

    pub fn signals(&self) -> Vec<(Pid, SentSignal)> {
        self.signals.borrow().clone()
    }

    fn get(&self, pid: Pid) -> Result<&FakeProcess, ProcessQueryError> {
        if self.dead.borrow().contains(&pid) {
            return Err(ProcessQueryError::NoSuchProcess(pid));
        }
        let process = self
            .processes
            .get(&pid)
            .ok_or(ProcessQueryError::NoSuchProcess(pid))?;
        process.check()?;
        Ok(process)
    }
}

impl ProcessTable for FakeProcessTable {
    fn pids(&self) -> Result<Vec<Pid>, ProcessQueryError> {
        let dead = self.dead.borrow();
        Ok(self
            .processes
            .keys()
            .copied()
            .filter(|pid| !dead.contains(pid))
            .collect())
    }

    fn current_pid(&self) -> Pid {
        self.current
    }

    fn name(&self, pid: Pid) -> Result<String, ProcessQueryError> {
        Ok(self.get(pid)?.name.clone())
    }

    fn cmdline(&self, pid: Pid) -> Result<Vec<String>, ProcessQueryError> {
        Ok(self.get(pid)?.cmdline.clone())
    }

    fn exe(&self, pid: Pid) -> Result<PathBuf, ProcessQueryError> {
        let process = self.get(pid)?;
        if process.exe_denied {
            return Err(ProcessQueryError::AccessDenied(pid));
        }
        Ok(process.exe.clone())
    }

    fn parent(&self, pid: Pid) -> Result<Option<Pid>, ProcessQueryError> {
        Ok(self.get(pid)?.parent)
    }

    fn is_alive(&self, pid: Pid) -> bool {
        if !self.liveness_delay.is_zero() {
            std::thread::sleep(self.liveness_delay);
        }
        self.processes.contains_key(&pid) && !self.dead.borrow().contains(&pid)
    }

    fn terminate(&self, pid: Pid) -> Result<(), ProcessQueryError> {
        let stubborn = self.get(pid)?.ignores_terminate;
        self.signals.borrow_mut().push((pid, SentSignal::Terminate));
        if !stubborn {
            self.dead.borrow_mut().insert(pid);
        }
        Ok(())
    }

    fn kill(&self, pid: Pid) -> Result<(), ProcessQueryError> {
        self.get(pid)?;
        self.signals.borrow_mut().push((pid, SentSignal::Kill));
        self.dead.borrow_mut().insert(pid);
        Ok(())
    }
}
