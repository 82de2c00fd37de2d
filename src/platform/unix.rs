use crate::core::models::Pid;
use crate::core::process_table::ProcessQueryError;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid as NixPid;

/// Check if process is alive
///
/// Signal 0 performs the permission and existence checks without delivering anything.
pub fn process_alive(pid: Pid) -> bool {
    match kill(to_nix_pid(pid), None) {
        Ok(()) => true,
        Err(errno) => errno == Errno::EPERM, // EPERM means process exists but no permission
    }
}

/// Send a signal, mapping errno onto the process query error kinds
pub fn send_signal(pid: Pid, signal: Signal) -> Result<(), ProcessQueryError> {
    kill(to_nix_pid(pid), signal).map_err(|errno| match errno {
        Errno::ESRCH => ProcessQueryError::NoSuchProcess(pid),
        Errno::EPERM => ProcessQueryError::AccessDenied(pid),
        other => ProcessQueryError::Other {
            pid,
            message: format!("{signal} failed: {other}"),
        },
    })
}

fn to_nix_pid(pid: Pid) -> NixPid {
    NixPid::from_raw(pid as libc::pid_t)
}
