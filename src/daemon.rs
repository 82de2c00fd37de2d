//! Background execution
//!
//! Detaching is one-way: once `detach` returns [`Detachment::Original`] the
//! caller must exit without serving, and only the [`Detachment::Daemon`] side
//! carries on. Runs before the tokio runtime exists so no worker threads are
//! lost across `fork`.

use crate::error::{errors, AutoApproveResult};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info};

const DAEMON_FLAG: &str = "--daemon";

/// Which side of the detach the caller is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detachment {
    /// The invoking process; a background copy now exists elsewhere.
    Original,
    /// The detached process, without a controlling terminal.
    Daemon,
}

pub trait Detacher {
    fn detach(&self) -> AutoApproveResult<Detachment>;
}

/// Double-forks where the platform allows it, relaunches otherwise.
#[derive(Debug, Clone, Copy)]
pub struct SystemDetacher {
    supports_fork: bool,
}

impl SystemDetacher {
    pub fn new(supports_fork: bool) -> Self {
        Self { supports_fork }
    }
}

impl Detacher for SystemDetacher {
    fn detach(&self) -> AutoApproveResult<Detachment> {
        if self.supports_fork {
            daemonize()
        } else {
            relaunch_detached()?;
            Ok(Detachment::Original)
        }
    }
}

/// Classic double fork: new session, root cwd, cleared umask, standard
/// streams on `/dev/null`.
#[cfg(unix)]
pub fn daemonize() -> AutoApproveResult<Detachment> {
    use nix::sys::stat::{umask, Mode};
    use nix::unistd::{chdir, fork, setsid, ForkResult};

    // SAFETY: called before any runtime threads are started
    match unsafe { fork() }
        .map_err(|err| errors::process_error_with_source("fork", "first fork failed", err))?
    {
        ForkResult::Parent { child } => {
            info!("Started autoapprove-mcp in background (pid {})", child);
            return Ok(Detachment::Original);
        }
        ForkResult::Child => {}
    }

    chdir("/").map_err(|err| errors::process_error_with_source("chdir", "chdir to / failed", err))?;
    setsid().map_err(|err| errors::process_error_with_source("setsid", "setsid failed", err))?;
    umask(Mode::empty());

    match unsafe { fork() }
        .map_err(|err| errors::process_error_with_source("fork", "second fork failed", err))?
    {
        // SAFETY: _exit skips atexit handlers and buffered writers owned by the original
        ForkResult::Parent { .. } => unsafe { libc::_exit(0) },
        ForkResult::Child => {}
    }

    redirect_standard_streams()?;
    debug!("daemonized as pid {}", std::process::id());
    Ok(Detachment::Daemon)
}

#[cfg(not(unix))]
pub fn daemonize() -> AutoApproveResult<Detachment> {
    relaunch_detached()?;
    Ok(Detachment::Original)
}

#[cfg(unix)]
fn redirect_standard_streams() -> AutoApproveResult<()> {
    use std::fs::OpenOptions;
    use std::io::Write;
    use std::os::fd::AsRawFd;

    let _ = std::io::stdout().flush();
    let _ = std::io::stderr().flush();

    let null = OpenOptions::new().read(true).write(true).open("/dev/null")?;
    for target in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        // SAFETY: both descriptors are open for the duration of the call
        if unsafe { libc::dup2(null.as_raw_fd(), target) } == -1 {
            return Err(std::io::Error::last_os_error().into());
        }
    }
    // dropping `null` closes the source descriptor; the duplicates stay open
    Ok(())
}

/// Starts this executable again with the same arguments, minus `--daemon`,
/// detached from the current console and process group.
pub fn relaunch_detached() -> AutoApproveResult<()> {
    let exe = std::env::current_exe()?;
    let args = relaunch_args(std::env::args_os().skip(1));

    let child = spawn_detached(&exe, &args)?;
    info!("Started autoapprove-mcp in background (pid {})", child.id());
    Ok(())
}

/// Spawns `program` with null stdio in its own process group (a new console
/// group on Windows). The child is not waited on.
pub fn spawn_detached(program: &Path, args: &[OsString]) -> AutoApproveResult<Child> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach_from_parent(&mut command);

    command.spawn().map_err(|err| {
        errors::process_error_with_source(
            program.display().to_string(),
            "failed to relaunch in background",
            err,
        )
    })
}

/// Arguments for the background copy. Dropping `--daemon` keeps the copy
/// from relaunching itself again.
pub fn relaunch_args<I, S>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .filter(|arg| arg.as_ref() != OsStr::new(DAEMON_FLAG))
        .map(|arg| arg.as_ref().to_os_string())
        .collect()
}

#[cfg(windows)]
fn detach_from_parent(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    use windows::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, DETACHED_PROCESS};

    command.creation_flags(DETACHED_PROCESS.0 | CREATE_NEW_PROCESS_GROUP.0);
}

#[cfg(unix)]
fn detach_from_parent(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    command.process_group(0);
}

#[cfg(not(any(unix, windows)))]
fn detach_from_parent(_command: &mut Command) {}
