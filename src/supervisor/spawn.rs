//! Child process spawning and termination.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, Command};

/// Something that can start the supervised child.
pub trait Spawn: Send {
    /// Start a new child process.
    fn spawn(&mut self) -> io::Result<Child>;

    /// Program name used in logs and errors.
    fn program(&self) -> &Path;
}

/// Spawns a fixed program with fixed arguments.
///
/// The child inherits stdout/stderr, gets a null stdin (the supervisor reads
/// the terminal) and, on Unix, its own process group so terminal signals
/// reach only the supervisor.
#[derive(Debug, Clone)]
pub struct CommandSpawner {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandSpawner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl Spawn for CommandSpawner {
    fn spawn(&mut self) -> io::Result<Child> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);

        command.spawn()
    }

    fn program(&self) -> &Path {
        &self.program
    }
}

/// Ask the child to exit (SIGTERM on Unix, kill elsewhere).
///
/// A child that already exited is not an error.
pub fn request_termination(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };

    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) | Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(io::Error::from(e)),
        }
    }

    #[cfg(not(unix))]
    {
        let _ = pid;
        child.start_kill()
    }
}

/// Sibling binary of the current executable, e.g. `service-host` next to
/// `service-host-dev`.
pub fn sibling_binary(name: &str) -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "executable has no parent directory"))?;
    Ok(dir.join(format!("{}{}", name, std::env::consts::EXE_SUFFIX)))
}
