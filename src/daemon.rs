//! Detached child processes.

use std::ffi::OsStr;
use std::mem::MaybeUninit;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::{io, ptr};

/// Shell used for running command strings.
const SHELL: &str = "/bin/sh";

/// Run a command string through the shell without waiting for it.
pub fn spawn_shell(command: &str) -> io::Result<()> {
    spawn(SHELL, ["-c", command])
}

/// Spawn an unsupervised daemon.
///
/// This double-forks so the child is reparented to init, which means its
/// exit status and output cannot be retrieved.
pub fn spawn<I, S>(program: S, args: I) -> io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command.args(args);
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    unsafe {
        command.pre_exec(|| {
            match libc::fork() {
                -1 => return Err(io::Error::last_os_error()),
                0 => (),
                _ => libc::_exit(0),
            }

            if libc::setsid() == -1 {
                return Err(io::Error::last_os_error());
            }

            // Signals blocked by the compositor's event loop stay blocked across exec.
            let mut signal_set = MaybeUninit::uninit();
            libc::sigemptyset(signal_set.as_mut_ptr());
            libc::sigprocmask(libc::SIG_SETMASK, signal_set.as_mut_ptr(), ptr::null_mut());

            Ok(())
        });
    }

    // Reap the intermediate child immediately.
    command.spawn()?.wait()?;

    Ok(())
}
