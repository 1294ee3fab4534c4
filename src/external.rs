use crate::command::ChildStatus;
use crate::error::{Result, ShellError};
use crate::interrupt::{self, InterruptRouter};
use crate::lexer::TokenVector;
use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{self, ForkResult, Pid, execvp};
use std::ffi::CString;
use std::io::{self, Write};
use tracing::{debug, info};

/// Exit status of a child whose program could not be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit status of a child whose program was found but could not be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// Command that is not a builtin.
///
/// The program is resolved by `execvp` in the child, using `PATH` exactly as
/// the child would see it. The interpreter's environment is inherited as is.
#[derive(Debug)]
pub struct ExternalCommand {
    name: String,
    argv: Vec<CString>,
}

impl ExternalCommand {
    /// Prepares the argv for a non-empty token vector.
    ///
    /// Everything that needs to allocate happens here, before the fork.
    pub fn new(tokens: &TokenVector) -> Result<Self> {
        let name = tokens.command().unwrap_or_default().to_owned();
        let argv = tokens.to_argv()?;
        Ok(Self { name, argv })
    }

    /// Forks, executes the program in the child and blocks until it terminates.
    ///
    /// The child's pid is recorded in `router` while SIGINT is blocked, so an
    /// interrupt can never reach the interpreter in the window between fork
    /// and recording. The router is back to idle when this returns.
    pub fn execute(self, router: &InterruptRouter) -> Result<ChildStatus> {
        if self.argv.is_empty() {
            return Ok(ChildStatus::Exited(0));
        }

        // Anything still buffered would otherwise be written twice.
        io::stdout().flush()?;
        let error_prefix = format!("fgsh: {}: ", self.name);

        let mask = router.block()?;
        // SAFETY: the child only resets signal state, calls execvp, and on
        // failure writes preformatted bytes before _exit.
        match unsafe { unistd::fork() } {
            Err(errno) => {
                drop(mask);
                Err(ShellError::ResourceExhaustion(errno))
            }
            Ok(ForkResult::Child) => exec_child(&self.argv, error_prefix.as_bytes()),
            Ok(ForkResult::Parent { child }) => {
                router.set_foreground(child);
                drop(mask);
                info!(pid = child.as_raw(), command = %self.name, "spawned foreground child");

                let status = wait_for(child);
                router.clear_foreground();
                if let Ok(status) = &status {
                    debug!(pid = child.as_raw(), %status, "reaped foreground child");
                }
                status
            }
        }
    }
}

fn exec_child(argv: &[CString], error_prefix: &[u8]) -> ! {
    interrupt::reset_in_child();

    let errno = match execvp(&argv[0], argv) {
        Ok(never) => match never {},
        Err(errno) => errno,
    };

    let stderr = io::stderr();
    let _ = unistd::write(&stderr, error_prefix);
    let _ = unistd::write(&stderr, errno.desc().as_bytes());
    let _ = unistd::write(&stderr, b"\n");

    let code = match errno {
        Errno::ENOENT | Errno::ENOTDIR => EXIT_NOT_FOUND,
        _ => EXIT_NOT_EXECUTABLE,
    };
    // SAFETY: _exit skips atexit handlers and stdio flushing, which belong to
    // the parent.
    unsafe { nix::libc::_exit(code) }
}

/// Waits for `child` to terminate, retrying when a signal interrupts the wait.
fn wait_for(child: Pid) -> Result<ChildStatus> {
    loop {
        match waitpid(child, None) {
            Ok(status) => {
                if let Some(status) = ChildStatus::from_wait(status) {
                    return Ok(status);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(source) => {
                return Err(ShellError::Wait {
                    pid: child.as_raw(),
                    source,
                });
            }
        }
    }
}
