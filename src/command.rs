use nix::sys::signal::Signal;
use nix::sys::wait::WaitStatus;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;

/// What the execution loop should do after a builtin was looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A builtin ran and asked the loop to stop.
    Terminate,
    /// A builtin ran (successfully or not); read the next line.
    Continue,
    /// The command is not a builtin and must be launched as a program.
    NotBuiltin,
}

/// How a foreground child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    Exited(ExitCode),
    Signaled { signal: Signal, core_dumped: bool },
}

impl ChildStatus {
    /// Converts a terminal `waitpid` result. Stops and continues are not
    /// terminations and yield `None`.
    pub(crate) fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ChildStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, core_dumped) => Some(ChildStatus::Signaled {
                signal,
                core_dumped,
            }),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, ChildStatus::Exited(0))
    }

    /// The status a shell would store in `$?`.
    pub fn code(&self) -> ExitCode {
        match self {
            ChildStatus::Exited(code) => *code,
            ChildStatus::Signaled { signal, .. } => 128 + *signal as i32,
        }
    }
}

impl std::fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildStatus::Exited(code) => write!(f, "exited with {code}"),
            ChildStatus::Signaled {
                signal,
                core_dumped: true,
            } => write!(f, "killed by {signal} (core dumped)"),
            ChildStatus::Signaled { signal, .. } => write!(f, "killed by {signal}"),
        }
    }
}
