use crate::command::Outcome;
use crate::error::{Result, ShellError};
use crate::lexer::TokenVector;
use nix::unistd::{getpid, getppid};
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are executed directly in the interpreter process without spawning
/// a child process. They read their arguments positionally; there are no
/// options, so a token such as `-x` or `help` is taken literally.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Builds the command from the tokens after its name.
    fn from_args(args: &[String]) -> Self;

    /// Runs the command, writing any regular output to `stdout`.
    fn execute(self, stdout: &mut dyn Write) -> Result<Outcome>;
}

/// The set of builtins, one variant per command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    MyInfo,
    Cd,
    Exit,
}

const BUILTINS: [Builtin; 3] = [Builtin::MyInfo, Builtin::Cd, Builtin::Exit];

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::MyInfo => MyInfo::name(),
            Builtin::Cd => Cd::name(),
            Builtin::Exit => Exit::name(),
        }
    }

    /// Finds the builtin whose name is exactly `name`.
    pub fn lookup(name: &str) -> Option<Self> {
        BUILTINS.into_iter().find(|b| b.name() == name)
    }
}

/// Runs the builtin named by the first token, if there is one.
///
/// Returns [`Outcome::NotBuiltin`] when the command has to be launched as an
/// external program. An empty token vector is a no-op.
pub fn dispatch(tokens: &TokenVector, stdout: &mut dyn Write) -> Result<Outcome> {
    let Some(name) = tokens.command() else {
        return Ok(Outcome::Continue);
    };
    let Some(builtin) = Builtin::lookup(name) else {
        return Ok(Outcome::NotBuiltin);
    };
    debug!(builtin = name, "dispatching builtin");

    let args = tokens.args();
    match builtin {
        Builtin::MyInfo => MyInfo::from_args(args).execute(stdout),
        Builtin::Cd => Cd::from_args(args).execute(stdout),
        Builtin::Exit => Exit::from_args(args).execute(stdout),
    }
}

/// Print the process id of the shell and of its parent. Arguments are ignored.
pub struct MyInfo;

impl BuiltinCommand for MyInfo {
    fn name() -> &'static str {
        "myinfo"
    }

    fn from_args(_args: &[String]) -> Self {
        MyInfo
    }

    fn execute(self, stdout: &mut dyn Write) -> Result<Outcome> {
        writeln!(stdout, "The PID: {}", getpid())?;
        writeln!(stdout, "The PPID: {}", getppid())?;
        Ok(Outcome::Continue)
    }
}

/// Change the current working directory.
///
/// The first argument is the target; anything after it is ignored. With no
/// argument, changes to the directory named by `HOME`.
pub struct Cd {
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_args(args: &[String]) -> Self {
        Cd {
            target: args.first().cloned(),
        }
    }

    fn execute(self, _stdout: &mut dyn Write) -> Result<Outcome> {
        let target = match self.target {
            Some(t) => PathBuf::from(t),
            None => env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or(ShellError::HomeNotSet)?,
        };

        env::set_current_dir(&target).map_err(|source| ShellError::DirectoryChange {
            path: target.clone(),
            source,
        })?;
        debug!(cwd = %target.display(), "changed directory");
        Ok(Outcome::Continue)
    }
}

/// Exit shell process. Arguments are ignored; the shell always exits with status 0.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_args(_args: &[String]) -> Self {
        Exit
    }

    fn execute(self, _stdout: &mut dyn Write) -> Result<Outcome> {
        Ok(Outcome::Terminate)
    }
}
