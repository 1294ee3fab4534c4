use crate::builtin;
use crate::command::{ChildStatus, Outcome};
use crate::config::Config;
use crate::error::Result;
use crate::external::ExternalCommand;
use crate::interrupt::InterruptRouter;
use crate::io_adapters::LineSource;
use crate::lexer;
use nix::sys::signal::Signal;
use std::io::Write;
use tracing::{debug, info, warn};

/// A minimal shell that runs builtins in-process and everything else as a
/// single foreground child.
///
/// Example
/// ```
/// use fgsh::{Config, Interpreter, InterruptRouter, Outcome};
/// let mut sh = Interpreter::new(Config::default(), InterruptRouter::detached());
/// let mut out = Vec::new();
/// assert_eq!(sh.run_line("true", &mut out).unwrap(), Outcome::Continue);
/// assert!(sh.last_status().unwrap().success());
/// assert_eq!(sh.run_line("exit", &mut out).unwrap(), Outcome::Terminate);
/// ```
pub struct Interpreter {
    config: Config,
    router: InterruptRouter,
    last_status: Option<ChildStatus>,
}

impl Interpreter {
    pub fn new(config: Config, router: InterruptRouter) -> Self {
        Self {
            config,
            router,
            last_status: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> &InterruptRouter {
        &self.router
    }

    /// Consumes the interpreter, handing back its router.
    pub fn into_router(self) -> InterruptRouter {
        self.router
    }

    /// How the most recent external command ended.
    pub fn last_status(&self) -> Option<ChildStatus> {
        self.last_status
    }

    /// Tokenizes and runs one input line.
    ///
    /// Blank lines do nothing. Builtins write to `stdout`; external programs
    /// write straight to the inherited file descriptors, after `stdout` has
    /// been flushed.
    pub fn run_line(&mut self, line: &str, stdout: &mut dyn Write) -> Result<Outcome> {
        let tokens = lexer::split_into_tokens(line, &self.config)?;
        if tokens.is_empty() {
            return Ok(Outcome::Continue);
        }

        match builtin::dispatch(&tokens, stdout)? {
            Outcome::NotBuiltin => {
                let command = ExternalCommand::new(&tokens)?;
                stdout.flush()?;

                // Discard interrupts that hit the prompt.
                self.router.take_interrupted();
                let status = command.execute(&self.router)?;
                self.last_status = Some(status);

                if self.router.take_interrupted() {
                    info!(%status, "interrupt forwarded to foreground child");
                    if let ChildStatus::Signaled {
                        signal: Signal::SIGINT,
                        ..
                    } = status
                    {
                        writeln!(stdout)?;
                    }
                }
                Ok(Outcome::Continue)
            }
            outcome => Ok(outcome),
        }
    }

    /// Read-eval loop: prompt, read, run, until `exit` or end of input.
    ///
    /// Errors from a single line are printed to `stderr` and the loop goes on;
    /// only an unreadable input ends it early.
    pub fn repl(
        &mut self,
        source: &mut dyn LineSource,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) {
        loop {
            let line = match source.read_line(&self.config.prompt) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    break;
                }
                Err(err) => {
                    warn!(%err, "cannot read input, leaving");
                    break;
                }
            };

            match self.run_line(&line, stdout) {
                Ok(Outcome::Terminate) => break,
                Ok(_) => {}
                Err(err) => {
                    debug!(%err, "command failed");
                    let _ = writeln!(stderr, "fgsh: {err}");
                }
            }
        }
        let _ = stdout.flush();
    }
}
