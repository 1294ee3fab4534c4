//! A tiny interactive shell that runs one foreground command at a time.
//!
//! Each input line is split on whitespace into tokens. The first token is
//! either one of the builtins (`cd`, `myinfo`, `exit`), run inside the
//! interpreter, or the name of a program that is forked, executed through
//! `PATH` and waited for. While a program runs, SIGINT is forwarded to it
//! instead of killing the shell.
//!
//! The main entry point is [`Interpreter`]. Input comes from any
//! [`LineSource`]; [`InterruptRouter`] owns the foreground-child record that
//! the SIGINT handler reads.

mod builtin;
pub mod command;
pub mod config;
pub mod error;
mod external;
mod interpreter;
pub mod interrupt;
pub mod io_adapters;
pub mod lexer;

pub use builtin::{Builtin, dispatch};
pub use command::{ChildStatus, ExitCode, Outcome};
pub use config::Config;
pub use error::{InputLimit, ShellError};
pub use external::{EXIT_NOT_EXECUTABLE, EXIT_NOT_FOUND, ExternalCommand};
pub use interpreter::Interpreter;
pub use interrupt::{InterruptRouter, RouterState};
pub use io_adapters::{EditorSource, LineSource, ReaderSource};
