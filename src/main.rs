use anyhow::{Context, Result};
use argh::FromArgs;
use fgsh::config::{DEFAULT_PROMPT, MAX_LINE_LEN, MAX_TOKEN_LEN, MAX_TOKENS};
use fgsh::{Config, EditorSource, Interpreter, InterruptRouter, ReaderSource};
use std::env;
use std::io::{self, IsTerminal};
use tracing::{debug, info};

#[derive(FromArgs)]
/// A small interactive shell that runs one foreground command at a time.
struct Args {
    #[argh(option, default = "String::from(DEFAULT_PROMPT)")]
    /// prompt printed before each line (default "=> ")
    prompt: String,

    #[argh(option, default = "MAX_LINE_LEN")]
    /// longest accepted input line, in bytes
    max_line: usize,

    #[argh(option, default = "MAX_TOKEN_LEN")]
    /// longest accepted token, in bytes
    max_token: usize,

    #[argh(option, default = "MAX_TOKENS")]
    /// largest number of tokens on one line
    max_tokens: usize,

    #[argh(switch, short = 'v')]
    /// log debug diagnostics to stderr
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            prompt: self.prompt.clone(),
            max_line_len: self.max_line,
            max_token_len: self.max_token,
            max_tokens: self.max_tokens,
        }
    }
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from(env_filter))
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let config = args.config();
    config.validate().map_err(anyhow::Error::msg)?;
    info!(?config, "starting fgsh v{}", env!("CARGO_PKG_VERSION"));

    let router = InterruptRouter::install().context("failed to install SIGINT handler")?;
    let mut shell = Interpreter::new(config, router);

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    if io::stdin().is_terminal() {
        let mut source = EditorSource::new().context("failed to create line editor")?;
        shell.repl(&mut source, &mut stdout, &mut stderr);
    } else {
        debug!("stdin is not a terminal, reading lines without an editor");
        let mut source = ReaderSource::new(io::stdin().lock(), io::stdout())
            .with_max_line_len(shell.config().max_line_len);
        shell.repl(&mut source, &mut stdout, &mut stderr);
    }

    // A SIGINT between here and process exit must still not kill the shell.
    shell.into_router().keep_installed();
    Ok(())
}
