use crate::config::MAX_LINE_LEN;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Read, Write};

/// Something the execution loop can prompt and read lines from.
pub trait LineSource {
    /// Shows `prompt` and reads one line, without its line terminator.
    ///
    /// `Ok(None)` means the input is exhausted, which the loop treats like `exit`.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Interactive line editing on a terminal, backed by rustyline.
///
/// Lines are not added to any history.
pub struct EditorSource {
    editor: DefaultEditor,
}

impl EditorSource {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl-C at the prompt: nothing is running, just prompt again.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }
}

/// Plain line reader for piped input and tests.
///
/// The prompt goes to `prompt_out`; invalid UTF-8 is replaced rather than
/// rejected so a stray byte cannot end the session. The `\n` (or `\r\n`)
/// terminator is stripped, as rustyline does.
///
/// At most `max_line_len + 1` bytes of a line are kept. The rest of an
/// over-long line is skipped, so the tokenizer still sees a line past the
/// limit and reports it, and the next read starts on the following line.
pub struct ReaderSource<R, W> {
    input: R,
    prompt_out: W,
    max_line_len: usize,
}

impl<R: BufRead, W: Write> ReaderSource<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self {
            input,
            prompt_out,
            max_line_len: MAX_LINE_LEN,
        }
    }

    /// Sets how many bytes of a line are worth reading.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    pub fn prompt_out(&self) -> &W {
        &self.prompt_out
    }
}

impl<R: BufRead, W: Write> LineSource for ReaderSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.prompt_out, "{prompt}")?;
        self.prompt_out.flush()?;

        // Room for a full line plus "\r\n".
        let cap = self.max_line_len.saturating_add(2);
        let mut buf = Vec::new();
        if (&mut self.input).take(cap as u64).read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        } else if buf.len() == cap {
            self.input.skip_until(b'\n')?;
            buf.truncate(self.max_line_len.saturating_add(1));
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }
}
