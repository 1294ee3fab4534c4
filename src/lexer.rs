//! Splitting an input line into command-line tokens.
//!
//! There is no quoting, escaping or expansion: a token is any maximal run of
//! bytes that are not delimiters.

use crate::config::Config;
use crate::error::{InputLimit, Result, ShellError};
use std::ffi::CString;

/// Characters that separate tokens: space, tab, CR, LF and BEL.
pub const DELIMITERS: [char; 5] = [' ', '\t', '\r', '\n', '\x07'];

/// The tokens of a single input line, in order.
///
/// Every stored token is non-empty, so when the vector is not empty its first
/// element is the command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenVector {
    tokens: Vec<String>,
}

impl TokenVector {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// The command name, if there is one.
    pub fn command(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Everything after the command name.
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    /// Converts the tokens into an argv for `execvp`.
    ///
    /// The terminating NULL pointer is appended by `execvp` itself when it
    /// builds the C array, so the returned vector holds exactly one entry per
    /// token.
    pub fn to_argv(&self) -> Result<Vec<CString>> {
        self.tokens
            .iter()
            .map(|t| CString::new(t.as_bytes()).map_err(|_| ShellError::InvalidArgument(t.clone())))
            .collect()
    }
}

/// Splits `line` into tokens, enforcing the limits in `config`.
///
/// A blank line yields an empty [`TokenVector`]; the caller decides what to do
/// with it.
pub fn split_into_tokens(line: &str, config: &Config) -> Result<TokenVector> {
    if line.len() > config.max_line_len {
        return Err(ShellError::InputTooLong(InputLimit::Line {
            len: line.len(),
            max: config.max_line_len,
        }));
    }

    let mut tokens = Vec::new();
    for word in line.split(DELIMITERS).filter(|w| !w.is_empty()) {
        if word.len() > config.max_token_len {
            return Err(ShellError::InputTooLong(InputLimit::Token {
                len: word.len(),
                max: config.max_token_len,
            }));
        }
        if tokens.len() == config.max_tokens {
            return Err(ShellError::InputTooLong(InputLimit::TokenCount {
                max: config.max_tokens,
            }));
        }
        tokens.push(word.to_owned());
    }

    Ok(TokenVector { tokens })
}
