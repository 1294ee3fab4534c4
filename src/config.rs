//! Runtime settings of the interpreter.

/// Prompt printed before every line is read.
pub const DEFAULT_PROMPT: &str = "=> ";

/// Longest accepted input line, in bytes.
pub const MAX_LINE_LEN: usize = 1024;

/// Longest accepted single token, in bytes.
pub const MAX_TOKEN_LEN: usize = MAX_LINE_LEN;

/// Largest number of tokens accepted on one line.
pub const MAX_TOKENS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub max_line_len: usize,
    pub max_token_len: usize,
    pub max_tokens: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_owned(),
            max_line_len: MAX_LINE_LEN,
            max_token_len: MAX_TOKEN_LEN,
            max_tokens: MAX_TOKENS,
        }
    }
}

impl Config {
    /// Checks that every limit can be satisfied by at least one non-empty line.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("max-line", self.max_line_len),
            ("max-token", self.max_token_len),
            ("max-tokens", self.max_tokens),
        ] {
            if value == 0 {
                return Err(format!("--{name} must be greater than zero"));
            }
        }
        Ok(())
    }
}
