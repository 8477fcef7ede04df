use crate::token::{Token, TokenType};
use crate::value::Value;
use thiserror::Error;

/// A genuine Lox runtime fault: the operand of an operator had the wrong
/// type, a call target wasn't callable, a property was missing, etc.
/// Carries the token whose line number the diagnostic interface reports.
#[derive(Debug, Error, Clone)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError { token, message: message.into() }
    }
}

/// What `execute`/`evaluate` actually return on the non-happy path. `return`
/// is not an error: it is structured control flow threaded through the same
/// `Result` plumbing so every intermediate block exit still restores its
/// enclosing environment via the ordinary `?` unwind.
#[derive(Debug)]
pub enum Unwind {
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

/// Parser errors are reported through `Diagnostics` at the point they're
/// discovered; this marker is just enough for `?` to unwind to `synchronize`.
#[derive(Debug, Error)]
#[error("parse error")]
pub struct ParseError;

/// Tracks the two diagnostic channels from spec §6/§7: static errors
/// (scan/parse/resolve) and runtime errors, each with their own sticky flag
/// so `main` can choose the right exit code and the REPL can reset between
/// lines. Threaded explicitly by `&mut` rather than kept as global state.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: bool,
    had_runtime_error: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn reset_error(&mut self) {
        self.had_error = false;
    }

    pub fn reset_runtime_error(&mut self) {
        self.had_runtime_error = false;
    }

    /// Reports a scan-time error, which only ever has a line number.
    pub fn error(&mut self, line: usize, message: &str) {
        self.report(line, "", message);
    }

    /// Reports a parse/resolve-time error located at a specific token.
    pub fn error_at(&mut self, token: &Token, message: &str) {
        let location = if token.token_type == TokenType::EOF {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        self.report(token.line, &location, message);
    }

    fn report(&mut self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error = true;
    }

    pub fn runtime_error(&mut self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error = true;
    }
}
