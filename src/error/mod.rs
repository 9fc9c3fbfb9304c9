// Errors and diagnostics raised while loading and scanning source

mod display;

use std::{fmt, path::Path};

pub use display::*;

/// Failures that abort the scan of the current scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    Mismatch(usize, char, char),
    UnexpectedCloser(usize, char),
    UnterminatedHeredoc(usize, String),
    TooDeep(usize),
}

impl ScanError {
    pub fn offset(&self) -> usize {
        match self {
            ScanError::Mismatch(offset, _, _) => *offset,
            ScanError::UnexpectedCloser(offset, _) => *offset,
            ScanError::UnterminatedHeredoc(offset, _) => *offset,
            ScanError::TooDeep(offset) => *offset,
        }
    }

    /// The same error reported at a different offset.
    pub fn relocated(self, offset: usize) -> ScanError {
        match self {
            ScanError::Mismatch(_, open, close) => ScanError::Mismatch(offset, open, close),
            ScanError::UnexpectedCloser(_, close) => ScanError::UnexpectedCloser(offset, close),
            ScanError::UnterminatedHeredoc(_, label) => ScanError::UnterminatedHeredoc(offset, label),
            ScanError::TooDeep(_) => ScanError::TooDeep(offset),
        }
    }

    pub fn message(&self) -> String {
        match self {
            ScanError::Mismatch(_, open, close) => {
                format!("'{}' does not close '{}'", close, open)
            }
            ScanError::UnexpectedCloser(_, close) => {
                format!("unexpected '{}' with nothing open", close)
            }
            ScanError::UnterminatedHeredoc(_, label) => {
                format!("no terminator line '{}' for heredoc", label)
            }
            ScanError::TooDeep(_) => "brackets nested too deeply".to_string(),
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message(), self.offset())
    }
}

impl std::error::Error for ScanError {}

/// A speculative match (quote-like literal, pattern, substitution) that
/// did not pan out. Carries a little of the input that follows so the
/// resulting diagnostic can be located by a human.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchError {
    pub reason: &'static str,
    pub context: String,
}

impl MatchError {
    pub fn new(reason: &'static str, rest: &str) -> MatchError {
        MatchError {
            reason,
            context: rest
                .chars()
                .take(100)
                .collect(),
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} near '{}'", self.reason, self.context)
    }
}

/// Recoverable trouble found during a scan. These are collected rather
/// than raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub offset: usize,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Raised by a plugin handler that could not make sense of the statement
/// it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginError {
    pub handler: String,
    pub problem: String,
}

impl PluginError {
    pub fn new(handler: &str, problem: impl Into<String>) -> PluginError {
        PluginError {
            handler: handler.to_string(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.handler, self.problem)
    }
}

impl std::error::Error for PluginError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingError<'i> {
    pub problem: String,
    pub details: String,
    pub filename: &'i Path,
}

impl<'i> fmt::Display for LoadingError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.problem, self.details)
    }
}
