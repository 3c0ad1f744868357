//! Error types surfaced by the parser and compiler.

use thiserror::Error;

/// Fatal failures while turning a script into a [`crate::Storyboard`].
///
/// Malformed individual lines are not fatal — they are collected as
/// [`LineDiagnostic`]s alongside the parsed result instead. This enum is
/// reserved for failures that leave no usable storyboard behind.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read storyboard script: {0}")]
    Io(#[from] std::io::Error),
}

/// Severity of a non-fatal parsing issue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

/// A single recoverable issue found while parsing one line of script.
///
/// The parser never fails the whole document over one of these — it logs
/// the issue via `tracing` and keeps going, falling back to the
/// authoring-tool default for the offending field.
#[derive(Clone, Debug)]
pub struct LineDiagnostic {
    pub line: usize,
    pub level: DiagnosticLevel,
    pub message: String,
}

impl LineDiagnostic {
    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            level: DiagnosticLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            level: DiagnosticLevel::Error,
            message: message.into(),
        }
    }
}
