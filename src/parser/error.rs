//! Parse diagnostics
//!
//! Two tiers: [`ParseError`]s are recorded in a bounded [`ErrorList`] while
//! parsing carries on, and a [`FatalError`] stops the parse of the file.

use super::ast::{SourceLocation, Span};
use thiserror::Error;

/// Default number of recorded errors kept per file.
pub const MAX_PARSE_ERRORS: usize = 64;

/// A recoverable syntax problem, such as a missing `;`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parse error at line {}, column {}: {message}", .location.line, .location.column)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
    pub location: SourceLocation,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            span,
            location,
        }
    }
}

/// Errors the parser has no recovery strategy for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error(
        "unexpected end of file at line {}, column {} while looking for {expected} (in {origin})",
        .location.line,
        .location.column
    )]
    UnexpectedEof {
        /// What the parser was scanning for
        expected: &'static str,
        /// Parser routine that hit the end of file
        origin: &'static str,
        span: Span,
        location: SourceLocation,
    },
}

impl FatalError {
    pub fn span(&self) -> Span {
        match self {
            FatalError::UnexpectedEof { span, .. } => *span,
        }
    }

    pub fn location(&self) -> SourceLocation {
        match self {
            FatalError::UnexpectedEof { location, .. } => *location,
        }
    }
}

/// Fixed-capacity list of recorded errors.
///
/// Once full, further errors are counted and otherwise discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorList {
    errors: Vec<ParseError>,
    capacity: usize,
    dropped: usize,
}

impl ErrorList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            errors: Vec::new(),
            capacity,
            dropped: 0,
        }
    }

    /// Record an error. Returns `false` when the list was already full.
    pub fn push(&mut self, error: ParseError) -> bool {
        if self.errors.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.errors.push(error);
        true
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.errors.len() >= self.capacity
    }

    /// Number of errors discarded after the list filled up.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    pub fn as_slice(&self) -> &[ParseError] {
        &self.errors
    }
}

impl Default for ErrorList {
    fn default() -> Self {
        Self::with_capacity(MAX_PARSE_ERRORS)
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
