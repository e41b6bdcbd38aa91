// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

//! Error taxonomy shared by the tokenizer, parser, generator and dialect
//! registry.
//!
//! Per-component `thiserror` enums (tokenizer, parser, generator) compose
//! into one top-level error so callers of `parse`/`transpile` have a
//! single type to match on.

use std::fmt;
use text_size::TextSize;
use unicode_width::UnicodeWidthStr;

/// Width of the source context window shown around a fault, in bytes.
const CONTEXT_WINDOW: usize = 100;

/// A single parse diagnostic, with enough context to render a highlighted
/// snippet of the offending span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub description: String,
    pub line: usize,
    pub col: usize,
    pub start_context: String,
    pub highlight: String,
    pub end_context: String,
}

impl Diagnostic {
    pub fn new(description: impl Into<String>, source: &str, at: TextSize, span_len: usize) -> Self {
        let at: usize = at.into();
        let (line, col) = line_col(source, at);
        let end = (at + span_len).min(source.len());
        let window_start = at.saturating_sub(CONTEXT_WINDOW);
        let window_end = (end + CONTEXT_WINDOW).min(source.len());

        Self {
            description: description.into(),
            line,
            col,
            start_context: source[window_start..at].to_string(),
            highlight: source[at..end].to_string(),
            end_context: source[end..window_end].to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Underline the offending span so a terminal renders it distinctly
        // within the surrounding context window.
        write!(
            f,
            "{}\nLine {}, Col {}: {}\x1b[4m{}\x1b[0m{}",
            self.description, self.line, self.col, self.start_context, self.highlight, self.end_context,
        )
    }
}

/// 1-indexed (line, column) of a byte offset in `source`.
fn line_col(source: &str, at: usize) -> (usize, usize) {
    let mut line = 1;
    let mut last_newline = 0;
    for (i, b) in source.as_bytes()[..at.min(source.len())].iter().enumerate() {
        if *b == b'\n' {
            line += 1;
            last_newline = i + 1;
        }
    }
    let col = source[last_newline..at.min(source.len())].width() + 1;
    (line, col)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TokenError(pub Diagnostic);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub struct ParseError {
    pub errors: Vec<Diagnostic>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl ParseError {
    pub fn single(d: Diagnostic) -> Self {
        Self { errors: vec![d] }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{0}")]
pub struct GenerateError(pub String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("dialect '{dialect}' does not support {construct}")]
pub struct UnsupportedError {
    pub dialect: String,
    pub construct: String,
}

/// The base error type returned by every public entry point.
#[derive(Debug, thiserror::Error)]
pub enum SqlglotError {
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error(transparent)]
    Unsupported(#[from] UnsupportedError),
    #[error("unknown dialect '{0}'")]
    UnknownDialect(String),
}

pub type Result<T> = std::result::Result<T, SqlglotError>;

/// Controls how the parser reacts to a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorLevel {
    /// First syntax error throws immediately.
    #[default]
    Immediate,
    /// Errors accumulate and are thrown together at statement end.
    Raise,
    /// Errors accumulate but are never thrown.
    Warn,
    /// Attempt to return partial results, swallowing errors.
    Ignore,
}
