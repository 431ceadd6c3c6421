/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Text-facing diagnostics with source snippets and caret pointers.

use crate::ast::SourceSpan;
use crate::compiler::CompileError;
use std::fmt;

/// Classification of a [`SyntaxError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed text: bad token, unbalanced grouping, ambiguous name, ...
    Syntax,
    /// A variable resolved to neither a parameter nor a constant.
    UnresolvedVariable,
    /// A called function is not in the registry.
    UnknownFunction,
    /// A function was called with an argument count it rejects.
    ArityMismatch,
}

/// Error returned by every text-level entry point.
///
/// Lexical and grammatical failures carry a source location; semantic
/// failures found while compiling the tree carry only a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Failure classification.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Byte offset into the source (`None` when unavailable).
    pub offset: Option<usize>,
    /// 1-based line number (`0` when unavailable).
    pub line: usize,
    /// 1-based column number (`0` when unavailable).
    pub column: usize,
    /// Source line snippet where the error occurred.
    pub snippet: String,
    /// Caret pointer aligned to `snippet`.
    pub pointer: String,
}

impl SyntaxError {
    /// Creates an error with no location information.
    pub fn message_only(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            offset: None,
            line: 0,
            column: 0,
            snippet: String::new(),
            pointer: String::new(),
        }
    }

    /// Creates a source-mapped syntax diagnostic from a [`SourceSpan`].
    pub fn from_span(message: impl Into<String>, source: &str, span: &SourceSpan) -> Self {
        // Pull the exact source line where the lexer/parser reported the span.
        let snippet = source
            .lines()
            .nth(span.line.saturating_sub(1))
            .unwrap_or("")
            .to_string();
        // Compute a safe caret range even when spans extend past line boundaries.
        let line_len = snippet.chars().count();
        let pointer_column = span.column.saturating_sub(1).min(line_len);
        let requested_len = source
            .get(span.start..span.end)
            .map_or(1, |text| text.chars().count())
            .max(1);
        let max_len = line_len.saturating_sub(pointer_column).max(1);
        let pointer_len = requested_len.min(max_len);
        let pointer = format!("{}{}", " ".repeat(pointer_column), "^".repeat(pointer_len));

        Self {
            kind: ErrorKind::Syntax,
            message: message.into(),
            offset: Some(span.start),
            line: span.line,
            column: span.column,
            snippet,
            pointer,
        }
    }
}

impl From<CompileError> for SyntaxError {
    fn from(err: CompileError) -> Self {
        let kind = match &err {
            CompileError::UnresolvedVariable(_) => ErrorKind::UnresolvedVariable,
            CompileError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            CompileError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
        };
        Self::message_only(kind, err.to_string())
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 || self.column == 0 {
            return write!(f, "{}", self.message);
        }

        write!(
            f,
            "{}\n --> line {}, column {}\n  |\n{:>3} | {}\n  | {}",
            self.message, self.line, self.column, self.line, self.snippet, self.pointer
        )
    }
}

impl std::error::Error for SyntaxError {}
