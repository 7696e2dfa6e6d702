use std::fmt;

/// Broad class of a markup error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input ended inside a construct: an open tag, attribute value,
    /// comment, raw-text body or element. More input could complete it.
    UnexpectedEof,
    /// Malformed input that no continuation can repair.
    Syntax,
}

/// Error raised while reading host markup, positioned at a 1-based line/column.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    pub line: usize,
    pub col: usize,
}

impl ParseError {
    pub(crate) fn syntax(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self { kind: ParseErrorKind::Syntax, message: msg.into(), line, col }
    }

    pub(crate) fn eof(msg: impl Into<String>, line: usize, col: usize) -> Self {
        Self { kind: ParseErrorKind::UnexpectedEof, message: msg.into(), line, col }
    }

    pub fn is_eof(&self) -> bool {
        self.kind == ParseErrorKind::UnexpectedEof
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ParseErrorKind::UnexpectedEof => "unexpected end of markup",
            ParseErrorKind::Syntax => "markup parse error",
        };
        write!(f, "{what} at {}:{}: {}", self.line, self.col, self.message)
    }
}

impl std::error::Error for ParseError {}
