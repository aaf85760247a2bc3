//! Error results that can be returned from the css3 front-end and the sass lexer

use thiserror::Error;

/// Faults reported by a rune source or latched by the preprocessor.
///
/// `Eof` is the distinguished end-of-input value; every other variant is a
/// real fault that latches and poisons the stream.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("end of input")]
    Eof,

    #[error("read failed: {0}")]
    Read(String),

    #[error("unread failed: {0}")]
    Unread(String),
}

/// Faults carried by an `Error` token.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The underlying rune source failed; every later token repeats this.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// A numeric repr was consumed but does not fit the value type.
    #[error("bad number: {0}")]
    BadNumber(String),
}

/// Syntactic failures surfaced as `Error` nodes in the parser output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("invalid syntax")]
    Syntax,

    #[error("empty")]
    Empty,

    #[error("extra input")]
    ExtraInput,

    #[error("unexpected }}")]
    UnmatchedCurly,

    #[error("unexpected ]")]
    UnmatchedSquare,

    #[error("unexpected )")]
    UnmatchedParen,
}

/// Faults reported by the sass lexer. The lexer emits one error token and
/// stops; the next token is `Eof`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SassLexError {
    #[error("unterminated comment")]
    UnterminatedComment,

    #[error("invalid variable")]
    InvalidVariable,

    #[error("invalid rgb")]
    InvalidRgb,

    #[error("bad number: {0}")]
    BadNumber(String),

    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
}
