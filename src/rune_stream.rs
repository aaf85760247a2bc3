//! Rune preprocessing and the lookahead scanner feeding the tokenizer.
//!
//! The preprocessor normalizes newlines per
//! [§3.3 of css-syntax-3](https://www.w3.org/TR/css-syntax-3/#input-preprocessing):
//! CRLF and lone CR become LF, FF becomes LF and NUL becomes U+FFFD. The
//! scanner layers a one-current plus three-ahead rune window on top, which is
//! exactly the lookahead the tokenizer needs.

use crate::errors::StreamError;

/// A single unit of the preprocessed stream: a scalar code point or one of
/// the two sentinels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rune {
    Ch(char),
    /// The source is exhausted; sticky.
    Eof,
    /// The source reported a non-EOF fault; sticky.
    Error,
}

use Rune::Ch;

impl Rune {
    pub fn to_char(self) -> Option<char> {
        match self {
            Ch(c) => Some(c),
            _ => None,
        }
    }

    /// Whitespace after preprocessing: space, tab or newline.
    pub fn is_whitespace(self) -> bool {
        matches!(self, Ch(' ' | '\t' | '\n'))
    }

    pub fn is_digit(self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_digit())
    }

    pub fn is_hex_digit(self) -> bool {
        matches!(self, Ch(c) if c.is_ascii_hexdigit())
    }

    /// [ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
    pub fn is_name_start(self) -> bool {
        matches!(self, Ch(c) if c == '_' || c >= '\u{0080}' || c.is_ascii_alphabetic())
    }

    /// [ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
    pub fn is_name(self) -> bool {
        self.is_name_start() || self.is_digit() || self == '-'
    }
}

/// Sentinels never compare equal to a char.
impl PartialEq<char> for Rune {
    fn eq(&self, other: &char) -> bool {
        matches!(self, Ch(c) if c == other)
    }
}

/// Anything that can hand out code points one at a time, with one rune of
/// pushback. End of input is `Err(StreamError::Eof)`; any other error is a
/// real fault.
pub trait RuneSource {
    fn read_rune(&mut self) -> Result<char, StreamError>;
    fn unread_rune(&mut self) -> Result<(), StreamError>;
}

/// In-memory rune source over a string. Never fails except for EOF.
pub struct StrSource {
    runes: Vec<char>,
    pos: usize,
}

impl From<&str> for StrSource {
    fn from(input: &str) -> Self {
        Self {
            runes: input.chars().collect(),
            pos: 0,
        }
    }
}

impl RuneSource for StrSource {
    fn read_rune(&mut self) -> Result<char, StreamError> {
        match self.runes.get(self.pos) {
            Some(&ch) => {
                self.pos += 1;
                Ok(ch)
            }
            None => Err(StreamError::Eof),
        }
    }

    fn unread_rune(&mut self) -> Result<(), StreamError> {
        if self.pos == 0 {
            return Err(StreamError::Unread("at start of input".to_string()));
        }
        self.pos -= 1;
        Ok(())
    }
}

/// Newline/NUL normalization with latching EOF and error states.
struct Preprocessor<R> {
    source: R,
    eof: bool,
    error: Option<StreamError>,
}

impl<R: RuneSource> Preprocessor<R> {
    fn new(source: R) -> Self {
        Self {
            source,
            eof: false,
            error: None,
        }
    }

    fn next_rune(&mut self) -> Rune {
        if self.error.is_some() {
            return Rune::Error;
        }
        if self.eof {
            return Rune::Eof;
        }

        let next = match self.source.read_rune() {
            Ok(ch) => ch,
            Err(StreamError::Eof) => {
                self.eof = true;
                return Rune::Eof;
            }
            Err(err) => {
                self.error = Some(err);
                return Rune::Error;
            }
        };

        match next {
            '\r' => {
                // CRLF collapses to one LF; a lone CR becomes LF with its
                // successor pushed back. A failing unread still yields the
                // synthesized LF before the latched error surfaces.
                match self.source.read_rune() {
                    Ok('\n') => {}
                    Ok(_) => {
                        if let Err(err) = self.source.unread_rune() {
                            self.error = Some(err);
                        }
                    }
                    Err(StreamError::Eof) => self.eof = true,
                    Err(err) => self.error = Some(err),
                }
                Ch('\n')
            }
            '\u{000C}' => Ch('\n'),
            '\u{0000}' => Ch('\u{FFFD}'),
            ch => Ch(ch),
        }
    }
}

/// The tokenizer's window onto the preprocessed stream: one current rune and
/// three of lookahead, with reconsume support.
///
/// The window fills lazily on the first consume; after that, `current` and
/// `peek3` never perform IO.
pub struct Scanner<R> {
    preprocessor: Preprocessor<R>,
    current: Rune,
    next: [Rune; 3],
    filled: bool,
    reconsume: bool,
}

impl<R: RuneSource> Scanner<R> {
    pub fn new(source: R) -> Self {
        Self {
            preprocessor: Preprocessor::new(source),
            current: Rune::Eof,
            next: [Rune::Eof; 3],
            filled: false,
            reconsume: false,
        }
    }

    /// The fault latched by the preprocessor, if any.
    pub fn error(&self) -> Option<&StreamError> {
        self.preprocessor.error.as_ref()
    }

    pub fn current(&self) -> Rune {
        self.current
    }

    /// The rune the next consume would yield (= `peek3()[0]`).
    pub fn next(&self) -> Rune {
        self.next[0]
    }

    /// The full three-rune lookahead window, padded with sentinels.
    pub fn peek3(&self) -> [Rune; 3] {
        self.next
    }

    /// The lookahead window up to the first sentinel, decoded.
    pub fn peek_string(&self) -> String {
        self.next
            .iter()
            .map_while(|r| r.to_char())
            .collect()
    }

    /// Mark the current rune to be yielded again by the next consume.
    pub fn reconsume(&mut self) {
        self.reconsume = true;
    }

    fn consume_one(&mut self) {
        if self.reconsume {
            self.reconsume = false;
            return;
        }
        if !self.filled {
            self.filled = true;
            self.current = self.preprocessor.next_rune();
            for slot in &mut self.next {
                *slot = self.preprocessor.next_rune();
            }
            return;
        }
        self.current = self.next[0];
        self.next[0] = self.next[1];
        self.next[1] = self.next[2];
        self.next[2] = self.preprocessor.next_rune();
    }

    /// Advance once and return the new current rune.
    pub fn consume1(&mut self) -> Rune {
        self.consume_one();
        self.current
    }

    /// Advance n times.
    pub fn consume(&mut self, n: usize) {
        for _ in 0..n {
            self.consume_one();
        }
    }
}
