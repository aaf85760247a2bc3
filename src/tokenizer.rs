//! CSS tokenizer according to the [w3 specification](https://www.w3.org/TR/css-syntax-3/#tokenization).

use std::fmt;

use crate::errors::TokenError;
use crate::rune_stream::{Rune, RuneSource, Scanner};
use crate::unicode::UnicodeChar;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

/// The payload of a `<number-token>`, `<percentage-token>` or
/// `<dimension-token>`.
///
/// Both value fields are kept alongside the verbatim repr so the repr
/// round-trips losslessly: re-parsing `repr` yields `integer` or `float`
/// again.
#[derive(Clone, Debug, PartialEq)]
pub struct Numeric {
    pub kind: NumericKind,
    pub repr: String,
    pub integer: i64,
    pub float: f64,
    /// `""` for numbers, `"%"` for percentages, the decoded identifier for
    /// dimensions.
    pub unit: String,
}

impl Numeric {
    pub(crate) fn parse(kind: NumericKind, repr: String) -> Result<Numeric, TokenError> {
        let mut num = Numeric {
            kind,
            repr,
            integer: 0,
            float: 0.0,
            unit: String::new(),
        };
        match kind {
            NumericKind::Integer => {
                num.integer = num
                    .repr
                    .parse()
                    .map_err(|_| TokenError::BadNumber(num.repr.clone()))?;
            }
            NumericKind::Float => {
                let value: f64 = num
                    .repr
                    .parse()
                    .map_err(|_| TokenError::BadNumber(num.repr.clone()))?;
                // float parsing saturates to infinity instead of failing;
                // an infinite result is the out-of-range signal
                if !value.is_finite() {
                    return Err(TokenError::BadNumber(num.repr.clone()));
                }
                num.float = value;
            }
        }
        Ok(num)
    }

    /// The numeric value regardless of kind.
    pub fn as_f64(&self) -> f64 {
        match self.kind {
            NumericKind::Integer => self.integer as f64,
            NumericKind::Float => self.float,
        }
    }
}

/// An inclusive code point interval from a `<unicode-range-token>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnicodeRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// The underlying fault; repeated forever once a stream error latches.
    Error(TokenError),
    Ident(String),
    Function(String),
    /// The value does not include the `@` marker.
    AtKeyword(String),
    /// The value does not include the `#` marker. `id` is set when the name
    /// would itself start an identifier.
    Hash { name: String, id: bool },
    /// The value does not include the quotes.
    String(String),
    /// Carries the partial payload consumed before the stray newline.
    BadString(String),
    Url(String),
    BadUrl,
    Delim(char),
    Number(Numeric),
    Percentage(Numeric),
    Dimension(Numeric),
    UnicodeRange(UnicodeRange),
    /// `~=`
    IncludeMatch,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `||`
    Column,
    /// A maximal whitespace run.
    Whitespace,
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    Colon,
    Semicolon,
    Comma,
    LParen,
    RParen,
    LSquare,
    RSquare,
    LCurly,
    RCurly,
    Eof,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }

    pub fn is_eof_or_error(&self) -> bool {
        matches!(self, Token::Eof | Token::Error(_))
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, Token::Whitespace)
    }

    pub fn is_delim(&self, delim: char) -> bool {
        matches!(self, Token::Delim(c) if *c == delim)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Token::Error(_) => "error",
            Token::Ident(_) => "ident",
            Token::Function(_) => "function",
            Token::AtKeyword(_) => "at-keyword",
            Token::Hash { .. } => "hash",
            Token::String(_) => "string",
            Token::BadString(_) => "bad-string",
            Token::Url(_) => "url",
            Token::BadUrl => "bad-url",
            Token::Delim(_) => "delim",
            Token::Number(_) => "number",
            Token::Percentage(_) => "percentage",
            Token::Dimension(_) => "dimension",
            Token::UnicodeRange(_) => "unicode-range",
            Token::IncludeMatch => "~=",
            Token::DashMatch => "|=",
            Token::PrefixMatch => "^=",
            Token::SuffixMatch => "$=",
            Token::SubstringMatch => "*=",
            Token::Column => "||",
            Token::Whitespace => "whitespace",
            Token::Cdo => "<!--",
            Token::Cdc => "-->",
            Token::Colon => ":",
            Token::Semicolon => ";",
            Token::Comma => ",",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LSquare => "[",
            Token::RSquare => "]",
            Token::LCurly => "{",
            Token::RCurly => "}",
            Token::Eof => "eof",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(val)
            | Token::Function(val)
            | Token::AtKeyword(val)
            | Token::String(val)
            | Token::BadString(val)
            | Token::Url(val) => write!(f, "{val}"),
            Token::Hash { name, .. } => write!(f, "{name}"),
            Token::Delim(c) => write!(f, "{c}"),
            Token::Number(num) | Token::Percentage(num) | Token::Dimension(num) => {
                write!(f, "{}{}", num.repr, num.unit)
            }
            Token::UnicodeRange(range) => write!(f, "U+{:04X}-{:04X}", range.start, range.end),
            Token::Error(err) => write!(f, "{err}"),
            token => write!(f, "{}", token.name()),
        }
    }
}

/// [4.3.9. Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#check-if-three-code-points-would-start-an-ident-sequence)
fn starts_ident(window: &[Rune; 3]) -> bool {
    let (first, second) = if window[0] == '-' {
        (window[1], window[2])
    } else {
        (window[0], window[1])
    };
    first.is_name_start() || starts_escape(first, second)
}

/// [4.3.8. Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn starts_escape(first: Rune, second: Rune) -> bool {
    first == '\\' && second != '\n'
}

/// [non-printable code point](https://www.w3.org/TR/css-syntax-3/#non-printable-code-point)
fn is_non_printable(ch: char) -> bool {
    (UnicodeChar::NULL..=UnicodeChar::BACKSPACE).contains(&ch)
        || ch == UnicodeChar::LINE_TABULATION
        || (UnicodeChar::SHIFT_OUT..=UnicodeChar::INFORMATION_SEPARATOR_ONE).contains(&ch)
        || ch == UnicodeChar::DELETE
}

/// Converts the scanner's rune window into tokens, one per call.
pub struct Tokenizer<R> {
    scanner: Scanner<R>,
}

impl<R: RuneSource> Tokenizer<R> {
    pub fn new(source: R) -> Self {
        Self {
            scanner: Scanner::new(source),
        }
    }

    fn stream_error(&self) -> Option<Token> {
        self.scanner
            .error()
            .map(|err| Token::Error(TokenError::Stream(err.clone())))
    }

    /// 4.3.1. [Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    ///
    /// Returns exactly one token and leaves the scanner on the last rune the
    /// token classified. Comments are stripped without producing a token; a
    /// maximal whitespace run produces one `Whitespace` token.
    pub fn consume_token(&mut self) -> Token {
        let mut ch = Rune::Eof;
        while self.scanner.error().is_none() {
            ch = self.scanner.consume1();
            if ch == Rune::Eof {
                return Token::Eof;
            }
            if ch.is_whitespace() {
                self.skip_whitespace();
                self.scanner.reconsume();
                return Token::Whitespace;
            }
            if ch != '/' {
                break;
            }
            if self.scanner.next() == '*' {
                self.skip_comment();
            } else {
                return Token::Delim('/');
            }
        }
        if let Some(token) = self.stream_error() {
            return token;
        }
        let ch = match ch.to_char() {
            Some(ch) => ch,
            None => return Token::Eof,
        };

        match ch {
            '"' | '\'' => self.consume_string(ch),
            '#' => {
                let next3 = self.scanner.peek3();
                if next3[0].is_name() || (next3[0] == '\\' && next3[1] != '\n') {
                    let id = starts_ident(&next3);
                    self.scanner.consume(1);
                    let name = self.consume_name();
                    return Token::Hash { name, id };
                }
                Token::Delim(ch)
            }
            ',' => Token::Comma,
            ':' => Token::Colon,
            ';' => Token::Semicolon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '[' => Token::LSquare,
            ']' => Token::RSquare,
            '{' => Token::LCurly,
            '}' => Token::RCurly,
            '<' => {
                if self.scanner.peek_string() == "!--" {
                    self.scanner.consume(3);
                    return Token::Cdo;
                }
                Token::Delim(ch)
            }
            '@' => {
                if starts_ident(&self.scanner.peek3()) {
                    self.scanner.consume(1);
                    return Token::AtKeyword(self.consume_name());
                }
                Token::Delim(ch)
            }
            '\\' => {
                if self.scanner.next() != '\n' {
                    return self.consume_ident_like();
                }
                // stray backslash before a newline is a parse error
                Token::Delim(ch)
            }
            '$' => self.delim_or_match(ch, Token::SuffixMatch),
            '*' => self.delim_or_match(ch, Token::SubstringMatch),
            '^' => self.delim_or_match(ch, Token::PrefixMatch),
            '~' => self.delim_or_match(ch, Token::IncludeMatch),
            '+' => {
                let next3 = self.scanner.peek3();
                if next3[0].is_digit() || (next3[0] == '.' && next3[1].is_digit()) {
                    return self.consume_numeric();
                }
                Token::Delim(ch)
            }
            '-' => {
                let next3 = self.scanner.peek3();
                if next3[0].is_digit() || (next3[0] == '.' && next3[1].is_digit()) {
                    return self.consume_numeric();
                }
                if starts_ident(&[Rune::Ch('-'), next3[0], next3[1]]) {
                    return self.consume_ident_like();
                }
                if next3[0] == '-' && next3[1] == '>' {
                    self.scanner.consume(2);
                    return Token::Cdc;
                }
                Token::Delim(ch)
            }
            '.' => {
                if self.scanner.next().is_digit() {
                    return self.consume_numeric();
                }
                Token::Delim(ch)
            }
            '|' => match self.scanner.next() {
                next if next == '=' => {
                    self.scanner.consume1();
                    Token::DashMatch
                }
                next if next == '|' => {
                    self.scanner.consume1();
                    Token::Column
                }
                _ => Token::Delim(ch),
            },
            'U' | 'u' => {
                let next3 = self.scanner.peek3();
                if next3[0] == '+' && (next3[1] == '?' || next3[1].is_hex_digit()) {
                    return self.consume_unicode_range();
                }
                self.consume_ident_like()
            }
            c if c.is_ascii_digit() => self.consume_numeric(),
            c if Rune::Ch(c).is_name_start() => self.consume_ident_like(),
            c => Token::Delim(c),
        }
    }

    /// 4.3.2. [Consume comments](https://www.w3.org/TR/css-syntax-3/#comment-diagram)
    ///
    /// Expects the scanner on the `/` of `/*`; stops after the closing `*/`
    /// or at EOF.
    fn skip_comment(&mut self) {
        let mut star = false;
        self.scanner.consume1();
        loop {
            if self.scanner.error().is_some() || self.scanner.current() == Rune::Eof {
                break;
            }
            self.scanner.consume1();
            if star && self.scanner.current() == '/' {
                break;
            }
            star = self.scanner.current() == '*';
        }
    }

    /// 4.3.3. [Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    ///
    /// Returns a `<number-token>`, `<percentage-token>` or
    /// `<dimension-token>`, or an `Error` token when the repr overflows.
    fn consume_numeric(&mut self) -> Token {
        let mut num = match self.consume_number() {
            Ok(num) => num,
            Err(err) => return Token::Error(err),
        };
        let next3 = self.scanner.peek3();
        if starts_ident(&[self.scanner.current(), next3[0], next3[1]]) {
            num.unit = self.consume_name();
            return Token::Dimension(num);
        }
        if self.scanner.current() == '%' {
            num.unit = "%".to_string();
            return Token::Percentage(num);
        }
        self.scanner.reconsume();
        Token::Number(num)
    }

    /// 4.3.12. [Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    fn consume_number(&mut self) -> Result<Numeric, TokenError> {
        let mut repr = String::with_capacity(8);
        let mut kind = NumericKind::Integer;
        let mut cur = self.scanner.current();

        if let Rune::Ch(sign @ ('+' | '-')) = cur {
            repr.push(sign);
            cur = self.scanner.consume1();
        }

        while let Rune::Ch(digit @ '0'..='9') = cur {
            repr.push(digit);
            cur = self.scanner.consume1();
        }

        if cur == '.' && self.scanner.next().is_digit() {
            kind = NumericKind::Float;
            repr.push('.');
            cur = self.scanner.consume1();
            while let Rune::Ch(digit @ '0'..='9') = cur {
                repr.push(digit);
                cur = self.scanner.consume1();
            }
        }

        let next3 = self.scanner.peek3();
        if matches!(cur, Rune::Ch('e' | 'E'))
            && (next3[0].is_digit()
                || (matches!(next3[0], Rune::Ch('+' | '-')) && next3[1].is_digit()))
        {
            kind = NumericKind::Float;
            if let Rune::Ch(e) = cur {
                repr.push(e);
            }
            cur = self.scanner.consume1();
            if let Rune::Ch(sign @ ('+' | '-')) = cur {
                repr.push(sign);
                cur = self.scanner.consume1();
            }
            while let Rune::Ch(digit @ '0'..='9') = cur {
                repr.push(digit);
                cur = self.scanner.consume1();
            }
        }

        Numeric::parse(kind, repr)
    }

    /// 4.3.11. [Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    ///
    /// The caller must have checked that an ident sequence starts at the
    /// current rune; this routine does no verification of its own.
    fn consume_name(&mut self) -> String {
        let mut value = String::new();
        let mut ch = self.scanner.current();
        let mut ch2 = self.scanner.next();
        self.scanner.reconsume();
        loop {
            if ch.is_name() {
                if let Rune::Ch(c) = ch {
                    value.push(c);
                }
                self.scanner.consume(1);
            } else if ch == '\\' && ch2 != '\n' {
                self.scanner.consume(1);
                value.push(self.consume_escape());
            } else {
                break;
            }
            let next3 = self.scanner.peek3();
            ch = next3[0];
            ch2 = next3[1];
        }
        value
    }

    /// 4.3.4. [Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// Returns an `<ident-token>`, `<function-token>`, `<url-token>` or
    /// `<bad-url-token>`.
    fn consume_ident_like(&mut self) -> Token {
        let name = self.consume_name();
        if self.scanner.next() == '(' {
            if name.eq_ignore_ascii_case("url") {
                return self.consume_url();
            }
            self.scanner.consume1();
            return Token::Function(name);
        }
        Token::Ident(name)
    }

    /// 4.3.6. [Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url(&mut self) -> Token {
        self.scanner.consume(2);
        self.skip_whitespace();

        let cur = self.scanner.current();
        if matches!(cur, Rune::Eof | Rune::Error) {
            return Token::Url(String::new());
        }
        if let Rune::Ch(quote @ ('"' | '\'')) = cur {
            return match self.consume_string(quote) {
                Token::BadString(_) => self.consume_bad_url_remnants(),
                Token::String(value) => {
                    self.scanner.consume1();
                    self.skip_whitespace();
                    let cur = self.scanner.current();
                    if cur != ')' && !matches!(cur, Rune::Eof | Rune::Error) {
                        return self.consume_bad_url_remnants();
                    }
                    Token::Url(value)
                }
                token => token,
            };
        }

        let mut url = String::new();
        let mut cur = cur;
        loop {
            match cur {
                Rune::Eof | Rune::Error => break,
                Rune::Ch(')') => break,
                ws if ws.is_whitespace() => {
                    self.skip_whitespace();
                    if self.scanner.current() != ')' {
                        return self.consume_bad_url_remnants();
                    }
                    break;
                }
                Rune::Ch('"' | '\'' | '(') => return self.consume_bad_url_remnants(),
                Rune::Ch(c) if is_non_printable(c) => return self.consume_bad_url_remnants(),
                Rune::Ch('\\') => {
                    if self.scanner.next() == '\n' {
                        return self.consume_bad_url_remnants();
                    }
                    url.push(self.consume_escape());
                    cur = self.scanner.consume1();
                }
                Rune::Ch(c) => {
                    url.push(c);
                    cur = self.scanner.consume1();
                }
            }
        }
        Token::Url(url)
    }

    /// 4.3.14. [Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Consumes enough input to reach a recovery point where normal
    /// tokenizing can resume.
    fn consume_bad_url_remnants(&mut self) -> Token {
        loop {
            match self.scanner.current() {
                Rune::Eof | Rune::Error => break,
                Rune::Ch(')') => break,
                Rune::Ch('\\') if self.scanner.next() != '\n' => {
                    self.consume_escape();
                }
                _ => {}
            }
            self.scanner.consume1();
        }
        Token::BadUrl
    }

    /// 4.3.5. [Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    ///
    /// Returns a `<string-token>` or, on a stray newline, a
    /// `<bad-string-token>` with the newline reconsumed.
    fn consume_string(&mut self, delim: char) -> Token {
        let mut value = String::new();
        loop {
            let ch = self.scanner.consume1();
            match ch {
                Rune::Eof | Rune::Error => break,
                Rune::Ch(c) if c == delim => break,
                Rune::Ch('\n') => {
                    self.scanner.reconsume();
                    return Token::BadString(value);
                }
                Rune::Ch('\\') => match self.scanner.next() {
                    Rune::Eof | Rune::Error => break,
                    Rune::Ch('\n') => {
                        self.scanner.consume1();
                    }
                    _ => value.push(self.consume_escape()),
                },
                Rune::Ch(c) => value.push(c),
            }
        }
        Token::String(value)
    }

    /// Consume up to `max` hex digits starting at the current rune, which the
    /// caller guarantees is one. Leaves the scanner on the last digit.
    fn consume_hex_code(&mut self, max: u32) -> (u32, u32) {
        let mut code = 0;
        let mut length = 0;
        self.scanner.reconsume();
        while length < max {
            if let Some(digit) = self.scanner.consume1().to_char().and_then(|c| c.to_digit(16)) {
                code = code * 16 + digit;
            }
            length += 1;
            if !self.scanner.next().is_hex_digit() {
                break;
            }
        }
        (code, length)
    }

    /// 4.3.7. [Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    ///
    /// Expects the scanner on the backslash. NUL, surrogates and
    /// out-of-range values fold to U+FFFD.
    fn consume_escape(&mut self) -> char {
        let cur = self.scanner.consume1();
        let c = match cur {
            Rune::Eof | Rune::Error => return UnicodeChar::REPLACEMENT_CHARACTER,
            Rune::Ch(c) => c,
        };
        if !c.is_ascii_hexdigit() {
            return c;
        }
        let (code, _) = self.consume_hex_code(6);
        if self.scanner.next().is_whitespace() {
            self.scanner.consume1();
        }
        if code == 0 || (0xD800..=0xDFFF).contains(&code) || code >= UnicodeChar::MAX_ALLOWED {
            return UnicodeChar::REPLACEMENT_CHARACTER;
        }
        char::from_u32(code).unwrap_or(UnicodeChar::REPLACEMENT_CHARACTER)
    }

    /// Consume a unicode range after the `u`/`U`; the caller has checked the
    /// `+?`/`+hex` lookahead.
    ///
    /// When question marks are present the range is the wildcarded interval
    /// and any trailing `-hex` part is left for the next token: `u+100?-1011`
    /// yields (0x1000, 0x100f).
    fn consume_unicode_range(&mut self) -> Token {
        let mut code = 0;
        let mut length = 0;
        self.scanner.consume(2);
        if self.scanner.current().is_hex_digit() {
            let (c, l) = self.consume_hex_code(6);
            code = c;
            length = l;
            self.scanner.consume1();
        }

        let mut qs = 0;
        while qs < 6 - length && self.scanner.current() == '?' {
            qs += 1;
            self.scanner.consume1();
        }
        if qs > 0 {
            let start = code << (4 * qs);
            let end = start | ((1 << (4 * qs)) - 1);
            self.scanner.reconsume();
            return Token::UnicodeRange(UnicodeRange { start, end });
        }

        let start = code;
        let mut end = start;
        if self.scanner.current() == '-' && self.scanner.next().is_hex_digit() {
            self.scanner.consume(1);
            let (c, _) = self.consume_hex_code(6);
            end = c;
        } else {
            self.scanner.reconsume();
        }
        Token::UnicodeRange(UnicodeRange { start, end })
    }

    fn delim_or_match(&mut self, ch: char, matched: Token) -> Token {
        if self.scanner.next() == '=' {
            self.scanner.consume1();
            return matched;
        }
        Token::Delim(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.scanner.current().is_whitespace() {
            self.scanner.consume1();
        }
    }
}
