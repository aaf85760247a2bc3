//! The sass pull lexer.
//!
//! Recognizer order per token: comment, variable, `#rgb`, number, keyword,
//! identifier, operator. The operator and keyword vocabularies and the
//! numeric units live in longest-prefix tries; lexing stops after the first
//! error token.

use lazy_static::lazy_static;

use crate::errors::SassLexError;
use crate::sass::trie::Trie;
use crate::sass::{Color, Number, Token, TokenKind, TokenValue, Unit};

lazy_static! {
    static ref KEYWORDS: Trie<TokenKind> =
        Trie::from_entries(&[("and", TokenKind::And), ("or", TokenKind::Or)]);

    static ref OPERATORS: Trie<TokenKind> = Trie::from_entries(&[
        (".", TokenKind::Period),
        (",", TokenKind::Comma),
        (":", TokenKind::Colon),
        (";", TokenKind::Semicolon),
        ("{", TokenKind::LeftBrace),
        ("}", TokenKind::RightBrace),
        ("[", TokenKind::LeftBracket),
        ("]", TokenKind::RightBracket),
        ("(", TokenKind::LeftParen),
        (")", TokenKind::RightParen),
        ("&", TokenKind::Amp),
        ("+", TokenKind::Plus),
        ("-", TokenKind::Minus),
        ("/", TokenKind::Slash),
        ("*", TokenKind::Star),
        ("==", TokenKind::Eq),
        ("!=", TokenKind::Ne),
        ("<=", TokenKind::Lte),
        ("<", TokenKind::Lt),
        (">=", TokenKind::Gte),
        (">", TokenKind::Gt),
        ("!important", TokenKind::Important),
        ("!default", TokenKind::Default),
        ("@debug", TokenKind::Debug),
        ("@warn", TokenKind::Warn),
        ("@include", TokenKind::Include),
        ("@extend", TokenKind::Extend),
        ("@if", TokenKind::If),
        ("@else", TokenKind::Else),
        ("@else if", TokenKind::ElseIf),
        ("@for", TokenKind::For),
        ("@mixin", TokenKind::Mixin),
        ("@function", TokenKind::Function),
        ("@return", TokenKind::Return),
        ("@option", TokenKind::Option),
        ("@import", TokenKind::Import),
        ("@media", TokenKind::Media),
        ("@font-face", TokenKind::FontFace),
        ("@variables", TokenKind::Variables),
        ("@vars", TokenKind::Variables),
        ("@page", TokenKind::Page),
        ("@charset", TokenKind::Charset),
    ]);

    static ref UNITS: Trie<Unit> = Trie::from_entries(&[
        ("%", Unit::Percent),
        ("em", Unit::Em),
        ("ex", Unit::Ex),
        ("ch", Unit::Ch),
        ("rem", Unit::Rem),
        ("vw", Unit::Vw),
        ("vh", Unit::Vh),
        ("vmin", Unit::Vmin),
        ("vmax", Unit::Vmax),
        ("cm", Unit::Cm),
        ("mm", Unit::Mm),
        ("in", Unit::In),
        ("px", Unit::Px),
        ("pt", Unit::Pt),
        ("pc", Unit::Pc),
    ]);
}

pub struct Lexer<'input> {
    input: &'input str,
    offset: usize,
    last_width: usize,
    done: bool,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Self {
            input,
            offset: 0,
            last_width: 0,
            done: false,
        }
    }

    /// Produce the next token. After an error token or EOF, keeps yielding
    /// EOF at the stop position.
    pub fn next_token(&mut self) -> Token {
        if self.done {
            return Token::eof(self.offset);
        }
        self.skip_space();
        if self.offset >= self.input.len() {
            self.done = true;
            return Token::eof(self.offset);
        }

        let mut token = Token {
            kind: TokenKind::Error,
            offset: self.offset,
            width: 0,
            value: TokenValue::None,
        };
        let matched = self.comment(&mut token)
            || self.variable(&mut token)
            || self.rgb(&mut token)
            || self.number(&mut token)
            || self.keyword(&mut token)
            || self.ident(&mut token)
            || self.operator(&mut token);
        if !matched {
            let (ch, _) = self.peek();
            token.value = TokenValue::Error(SassLexError::UnexpectedChar(ch));
        }
        if token.kind == TokenKind::Error {
            self.done = true;
        }
        log::trace!("{token:?}");
        token
    }

    fn next(&mut self) -> (char, usize) {
        match self.input[self.offset..].chars().next() {
            Some(ch) => {
                let width = ch.len_utf8();
                self.last_width = width;
                self.offset += width;
                (ch, width)
            }
            None => {
                self.last_width = 0;
                ('\0', 0)
            }
        }
    }

    fn unread(&mut self) {
        self.offset -= self.last_width;
        self.last_width = 0;
    }

    fn peek(&mut self) -> (char, usize) {
        let (ch, width) = self.next();
        self.unread();
        (ch, width)
    }

    fn skip_space(&mut self) {
        loop {
            let (ch, width) = self.next();
            if width == 0 || !ch.is_whitespace() {
                self.unread();
                return;
            }
        }
    }

    /// `//` line comments (newline excluded) and `/* */` block comments
    /// (closing `*/` trimmed). An unterminated block comment is an error.
    fn comment(&mut self, token: &mut Token) -> bool {
        let prev_offset = self.offset;

        let (ch, _) = self.next();
        if ch != '/' {
            self.unread();
            return false;
        }

        let (ch, _) = self.next();
        match ch {
            '/' => {
                let begin = self.offset;
                let (mut ch, mut width) = self.next();
                while width > 0 && ch != '\n' {
                    let n = self.next();
                    ch = n.0;
                    width = n.1;
                }
                self.unread();
                token.kind = TokenKind::Comment;
                token.value = TokenValue::Text(self.input[begin..self.offset].to_string());
                token.width = self.offset - prev_offset;
            }
            '*' => {
                let begin = self.offset;
                let mut star_offset = 0;
                let mut star = false;
                let (mut ch, mut width) = self.next();
                loop {
                    if star && ch == '/' {
                        break;
                    }
                    if width == 0 {
                        token.value = TokenValue::Error(SassLexError::UnterminatedComment);
                        return true;
                    }
                    star = ch == '*';
                    if star {
                        star_offset = self.offset - width;
                    }
                    let n = self.next();
                    ch = n.0;
                    width = n.1;
                }
                token.kind = TokenKind::Comment;
                token.value = TokenValue::Text(self.input[begin..star_offset].to_string());
                token.width = self.offset - prev_offset;
            }
            _ => {
                self.unread();
                self.offset = prev_offset;
                return false;
            }
        }
        true
    }

    fn variable(&mut self, token: &mut Token) -> bool {
        let (ch, width) = self.next();
        if ch != '$' {
            self.unread();
            return false;
        }
        if !self.ident(token) {
            token.value = TokenValue::Error(SassLexError::InvalidVariable);
            return true;
        }
        token.kind = TokenKind::Var;
        token.width += width;
        true
    }

    fn rgb(&mut self, token: &mut Token) -> bool {
        let begin = self.offset;
        let (ch, _) = self.next();
        if ch != '#' {
            self.unread();
            return false;
        }
        let (mut ch, mut width) = self.next();
        while width > 0 && ch.is_ascii_hexdigit() {
            let n = self.next();
            ch = n.0;
            width = n.1;
        }
        self.unread();

        match Color::parse(&self.input[begin..self.offset]) {
            Ok(color) => {
                token.kind = TokenKind::Rgb;
                token.value = TokenValue::Color(color);
                token.width = self.offset - begin;
            }
            Err(err) => token.value = TokenValue::Error(err),
        }
        true
    }

    fn number(&mut self, token: &mut Token) -> bool {
        let begin = self.offset;
        let (mut ch, mut width) = self.next();
        if ch == '-' || ch == '+' {
            let n = self.next();
            ch = n.0;
            width = n.1;
            if ch != '.' && !ch.is_ascii_digit() {
                self.offset = begin;
                return false;
            }
        } else if ch == '.' {
            let (peeked, _) = self.peek();
            if !peeked.is_ascii_digit() {
                self.offset = begin;
                return false;
            }
        } else if !ch.is_ascii_digit() {
            self.offset = begin;
            return false;
        }
        while width > 0 && ch.is_ascii_digit() {
            let n = self.next();
            ch = n.0;
            width = n.1;
        }
        if ch == '.' {
            let n = self.next();
            ch = n.0;
            width = n.1;
            while width > 0 && ch.is_ascii_digit() {
                let n = self.next();
                ch = n.0;
                width = n.1;
            }
        }
        if ch == 'e' {
            // a bare `e` with no exponent is re-lexed, so `1em` stays a
            // number with a unit
            let exponent_start = self.offset - width;
            let n = self.next();
            ch = n.0;
            width = n.1;
            if ch == '-' || ch == '+' || ch.is_ascii_digit() {
                while width > 0 && ch.is_ascii_digit() {
                    let n = self.next();
                    ch = n.0;
                    width = n.1;
                }
                self.unread();
            } else {
                self.unread();
                self.offset = exponent_start;
            }
        } else {
            self.unread();
        }

        let repr = &self.input[begin..self.offset];
        let value: f64 = match repr.parse() {
            Ok(value) if f64::is_finite(value) => value,
            _ => {
                token.value = TokenValue::Error(SassLexError::BadNumber(repr.to_string()));
                return true;
            }
        };

        token.kind = TokenKind::Number;
        let (unit, unit_width) = UNITS.longest_match(&self.input[self.offset..]);
        self.offset += unit_width;
        token.value = TokenValue::Number(Number {
            value,
            unit: unit.unwrap_or(Unit::None),
        });
        token.width = self.offset - begin;
        true
    }

    fn keyword(&mut self, token: &mut Token) -> bool {
        self.trie_token(token, &KEYWORDS)
    }

    fn operator(&mut self, token: &mut Token) -> bool {
        self.trie_token(token, &OPERATORS)
    }

    fn trie_token(&mut self, token: &mut Token, trie: &Trie<TokenKind>) -> bool {
        let (kind, width) = trie.longest_match(&self.input[self.offset..]);
        match kind {
            Some(kind) if width > 0 => {
                token.kind = kind;
                token.value =
                    TokenValue::Text(self.input[self.offset..self.offset + width].to_string());
                token.width = width;
                self.offset += width;
                true
            }
            _ => false,
        }
    }

    fn ident(&mut self, token: &mut Token) -> bool {
        let begin = self.offset;
        let (mut ch, mut width) = self.next();
        if ch == '-' {
            let (peeked, peeked_width) = self.peek();
            if peeked != '_' && !peeked.is_alphabetic() {
                self.offset = begin;
                return false;
            }
            ch = peeked;
            width = peeked_width;
        } else if ch != '_' && !ch.is_alphabetic() {
            self.unread();
            return false;
        }
        while width > 0 && (ch == '_' || ch == '-' || ch.is_alphabetic() || ch.is_numeric()) {
            let n = self.next();
            ch = n.0;
            width = n.1;
        }
        self.unread();
        token.kind = TokenKind::Ident;
        token.value = TokenValue::Text(self.input[begin..self.offset].to_string());
        token.width = self.offset - begin;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if eof {
                break;
            }
        }
        tokens
    }

    fn tok(kind: TokenKind, offset: usize, width: usize, value: TokenValue) -> Token {
        Token {
            kind,
            offset,
            width,
            value,
        }
    }

    fn text(s: &str) -> TokenValue {
        TokenValue::Text(s.to_string())
    }

    fn num(value: f64, unit: Unit) -> TokenValue {
        TokenValue::Number(Number { value, unit })
    }

    #[test]
    fn operators() {
        use TokenKind::*;
        assert_eq!(
            tokenize(".,:;{}[]()&+-*"),
            vec![
                tok(Period, 0, 1, text(".")),
                tok(Comma, 1, 1, text(",")),
                tok(Colon, 2, 1, text(":")),
                tok(Semicolon, 3, 1, text(";")),
                tok(LeftBrace, 4, 1, text("{")),
                tok(RightBrace, 5, 1, text("}")),
                tok(LeftBracket, 6, 1, text("[")),
                tok(RightBracket, 7, 1, text("]")),
                tok(LeftParen, 8, 1, text("(")),
                tok(RightParen, 9, 1, text(")")),
                tok(Amp, 10, 1, text("&")),
                tok(Plus, 11, 1, text("+")),
                tok(Minus, 12, 1, text("-")),
                tok(Star, 13, 1, text("*")),
                Token::eof(14),
            ]
        );

        assert_eq!(
            tokenize("andor==!=<=<>=>"),
            vec![
                tok(And, 0, 3, text("and")),
                tok(Or, 3, 2, text("or")),
                tok(Eq, 5, 2, text("==")),
                tok(Ne, 7, 2, text("!=")),
                tok(Lte, 9, 2, text("<=")),
                tok(Lt, 11, 1, text("<")),
                tok(Gte, 12, 2, text(">=")),
                tok(Gt, 14, 1, text(">")),
                Token::eof(15),
            ]
        );
    }

    #[test]
    fn directives() {
        use TokenKind::*;
        assert_eq!(
            tokenize("!important !default @debug @warn @include @extend"),
            vec![
                tok(Important, 0, 10, text("!important")),
                tok(Default, 11, 8, text("!default")),
                tok(Debug, 20, 6, text("@debug")),
                tok(Warn, 27, 5, text("@warn")),
                tok(Include, 33, 8, text("@include")),
                tok(Extend, 42, 7, text("@extend")),
                Token::eof(49),
            ]
        );

        assert_eq!(
            tokenize("@if @else @else if @for @mixin @function @return"),
            vec![
                tok(If, 0, 3, text("@if")),
                tok(Else, 4, 5, text("@else")),
                tok(ElseIf, 10, 8, text("@else if")),
                tok(For, 19, 4, text("@for")),
                tok(Mixin, 24, 6, text("@mixin")),
                tok(Function, 31, 9, text("@function")),
                tok(Return, 41, 7, text("@return")),
                Token::eof(48),
            ]
        );

        assert_eq!(
            tokenize("@option @import @media @font-face @variables @vars @page @charset"),
            vec![
                tok(Option, 0, 7, text("@option")),
                tok(Import, 8, 7, text("@import")),
                tok(Media, 16, 6, text("@media")),
                tok(FontFace, 23, 10, text("@font-face")),
                tok(Variables, 34, 10, text("@variables")),
                tok(Variables, 45, 5, text("@vars")),
                tok(Page, 51, 5, text("@page")),
                tok(Charset, 57, 8, text("@charset")),
                Token::eof(65),
            ]
        );
    }

    #[test]
    fn whitespace_is_skipped() {
        use TokenKind::*;
        assert_eq!(
            tokenize(". ,  : \n ;  "),
            vec![
                tok(Period, 0, 1, text(".")),
                tok(Comma, 2, 1, text(",")),
                tok(Colon, 5, 1, text(":")),
                tok(Semicolon, 9, 1, text(";")),
                Token::eof(12),
            ]
        );
    }

    #[test]
    fn comments() {
        use TokenKind::*;
        assert_eq!(
            tokenize("/ //* \n*/ /*\ntest */"),
            vec![
                tok(Slash, 0, 1, text("/")),
                tok(Comment, 2, 4, text("* ")),
                tok(Star, 7, 1, text("*")),
                tok(Slash, 8, 1, text("/")),
                tok(Comment, 10, 10, text("\ntest ")),
                Token::eof(20),
            ]
        );
    }

    #[test]
    fn numbers() {
        use TokenKind::*;
        assert_eq!(
            tokenize("0 1 -1 +1 0.1 1. -0.1 +.1"),
            vec![
                tok(Number, 0, 1, num(0.0, Unit::None)),
                tok(Number, 2, 1, num(1.0, Unit::None)),
                tok(Number, 4, 2, num(-1.0, Unit::None)),
                tok(Number, 7, 2, num(1.0, Unit::None)),
                tok(Number, 10, 3, num(0.1, Unit::None)),
                tok(Number, 14, 2, num(1.0, Unit::None)),
                tok(Number, 17, 4, num(-0.1, Unit::None)),
                tok(Number, 22, 3, num(0.1, Unit::None)),
                Token::eof(25),
            ]
        );

        assert_eq!(
            tokenize("1ex 1e-x"),
            vec![
                tok(Number, 0, 3, num(1.0, Unit::Ex)),
                tok(
                    Error,
                    4,
                    0,
                    TokenValue::Error(SassLexError::BadNumber("1e".to_string()))
                ),
                Token::eof(6),
            ]
        );
    }

    #[test]
    fn units() {
        use TokenKind::*;
        assert_eq!(
            tokenize("1 1e2% 2ex 3em 4ch 5rem 6vw 7vh 8vmin 9vmax 0cm 1mm 2in 3px 4pt 5pc"),
            vec![
                tok(Number, 0, 1, num(1.0, Unit::None)),
                tok(Number, 2, 4, num(100.0, Unit::Percent)),
                tok(Number, 7, 3, num(2.0, Unit::Ex)),
                tok(Number, 11, 3, num(3.0, Unit::Em)),
                tok(Number, 15, 3, num(4.0, Unit::Ch)),
                tok(Number, 19, 4, num(5.0, Unit::Rem)),
                tok(Number, 24, 3, num(6.0, Unit::Vw)),
                tok(Number, 28, 3, num(7.0, Unit::Vh)),
                tok(Number, 32, 5, num(8.0, Unit::Vmin)),
                tok(Number, 38, 5, num(9.0, Unit::Vmax)),
                tok(Number, 44, 3, num(0.0, Unit::Cm)),
                tok(Number, 48, 3, num(1.0, Unit::Mm)),
                tok(Number, 52, 3, num(2.0, Unit::In)),
                tok(Number, 56, 3, num(3.0, Unit::Px)),
                tok(Number, 60, 3, num(4.0, Unit::Pt)),
                tok(Number, 64, 3, num(5.0, Unit::Pc)),
                Token::eof(67),
            ]
        );
    }

    #[test]
    fn identifiers() {
        use TokenKind::*;
        assert_eq!(
            tokenize("ab a-b -a-b -_a - 0a -1 ---a0 _0ಠ"),
            vec![
                tok(Ident, 0, 2, text("ab")),
                tok(Ident, 3, 3, text("a-b")),
                tok(Ident, 7, 4, text("-a-b")),
                tok(Ident, 12, 3, text("-_a")),
                tok(Minus, 16, 1, text("-")),
                tok(Number, 18, 1, num(0.0, Unit::None)),
                tok(Ident, 19, 1, text("a")),
                tok(Number, 21, 2, num(-1.0, Unit::None)),
                tok(Minus, 24, 1, text("-")),
                tok(Minus, 25, 1, text("-")),
                tok(Ident, 26, 3, text("-a0")),
                tok(Ident, 30, 5, text("_0ಠ")),
                Token::eof(35),
            ]
        );
    }

    #[test]
    fn variables() {
        use TokenKind::*;
        assert_eq!(
            tokenize("$test $-test $ "),
            vec![
                tok(Var, 0, 5, text("test")),
                tok(Var, 6, 6, text("-test")),
                tok(
                    Error,
                    13,
                    0,
                    TokenValue::Error(SassLexError::InvalidVariable)
                ),
                Token::eof(14),
            ]
        );
    }

    #[test]
    fn rgb_literals() {
        use TokenKind::*;
        assert_eq!(
            tokenize("#123 #123456 #1"),
            vec![
                tok(
                    Rgb,
                    0,
                    4,
                    TokenValue::Color(Color {
                        r: 0x11,
                        g: 0x22,
                        b: 0x33,
                        a: 0
                    })
                ),
                tok(
                    Rgb,
                    5,
                    7,
                    TokenValue::Color(Color {
                        r: 0x12,
                        g: 0x34,
                        b: 0x56,
                        a: 0
                    })
                ),
                tok(Error, 13, 0, TokenValue::Error(SassLexError::InvalidRgb)),
                Token::eof(15),
            ]
        );
    }

    #[test]
    fn lex_errors_stop_the_stream() {
        use TokenKind::*;
        assert_eq!(
            tokenize("/*"),
            vec![
                tok(
                    Error,
                    0,
                    0,
                    TokenValue::Error(SassLexError::UnterminatedComment)
                ),
                Token::eof(2),
            ]
        );

        assert_eq!(
            tokenize("1e400/*"),
            vec![
                tok(
                    Error,
                    0,
                    0,
                    TokenValue::Error(SassLexError::BadNumber("1e400".to_string()))
                ),
                Token::eof(5),
            ]
        );

        assert_eq!(
            tokenize("\"str\""),
            vec![
                tok(
                    Error,
                    0,
                    0,
                    TokenValue::Error(SassLexError::UnexpectedChar('"'))
                ),
                Token::eof(0),
            ]
        );
    }
}
