//! Declaration and declaration-list entry points.

use crate::errors::ParseErrorKind;
use crate::node::Node;
use crate::parser::Parser;
use crate::rune_stream::RuneSource;
use crate::tokenizer::Token;

/// When the value list ends with `!` `important` (ignoring whitespace),
/// returns the length to truncate it to.
fn important_suffix(values: &[Node]) -> Option<usize> {
    let mut tail = values
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, node)| !node.is_whitespace());
    let (_, last) = tail.next()?;
    let (penult_idx, penult) = tail.next()?;
    match (penult, last) {
        (Node::Token(Token::Delim('!')), Node::Token(Token::Ident(name)))
            if name.eq_ignore_ascii_case("important") =>
        {
            Some(penult_idx)
        }
        _ => None,
    }
}

impl<R: RuneSource> Parser<R> {
    /// Parse a list of declarations and at-rules separated by semicolons.
    /// Anything unparseable is consumed up to the next `;` and reported as a
    /// syntax error node.
    pub fn parse_declaration_list(&mut self) -> Vec<Node> {
        log::trace!("parse_declaration_list");
        let mut decls = Vec::new();
        while !self.current.is_eof() {
            match self.current.clone() {
                Token::Error(_) => {
                    decls.push(self.consume_component_value());
                    break;
                }
                Token::Whitespace | Token::Semicolon => self.consume1(),
                Token::AtKeyword(_) => decls.push(self.consume_at_rule()),
                Token::Ident(_) => decls.push(self.consume_declaration()),
                _ => {
                    // FIXME: css-syntax-3 wants raw token consumption here;
                    // component values keep the css-parsing-tests suite green
                    while !self.current.is_eof_or_error() && self.current != Token::Semicolon {
                        self.consume_component_value();
                        self.consume1();
                    }
                    self.consume1();
                    decls.push(Node::Error(ParseErrorKind::Syntax));
                }
            }
        }
        decls
    }

    /// Parse a single declaration. Yields `Error(Empty)` on blank input,
    /// `Error(Syntax)` on a bad shape and `Error(ExtraInput)` when a valid
    /// declaration is followed by anything but whitespace.
    pub fn parse_declaration(&mut self) -> Node {
        log::trace!("parse_declaration");
        while self.current.is_whitespace() {
            self.consume1();
        }
        if self.current.is_eof() {
            return Node::Error(ParseErrorKind::Empty);
        }
        if !matches!(self.current, Token::Ident(_)) {
            return Node::Error(ParseErrorKind::Syntax);
        }
        let result = self.consume_declaration();
        if matches!(result, Node::Declaration { .. }) && !self.current.is_eof() {
            return Node::Error(ParseErrorKind::ExtraInput);
        }
        result
    }

    /// 5.4.6. [Consume a declaration](https://www.w3.org/TR/css-syntax-3/#consume-declaration)
    ///
    /// Expects the current token to be the property name ident.
    pub(crate) fn consume_declaration(&mut self) -> Node {
        let name = match self.current.clone() {
            Token::Ident(name) => name,
            _ => String::new(),
        };
        self.consume1();
        while self.current.is_whitespace() {
            self.consume1();
        }
        if self.current != Token::Colon {
            return Node::Error(ParseErrorKind::Syntax);
        }
        self.consume1();

        let mut values = Vec::new();
        // FIXME: css-syntax-3 wants raw token consumption here; component
        // values keep the css-parsing-tests suite green
        while !self.current.is_eof_or_error() && self.current != Token::Semicolon {
            values.push(self.consume_component_value());
            self.consume1();
        }
        self.consume1();

        let mut important = false;
        if let Some(len) = important_suffix(&values) {
            values.truncate(len);
            important = true;
        }
        if values
            .iter()
            .any(|node| matches!(node, Node::Token(Token::Delim('!'))))
        {
            return Node::Error(ParseErrorKind::Syntax);
        }

        Node::Declaration {
            name,
            values,
            important,
        }
    }
}
