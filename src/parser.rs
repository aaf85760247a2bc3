//! Component-value parser over the token stream.
//!
//! A thin layer with one token of lookahead (`current` plus `next`) and a
//! held-token flag mirroring the scanner's reconsume. Syntactic failures
//! never abort a parse; they surface as `Error` nodes in the output.

mod declaration;
mod rule;

use crate::errors::ParseErrorKind;
use crate::node::Node;
use crate::rune_stream::{RuneSource, StrSource};
use crate::tokenizer::{Token, Tokenizer};

pub struct Parser<R> {
    tokenizer: Tokenizer<R>,
    current: Token,
    next: Token,
    held: bool,
}

impl Parser<StrSource> {
    /// Parser over an in-memory string.
    pub fn from_css(input: &str) -> Self {
        Self::new(StrSource::from(input))
    }
}

impl<R: RuneSource> Parser<R> {
    pub fn new(source: R) -> Self {
        let mut tokenizer = Tokenizer::new(source);
        let current = tokenizer.consume_token();
        log::trace!("consume: {current:?}");
        let next = tokenizer.consume_token();
        Self {
            tokenizer,
            current,
            next,
            held: false,
        }
    }

    fn consume1(&mut self) {
        if self.held {
            self.held = false;
            return;
        }
        self.current = std::mem::replace(&mut self.next, self.tokenizer.consume_token());
        log::trace!("consume: {:?}", self.current);
    }

    /// Make the next consume yield the current token again.
    #[allow(dead_code)]
    fn reconsume(&mut self) {
        self.held = true;
    }

    /// Parse everything as component values. The returned list ends with an
    /// `Eof` node, or with the surfaced error when the stream fails.
    pub fn parse_list_of_component_values(&mut self) -> Vec<Node> {
        log::trace!("parse_list_of_component_values");
        let mut nodes = Vec::new();
        loop {
            let node = self.consume_component_value();
            let terminal = node.is_terminal();
            nodes.push(node);
            if terminal {
                break;
            }
            self.consume1();
        }
        nodes
    }

    /// 5.4.7. [Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    ///
    /// Operates on the current token; compound values consume through their
    /// closing delimiter. An unmatched closer becomes the matching error
    /// node.
    fn consume_component_value(&mut self) -> Node {
        match self.current.clone() {
            Token::Eof => Node::Eof,
            Token::Function(_) => self.consume_function(),
            Token::LCurly => self.consume_simple_block(Token::RCurly),
            Token::LSquare => self.consume_simple_block(Token::RSquare),
            Token::LParen => self.consume_simple_block(Token::RParen),
            Token::RCurly => Node::Error(ParseErrorKind::UnmatchedCurly),
            Token::RSquare => Node::Error(ParseErrorKind::UnmatchedSquare),
            Token::RParen => Node::Error(ParseErrorKind::UnmatchedParen),
            token => Node::from_token(token),
        }
    }

    /// 5.4.8. [Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    fn consume_simple_block(&mut self, end: Token) -> Node {
        let mut children = Vec::new();
        self.consume1();
        while !self.current.is_eof_or_error() && self.current != end {
            children.push(self.consume_component_value());
            self.consume1();
        }
        Node::Block { end, children }
    }

    /// 5.4.9. [Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    fn consume_function(&mut self) -> Node {
        let name = match &self.current {
            Token::Function(name) => name.clone(),
            _ => String::new(),
        };
        let mut children = Vec::new();
        self.consume1();
        while !self.current.is_eof_or_error() && self.current != Token::RParen {
            children.push(self.consume_component_value());
            self.consume1();
        }
        Node::Function { name, children }
    }
}
