//! Rule, rule-list and stylesheet entry points.

use crate::errors::ParseErrorKind;
use crate::node::Node;
use crate::parser::Parser;
use crate::rune_stream::RuneSource;
use crate::tokenizer::Token;

impl<R: RuneSource> Parser<R> {
    /// Parse a single qualified rule or at-rule. Yields `Error(Empty)` on
    /// blank input and `Error(ExtraInput)` when more than whitespace follows
    /// the rule.
    pub fn parse_rule(&mut self) -> Node {
        log::trace!("parse_rule");
        while self.current.is_whitespace() {
            self.consume1();
        }
        if self.current.is_eof() {
            return Node::Error(ParseErrorKind::Empty);
        }
        let result = if matches!(self.current, Token::AtKeyword(_)) {
            self.consume_at_rule()
        } else {
            self.consume_qualified_rule()
        };
        self.consume1();
        while self.current.is_whitespace() {
            self.consume1();
        }
        if !self.current.is_eof() {
            return Node::Error(ParseErrorKind::ExtraInput);
        }
        result
    }

    /// Parse a rule list. CDO/CDC tokens open qualified-rule preludes here;
    /// only the top-level stylesheet form drops them.
    pub fn parse_rule_list(&mut self) -> Vec<Node> {
        log::trace!("parse_rule_list");
        self.consume_rule_list(false)
    }

    /// Parse a top-level stylesheet: a rule list with CDO/CDC dropped.
    pub fn parse_stylesheet(&mut self) -> Vec<Node> {
        log::trace!("parse_stylesheet");
        self.consume_rule_list(true)
    }

    /// 5.4.1. [Consume a list of rules](https://www.w3.org/TR/css-syntax-3/#consume-list-of-rules)
    fn consume_rule_list(&mut self, toplevel: bool) -> Vec<Node> {
        let mut rules = Vec::new();
        while !self.current.is_eof() {
            match self.current.clone() {
                Token::Error(_) => {
                    rules.push(self.consume_component_value());
                    break;
                }
                Token::Whitespace => {
                    self.consume1();
                    continue;
                }
                Token::Cdo | Token::Cdc => {
                    if !toplevel {
                        rules.push(self.consume_qualified_rule());
                    }
                }
                Token::AtKeyword(_) => rules.push(self.consume_at_rule()),
                _ => rules.push(self.consume_qualified_rule()),
            }
            self.consume1();
        }
        rules
    }

    /// 5.4.2. [Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    ///
    /// The prelude runs to a `{`, `;` or EOF; a braced body is reported as
    /// absent when empty.
    pub(crate) fn consume_at_rule(&mut self) -> Node {
        let name = match self.current.clone() {
            Token::AtKeyword(name) => name,
            _ => String::new(),
        };
        let mut prelude = Vec::new();
        self.consume1();
        while !self.current.is_eof_or_error() && self.current != Token::Semicolon {
            if self.current == Token::LCurly {
                break;
            }
            prelude.push(self.consume_component_value());
            self.consume1();
        }
        let mut body = None;
        if self.current == Token::LCurly {
            if let Node::Block { children, .. } = self.consume_simple_block(Token::RCurly) {
                if !children.is_empty() {
                    body = Some(children);
                }
            }
        }
        self.consume1();
        Node::AtRule {
            name,
            prelude,
            body,
        }
    }

    /// 5.4.3. [Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    ///
    /// EOF inside the prelude is a syntax error.
    pub(crate) fn consume_qualified_rule(&mut self) -> Node {
        let mut prelude = Vec::new();
        while self.current != Token::LCurly {
            if self.current.is_eof_or_error() {
                return Node::Error(ParseErrorKind::Syntax);
            }
            prelude.push(self.consume_component_value());
            self.consume1();
        }
        let body = match self.consume_simple_block(Token::RCurly) {
            Node::Block { children, .. } => children,
            _ => Vec::new(),
        };
        Node::QualifiedRule { prelude, body }
    }
}
