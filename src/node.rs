//! Parser output nodes and their canonical test representation.

use serde_json::{json, Value};

use crate::errors::ParseErrorKind;
use crate::tokenizer::{Numeric, NumericKind, Token};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumericForm {
    Number,
    Percentage,
    Dimension,
}

impl NumericForm {
    fn tag(self) -> &'static str {
        match self {
            NumericForm::Number => "number",
            NumericForm::Percentage => "percentage",
            NumericForm::Dimension => "dimension",
        }
    }
}

/// A single element of the parser output. The smallest standalone values
/// (token, function, simple block) are the component values; rules and
/// declarations only appear from the dedicated entry points.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Eof,
    Error(ParseErrorKind),
    Token(Token),
    /// Refinement of a hash token.
    Hash { name: String, id: bool },
    /// Refinement of a number, percentage or dimension token.
    Numeric { form: NumericForm, value: Numeric },
    /// A simple block closed by `end`.
    Block { end: Token, children: Vec<Node> },
    Function {
        name: String,
        children: Vec<Node>,
    },
    QualifiedRule {
        prelude: Vec<Node>,
        body: Vec<Node>,
    },
    AtRule {
        name: String,
        prelude: Vec<Node>,
        /// `None` when the rule was terminated by `;`/EOF or its block was
        /// empty.
        body: Option<Vec<Node>>,
    },
    Declaration {
        name: String,
        values: Vec<Node>,
        important: bool,
    },
}

impl Node {
    /// Wrap a token, refining hashes and numerics into their dedicated
    /// variants and EOF into the end node.
    pub(crate) fn from_token(token: Token) -> Node {
        match token {
            Token::Eof => Node::Eof,
            Token::Hash { name, id } => Node::Hash { name, id },
            Token::Number(value) => Node::Numeric {
                form: NumericForm::Number,
                value,
            },
            Token::Percentage(value) => Node::Numeric {
                form: NumericForm::Percentage,
                value,
            },
            Token::Dimension(value) => Node::Numeric {
                form: NumericForm::Dimension,
                value,
            },
            token => Node::Token(token),
        }
    }

    /// True for the nodes that end a component-value list: EOF, parse
    /// errors, and surfaced stream-error tokens.
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self,
            Node::Eof | Node::Error(_) | Node::Token(Token::Error(_))
        )
    }

    pub(crate) fn is_whitespace(&self) -> bool {
        matches!(self, Node::Token(Token::Whitespace))
    }

    /// The canonical serialisable structure used by conformance-style tests.
    pub fn test_repr(&self) -> Value {
        match self {
            Node::Eof => Value::Null,
            Node::Error(kind) => json!(["error", error_discriminator(*kind)]),
            Node::Token(token) => token_test_repr(token),
            Node::Hash { name, id } => {
                json!(["hash", name, if *id { "id" } else { "unrestricted" }])
            }
            Node::Numeric { form, value } => numeric_test_repr(*form, value),
            Node::Block { end, children } => {
                let tag = match end {
                    Token::RParen => "()",
                    Token::RCurly => "{}",
                    Token::RSquare => "[]",
                    _ => "",
                };
                let mut repr = vec![json!(tag)];
                repr.extend(children.iter().map(Node::test_repr));
                Value::Array(repr)
            }
            Node::Function { name, children } => {
                let mut repr = vec![json!("function"), json!(name)];
                repr.extend(children.iter().map(Node::test_repr));
                Value::Array(repr)
            }
            Node::QualifiedRule { prelude, body } => {
                json!(["qualified rule", list_test_repr(prelude), list_test_repr(body)])
            }
            Node::AtRule {
                name,
                prelude,
                body,
            } => {
                let body = match body {
                    Some(body) => list_test_repr(body),
                    None => Value::Null,
                };
                json!(["at-rule", name, list_test_repr(prelude), body])
            }
            Node::Declaration {
                name,
                values,
                important,
            } => {
                json!(["declaration", name, list_test_repr(values), important])
            }
        }
    }
}

/// Test representation of a node list.
pub fn list_test_repr(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(Node::test_repr).collect())
}

fn error_discriminator(kind: ParseErrorKind) -> &'static str {
    match kind {
        ParseErrorKind::Syntax => "invalid",
        ParseErrorKind::Empty => "empty",
        ParseErrorKind::ExtraInput => "extra-input",
        ParseErrorKind::UnmatchedCurly => "}",
        ParseErrorKind::UnmatchedSquare => "]",
        ParseErrorKind::UnmatchedParen => ")",
    }
}

fn numeric_test_repr(form: NumericForm, value: &Numeric) -> Value {
    let mut repr = vec![json!(form.tag()), json!(value.repr)];
    match value.kind {
        NumericKind::Integer => {
            repr.push(json!(value.integer as f64));
            repr.push(json!("integer"));
        }
        NumericKind::Float => {
            repr.push(json!(value.float));
            repr.push(json!("number"));
        }
    }
    if form == NumericForm::Dimension {
        repr.push(json!(value.unit));
    }
    Value::Array(repr)
}

fn token_test_repr(token: &Token) -> Value {
    match token {
        Token::Whitespace => json!(" "),
        Token::Delim(c) => json!(c.to_string()),
        Token::Ident(name) => json!(["ident", name]),
        Token::AtKeyword(name) => json!(["at-keyword", name]),
        Token::Cdo => json!("<!--"),
        Token::Cdc => json!("-->"),
        Token::String(value) => json!(["string", value]),
        Token::BadString(_) => json!(["error", "bad-string"]),
        Token::Url(value) => json!(["url", value]),
        Token::BadUrl => json!(["error", "bad-url"]),
        Token::UnicodeRange(range) => json!(["unicode-range", range.start, range.end]),
        Token::IncludeMatch => json!("~="),
        Token::DashMatch => json!("|="),
        Token::PrefixMatch => json!("^="),
        Token::SuffixMatch => json!("$="),
        Token::SubstringMatch => json!("*="),
        Token::Column => json!("||"),
        Token::Comma => json!(","),
        Token::Colon => json!(":"),
        Token::Semicolon => json!(";"),
        token => json!(["error", token.name()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::UnicodeRange;

    #[test]
    fn token_reprs() {
        let cases = vec![
            (Token::Whitespace, json!(" ")),
            (Token::Delim('!'), json!("!")),
            (Token::Ident("a".to_string()), json!(["ident", "a"])),
            (
                Token::AtKeyword("media".to_string()),
                json!(["at-keyword", "media"]),
            ),
            (Token::Cdo, json!("<!--")),
            (Token::Cdc, json!("-->")),
            (Token::String("x".to_string()), json!(["string", "x"])),
            (
                Token::BadString("x".to_string()),
                json!(["error", "bad-string"]),
            ),
            (Token::Url("x".to_string()), json!(["url", "x"])),
            (Token::BadUrl, json!(["error", "bad-url"])),
            (
                Token::UnicodeRange(UnicodeRange {
                    start: 0x1000,
                    end: 0x1fff,
                }),
                json!(["unicode-range", 0x1000, 0x1fff]),
            ),
            (Token::IncludeMatch, json!("~=")),
            (Token::Column, json!("||")),
            (Token::Comma, json!(",")),
            (Token::Colon, json!(":")),
            (Token::Semicolon, json!(";")),
        ];
        for (token, expected) in cases {
            assert_eq!(Node::from_token(token).test_repr(), expected);
        }
    }

    #[test]
    fn refined_reprs() {
        assert_eq!(
            Node::from_token(Token::Hash {
                name: "abc".to_string(),
                id: true
            })
            .test_repr(),
            json!(["hash", "abc", "id"])
        );
        assert_eq!(
            Node::from_token(Token::Hash {
                name: "123".to_string(),
                id: false
            })
            .test_repr(),
            json!(["hash", "123", "unrestricted"])
        );
    }

    #[test]
    fn error_reprs() {
        let cases = vec![
            (ParseErrorKind::Syntax, "invalid"),
            (ParseErrorKind::Empty, "empty"),
            (ParseErrorKind::ExtraInput, "extra-input"),
            (ParseErrorKind::UnmatchedCurly, "}"),
            (ParseErrorKind::UnmatchedSquare, "]"),
            (ParseErrorKind::UnmatchedParen, ")"),
        ];
        for (kind, discriminator) in cases {
            assert_eq!(Node::Error(kind).test_repr(), json!(["error", discriminator]));
        }
    }

    #[test]
    fn eof_repr_is_null() {
        assert_eq!(Node::Eof.test_repr(), Value::Null);
    }
}
