//! A CSS Syntax Module Level 3 front-end plus a sass-dialect lexer.
//!
//! The css3 pipeline is pull-driven end to end: a [`rune_stream::Scanner`]
//! normalizes and windows the input, the [`tokenizer::Tokenizer`] turns the
//! rune stream into tokens, the [`parser::Parser`] builds component values,
//! rules and declarations, and [`colors::Color`] evaluates the
//! color-bearing subset of those nodes. The [`sass`] module is a separate
//! lexing surface over a fixed vocabulary, built on a longest-prefix trie.
//!
//! ```
//! use cascata::{Color, Parser};
//!
//! let nodes = Parser::from_css("a { color: red }").parse_stylesheet();
//! assert_eq!(nodes.len(), 1);
//!
//! let red = Color::from_css("rgb(100%, 0%, 0%)").unwrap();
//! assert_eq!((red.r, red.g, red.b, red.a), (1.0, 0.0, 0.0, 1.0));
//! ```

pub mod colors;
pub mod errors;
pub mod node;
pub mod parser;
pub mod rune_stream;
pub mod sass;
pub mod tokenizer;
mod unicode;

pub use colors::Color;
pub use node::Node;
pub use parser::Parser;
pub use rune_stream::{Rune, RuneSource, StrSource};
pub use tokenizer::{Token, Tokenizer};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::list_test_repr;
    use simple_logger::SimpleLogger;

    /// End-to-end trace of a stylesheet parse, for eyeballing the parser
    /// productions with `cargo test -- --ignored --nocapture`.
    #[test]
    #[ignore]
    fn trace_stylesheet_parse() {
        SimpleLogger::new().init().unwrap();

        let css = "
        /* Navbar */
        #header .nav {
            font-size: 1.1rem;
        }

        @media screen (max-width: 200px) {}

        background: url(https://example.test);
        ";
        let rules = Parser::from_css(css).parse_stylesheet();
        println!("{}", list_test_repr(&rules));
    }

    #[test]
    fn pipeline_smoke() {
        let mut tokenizer = Tokenizer::new(StrSource::from("/**/123"));
        assert!(matches!(tokenizer.consume_token(), Token::Number(_)));
        assert!(tokenizer.consume_token().is_eof());

        let color = Color::from_css("hsla(120, 100%, 50%, 0.5)").unwrap();
        assert!((color.g - 1.0).abs() < 1e-9);
        assert!((color.a - 0.5).abs() < 1e-9);

        let mut lexer = sass::Lexer::new("$width: 10px;");
        assert_eq!(lexer.next_token().kind, sass::TokenKind::Var);
        assert_eq!(lexer.next_token().kind, sass::TokenKind::Colon);
        assert_eq!(lexer.next_token().kind, sass::TokenKind::Number);
        assert_eq!(lexer.next_token().kind, sass::TokenKind::Semicolon);
        assert_eq!(lexer.next_token().kind, sass::TokenKind::Eof);
    }
}
