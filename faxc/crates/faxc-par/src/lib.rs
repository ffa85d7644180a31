//! faxc-par - Syntax analysis for the Fax C-subset compiler.
//!
//! Loads (or builds and caches) an LR(1) table set from a plain-text
//! grammar, then drives a shift-reduce parse of a token stream into a
//! parse tree, flattening list productions and running the post-order
//! `prepare` pass. Grounded on `original_source/src/parser/grammar.py`
//! and `lrParser.py`.

pub mod driver;
pub mod error;
pub mod grammar;
pub mod lr;
pub mod tree;

pub use driver::{load_or_build_tables, parse, terminal_name};
pub use error::{ParseError, Result};
pub use grammar::Grammar;
pub use lr::{build_tables, Action, BuildResult, Item, Tables};
pub use tree::{flatten_lists, Node, NodeKind, LIST_REDUCERS};

use faxc_lex::Token;
use faxc_util::Unique;

/// Runs the full parse pipeline over an already-tokenized source:
/// shift-reduce parse, list-flattening, and the `prepare` value pass.
/// Returns the finished root `program` node.
pub fn parse_program(
    tokens: &[Token],
    grammar: &Grammar,
    tables: &Tables,
    unique: &mut Unique,
) -> Result<Node> {
    let mut root = parse(tokens, grammar, tables)?;
    flatten_lists(&mut root, LIST_REDUCERS);
    root.prepare(unique);
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_lex::{Token, TokenKind};

    #[test]
    fn parses_and_prepares_a_tiny_assignment_grammar() {
        let grammar = Grammar::parse("program -> stmt\nstmt -> ID = constNum ;\n");
        let built = build_tables(&grammar);
        let tokens = vec![
            Token::new(TokenKind::Identifier, "x"),
            Token::new(TokenKind::Eq, "="),
            Token::new(TokenKind::Number, "2"),
            Token::new(TokenKind::Semicolon, ";"),
            Token::plain(TokenKind::Eof),
        ];
        let root = parse_program(&tokens, &grammar, &built.tables, &mut Unique::new()).unwrap();
        assert_eq!(root.kind, NodeKind::Program);
    }
}
