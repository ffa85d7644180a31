//! faxc-lex - Lexical analysis for the Fax C-subset compiler.
//!
//! Converts a source string into an ordered token stream ending in an
//! end-of-file sentinel, per SPEC_FULL.md §4.1. Grounded on
//! `original_source/src/lexer/lexer.py` and `tokens.py`.

pub mod error;
pub mod lexer;
pub mod token;

pub use error::{LexError, Result};
pub use lexer::tokenize;
pub use token::{Token, TokenKind};
