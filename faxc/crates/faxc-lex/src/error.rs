//! Lexer error taxonomy.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LexError {
    #[error("Unrecognized token: '{0}'")]
    UnrecognizedChunk(String),

    #[error("Missing terminating quote!")]
    UnterminatedQuote,

    #[error("Malformed include statement: '{0}'")]
    MalformedInclude(String),
}

pub type Result<T> = std::result::Result<T, LexError>;
