//! Parser-facing errors.
//!
//! Grounded on `original_source/src/parser/lrParser.py`'s fatal parse
//! error path (`raise CompilerError` with the offending state, token,
//! and stack contents) and `loadParseTables`'s cache-file handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error(
        "syntax error: no action for token '{token}' in state {state} (stack depth {stack_depth})"
    )]
    Fatal {
        state: u32,
        token: String,
        stack_depth: usize,
    },

    #[error("unexpected end of input while parsing")]
    UnexpectedEof,

    #[error("grammar table cache I/O error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("grammar table cache is corrupt: {0}")]
    CacheFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;
