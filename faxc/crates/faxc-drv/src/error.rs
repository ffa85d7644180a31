//! The driver's top-level error, wrapping every stage error into one
//! type so `main` has a single place to map failures to exit code 2.
//!
//! Grounded on `original_source/src/main.py`'s `except CompilerMessage`
//! handler, which catches whatever stage raised and prints it the same
//! way regardless of origin.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lex(#[from] faxc_lex::LexError),

    #[error(transparent)]
    Parse(#[from] faxc_par::ParseError),

    #[error(transparent)]
    Semantic(#[from] faxc_sem::SemanticError),

    #[error(transparent)]
    Ir(#[from] faxc_mir::IrError),

    #[error(transparent)]
    Codegen(#[from] faxc_lir::LirError),

    #[error("no source file given (pass one, or resume with --input)")]
    MissingSource,

    #[error("IR dump is malformed: {0}")]
    IrFormat(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DriverError>;
