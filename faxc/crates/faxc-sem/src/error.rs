//! Semantic-analysis errors.
//!
//! Grounded on `original_source/src/symbolTable/symbolTable.py`'s
//! `CompilerMessage` raises (duplicate scope, duplicate variable,
//! duplicate label, undefined identifier, unresolved label).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SemanticError {
    #[error("scope with name '{0}' already exists")]
    DuplicateScope(String),

    #[error("variable with name '{0}' already exists")]
    DuplicateVariable(String),

    #[error("label with name '{0}' already exists")]
    DuplicateLabel(String),

    #[error("identifier '{0}' is undefined")]
    UndefinedIdentifier(String),

    #[error("the label '{0}' was used but never declared")]
    UnresolvedLabel(String),
}

pub type Result<T> = std::result::Result<T, SemanticError>;
