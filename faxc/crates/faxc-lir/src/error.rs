//! Code-generation-time errors: the two ways a structurally valid IR
//! can still fail to lower, per SPEC_FULL.md §7's IR/codegen category.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LirError {
    #[error("division by zero in constant fold ({lhs} {op} {rhs})")]
    DivisionByZero { lhs: i64, op: String, rhs: i64 },

    #[error("function '{0}' has more arguments than the ABI has parameter registers (8)")]
    TooManyArguments(String),

    #[error("branch in function '{0}' reached codegen with an unresolved target")]
    UnresolvedBranch(String),
}

pub type Result<T> = std::result::Result<T, LirError>;
