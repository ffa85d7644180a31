//! faxc-sem - Semantic analysis for the Fax C-subset compiler.
//!
//! Walks the finished parse tree to build a symbol table, declaring
//! variables/labels as their declarations are encountered and checking
//! every identifier reference and `goto` target against it. Grounded on
//! `original_source/src/symbolTable/symbolTable.py`.

pub mod error;
pub mod symbol_table;

pub use error::{Result, SemanticError};
pub use symbol_table::{build_symbol_table, Scope, SymbolTable, GLOBAL};
