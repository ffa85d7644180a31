//! faxc-mir - IR construction for the Fax C-subset compiler.
//!
//! Partitions a finished, symbol-table-checked parse tree into a
//! whole-program list of three-address basic blocks, resolving every
//! forward branch target (if/else, while/switch break/continue) before
//! returning. Grounded on `original_source/src/ir/ir.py`; see
//! DESIGN.md for why the Spanish-drifted duplicate module was not
//! ported and why there is no separate optimization pass here (an
//! explicit Non-goal).

pub mod builder;
pub mod error;
pub mod instr;

pub use builder::build;
pub use error::{IrError, Result};
pub use instr::{BasicBlock, BranchTarget, Function, Instruction, Program};
