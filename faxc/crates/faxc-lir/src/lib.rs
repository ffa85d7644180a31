//! faxc-lir - The x86-64 low-level IR for the Fax C-subset compiler.
//!
//! Lowers a finished [`faxc_mir::Program`] into a small, fixed x86-64
//! instruction vocabulary using this spec's non-standard ABI (integer
//! parameters in `{r8d..r15d}`, 4-byte stack slots). [`crate::printer`]
//! (in `faxc-gen`) turns this into AT&T-syntax text; this crate only
//! builds the in-memory representation. Grounded on
//! `original_source/src/assembler/assembler.py` and the teacher's
//! `faxc-lir/src/lir.rs`/`stack_frame.rs` shapes — see DESIGN.md.

pub mod calling_convention;
pub mod error;
pub mod instr;
pub mod lower;
pub mod operand;
pub mod stack_frame;

pub use calling_convention::{mangled_name, Platform, PARAM_REGISTERS};
pub use error::{LirError, Result};
pub use instr::Instruction;
pub use lower::{lower_program, LirFunction, LirProgram};
pub use operand::{ArithOp, Condition, Operand, Register};
pub use stack_frame::StackFrame;
