//! faxc-gen - The AT&T-syntax assembly printer for the Fax C-subset
//! compiler.
//!
//! Owns the very last pipeline stage: turning a [`faxc_mir::Program`]
//! into the textual `.s` output a system assembler accepts, by first
//! lowering through `faxc-lir` and then rendering with
//! [`printer::print_program`]. Grounded on
//! `original_source/src/assembler/assembler.py`, whose `generate()`
//! entry point does exactly this same lower-then-print in one call.

pub mod printer;

pub use faxc_lir::{LirError, Platform, Result};
pub use printer::print_program;

/// Lowers `program` for `platform` and renders it to GNU AT&T-syntax
/// assembly text in one step.
pub fn generate(program: &faxc_mir::Program, platform: Platform) -> Result<String> {
    let lir = faxc_lir::lower_program(program, platform)?;
    Ok(printer::print_program(&lir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_mir::{BasicBlock, Function, Program};

    #[test]
    fn generate_lowers_and_prints_in_one_call() {
        let program = Program {
            functions: vec![Function {
                name: "main".to_string(),
                arguments: Vec::new(),
                declarations: 0,
                blocks: vec![BasicBlock {
                    label: "_L1".to_string(),
                    instructions: vec![faxc_mir::Instruction::Return(Some("7".to_string()))],
                }],
            }],
        };
        let text = generate(&program, Platform::Linux).unwrap();
        assert!(text.contains("movl $7, %eax"));
        assert!(text.contains("retq"));
    }
}
