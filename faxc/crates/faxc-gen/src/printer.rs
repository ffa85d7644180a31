//! Renders a lowered [`faxc_lir::LirProgram`] as GNU AT&T-syntax text.
//!
//! Grounded entirely on `original_source/src/assembler/assembler.py`'s
//! line-by-line instruction printing. The only decision made here
//! rather than in `faxc-lir::lower` is whether a function's
//! `FrameReserve`/`FrameRelease` placeholder renders at all: a function
//! that never assigned a single stack slot (no locals, no
//! temporaries — SPEC_FULL.md §8's "zero parameters and zero
//! declarations" boundary case) gets no `subq`/`addq` line at all
//! rather than a `subq $0, %rsp` no-op.

use std::fmt::Write as _;

use faxc_lir::{Instruction, LirProgram};

pub fn print_program(program: &LirProgram) -> String {
    let mut out = String::new();
    out.push_str("\t.text\n");
    for function in &program.functions {
        for instr in &function.instructions {
            print_instruction(instr, function.frame_bytes, &mut out);
        }
        out.push('\n');
    }
    out
}

fn print_instruction(instr: &Instruction, frame_bytes: i32, out: &mut String) {
    use Instruction::*;
    match instr {
        Globl(name) => writeln!(out, "\t.globl {name}").unwrap(),
        Label(name) => writeln!(out, "{name}:").unwrap(),
        Pushq(r) => writeln!(out, "\tpushq {r}").unwrap(),
        Popq(r) => writeln!(out, "\tpopq {r}").unwrap(),
        Movq(src, dst) => writeln!(out, "\tmovq {src}, {dst}").unwrap(),
        MovlImmToReg(n, r) => writeln!(out, "\tmovl ${n}, {r}").unwrap(),
        MovlRegToReg(src, dst) => writeln!(out, "\tmovl {src}, {dst}").unwrap(),
        MovlRegToMem(r, offset) => writeln!(out, "\tmovl {r}, -{offset}(%rbp)").unwrap(),
        MovlMemToReg(offset, r) => writeln!(out, "\tmovl -{offset}(%rbp), {r}").unwrap(),
        Arith(op, operand, r) => writeln!(out, "\t{} {operand}, {r}", op.mnemonic()).unwrap(),
        Cltd => writeln!(out, "\tcltd").unwrap(),
        Idivl(r) => writeln!(out, "\tidivl {r}").unwrap(),
        Shll(r) => writeln!(out, "\tshll %cl, {r}").unwrap(),
        Sarl(r) => writeln!(out, "\tsarl %cl, {r}").unwrap(),
        Cmpl(operand, r) => writeln!(out, "\tcmpl {operand}, {r}").unwrap(),
        TestZero(operand) => writeln!(out, "\tcmpl $0, {operand}").unwrap(),
        SetCC(cond, r) => writeln!(out, "\t{} {r}", cond.set_mnemonic()).unwrap(),
        Andb(n, r) => writeln!(out, "\tandb ${n}, {r}").unwrap(),
        Xorb(n, r) => writeln!(out, "\txorb ${n}, {r}").unwrap(),
        Movzbl(src, dst) => writeln!(out, "\tmovzbl {src}, {dst}").unwrap(),
        NotComplement(r) => writeln!(out, "\txorl $-1, {r}").unwrap(),
        Jmp(label) => writeln!(out, "\tjmp {label}").unwrap(),
        Je(label) => writeln!(out, "\tje {label}").unwrap(),
        Callq(name) => writeln!(out, "\tcallq {name}").unwrap(),
        FrameReserve => {
            if frame_bytes > 0 {
                writeln!(out, "\tsubq ${frame_bytes}, %rsp").unwrap();
            }
        }
        FrameRelease => {
            if frame_bytes > 0 {
                writeln!(out, "\taddq ${frame_bytes}, %rsp").unwrap();
            }
        }
        Retq => writeln!(out, "\tretq").unwrap(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_lir::{lower_program, Platform};
    use faxc_mir::{BasicBlock, Function, Program};

    #[test]
    fn folded_return_renders_a_single_literal_move() {
        let program = Program {
            functions: vec![Function {
                name: "main".to_string(),
                arguments: Vec::new(),
                declarations: 0,
                blocks: vec![BasicBlock {
                    label: "_L1".to_string(),
                    instructions: vec![
                        faxc_mir::Instruction::Binary {
                            dest: "r1".to_string(),
                            op: "+".to_string(),
                            lhs: "2".to_string(),
                            rhs: "2".to_string(),
                        },
                        faxc_mir::Instruction::Return(Some("r1".to_string())),
                    ],
                }],
            }],
        };
        let lir = lower_program(&program, Platform::Linux).unwrap();
        let text = print_program(&lir);
        assert!(text.contains("movl $4, %eax"));
        assert!(text.contains("retq"));
        // r1 is a real temporary with its own stack slot, so the frame
        // reservation is emitted (non-zero frame_bytes).
        assert!(text.contains("subq $4, %rsp"));
    }

    #[test]
    fn zero_frame_function_emits_no_subq_or_addq() {
        let program = Program {
            functions: vec![Function {
                name: "main".to_string(),
                arguments: Vec::new(),
                declarations: 0,
                blocks: vec![BasicBlock {
                    label: "_L1".to_string(),
                    instructions: vec![faxc_mir::Instruction::Return(Some("0".to_string()))],
                }],
            }],
        };
        let lir = lower_program(&program, Platform::Linux).unwrap();
        let text = print_program(&lir);
        assert!(!text.contains("subq"));
        assert!(!text.contains("addq"));
    }

    #[test]
    fn macos_entry_point_is_underscored() {
        let program = Program {
            functions: vec![Function {
                name: "main".to_string(),
                arguments: Vec::new(),
                declarations: 0,
                blocks: vec![BasicBlock {
                    label: "_L1".to_string(),
                    instructions: vec![faxc_mir::Instruction::Return(Some("0".to_string()))],
                }],
            }],
        };
        let lir = lower_program(&program, Platform::MacOs).unwrap();
        let text = print_program(&lir);
        assert!(text.contains(".globl _main"));
        assert!(text.contains("_main:"));
    }
}
