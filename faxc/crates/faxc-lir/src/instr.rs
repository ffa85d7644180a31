//! The LIR instruction vocabulary: one variant per AT&T-syntax line
//! shape this backend ever emits.
//!
//! Grounded on `faxc-lir/src/lir.rs`'s `Instruction` enum shape, pruned
//! to this ABI's needs. Per the Design Note in SPEC_FULL.md §9, the
//! reference's `REPLACEME ADDQ` text sentinel becomes the explicit
//! [`Instruction::FrameReserve`]/[`Instruction::FrameRelease`] variants:
//! both carry no size of their own and are rendered by
//! [`crate::printer`] against the owning function's `frame_bytes`,
//! computed only once the whole body has been lowered and every local
//! and temporary has a slot.

use crate::operand::{ArithOp, Condition, Operand, Register};

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Globl(String),
    Label(String),

    Pushq(Register),
    Popq(Register),
    /// `movq src, dst`
    Movq(Register, Register),

    /// `movl $imm, dst`
    MovlImmToReg(i64, Register),
    /// `movl src, dst`
    MovlRegToReg(Register, Register),
    /// `movl src, -offset(%rbp)`
    MovlRegToMem(Register, i32),
    /// `movl -offset(%rbp), dst`
    MovlMemToReg(i32, Register),

    /// `<op>l operand, dst` for `+ - * & | ^`.
    Arith(ArithOp, Operand, Register),
    Cltd,
    /// `idivl reg` (divisor already loaded into `%ecx` by the caller).
    Idivl(Register),
    /// `shll %cl, dst`
    Shll(Register),
    /// `sarl %cl, dst`
    Sarl(Register),

    /// `cmpl operand, dst` — used once one side of a comparison has
    /// already been loaded into a register.
    Cmpl(Operand, Register),
    /// `cmpl $0, operand` — the `if`/`while`/`switch`-case test, which
    /// (per SPEC_FULL.md §4.6) compares a condition operand to zero
    /// directly, without first loading it into a register, when that
    /// operand is already a memory slot.
    TestZero(Operand),
    SetCC(Condition, Register),
    /// `andb $imm, dst`
    Andb(i64, Register),
    /// `xorb $imm, dst`
    Xorb(i64, Register),
    Movzbl(Register, Register),

    /// `xorl $-1, dst` — bitwise complement.
    NotComplement(Register),

    Jmp(String),
    Je(String),
    Callq(String),

    /// Placeholder for the prologue's initial stack reservation;
    /// rendered as `subq $frame_bytes, %rsp`, or omitted entirely when
    /// the function needs no frame at all.
    FrameReserve,
    /// Placeholder for an epilogue's stack release; rendered as
    /// `addq $frame_bytes, %rsp`, or omitted alongside `FrameReserve`.
    FrameRelease,

    Retq,
}
