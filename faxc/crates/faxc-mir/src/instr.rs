//! The IR's data model: instructions, basic blocks, functions, and the
//! whole-program container.
//!
//! Grounded on `original_source/src/ir/ir.py`: a `BasicBlock` is a
//! label plus an ordered instruction list, a function is a flat list of
//! blocks plus an argument-name list and a declaration count, and a
//! program is an ordered map of function name to function. Per the
//! Design Note in SPEC_FULL.md §9, `REPLACEME`/`UNKNOWN` string
//! sentinels become [`BranchTarget::Unresolved`], patched in place by
//! [`crate::builder`] once the block it names has actually been built,
//! instead of by label-number arithmetic.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchTarget {
    Label(String),
    /// Not yet known; patched once the target block exists.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// `dest = value`
    Assign { dest: String, value: String },
    /// `dest = lhs op rhs`
    Binary {
        dest: String,
        op: String,
        lhs: String,
        rhs: String,
    },
    /// `dest = op operand`
    Unary {
        dest: String,
        op: String,
        operand: String,
    },
    Call {
        dest: Option<String>,
        name: String,
        args: Vec<String>,
    },
    Return(Option<String>),
    Goto(String),
    /// A user-written label (`even:`), carried inside whichever block it
    /// opens rather than as that block's own `_L`-minted header, so
    /// `goto`/label targets resolve to a real assembly label.
    Label(String),
    If {
        cond: String,
        then: BranchTarget,
        otherwise: BranchTarget,
    },
    /// Present only transiently, between a loop/switch body being built
    /// and the enclosing construct's exit rewriting it to a `Goto`.
    Break,
    Continue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub arguments: Vec<String>,
    pub declarations: usize,
    pub blocks: Vec<BasicBlock>,
}

/// Insertion-ordered so the assembler emits functions in source order,
/// matching the reference's dict-preserves-insertion-order behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<Function>,
}

impl Program {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}
