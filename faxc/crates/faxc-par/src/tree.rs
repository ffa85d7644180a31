//! The parse tree: node kinds, the shift/reduce node factory, the
//! post-order `prepare` pass, and list-flattening.
//!
//! Grounded on `original_source/src/parser/grammar.py`'s ~60 node
//! classes (the `nodes`/`terminals` factory dictionaries, each class's
//! constructor and `prepare`/`ir` overrides) and
//! `original_source/src/symbolTable/symbolTable.py`'s `flattenTree`.
//! Per the Design Note in SPEC_FULL.md §9, the class hierarchy becomes
//! one tagged enum (`NodeKind`) with an exhaustive match instead of a
//! string-keyed class factory, and there are no parent back-pointers —
//! semantic and IR passes descend from the root as the reference does.

use faxc_util::Unique;
use rustc_hash::FxHashSet;

/// The ~60 internal (non-leaf) grammar productions recognized as parse
/// tree nodes, plus the 6 leaf kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    DeclarationList,
    Declaration,
    FunctionDeclaration,
    Arguments,
    Argument,
    Parameters,
    Parameter,
    StatementList,
    Statement,
    ReturnStatement,
    VariableDeclaration,
    LabelDeclaration,
    VariableAssignment,
    IncrementAssignment,
    DecrementAssignment,
    PlusEqualAssignment,
    MinusEqualAssignment,
    MultEqualAssignment,
    DivEqualAssignment,
    CallAssignment,
    ExpressionAssignment,
    Expression,
    NestedExpression,
    AdditionExpression,
    SubtractionExpression,
    MultiplicationExpression,
    DivisionExpression,
    ModulusExpression,
    BooleanAnd,
    BooleanOr,
    BooleanNot,
    LteExpression,
    GteExpression,
    LtExpression,
    GtExpression,
    NotEqualExpression,
    EqualExpression,
    ForStatement,
    WhileStatement,
    WhileCondition,
    BreakStatement,
    ContinueStatement,
    IncludeStatement,
    CallStatement,
    GotoStatement,
    IfStatement,
    IfBody,
    Condition,
    ElseStatement,
    SwitchStatement,
    SwitchCaseList,
    SwitchCase,
    SwitchCondition,
    BitAnd,
    BitOr,
    BitXor,
    BitNot,
    LeftShift,
    RightShift,
    EnumStatement,
    EnumList,
    StructStatement,
    StructList,
    StructDec,
    VarList,

    // Leaves
    TypeSpecifier,
    ConstNum,
    Identifier,
    Filename,
    StringLit,
    Label,
}

impl NodeKind {
    pub fn is_binary_expr(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            AdditionExpression
                | SubtractionExpression
                | MultiplicationExpression
                | DivisionExpression
                | ModulusExpression
                | BooleanAnd
                | BooleanOr
                | BitAnd
                | BitOr
                | BitXor
                | LeftShift
                | RightShift
        )
    }

    pub fn is_comparison(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            LteExpression
                | GteExpression
                | LtExpression
                | GtExpression
                | NotEqualExpression
                | EqualExpression
        )
    }

    /// The infix operator spelling used by the IR, for binary/compare kinds.
    pub fn operator(self) -> &'static str {
        use NodeKind::*;
        match self {
            AdditionExpression => "+",
            SubtractionExpression => "-",
            MultiplicationExpression => "*",
            DivisionExpression => "/",
            ModulusExpression => "%",
            BooleanAnd => "&&",
            BooleanOr => "||",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            LeftShift => "<<",
            RightShift => ">>",
            LteExpression => "<=",
            GteExpression => ">=",
            LtExpression => "<",
            GtExpression => ">",
            NotEqualExpression => "!=",
            EqualExpression => "==",
            _ => "",
        }
    }
}

/// One parse-tree node. Internal nodes carry children; leaves carry
/// their raw lexeme in `text`. `value` is populated by [`Node::prepare`]
/// and is the only field later passes (symbol table, IR builder) read
/// besides `children`/`text`.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<Node>,
    pub text: String,
    pub value: String,
    /// A value pushed down from an enclosing node during `prepare`,
    /// rather than synthesized from this node's own children — the only
    /// user is `SwitchStatement`, which stamps its scrutinee onto each
    /// `SwitchCase` child as `operator` (`grammar.py:464-469`).
    pub operand: String,
}

impl Node {
    fn leaf(kind: NodeKind, text: impl Into<String>) -> Node {
        let text = text.into();
        Node {
            kind,
            children: Vec::new(),
            value: text.clone(),
            text,
            operand: String::new(),
        }
    }

    fn internal(kind: NodeKind, children: Vec<Node>) -> Node {
        Node {
            kind,
            children,
            text: String::new(),
            value: String::new(),
            operand: String::new(),
        }
    }

    /// `FunctionDeclaration`'s type specifier (first child's text).
    pub fn return_type(&self) -> &str {
        self.children[0].value.as_str()
    }

    /// The declared name of a `FunctionDeclaration` / `VariableDeclaration`
    /// / `Argument` / `Parameter`.
    pub fn name(&self) -> &str {
        self.children[1].value.as_str()
    }

    /// An `Argument`'s parameter name, or `None` for a bare `void`
    /// argument with no identifier (e.g. `main(void)`), which
    /// contributes no real parameter.
    pub fn argument_name(&self) -> Option<&str> {
        if self.children.len() > 1 {
            Some(self.children[1].value.as_str())
        } else {
            None
        }
    }

    /// True if this `IfStatement`/`IfBody` has a trailing `else` clause.
    pub fn has_else(&self) -> bool {
        self.kind == NodeKind::IfStatement && self.children.len() > 2
    }

    /// Builds an internal node for grammar rule `name`, given its
    /// already-reduced children — the Rust match replacing the
    /// reference's `nodes` dictionary. Returns `None` for rule names
    /// that are not tree-bearing productions (mirrors
    /// `grammar.parseToken`'s fallback).
    pub fn from_rule(name: &str, children: Vec<Node>) -> Option<Node> {
        use NodeKind::*;
        let kind = match name {
            "program" => Program,
            "declarationList" => DeclarationList,
            "declaration" => Declaration,
            "functionDeclaration" => FunctionDeclaration,
            "argList" => Arguments,
            "arg" => Argument,
            "paramList" => Parameters,
            "param" => Parameter,
            "statementList" | "statementListNew" => StatementList,
            "statement" | "statementNew" => Statement,
            "returnStatement" => ReturnStatement,
            "varDec" => VariableDeclaration,
            "labelDeclaration" => LabelDeclaration,
            "assignment" => VariableAssignment,
            "incAssignment" => IncrementAssignment,
            "decAssignment" => DecrementAssignment,
            "incEqualAssignment" => PlusEqualAssignment,
            "decEqualAssignment" => MinusEqualAssignment,
            "multEqualAssignment" => MultEqualAssignment,
            "divEqualAssignment" => DivEqualAssignment,
            "callAssignment" => CallAssignment,
            "exprAssignment" => ExpressionAssignment,
            "expression" => Expression,
            "nestedExpr" => NestedExpression,
            "addExpr" => AdditionExpression,
            "subExpr" => SubtractionExpression,
            "multExpr" => MultiplicationExpression,
            "divExpr" => DivisionExpression,
            "modExpr" => ModulusExpression,
            "boolAnd" => BooleanAnd,
            "boolOr" => BooleanOr,
            "boolNot" => BooleanNot,
            "lteExpr" => LteExpression,
            "gteExpr" => GteExpression,
            "ltExpr" => LtExpression,
            "gtExpr" => GtExpression,
            "neExpr" => NotEqualExpression,
            "eExpr" => EqualExpression,
            "forStatement" => ForStatement,
            "whileStatement" => WhileStatement,
            "whileCondition" => WhileCondition,
            "breakStatement" => BreakStatement,
            "continueStatement" => ContinueStatement,
            "includeStatement" => IncludeStatement,
            "callStatement" => CallStatement,
            "gotoStatement" => GotoStatement,
            "ifStatement" => IfStatement,
            "ifBody" => IfBody,
            "condition" => Condition,
            "elseStatement" => ElseStatement,
            "switchStatement" => SwitchStatement,
            "caseList" => SwitchCaseList,
            "switchCase" => SwitchCase,
            "switchCondition" => SwitchCondition,
            "bitAnd" => BitAnd,
            "bitOr" => BitOr,
            "bitXor" => BitXor,
            "bitNot" => BitNot,
            "leftShift" => LeftShift,
            "rightShift" => RightShift,
            "enumStatement" => EnumStatement,
            "enumList" => EnumList,
            "structStatement" => StructStatement,
            "structList" => StructList,
            "structDec" => StructDec,
            "varList" => VarList,
            _ => return None,
        };
        Some(Node::internal(kind, children))
    }

    /// Builds a leaf node for grammar terminal `name` carrying lexeme
    /// `content` — the Rust match replacing the reference's
    /// `terminals` dictionary.
    pub fn from_terminal(name: &str, content: &str) -> Option<Node> {
        use NodeKind::*;
        let kind = match name {
            "typeSpecifier" => TypeSpecifier,
            "ID" => Identifier,
            "constNum" => ConstNum,
            "fileName" => Filename,
            "str" => StringLit,
            "label" => Label,
            _ => return None,
        };
        Some(Node::leaf(kind, content))
    }

    /// Post-order population of `value` for expression/leaf-passthrough
    /// kinds. Leaves already carry `value == text` from construction;
    /// statement/assignment kinds that mint their own temporary do so
    /// later, during IR emission (matching the reference, where those
    /// classes set `self.value` inside `ir()` rather than `prepare()`).
    pub fn prepare(&mut self, unique: &mut Unique) {
        for child in &mut self.children {
            child.prepare(unique);
        }

        use NodeKind::*;
        match self.kind {
            Expression | NestedExpression => {
                self.value = self.children[0].value.clone();
            }
            Condition | WhileCondition | SwitchCondition | SwitchCase | LabelDeclaration => {
                self.value = self.children[0].value.clone();
            }
            SwitchStatement => {
                self.value = self.children[0].value.clone();
                if let Some(case_list) = self.children.get_mut(1) {
                    for case in &mut case_list.children {
                        case.operand = self.value.clone();
                    }
                }
            }
            k if k.is_binary_expr() || k.is_comparison() => {
                self.value = unique.fresh_temp();
            }
            _ => {}
        }
    }
}

/// Collapses a right-recursive list production (`List -> Item List |
/// Item`) into a single node whose children are the items in source
/// order, recursively for every node in the tree. Grounded on
/// `flattenTree`.
pub fn flatten_lists(root: &mut Node, reducers: &[NodeKind]) {
    let set: FxHashSet<NodeKind> = reducers.iter().copied().collect();
    flatten_inner(root, &set);
}

fn flatten_inner(node: &mut Node, reducers: &FxHashSet<NodeKind>) {
    for child in &mut node.children {
        flatten_inner(child, reducers);
    }

    if reducers.contains(&node.kind) {
        let chain = std::mem::take(&mut node.children);
        node.children = collect_chain(chain, node.kind);
    }
}

fn collect_chain(mut children: Vec<Node>, list_kind: NodeKind) -> Vec<Node> {
    match children.len() {
        0 => Vec::new(),
        1 => vec![children.pop().unwrap()],
        _ => {
            let rest = children.pop().unwrap();
            let item = children.pop().unwrap();
            let mut out = vec![item];
            if rest.kind == list_kind {
                out.extend(rest.children);
            } else {
                out.push(rest);
            }
            out
        }
    }
}

/// The list-shaped productions that get flattened after a parse, per
/// SPEC_FULL.md §3's Data Model and `main.py`'s nine-entry reducer
/// list (which additionally names `StatementListNew`, dropped from the
/// distilled spec's prose but present in the original driver).
pub const LIST_REDUCERS: &[NodeKind] = &[
    NodeKind::Arguments,
    NodeKind::Parameters,
    NodeKind::DeclarationList,
    NodeKind::StatementList,
    NodeKind::SwitchCaseList,
    NodeKind::EnumList,
    NodeKind::StructList,
    NodeKind::VarList,
];
