//! The IR builder: a post-order walk of the parse tree that partitions
//! code into basic blocks at `if`/`while`/`switch`/label boundaries and
//! resolves forward branch targets once the block they name exists.
//!
//! Grounded on `original_source/src/ir/ir.py`'s `IR.visit`/`closeBlock`.
//! The reference derives every forward target (an `if`'s else branch, a
//! `while`'s break target, a `switch`'s break target, the goto that
//! skips an `if`'s `else` clause) from arithmetic on the single
//! process-wide `unique` label counter — `savedLabel - firstLabel + 1`
//! and similar offsets — which only stays correct because a block is
//! minted on (almost) every `closeBlock` call in a fixed order. Per
//! SPEC_FULL.md §9's Design Note this is replaced with an explicit
//! pending-patch queue keyed by real `(block index, instruction index)`
//! locations: a `then`/`otherwise` branch arm, or a goto-over-else, is
//! registered as "resolve with the label of whatever block closes
//! next", and resolved the moment that block exists. Post-order
//! visitation guarantees an inner construct's own pending patches are
//! always resolved before an enclosing construct registers its own, so
//! a single FIFO-by-registration queue is sufficient — no arithmetic on
//! label numbers is needed anywhere in this module.

use faxc_par::{Node, NodeKind};
use faxc_sem::SymbolTable;
use faxc_util::Unique;

use crate::error::{IrError, Result};
use crate::instr::{BasicBlock, BranchTarget, Function, Instruction, Program};

#[derive(Debug, Clone, Copy)]
enum Pending {
    Then(usize, usize),
    Otherwise(usize, usize),
    Goto(usize, usize),
}

pub struct Builder<'a> {
    symbols: &'a SymbolTable,
    unique: &'a mut Unique,
    program: Program,
    current: Option<usize>,
    stack: Vec<Instruction>,
    pending: Vec<Pending>,
    /// One entry per currently-open `if`/`while`/`switch`: the
    /// `(block, instr)` location of its condition's placeholder,
    /// available to whichever construct owns resolving its `otherwise`
    /// arm (the owning `IfStatement`'s own exit for an if with no
    /// `else`, or `rewrite_loop_body`'s caller for while/switch).
    if_stack: Vec<(usize, usize)>,
    /// One entry per currently-open `if` that has an `else` clause:
    /// whether it does, pushed on `IfStatement` entry (where `node` is
    /// the `IfStatement` itself and `has_else()` is meaningful) and
    /// consulted by `IfBody`'s exit, where `node` is the `IfBody` and
    /// has no means of asking its own enclosing statement.
    if_has_else: Vec<bool>,
    /// One entry per currently-open `if`-with-`else`: the `(block,
    /// instr)` location of the `then` branch's goto-over-the-else
    /// placeholder, patched once the block following the whole
    /// if/else is known.
    goto_over_else_stack: Vec<(usize, usize)>,
}

/// Builds the whole-program IR from a finished, symbol-table-checked
/// parse tree.
pub fn build(root: &Node, symbols: &SymbolTable, unique: &mut Unique) -> Result<Program> {
    let mut builder = Builder {
        symbols,
        unique,
        program: Program::default(),
        current: None,
        stack: Vec::new(),
        pending: Vec::new(),
        if_stack: Vec::new(),
        if_has_else: Vec::new(),
        goto_over_else_stack: Vec::new(),
    };
    builder.visit(root)?;
    Ok(builder.program)
}

impl<'a> Builder<'a> {
    fn current_mut(&mut self) -> Result<&mut Function> {
        let idx = self.current.ok_or(IrError::NoActiveFunction)?;
        Ok(&mut self.program.functions[idx])
    }

    fn visit(&mut self, node: &Node) -> Result<()> {
        self.enter(node)?;
        for child in &node.children {
            self.visit(child)?;
        }
        self.exit(node)?;
        Ok(())
    }

    fn enter(&mut self, node: &Node) -> Result<()> {
        match node.kind {
            NodeKind::FunctionDeclaration => {
                let name = node.name().to_string();
                let declarations = self
                    .symbols
                    .functions
                    .get(&name)
                    .map(|s| s.variables.len())
                    .unwrap_or(0);
                self.program.functions.push(Function {
                    name: name.clone(),
                    arguments: Vec::new(),
                    declarations,
                    blocks: Vec::new(),
                });
                self.current = Some(self.program.functions.len() - 1);
            }
            NodeKind::IfStatement => {
                self.close_block(false)?;
                self.if_has_else.push(node.has_else());
            }
            NodeKind::ElseStatement
            | NodeKind::LabelDeclaration
            | NodeKind::Condition
            | NodeKind::WhileStatement
            | NodeKind::WhileCondition
            | NodeKind::SwitchCondition
            | NodeKind::SwitchStatement => {
                self.close_block(false)?;
            }
            _ => {}
        }

        Ok(())
    }

    fn exit(&mut self, node: &Node) -> Result<()> {
        match node.kind {
            NodeKind::FunctionDeclaration => {
                let arg_names: Vec<String> = node
                    .children
                    .iter()
                    .find(|c| c.kind == NodeKind::Arguments)
                    .map(|args| {
                        args.children
                            .iter()
                            .filter_map(|a| a.argument_name().map(|s| s.to_string()))
                            .collect()
                    })
                    .unwrap_or_default();
                self.current_mut()?.arguments = arg_names;
                self.close_block(false)?;
                // One more forced block so every pending patch has
                // something to resolve against, matching the
                // reference's closing `closeBlock(force=True)`.
                self.close_block(true)?;
                self.current = None;
            }
            NodeKind::IfBody => {
                let has_else = self.if_has_else.last().copied().unwrap_or(false);
                if has_else {
                    // A goto skipping over the upcoming `else` clause;
                    // its target (whatever follows the whole if/else)
                    // is only known once the enclosing `IfStatement`
                    // finishes visiting the else branch, so it's queued
                    // separately from the condition's own placeholder.
                    self.stack.push(Instruction::Goto(String::new()));
                    self.close_block(true)?;
                    let func = self.current_mut()?;
                    let bi = func.blocks.len() - 1;
                    let ii = func.blocks[bi].instructions.len() - 1;
                    self.goto_over_else_stack.push((bi, ii));
                    // The condition's `otherwise` arm is the block the
                    // `else` clause is about to open; resolve it the
                    // moment that block exists (the very next
                    // `close_block`, fired by `ElseStatement`'s exit).
                    if let Some((cbi, cii)) = self.if_stack.pop() {
                        self.pending.push(Pending::Otherwise(cbi, cii));
                    }
                } else {
                    self.close_block(false)?;
                }
            }
            NodeKind::IfStatement => {
                self.close_block(false)?;
                self.if_has_else.pop();
                if node.has_else() {
                    if let Some((bi, ii)) = self.goto_over_else_stack.pop() {
                        self.pending.push(Pending::Goto(bi, ii));
                    }
                } else if let Some((bi, ii)) = self.if_stack.pop() {
                    self.pending.push(Pending::Otherwise(bi, ii));
                }
            }
            NodeKind::Condition => {
                let value = node.value.clone();
                self.stack.push(Instruction::If {
                    cond: value,
                    then: BranchTarget::Unresolved,
                    otherwise: BranchTarget::Unresolved,
                });
                self.close_block(false)?;
                self.register_if_placeholder();
            }
            NodeKind::ElseStatement => {
                self.close_block(false)?;
            }
            NodeKind::LabelDeclaration => {
                let label = node.children[0].value.clone();
                self.stack.insert(0, Instruction::Label(label));
                self.close_block(false)?;
            }
            NodeKind::WhileStatement => {
                let cond_label = self.condition_block_label()?;
                self.stack.push(Instruction::Goto(cond_label.clone()));
                self.close_block(false)?;
                self.rewrite_loop_body(&cond_label)?;
                self.pending.push(self.last_if_placeholder_as_otherwise()?);
            }
            NodeKind::WhileCondition => {
                let value = node.value.clone();
                self.stack.push(Instruction::If {
                    cond: value,
                    then: BranchTarget::Unresolved,
                    otherwise: BranchTarget::Unresolved,
                });
                self.close_block(false)?;
                self.register_if_placeholder();
            }
            NodeKind::SwitchCondition => {
                self.close_block(false)?;
            }
            NodeKind::SwitchCase => {
                let case_value = node.value.clone();
                let switch_value = node.operand.clone();
                let temp = self.unique.fresh_temp();
                self.stack.push(Instruction::Binary {
                    dest: temp.clone(),
                    op: "==".to_string(),
                    lhs: switch_value,
                    rhs: case_value,
                });
                self.stack.push(Instruction::If {
                    cond: temp,
                    then: BranchTarget::Unresolved,
                    otherwise: BranchTarget::Unresolved,
                });
                self.close_block(false)?;
                self.register_if_placeholder();
            }
            NodeKind::SwitchStatement => {
                let continue_label = self.first_case_block_label()?;
                self.rewrite_loop_body(&continue_label)?;
                self.close_block(false)?;
                self.pending.push(self.last_if_placeholder_as_otherwise()?);
            }
            NodeKind::BreakStatement => {
                self.stack.push(Instruction::Break);
            }
            NodeKind::ContinueStatement => {
                self.stack.push(Instruction::Continue);
            }
            _ => {
                if let Some(instr) = self.lower_leaf(node) {
                    self.stack.push(instr);
                }
            }
        }
        Ok(())
    }

    /// Emits the instruction for node kinds whose IR is a single
    /// self-contained instruction derived from already-`prepare`d
    /// children values (assignments, calls, returns, gotos, and every
    /// binary/unary expression kind).
    fn lower_leaf(&mut self, node: &Node) -> Option<Instruction> {
        use NodeKind::*;
        match node.kind {
            VariableAssignment | ExpressionAssignment => Some(Instruction::Assign {
                dest: node.children[0].value.clone(),
                value: node.children[1].value.clone(),
            }),
            IncrementAssignment => Some(Instruction::Binary {
                dest: node.children[0].value.clone(),
                op: "+".to_string(),
                lhs: node.children[0].value.clone(),
                rhs: "1".to_string(),
            }),
            DecrementAssignment => Some(Instruction::Binary {
                dest: node.children[0].value.clone(),
                op: "-".to_string(),
                lhs: node.children[0].value.clone(),
                rhs: "1".to_string(),
            }),
            PlusEqualAssignment => Some(self.compound_assign(node, "+")),
            MinusEqualAssignment => Some(self.compound_assign(node, "-")),
            MultEqualAssignment => Some(self.compound_assign(node, "*")),
            DivEqualAssignment => Some(self.compound_assign(node, "/")),
            CallAssignment => Some(self.call_instruction(node, true)),
            CallStatement => Some(self.call_instruction(node, false)),
            ReturnStatement => Some(Instruction::Return(
                node.children.first().map(|c| c.value.clone()),
            )),
            GotoStatement => Some(Instruction::Goto(node.children[0].value.clone())),
            k if k.is_binary_expr() || k.is_comparison() => Some(Instruction::Binary {
                dest: node.value.clone(),
                op: k.operator().to_string(),
                lhs: node.children[0].value.clone(),
                rhs: node.children[1].value.clone(),
            }),
            BooleanNot => Some(Instruction::Unary {
                dest: self.unique.fresh_temp(),
                op: "!".to_string(),
                operand: node.children[0].value.clone(),
            }),
            BitNot => Some(Instruction::Unary {
                dest: self.unique.fresh_temp(),
                op: "~".to_string(),
                operand: node.children[0].value.clone(),
            }),
            _ => None,
        }
    }

    fn compound_assign(&self, node: &Node, op: &str) -> Instruction {
        let dest = node.children[0].value.clone();
        Instruction::Binary {
            dest: dest.clone(),
            op: op.to_string(),
            lhs: dest,
            rhs: node.children[1].value.clone(),
        }
    }

    fn call_instruction(&self, node: &Node, has_dest: bool) -> Instruction {
        let (name_node, args_node, dest) = if has_dest {
            (&node.children[1], node.children.get(2), Some(node.children[0].value.clone()))
        } else {
            (&node.children[0], node.children.get(1), None)
        };
        let args = args_node
            .map(|a| a.children.iter().map(|c| c.value.clone()).collect())
            .unwrap_or_default();
        Instruction::Call {
            dest,
            name: name_node.value.clone(),
            args,
        }
    }

    fn register_if_placeholder(&mut self) {
        if let Some(&(bi, ii)) = self.pending_if_location().as_ref() {
            self.if_stack.push((bi, ii));
        }
    }

    fn pending_if_location(&self) -> Option<(usize, usize)> {
        let func = self.program.functions.last()?;
        let bi = func.blocks.len().checked_sub(1)?;
        let ii = func.blocks[bi].instructions.len().checked_sub(1)?;
        matches!(func.blocks[bi].instructions[ii], Instruction::If { .. }).then_some((bi, ii))
    }

    fn last_if_placeholder_as_otherwise(&mut self) -> Result<Pending> {
        let (bi, ii) = self.if_stack.pop().ok_or(IrError::NoActiveFunction)?;
        Ok(Pending::Otherwise(bi, ii))
    }

    fn condition_block_label(&self) -> Result<String> {
        let func = self.program.functions.last().ok_or(IrError::NoActiveFunction)?;
        let (bi, _) = *self.if_stack.last().ok_or(IrError::NoActiveFunction)?;
        Ok(func.blocks[bi].label.clone())
    }

    fn first_case_block_label(&self) -> Result<String> {
        self.condition_block_label()
    }

    /// Rewrites every `break`/`continue` already emitted in the current
    /// function's blocks following the construct's own condition block
    /// into a concrete `goto`. `continue` always has a known target
    /// (`continue_label`, the loop condition or first case check);
    /// `break`'s target is only known once the enclosing construct
    /// finishes, so each break site is queued as a pending goto.
    fn rewrite_loop_body(&mut self, continue_label: &str) -> Result<()> {
        let start = self
            .if_stack
            .last()
            .map(|&(bi, _)| bi + 1)
            .unwrap_or(0);
        let func = self.current_mut()?;
        let mut break_sites = Vec::new();
        for (bi, block) in func.blocks.iter_mut().enumerate().skip(start) {
            for (ii, instr) in block.instructions.iter_mut().enumerate() {
                match instr {
                    Instruction::Continue => *instr = Instruction::Goto(continue_label.to_string()),
                    Instruction::Break => break_sites.push((bi, ii)),
                    _ => {}
                }
            }
        }
        for site in break_sites {
            self.pending.push(Pending::Goto(site.0, site.1));
        }
        Ok(())
    }

    fn close_block(&mut self, force: bool) -> Result<()> {
        if self.stack.is_empty() && !force {
            return Ok(());
        }
        let label = self.unique.fresh_label();
        let block = BasicBlock {
            label: label.clone(),
            instructions: std::mem::take(&mut self.stack),
        };
        let func = self.current_mut()?;
        func.blocks.push(block);
        let new_idx = func.blocks.len() - 1;

        for patch in self.pending.drain(..) {
            let func = &mut self.program.functions[self.current.unwrap()];
            match patch {
                Pending::Then(bi, ii) => {
                    if let Instruction::If { then, .. } = &mut func.blocks[bi].instructions[ii] {
                        *then = BranchTarget::Label(label.clone());
                    }
                }
                Pending::Otherwise(bi, ii) => {
                    if let Instruction::If { otherwise, .. } = &mut func.blocks[bi].instructions[ii]
                    {
                        *otherwise = BranchTarget::Label(label.clone());
                    }
                }
                Pending::Goto(bi, ii) => {
                    func.blocks[bi].instructions[ii] = Instruction::Goto(label.clone());
                }
            }
        }

        let func = self.current_mut()?;
        if let Some(Instruction::If { then, .. }) = func.blocks[new_idx].instructions.last() {
            if *then == BranchTarget::Unresolved {
                let ii = func.blocks[new_idx].instructions.len() - 1;
                self.pending.push(Pending::Then(new_idx, ii));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_sem::SymbolTable;

    fn ident(name: &str) -> Node {
        Node::from_terminal("ID", name).unwrap()
    }

    fn const_num(n: &str) -> Node {
        Node::from_terminal("constNum", n).unwrap()
    }

    fn assign(dest: &str, value: Node) -> Node {
        Node::from_rule("assignment", vec![ident(dest), value]).unwrap()
    }

    fn function(body: Vec<Node>) -> Node {
        let mut children = vec![
            Node::from_terminal("typeSpecifier", "int").unwrap(),
            ident("main"),
            Node::from_rule("argList", Vec::new()).unwrap(),
        ];
        children.extend(body);
        Node::from_rule("functionDeclaration", children).unwrap()
    }

    fn build_ir(mut root: Node) -> Program {
        let mut unique = Unique::new();
        root.prepare(&mut unique);
        let symbols = SymbolTable::new();
        build(&root, &symbols, &mut unique).unwrap()
    }

    /// `if (c) { a = 1; } else { a = 2; } return a;` — the `then` block
    /// must end with a goto skipping the `else` block, and the
    /// condition's `otherwise` arm must land on the `else` block
    /// itself, not on whatever follows the whole statement.
    #[test]
    fn if_else_skips_the_else_block_and_patches_both_arms() {
        let if_stmt = Node::from_rule(
            "ifStatement",
            vec![
                Node::from_rule("condition", vec![ident("c")]).unwrap(),
                Node::from_rule("ifBody", vec![assign("a", const_num("1"))]).unwrap(),
                Node::from_rule("elseStatement", vec![assign("a", const_num("2"))]).unwrap(),
            ],
        )
        .unwrap();
        let ret = Node::from_rule("returnStatement", vec![ident("a")]).unwrap();
        let program = build_ir(function(vec![if_stmt, ret]));

        let func = &program.functions[0];
        assert_eq!(func.blocks.len(), 5, "{func:#?}");

        match &func.blocks[0].instructions[0] {
            Instruction::If { then, otherwise, .. } => {
                assert_eq!(*then, BranchTarget::Label(func.blocks[1].label.clone()));
                assert_eq!(*otherwise, BranchTarget::Label(func.blocks[2].label.clone()));
            }
            other => panic!("expected an If, got {other:?}"),
        }
        assert_eq!(
            func.blocks[1].instructions[0],
            Instruction::Assign { dest: "a".to_string(), value: "1".to_string() }
        );
        assert_eq!(
            func.blocks[1].instructions[1],
            Instruction::Goto(func.blocks[3].label.clone()),
            "the then-block must jump past the else block, not fall through into it"
        );
        assert_eq!(
            func.blocks[2].instructions[0],
            Instruction::Assign { dest: "a".to_string(), value: "2".to_string() }
        );
        assert_eq!(func.blocks[3].instructions[0], Instruction::Return(Some("a".to_string())));
    }

    /// `if (c) { a = 1; } return a;` with no `else`: the condition's
    /// `otherwise` arm resolves straight to the block following the
    /// whole statement.
    #[test]
    fn if_without_else_patches_otherwise_to_the_following_block() {
        let if_stmt = Node::from_rule(
            "ifStatement",
            vec![
                Node::from_rule("condition", vec![ident("c")]).unwrap(),
                Node::from_rule("ifBody", vec![assign("a", const_num("1"))]).unwrap(),
            ],
        )
        .unwrap();
        let ret = Node::from_rule("returnStatement", vec![ident("a")]).unwrap();
        let program = build_ir(function(vec![if_stmt, ret]));

        let func = &program.functions[0];
        assert_eq!(func.blocks.len(), 4, "{func:#?}");
        match &func.blocks[0].instructions[0] {
            Instruction::If { then, otherwise, .. } => {
                assert_eq!(*then, BranchTarget::Label(func.blocks[1].label.clone()));
                assert_eq!(*otherwise, BranchTarget::Label(func.blocks[2].label.clone()));
            }
            other => panic!("expected an If, got {other:?}"),
        }
        assert_eq!(func.blocks[2].instructions[0], Instruction::Return(Some("a".to_string())));
    }

    /// `while (c) { continue; break; } return a;` — `continue` resolves
    /// immediately to the condition block; `break` is only known once
    /// the loop's own exit runs and must land on the block after the
    /// loop, not inside it.
    #[test]
    fn while_loop_resolves_continue_and_break_to_the_right_blocks() {
        let while_stmt = Node::from_rule(
            "whileStatement",
            vec![
                Node::from_rule("whileCondition", vec![ident("c")]).unwrap(),
                Node::from_rule("continueStatement", Vec::new()).unwrap(),
                Node::from_rule("breakStatement", Vec::new()).unwrap(),
            ],
        )
        .unwrap();
        let ret = Node::from_rule("returnStatement", vec![ident("a")]).unwrap();
        let program = build_ir(function(vec![while_stmt, ret]));

        let func = &program.functions[0];
        assert_eq!(func.blocks.len(), 4, "{func:#?}");

        match &func.blocks[0].instructions[0] {
            Instruction::If { then, otherwise, .. } => {
                assert_eq!(*then, BranchTarget::Label(func.blocks[1].label.clone()));
                assert_eq!(*otherwise, BranchTarget::Label(func.blocks[2].label.clone()));
            }
            other => panic!("expected an If, got {other:?}"),
        }
        assert_eq!(
            func.blocks[1].instructions[0],
            Instruction::Goto(func.blocks[0].label.clone()),
            "continue must jump straight back to the condition block"
        );
        assert_eq!(
            func.blocks[1].instructions[1],
            Instruction::Goto(func.blocks[2].label.clone()),
            "break must land past the loop, not inside it"
        );
        assert_eq!(
            func.blocks[1].instructions[2],
            Instruction::Goto(func.blocks[0].label.clone()),
            "the loop body falls through back to the condition"
        );
        assert_eq!(func.blocks[2].instructions[0], Instruction::Return(Some("a".to_string())));
    }

    /// `goto even; even: return 1;` — the user label must survive as a
    /// real `Label` instruction inside the block it opens, not be
    /// discarded, so the earlier `goto even` has something to target.
    #[test]
    fn goto_and_user_label_round_trip_by_name() {
        let goto_stmt = Node::from_rule(
            "gotoStatement",
            vec![Node::from_terminal("label", "even").unwrap()],
        )
        .unwrap();
        let label_decl = Node::from_rule(
            "labelDeclaration",
            vec![Node::from_terminal("label", "even").unwrap()],
        )
        .unwrap();
        let ret = Node::from_rule("returnStatement", vec![const_num("1")]).unwrap();
        let program = build_ir(function(vec![goto_stmt, label_decl, ret]));

        let func = &program.functions[0];
        assert_eq!(func.blocks.len(), 4, "{func:#?}");
        assert_eq!(func.blocks[0].instructions[0], Instruction::Goto("even".to_string()));
        assert_eq!(func.blocks[1].instructions[0], Instruction::Label("even".to_string()));
        assert_eq!(func.blocks[2].instructions[0], Instruction::Return(Some("1".to_string())));
    }

    /// `switch (x) { case 1: } return a;` — the comparison must test
    /// the switch's own scrutinee (`x`) against the case value, not the
    /// case value against itself.
    #[test]
    fn switch_case_compares_the_scrutinee_not_the_case_value_against_itself() {
        let switch_stmt = Node::from_rule(
            "switchStatement",
            vec![
                Node::from_rule("switchCondition", vec![ident("x")]).unwrap(),
                Node::from_rule(
                    "caseList",
                    vec![Node::from_rule("switchCase", vec![const_num("1")]).unwrap()],
                )
                .unwrap(),
            ],
        )
        .unwrap();
        let ret = Node::from_rule("returnStatement", vec![ident("a")]).unwrap();
        let program = build_ir(function(vec![switch_stmt, ret]));

        let func = &program.functions[0];
        match &func.blocks[0].instructions[0] {
            Instruction::Binary { op, lhs, rhs, .. } => {
                assert_eq!(op, "==");
                assert_eq!(lhs, "x", "lhs must be the switch's scrutinee");
                assert_eq!(rhs, "1", "rhs must be this case's own value");
            }
            other => panic!("expected a Binary comparison, got {other:?}"),
        }
    }
}
