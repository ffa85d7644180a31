//! The symbol table: one global scope plus one flat scope per
//! function, and the pre-order tree walk that populates it.
//!
//! Grounded on `original_source/src/symbolTable/symbolTable.py`'s
//! `SymbolTable`/`buildSymbolTable`/`updateSymbolTable`/`verifyLabels`.
//! The reference represents scopes as nested dicts, with a child
//! scope's dict stored under its own name as a key of its parent —
//! which is how a function's own name resolves via `find` once its
//! scope has been opened (the name becomes a key of the enclosing
//! scope). Functions never nest here (SPEC_FULL.md's single-function-
//! depth assumption, preserved per DESIGN.md Open Question 3), so that
//! structure collapses to exactly two levels: [`SymbolTable::global`]
//! and a flat map of per-function [`Scope`]s.

use rustc_hash::FxHashMap;

use crate::error::{Result, SemanticError};
use faxc_par::{Node, NodeKind};

#[derive(Debug, Default, Clone)]
pub struct Scope {
    pub name: String,
    pub variables: FxHashMap<String, String>,
    pub labels: FxHashMap<String, bool>,
}

impl Scope {
    fn named(name: impl Into<String>) -> Scope {
        Scope {
            name: name.into(),
            variables: FxHashMap::default(),
            labels: FxHashMap::default(),
        }
    }
}

pub const GLOBAL: &str = "global";

#[derive(Debug, Default)]
pub struct SymbolTable {
    pub global: Scope,
    pub functions: FxHashMap<String, Scope>,
    current: Option<String>,
    level: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            global: Scope::named(GLOBAL),
            functions: FxHashMap::default(),
            current: None,
            level: 0,
        }
    }

    fn current_scope_mut(&mut self) -> &mut Scope {
        match &self.current {
            None => &mut self.global,
            Some(name) => self.functions.get_mut(name).expect("current scope exists"),
        }
    }

    pub fn start_scope(&mut self, name: &str, level: usize) -> Result<()> {
        if self.functions.contains_key(name) {
            return Err(SemanticError::DuplicateScope(name.to_string()));
        }
        self.functions.insert(name.to_string(), Scope::named(name));
        self.current = Some(name.to_string());
        self.level = level;
        Ok(())
    }

    pub fn end_scope(&mut self) {
        self.current = None;
    }

    pub fn declare_variable(&mut self, ty: &str, name: &str) -> Result<()> {
        let scope = self.current_scope_mut();
        if scope.variables.contains_key(name) {
            return Err(SemanticError::DuplicateVariable(name.to_string()));
        }
        scope.variables.insert(name.to_string(), ty.to_string());
        Ok(())
    }

    pub fn use_label(&mut self, name: &str) {
        let scope = self.current_scope_mut();
        scope.labels.entry(name.to_string()).or_insert(false);
    }

    pub fn declare_label(&mut self, name: &str) -> Result<()> {
        let scope = self.current_scope_mut();
        if scope.labels.get(name) == Some(&true) {
            return Err(SemanticError::DuplicateLabel(name.to_string()));
        }
        scope.labels.insert(name.to_string(), true);
        Ok(())
    }

    /// Resolves `name` from the current scope outward. Mirrors
    /// `SymbolTable.find`: inside a function scope, a hit is the
    /// scope's own variables/labels *or the scope's own name* (so a
    /// function may reference itself, e.g. recursive calls); failing
    /// that, the global scope's variables/labels, or any function name
    /// (every declared function is visible everywhere, matching the
    /// reference's scope-name-as-key-of-global behavior).
    pub fn find(&self, name: &str) -> Option<&str> {
        match &self.current {
            None => {
                if self.global.variables.contains_key(name)
                    || self.global.labels.contains_key(name)
                    || self.functions.contains_key(name)
                {
                    Some(GLOBAL)
                } else {
                    None
                }
            }
            Some(cur) => {
                let scope = &self.functions[cur];
                if scope.variables.contains_key(name)
                    || scope.name == name
                    || scope.labels.contains_key(name)
                {
                    Some(cur.as_str())
                } else if self.global.variables.contains_key(name)
                    || self.global.labels.contains_key(name)
                    || self.functions.contains_key(name)
                {
                    Some(GLOBAL)
                } else {
                    None
                }
            }
        }
    }

    pub fn verify_labels(&self) -> Result<()> {
        verify_scope_labels(&self.global)?;
        for scope in self.functions.values() {
            verify_scope_labels(scope)?;
        }
        Ok(())
    }
}

fn verify_scope_labels(scope: &Scope) -> Result<()> {
    for (label, declared) in &scope.labels {
        if !declared {
            return Err(SemanticError::UnresolvedLabel(label.clone()));
        }
    }
    Ok(())
}

/// Builds and validates a symbol table from a finished parse tree.
pub fn build_symbol_table(root: &Node) -> Result<SymbolTable> {
    let mut st = SymbolTable::new();
    visit(root, &mut st, 0)?;
    st.verify_labels()?;
    Ok(st)
}

fn visit(node: &Node, st: &mut SymbolTable, level: usize) -> Result<()> {
    update(node, st, level)?;
    for child in &node.children {
        visit(child, st, level + 1)?;
    }
    Ok(())
}

fn update(node: &Node, st: &mut SymbolTable, level: usize) -> Result<()> {
    match node.kind {
        NodeKind::FunctionDeclaration => {
            if st.level == level {
                st.end_scope();
            }
            st.start_scope(node.name(), level)?;
        }
        NodeKind::VariableDeclaration => {
            st.declare_variable(node.return_type(), node.name())?;
        }
        NodeKind::Argument => {
            if let Some(name) = node.argument_name() {
                st.declare_variable(node.return_type(), name)?;
            }
        }
        NodeKind::GotoStatement => {
            st.use_label(node.children[0].value.as_str());
        }
        NodeKind::LabelDeclaration => {
            st.declare_label(node.children[0].value.as_str())?;
        }
        NodeKind::Identifier => {
            if st.find(node.value.as_str()).is_none() {
                return Err(SemanticError::UndefinedIdentifier(node.value.clone()));
            }
        }
        _ => {}
    }
    Ok(())
}
