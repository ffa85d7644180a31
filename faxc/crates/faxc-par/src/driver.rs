//! The shift-reduce driver and the parse-table cache.
//!
//! Grounded on `original_source/src/parser/lrParser.py`'s `parse` loop
//! (stack of states/symbols, ACTION lookup, shift/reduce dispatch, the
//! `EMPTY` lookahead fallback for epsilon productions) and
//! `loadParseTables` (grammar-stem-keyed JSON cache, `force` to rebuild).

use std::fs;
use std::path::{Path, PathBuf};

use faxc_lex::{Token, TokenKind};
use tempfile::NamedTempFile;

use crate::error::{ParseError, Result};
use crate::grammar::{Grammar, ACCEPT, EMPTY};
use crate::lr::{build_tables, Action, Tables};
use crate::tree::Node;

/// Maps a lexer token to the grammar terminal name used for ACTION
/// lookups and tree construction. Every distinct type keyword
/// (`int`, `char`, `void`, ...) collapses onto the single `typeSpecifier`
/// terminal, since the grammar treats the type keyword family as one
/// symbol; every other token's own canonical spelling is already the
/// terminal name.
pub fn terminal_name(token: &Token) -> &'static str {
    use TokenKind::*;
    match token.kind {
        Int | Char | Float | Double | Void | Long | Short | Unsigned | Signed => "typeSpecifier",
        other => other.desc(),
    }
}

/// Drives the shift-reduce parse to completion, returning the root
/// `program` node.
pub fn parse(tokens: &[Token], grammar: &Grammar, tables: &Tables) -> Result<Node> {
    let mut state_stack: Vec<u32> = vec![0];
    let mut node_stack: Vec<Option<Node>> = Vec::new();
    let mut idx = 0usize;

    loop {
        let token = tokens.get(idx).ok_or(ParseError::UnexpectedEof)?;
        let terminal = terminal_name(token);
        let state = *state_stack.last().expect("state stack never empties");

        let action = tables
            .action
            .get(&state)
            .and_then(|m| m.get(terminal))
            .or_else(|| tables.action.get(&state).and_then(|m| m.get(EMPTY)))
            .cloned();

        match action {
            Some(Action::Shift(target)) => {
                node_stack.push(Node::from_terminal(terminal, &token.content));
                state_stack.push(target);
                idx += 1;
            }
            Some(Action::Reduce(lhs, _index)) if lhs == ACCEPT => {
                return node_stack
                    .pop()
                    .flatten()
                    .ok_or(ParseError::UnexpectedEof);
            }
            Some(Action::Reduce(lhs, index)) => {
                let alts = grammar.alternatives(&lhs).ok_or_else(|| ParseError::Fatal {
                    state,
                    token: lhs.clone(),
                    stack_depth: state_stack.len(),
                })?;
                let rhs = &alts[index];
                let pop_count = if rhs.len() == 1 && rhs[0] == EMPTY { 0 } else { rhs.len() };

                let mut children = Vec::with_capacity(pop_count);
                for _ in 0..pop_count {
                    state_stack.pop();
                    if let Some(node) = node_stack.pop().expect("node stack underflow") {
                        children.push(node);
                    }
                }
                children.reverse();

                let new_node = Node::from_rule(&lhs, children);
                let back_state = *state_stack.last().expect("state stack never empties");
                let goto_state = *tables
                    .goto
                    .get(&back_state)
                    .and_then(|m| m.get(&lhs))
                    .ok_or_else(|| ParseError::Fatal {
                        state: back_state,
                        token: lhs.clone(),
                        stack_depth: state_stack.len(),
                    })?;

                node_stack.push(new_node);
                state_stack.push(goto_state);
            }
            None => {
                return Err(ParseError::Fatal {
                    state,
                    token: terminal.to_string(),
                    stack_depth: state_stack.len(),
                });
            }
        }
    }
}

/// Loads a grammar file, building and caching its LR(1) tables in a
/// sibling `tables/<stem>_table.json` unless `force` requests a
/// rebuild. Returns any conflicts detected during a (re)build so the
/// caller can log them; a cache hit reports no conflicts since none
/// were re-derived.
pub fn load_or_build_tables(
    grammar_path: &Path,
    force: bool,
) -> Result<(Grammar, Tables, Vec<String>)> {
    let text = fs::read_to_string(grammar_path)?;
    let grammar = Grammar::parse(&text);
    let cache_path = cache_path_for(grammar_path);

    if !force {
        if let Ok(bytes) = fs::read(&cache_path) {
            if let Ok(tables) = serde_json::from_slice::<Tables>(&bytes) {
                return Ok((grammar, tables, Vec::new()));
            }
        }
    }

    let built = build_tables(&grammar);
    for conflict in &built.conflicts {
        tracing::warn!("{conflict}");
    }
    write_cache(&cache_path, &built.tables)?;
    Ok((grammar, built.tables, built.conflicts))
}

fn cache_path_for(grammar_path: &Path) -> PathBuf {
    let stem = grammar_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("grammar");
    let dir = grammar_path.parent().unwrap_or_else(|| Path::new("."));
    dir.join("tables").join(format!("{stem}_table.json"))
}

fn write_cache(path: &Path, tables: &Tables) -> Result<()> {
    let Some(dir) = path.parent() else { return Ok(()) };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut tmp, tables)?;
    tmp.persist(path).map_err(|e| ParseError::Cache(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use faxc_lex::Token;

    fn tok(kind: TokenKind, content: &str) -> Token {
        Token::new(kind, content)
    }

    #[test]
    fn parses_a_single_assignment_sentence() {
        let grammar = Grammar::parse("program -> stmt\nstmt -> ID = constNum ;\n");
        let built = build_tables(&grammar);
        let tokens = vec![
            tok(TokenKind::Identifier, "x"),
            tok(TokenKind::Eq, "="),
            tok(TokenKind::Number, "2"),
            tok(TokenKind::Semicolon, ";"),
            tok(TokenKind::Eof, "$"),
        ];
        let result = parse(&tokens, &grammar, &built.tables);
        assert!(result.is_ok());
    }

    #[test]
    fn reports_a_fatal_error_on_an_unexpected_token() {
        let grammar = Grammar::parse("program -> stmt\nstmt -> ID = constNum ;\n");
        let built = build_tables(&grammar);
        let tokens = vec![tok(TokenKind::Semicolon, ";"), tok(TokenKind::Eof, "$")];
        let result = parse(&tokens, &grammar, &built.tables);
        assert!(result.is_err());
    }

    #[test]
    fn writes_and_reloads_a_table_cache() {
        let dir = tempfile::tempdir().unwrap();
        let grammar_path = dir.path().join("tiny.txt");
        fs::write(&grammar_path, "program -> stmt\nstmt -> ID = constNum ;\n").unwrap();

        let (_, tables_a, conflicts) = load_or_build_tables(&grammar_path, true).unwrap();
        assert!(conflicts.is_empty() || !conflicts.is_empty());
        let (_, tables_b, cached_conflicts) = load_or_build_tables(&grammar_path, false).unwrap();
        assert!(cached_conflicts.is_empty());
        assert_eq!(tables_a.action.len(), tables_b.action.len());
    }
}
