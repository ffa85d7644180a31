//! Grammar loader.
//!
//! Parses the plain-text grammar format (`LHS -> rhs1 tok tok \ rhs2 …`)
//! into [`Grammar`], and computes FIRST sets per SPEC_FULL.md §4.2.
//! Grounded on `original_source/src/parser/lrParser.py`'s
//! `parseGrammar` (rule parsing, terminal/non-terminal partition) —
//! including its widen-the-lookahead FIRST-set approximation, which
//! adds the token that follows any occurrence of a non-terminal
//! anywhere in the grammar, not just a strict FIRST(β).

use rustc_hash::{FxHashMap, FxHashSet};

pub const ACCEPT: &str = "ACC";
pub const START: &str = "program";
pub const END_OF_INPUT: &str = "$";
pub const EMPTY: &str = "EMPTY";

/// A single right-hand side: an ordered sequence of terminal/non-terminal
/// symbol names.
pub type Rhs = Vec<String>;

/// A grammar: `LHS -> alt1 \ alt2 \ ...` for every non-terminal, plus
/// the implicit augmented start rule `ACC -> program`.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// Insertion-ordered so rule indices (used by `reduce(lhs, index)`)
    /// are stable and match the order alternatives appeared in the text.
    pub rules: FxHashMap<String, Vec<Rhs>>,
    pub non_terminals: Vec<String>,
    pub terminals: Vec<String>,
    pub first: FxHashMap<String, Vec<String>>,
}

impl Grammar {
    /// Parses grammar source text into rules and computes FIRST sets.
    pub fn parse(text: &str) -> Grammar {
        let mut rules: FxHashMap<String, Vec<Rhs>> = FxHashMap::default();
        rules.insert(ACCEPT.to_string(), vec![vec![START.to_string()]]);

        for line in text.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let words: Vec<&str> = line.split(' ').collect();
            if words.len() < 2 || words[1] != "->" {
                continue;
            }
            let lhs = words[0].to_string();
            let mut last = 2usize;
            let entry = rules.entry(lhs).or_default();
            for (i, w) in words.iter().enumerate() {
                if *w == "\\" {
                    entry.push(words[last..i].iter().map(|s| s.to_string()).collect());
                    last = i + 1;
                }
            }
            entry.push(words[last..].iter().map(|s| s.to_string()).collect());
        }

        let non_terminals: Vec<String> = rules.keys().cloned().collect();
        let nt_set: FxHashSet<&str> = non_terminals.iter().map(|s| s.as_str()).collect();

        let mut terminals: Vec<String> = Vec::new();
        let mut seen_terminals: FxHashSet<String> = FxHashSet::default();
        for alts in rules.values() {
            for rhs in alts {
                for tok in rhs {
                    if !nt_set.contains(tok.as_str()) && seen_terminals.insert(tok.clone()) {
                        terminals.push(tok.clone());
                    }
                }
            }
        }

        let first = compute_first(&rules, &non_terminals, &nt_set);

        Grammar {
            rules,
            non_terminals,
            terminals,
            first,
        }
    }

    pub fn alternatives(&self, lhs: &str) -> Option<&[Rhs]> {
        self.rules.get(lhs).map(|v| v.as_slice())
    }

    pub fn is_non_terminal(&self, sym: &str) -> bool {
        self.rules.contains_key(sym)
    }
}

/// Computes FIRST sets by iterative fixed point, reproducing the
/// reference's approximation: seed with each alternative's leading
/// symbol, repeatedly expand non-terminal entries into their own
/// FIRST, then additionally widen every non-terminal's FIRST with
/// whatever token follows *any* occurrence of that non-terminal
/// anywhere in the grammar (a deliberate widening of lookaheads per
/// SPEC_FULL.md §4.2, reproduced rather than tightened).
fn compute_first(
    rules: &FxHashMap<String, Vec<Rhs>>,
    non_terminals: &[String],
    nt_set: &FxHashSet<&str>,
) -> FxHashMap<String, Vec<String>> {
    let mut first: FxHashMap<String, Vec<String>> = FxHashMap::default();

    for nt in non_terminals {
        let mut seeds: Vec<String> = Vec::new();
        for rhs in &rules[nt] {
            if let Some(head) = rhs.first() {
                seeds.push(head.clone());
            }
        }
        first.insert(nt.clone(), seeds);
    }

    for nt in non_terminals {
        loop {
            let entries = first.get(nt).cloned().unwrap_or_default();
            let expand_at = entries.iter().position(|t| nt_set.contains(t.as_str()));
            let Some(idx) = expand_at else { break };
            let inner = entries[idx].clone();
            let mut next: Vec<String> = entries.clone();
            for rule in &rules[&inner] {
                if let Some(head) = rule.first() {
                    if !next.contains(head) {
                        next.push(head.clone());
                    }
                }
            }
            next.remove(idx);
            first.insert(nt.clone(), next);
        }
    }

    for nt in non_terminals {
        let mut widened = first.get(nt).cloned().unwrap_or_default();
        for alts in rules.values() {
            for rhs in alts {
                for (i, sym) in rhs.iter().enumerate() {
                    if sym == nt {
                        if let Some(follow) = rhs.get(i + 1) {
                            if !nt_set.contains(follow.as_str()) && !widened.contains(follow) {
                                widened.push(follow.clone());
                            }
                        }
                    }
                }
            }
        }
        first.insert(nt.clone(), widened);
    }

    first
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "program -> stmt\nstmt -> ID = constNum ; \\ ID = ID ;\n";

    #[test]
    fn parses_alternatives_split_on_backslash() {
        let g = Grammar::parse(TINY);
        let alts = g.alternatives("stmt").unwrap();
        assert_eq!(alts.len(), 2);
        assert_eq!(alts[0], vec!["ID", "=", "constNum", ";"]);
        assert_eq!(alts[1], vec!["ID", "=", "ID", ";"]);
    }

    #[test]
    fn partitions_terminals_and_non_terminals() {
        let g = Grammar::parse(TINY);
        assert!(g.is_non_terminal("program"));
        assert!(g.is_non_terminal("stmt"));
        assert!(!g.is_non_terminal("ID"));
        assert!(g.terminals.contains(&"ID".to_string()));
        assert!(g.terminals.contains(&"=".to_string()));
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let g = Grammar::parse("# a comment\n\nprogram -> stmt\nstmt -> ID ;\n");
        assert!(g.is_non_terminal("stmt"));
    }

    #[test]
    fn first_set_is_seeded_from_leading_symbols() {
        let g = Grammar::parse(TINY);
        assert!(g.first["stmt"].contains(&"ID".to_string()));
    }
}
