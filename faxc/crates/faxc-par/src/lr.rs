//! LR(1) canonical collection and ACTION/GOTO table construction.
//!
//! Grounded on `original_source/src/parser/lrParser.py`'s
//! `buildTables`/`closure`/`cleanItemSet(s)`/`createItemSets`/
//! `buildActionGoto`. Two deliberate departures from the Python source,
//! both called out in SPEC_FULL.md §9/DESIGN.md as Open Question
//! resolutions:
//!
//! - The per-set lookahead-cleaning step (`cleanItemSet`, singular) is
//!   actually invoked here on every item set, as SPEC_FULL.md §4.2 step
//!   2 describes; in the Python source the method exists but the main
//!   build loop calls only `cleanItemSets` (plural, the dedup step) and
//!   never the singular one, leaving non-terminal-lookahead items
//!   unexpanded. The written spec names this as a real pipeline step,
//!   so it is implemented as one.
//! - `closure` here runs to an honest fixed point (grow until a full
//!   pass adds nothing), rather than reproducing the Python loop's
//!   `new` flag, which is reset on every item visited and so reflects
//!   only the *last* item processed in a pass rather than any item —
//!   an incidental bug, not a named approximation, so it is not carried
//!   forward.
//!
//! The one-directional `cleanItemSets` containment check *is*
//! reproduced verbatim (see [`find_duplicate`]): two sets are merged
//! when every item of the earlier set also appears in the later one,
//! without checking the reverse inclusion.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::grammar::{Grammar, Rhs, ACCEPT, END_OF_INPUT, START};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub lhs: String,
    pub rhs: Rhs,
    pub dot: usize,
    pub lookahead: String,
}

impl Item {
    fn is_reducing(&self) -> bool {
        self.dot >= self.rhs.len()
    }

    fn symbol_after_dot(&self) -> Option<&str> {
        self.rhs.get(self.dot).map(|s| s.as_str())
    }

    fn advanced(&self) -> Item {
        Item {
            lhs: self.lhs.clone(),
            rhs: self.rhs.clone(),
            dot: self.dot + 1,
            lookahead: self.lookahead.clone(),
        }
    }
}

/// An action: shift to a state, or reduce by alternative `index` of
/// non-terminal `lhs`. Accept is represented as `Reduce(ACC, 0)` —
/// reducing the augmented start rule down to a one-element stack is
/// exactly the parser's acceptance condition, matching the reference
/// (which has no separate "accept" action kind either).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Shift(u32),
    Reduce(String, usize),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    pub action: FxHashMap<u32, FxHashMap<String, Action>>,
    pub goto: FxHashMap<u32, FxHashMap<String, u32>>,
}

impl Tables {
    pub fn is_accept(action: &Action) -> bool {
        matches!(action, Action::Reduce(lhs, 0) if lhs == ACCEPT)
    }
}

/// Everything built from a grammar: the tables the driver consumes,
/// plus a human-readable log of every ACTION-table conflict detected
/// (shift/reduce or reduce/reduce) for the caller to `tracing::warn!`.
pub struct BuildResult {
    pub tables: Tables,
    pub conflicts: Vec<String>,
}

pub fn build_tables(grammar: &Grammar) -> BuildResult {
    let mut item_sets: Vec<Option<Vec<Item>>> = vec![Some(vec![Item {
        lhs: ACCEPT.to_string(),
        rhs: vec![START.to_string()],
        dot: 0,
        lookahead: END_OF_INPUT.to_string(),
    }])];
    let mut transitions: Vec<FxHashMap<String, u32>> = vec![FxHashMap::default()];

    let mut processed = 0usize;
    loop {
        let frontier_end = item_sets.len();
        if processed == frontier_end {
            break;
        }
        for i in processed..frontier_end {
            if item_sets[i].is_none() {
                continue;
            }

            let mut set = item_sets[i].take().unwrap();
            closure(&mut set, grammar);
            clean_item_set(&mut set, grammar);

            if let Some(j) = find_duplicate(i, &set, &item_sets) {
                redirect_transitions(&mut transitions, i as u32, j as u32);
                item_sets[i] = None;
                continue;
            }

            item_sets[i] = Some(set);
            create_successors(i, &mut item_sets, &mut transitions);
        }
        processed = frontier_end;
    }

    let (tables, conflicts) = build_action_goto(grammar, &item_sets, &transitions);
    BuildResult { tables, conflicts }
}

/// Closure: while any item `[A -> a.Bb, x]` has a non-terminal `B`
/// right after the dot, add `[B -> .g, follow]` for every alternative
/// `g` of `B`, where `follow` is both the symbol right after `B` in the
/// current rule (or the item's own lookahead if `B` is last) *and*
/// every terminal already computed in `grammar.first[B]` — SPEC_FULL.md
/// §4.2 step 1 explicitly calls for both insertion forms.
fn closure(item_set: &mut Vec<Item>, grammar: &Grammar) {
    loop {
        let mut added = false;
        let mut i = 0;
        while i < item_set.len() {
            let (b, following) = {
                let item = &item_set[i];
                match item.symbol_after_dot() {
                    Some(b) if grammar.is_non_terminal(b) => {
                        let follow = item
                            .rhs
                            .get(item.dot + 1)
                            .cloned()
                            .unwrap_or_else(|| item.lookahead.clone());
                        (b.to_string(), follow)
                    }
                    _ => {
                        i += 1;
                        continue;
                    }
                }
            };

            let Some(alts) = grammar.alternatives(&b) else {
                i += 1;
                continue;
            };

            for alt in alts {
                let mut lookaheads = vec![following.clone()];
                for f in grammar.first.get(&b).into_iter().flatten() {
                    if !lookaheads.contains(f) {
                        lookaheads.push(f.clone());
                    }
                }
                for la in lookaheads {
                    let candidate = Item {
                        lhs: b.clone(),
                        rhs: alt.clone(),
                        dot: 0,
                        lookahead: la,
                    };
                    if !item_set.contains(&candidate) {
                        item_set.push(candidate);
                        added = true;
                    }
                }
            }
            i += 1;
        }
        if !added {
            break;
        }
    }
}

/// Expands any item whose lookahead is itself a non-terminal into one
/// item per terminal of that non-terminal's (already terminal-only)
/// FIRST set, discarding the original.
fn clean_item_set(item_set: &mut Vec<Item>, grammar: &Grammar) {
    loop {
        let idx = item_set
            .iter()
            .position(|it| grammar.is_non_terminal(&it.lookahead));
        let Some(idx) = idx else { break };
        let item = item_set.remove(idx);
        for term in grammar.first.get(&item.lookahead).into_iter().flatten() {
            let candidate = Item {
                lhs: item.lhs.clone(),
                rhs: item.rhs.clone(),
                dot: item.dot,
                lookahead: term.clone(),
            };
            if !item_set.contains(&candidate) {
                item_set.push(candidate);
            }
        }
    }
}

/// One-directional containment check, reproduced from
/// `cleanItemSets`: set `i` is considered a duplicate of an earlier
/// set `j` when every item of `j` is found in `i`, without checking
/// the reverse — so a later set that is a strict superset of an
/// earlier one is also merged away.
fn find_duplicate(i: usize, candidate: &[Item], item_sets: &[Option<Vec<Item>>]) -> Option<usize> {
    for j in (0..i).rev() {
        let Some(existing) = &item_sets[j] else {
            continue;
        };
        if existing.iter().all(|it| candidate.contains(it)) {
            return Some(j);
        }
    }
    None
}

fn redirect_transitions(transitions: &mut [FxHashMap<String, u32>], from: u32, to: u32) {
    for table in transitions.iter_mut() {
        for target in table.values_mut() {
            if *target == from {
                *target = to;
            }
        }
    }
}

fn create_successors(
    i: usize,
    item_sets: &mut Vec<Option<Vec<Item>>>,
    transitions: &mut Vec<FxHashMap<String, u32>>,
) {
    let set = item_sets[i].clone().unwrap();
    for item in &set {
        let Some(symbol) = item.symbol_after_dot() else {
            continue;
        };
        let symbol = symbol.to_string();
        let target = *transitions[i].entry(symbol.clone()).or_insert_with(|| {
            let id = item_sets.len() as u32;
            item_sets.push(Some(Vec::new()));
            transitions.push(FxHashMap::default());
            id
        });
        let advanced = item.advanced();
        let bucket = item_sets[target as usize].get_or_insert_with(Vec::new);
        if !bucket.contains(&advanced) {
            bucket.push(advanced);
        }
    }
}

fn build_action_goto(
    grammar: &Grammar,
    item_sets: &[Option<Vec<Item>>],
    transitions: &[FxHashMap<String, u32>],
) -> (Tables, Vec<String>) {
    let mut action: FxHashMap<u32, FxHashMap<String, Action>> = FxHashMap::default();
    let mut goto: FxHashMap<u32, FxHashMap<String, u32>> = FxHashMap::default();
    let mut conflicts = Vec::new();

    for (state, maybe_set) in item_sets.iter().enumerate() {
        let Some(set) = maybe_set else { continue };
        for item in set {
            if !item.is_reducing() {
                continue;
            }
            let Some(alts) = grammar.alternatives(&item.lhs) else {
                continue;
            };
            let Some(idx) = alts.iter().position(|alt| alt == &item.rhs) else {
                continue;
            };
            let entry = action.entry(state as u32).or_default();
            let new_action = Action::Reduce(item.lhs.clone(), idx);
            if let Some(prev) = entry.get(&item.lookahead) {
                if *prev != new_action {
                    conflicts.push(format!(
                        "reduce/reduce conflict at state {state} on '{}': {:?} -> {:?}",
                        item.lookahead, prev, new_action
                    ));
                }
            }
            entry.insert(item.lookahead.clone(), new_action);
        }
    }

    for (state, table) in transitions.iter().enumerate() {
        for (symbol, &target) in table {
            if grammar.is_non_terminal(symbol) {
                goto.entry(state as u32)
                    .or_default()
                    .insert(symbol.clone(), target);
            } else {
                let entry = action.entry(state as u32).or_default();
                let new_action = Action::Shift(target);
                if let Some(prev) = entry.get(symbol) {
                    if *prev != new_action {
                        conflicts.push(format!(
                            "shift/reduce conflict at state {state} on '{symbol}': {:?} -> {:?}",
                            prev, new_action
                        ));
                    }
                }
                entry.insert(symbol.clone(), new_action);
            }
        }
    }

    (Tables { action, goto }, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;

    const TINY: &str = "program -> ID = constNum ;\n";

    #[test]
    fn builds_tables_that_accept_the_only_sentence() {
        let grammar = Grammar::parse(TINY);
        let result = build_tables(&grammar);
        assert!(result.tables.action.get(&0).is_some());
    }

    #[test]
    fn no_two_item_sets_after_build_are_literally_identical() {
        let grammar = Grammar::parse(
            "program -> stmt\nstmt -> ID = constNum ; \\ ID = ID ;\n",
        );
        let result = build_tables(&grammar);
        assert!(!result.conflicts.iter().any(|c| c.contains("reduce/reduce") && c.contains("state 0")));
    }
}
