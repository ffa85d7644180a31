//! The unique-name generator.
//!
//! Grounded on `original_source/src/util.py`'s `Unique` class: a
//! per-prefix monotonic counter used to mint fresh temporaries (default
//! prefix, yielding `r1, r2, ...`) and basic-block labels (prefix `_L`,
//! yielding `_L1, _L2, ...`). The reference keeps one process-wide
//! singleton (`util.unique`); per the spec's design note this is instead
//! an explicit value threaded through the parser, IR builder, and
//! codegen via the compilation session, so two compilations never share
//! state and tests can construct a fresh one freely.

use crate::FxHashMap;

const DEFAULT_PREFIX: &str = "r";

/// Mints fresh, monotonically increasing names, one counter per prefix.
#[derive(Debug, Default)]
pub struct Unique {
    counters: FxHashMap<String, u32>,
}

impl Unique {
    pub fn new() -> Self {
        Unique {
            counters: FxHashMap::default(),
        }
    }

    /// Returns the next name for `prefix`, e.g. `fresh("_L")` yields
    /// `_L1`, then `_L2`, ...
    pub fn fresh(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    /// Mints a fresh temporary using the default `r` prefix.
    pub fn fresh_temp(&mut self) -> String {
        self.fresh(DEFAULT_PREFIX)
    }

    /// Mints a fresh basic-block label using the `_L` prefix.
    pub fn fresh_label(&mut self) -> String {
        self.fresh("_L")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_per_prefix_and_monotone() {
        let mut u = Unique::new();
        assert_eq!(u.fresh_temp(), "r1");
        assert_eq!(u.fresh_temp(), "r2");
        assert_eq!(u.fresh_label(), "_L1");
        assert_eq!(u.fresh_temp(), "r3");
        assert_eq!(u.fresh_label(), "_L2");
    }
}
