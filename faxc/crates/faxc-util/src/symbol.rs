//! Interned strings.
//!
//! Identifiers, keywords, and label names all flow through a single
//! [`StringTable`] so that equality and hashing on a [`Symbol`] are a
//! single `u32` comparison instead of a string compare. Strings are
//! allocated out of a `bumpalo::Bump` arena and leaked to `'static` so
//! a `Symbol` can be copied freely without a lifetime parameter.

use std::cell::RefCell;
use std::fmt;

use rustc_hash::FxHashMap;

/// A lightweight handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

impl Symbol {
    /// Interns `s` in the thread-local table, returning its handle.
    pub fn intern(s: &str) -> Symbol {
        TABLE.with(|t| t.borrow_mut().intern(s))
    }

    /// Resolves this symbol back to its string contents.
    pub fn as_str(self) -> &'static str {
        TABLE.with(|t| t.borrow().get(self))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

thread_local! {
    static TABLE: RefCell<StringTable> = RefCell::new(StringTable::new());
}

/// The arena-backed interner backing [`Symbol`].
struct StringTable {
    index: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
    arena: bumpalo::Bump,
}

impl StringTable {
    fn new() -> Self {
        StringTable {
            index: FxHashMap::default(),
            strings: Vec::new(),
            arena: bumpalo::Bump::new(),
        }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&id) = self.index.get(s) {
            return Symbol(id);
        }

        let leaked: &'static str = {
            let alloc: &str = self.arena.alloc_str(s);
            // SAFETY: the arena is never reset or dropped while this
            // `StringTable` is alive, so strings allocated from it live
            // as long as the table does. The table itself lives for the
            // duration of the thread (thread_local), which outlives every
            // `Symbol` that could be produced from it.
            unsafe { std::mem::transmute::<&str, &'static str>(alloc) }
        };

        let id = self.strings.len() as u32;
        self.strings.push(leaked);
        self.index.insert(leaked, id);
        Symbol(id)
    }

    fn get(&self, sym: Symbol) -> &'static str {
        self.strings[sym.0 as usize]
    }
}
