//! Symbol interner
//!
//! Bidirectional map between byte strings and stable, `Copy` handles.
//! Two symbols compare equal iff the bytes they were interned from are
//! equal; interning the same bytes twice returns the same handle.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::RwLock;

/// An interned byte string. Reserves the value `0` internally so that
/// `Option<Symbol>` stays four bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(NonZeroU32);

impl Symbol {
    fn from_index(index: u32) -> Self {
        Symbol(NonZeroU32::new(index + 1).expect("symbol index overflow"))
    }

    fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Process-wide, thread-safe symbol table.
///
/// Reads (`resolve`, `as_bytes`) take the table's read lock and are safe to
/// call concurrently once keyword reservation has finished. `intern` takes
/// the write lock.
pub struct Interner {
    inner: RwLock<InternerTables>,
}

struct InternerTables {
    map: HashMap<Box<[u8]>, Symbol>,
    strings: Vec<Box<[u8]>>,
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            inner: RwLock::new(InternerTables {
                map: HashMap::new(),
                strings: Vec::new(),
            }),
        }
    }

    /// Interns a byte slice, returning its stable symbol. Idempotent: interning
    /// the same bytes any number of times returns the same `Symbol`.
    pub fn intern(&self, bytes: &[u8]) -> Symbol {
        if let Some(sym) = self.resolve(bytes) {
            return sym;
        }
        let mut tables = self.inner.write().expect("interner lock poisoned");
        // Re-check under the write lock: another writer may have interned
        // these same bytes between our read-lock probe and taking the lock.
        if let Some(sym) = tables.map.get(bytes) {
            return *sym;
        }
        let owned: Box<[u8]> = bytes.into();
        let sym = Symbol::from_index(tables.strings.len() as u32);
        tables.strings.push(owned.clone());
        tables.map.insert(owned, sym);
        sym
    }

    pub fn intern_str(&self, s: &str) -> Symbol {
        self.intern(s.as_bytes())
    }

    /// Looks up an already-interned byte slice without inserting it.
    pub fn resolve(&self, bytes: &[u8]) -> Option<Symbol> {
        let tables = self.inner.read().expect("interner lock poisoned");
        tables.map.get(bytes).copied()
    }

    /// Returns the bytes a symbol was interned from.
    ///
    /// # Panics
    /// Panics if `sym` was not produced by this interner.
    pub fn as_bytes(&self, sym: Symbol) -> Vec<u8> {
        let tables = self.inner.read().expect("interner lock poisoned");
        tables.strings[sym.index()].to_vec()
    }

    pub fn as_str(&self, sym: Symbol) -> String {
        String::from_utf8(self.as_bytes(sym)).expect("interned symbol was not valid UTF-8")
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

/// Reserved symbol constants, interned once when a [`Interner`] is built via
/// [`Keywords::install`]. Mirrors the "bind a const per well-known symbol"
/// idiom so parser code can write `kw.if_` instead of re-interning
/// `"if"` at every call site.
pub struct Keywords {
    pub blank: Symbol,
    pub if_: Symbol,
    pub else_: Symbol,
    pub fun: Symbol,
    pub let_: Symbol,
    pub var: Symbol,
    pub mut_: Symbol,
    pub this: Symbol,
    pub type_: Symbol,
    pub return_: Symbol,
    pub break_: Symbol,
    pub continue_: Symbol,
    pub true_: Symbol,
    pub false_: Symbol,
    pub struct_: Symbol,
}

impl Keywords {
    pub fn install(interner: &Interner) -> Self {
        Keywords {
            blank: interner.intern_str("_"),
            if_: interner.intern_str("if"),
            else_: interner.intern_str("else"),
            fun: interner.intern_str("fun"),
            let_: interner.intern_str("let"),
            var: interner.intern_str("var"),
            mut_: interner.intern_str("mut"),
            this: interner.intern_str("this"),
            type_: interner.intern_str("type"),
            return_: interner.intern_str("return"),
            break_: interner.intern_str("break"),
            continue_: interner.intern_str("continue"),
            true_: interner.intern_str("true"),
            false_: interner.intern_str("false"),
            struct_: interner.intern_str("struct"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let interner = Interner::new();
        let a = interner.intern_str("hello");
        let b = interner.intern_str("hello");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_bytes_get_distinct_symbols() {
        let interner = Interner::new();
        let a = interner.intern_str("foo");
        let b = interner.intern_str("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn round_trips_bytes() {
        let interner = Interner::new();
        let sym = interner.intern_str("roundtrip");
        assert_eq!(interner.as_str(sym), "roundtrip");
    }

    #[test]
    fn resolve_without_interning_misses() {
        let interner = Interner::new();
        assert!(interner.resolve(b"never-interned").is_none());
        let sym = interner.intern_str("now-interned");
        assert_eq!(interner.resolve(b"now-interned"), Some(sym));
    }

    #[test]
    fn keywords_are_stable() {
        let interner = Interner::new();
        let kw = Keywords::install(&interner);
        assert_eq!(kw.if_, interner.intern_str("if"));
        assert_ne!(kw.if_, kw.else_);
    }
}
