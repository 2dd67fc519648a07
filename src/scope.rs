//! Lexical scope stack.
//!
//! A single contiguous stack of words, interleaving (value, key) pairs for
//! the current scope with a saved-base word left behind by `push`. This
//! gives O(1) push/pop of entire scopes and avoids a per-scope `HashMap`
//! allocation, at the cost of a linear scan per lookup.

use crate::symbol::Symbol;

/// What a name in scope is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Resolves to an expression-producing definition (local, parameter, fn).
    Expr(u32),
    /// Resolves to a type definition.
    Type(u32),
}

#[derive(Debug, Clone, Copy)]
enum Word {
    Entry { key: Symbol, value: Binding },
    SavedBase(usize),
}

/// Flat, stack-discipline scope chain.
pub struct ScopeStack {
    words: Vec<Word>,
    /// Index of the first word belonging to the current (innermost) scope.
    base: usize,
    /// `base` of the outermost user scope (the package scope), set
    /// explicitly by [`Self::mark_toplevel`] once the caller has pushed
    /// past the builtin universe scope.
    package_base: Option<usize>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            words: Vec::new(),
            base: 0,
            package_base: None,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Pushes a new scope. The previous `base` is saved so `pop` can restore it.
    pub fn push(&mut self) {
        self.words.push(Word::SavedBase(self.base));
        self.base = self.words.len();
    }

    /// Marks the current scope as the package scope, the level
    /// [`Self::is_toplevel`] reports true for. Called once, right after the
    /// package scope (as opposed to the builtin universe beneath it) is
    /// pushed.
    pub fn mark_toplevel(&mut self) {
        self.package_base = Some(self.base);
    }

    /// Pops the current scope, restoring `base` to the value saved by the
    /// matching `push`.
    ///
    /// # Panics
    /// Panics (via `debug_assert!`) if called without a matching `push` —
    /// this is an internal invariant violation, per the spec's "asserted,
    /// not recovered" policy for scoped-acquisition bugs.
    pub fn pop(&mut self) {
        debug_assert!(self.base > 0, "pop without matching push");
        let saved_base_slot = self.base - 1;
        let saved = match self.words.get(saved_base_slot) {
            Some(Word::SavedBase(b)) => *b,
            _ => unreachable!("scope stack corrupted: base does not point at a saved-base slot"),
        };
        self.words.truncate(saved_base_slot);
        self.base = saved;
    }

    /// Defines `key` in the current (innermost) scope.
    pub fn define(&mut self, key: Symbol, value: Binding) {
        self.words.push(Word::Entry { key, value });
    }

    /// Looks up `key`, scanning from the top of the stack toward the root,
    /// stepping across saved-base slots, for up to `max_depth` enclosing
    /// scopes. `max_depth = None` means unbounded; `max_depth = Some(0)`
    /// restricts the search to the innermost frame only (used to detect
    /// same-scope duplicates before defining).
    pub fn lookup(&self, key: Symbol, max_depth: Option<u32>) -> Option<Binding> {
        let mut scope_base = self.base;
        let mut scope_end = self.words.len();
        let mut scopes_examined: u32 = 0;
        loop {
            let mut idx = scope_end;
            while idx > scope_base {
                idx -= 1;
                if let Word::Entry { key: k, value } = self.words[idx] {
                    if k == key {
                        return Some(value);
                    }
                }
            }
            if scope_base == 0 {
                return None;
            }
            scopes_examined += 1;
            if let Some(max) = max_depth {
                if scopes_examined > max {
                    return None;
                }
            }
            // The saved-base slot just below this scope both terminates the
            // enclosing scope's entry run and records where it began.
            scope_end = scope_base - 1;
            scope_base = match self.words.get(scope_end) {
                Some(Word::SavedBase(b)) => *b,
                _ => unreachable!("scope stack corrupted: missing saved-base slot"),
            };
        }
    }

    /// True when the current scope is the outermost user scope (the package
    /// scope) — the first scope pushed after construction.
    pub fn is_toplevel(&self) -> bool {
        self.package_base == Some(self.base)
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(n: u32) -> Symbol {
        // Symbols are opaque outside this crate; tests construct them
        // through an Interner instead of relying on representation.
        let interner = crate::symbol::Interner::new();
        interner.intern_str(&format!("sym{n}"))
    }

    #[test]
    fn push_pop_restores_len_and_base() {
        let mut s = ScopeStack::new();
        assert_eq!(s.len(), 0);
        s.push();
        s.define(sym(0), Binding::Expr(0));
        s.define(sym(1), Binding::Expr(1));
        assert_eq!(s.len(), 2);
        s.pop();
        assert_eq!(s.len(), 0);
    }

    #[test]
    fn nested_scopes_shadow_and_restore() {
        let mut s = ScopeStack::new();
        let x = sym(0);
        s.push();
        s.define(x, Binding::Expr(1));
        s.push();
        s.define(x, Binding::Expr(2));
        assert_eq!(s.lookup(x, None), Some(Binding::Expr(2)));
        s.pop();
        assert_eq!(s.lookup(x, None), Some(Binding::Expr(1)));
        s.pop();
        assert_eq!(s.lookup(x, None), None);
    }

    #[test]
    fn max_depth_zero_only_sees_innermost_scope() {
        let mut s = ScopeStack::new();
        let x = sym(0);
        s.push();
        s.define(x, Binding::Expr(1));
        s.push();
        assert_eq!(s.lookup(x, Some(0)), None);
        assert_eq!(s.lookup(x, Some(1)), Some(Binding::Expr(1)));
    }

    #[test]
    fn is_toplevel_tracks_package_scope() {
        let mut s = ScopeStack::new();
        s.push(); // universe
        assert!(!s.is_toplevel());
        s.push(); // package
        s.mark_toplevel();
        assert!(s.is_toplevel());
        s.push();
        assert!(!s.is_toplevel());
        s.pop();
        assert!(s.is_toplevel());
    }
}
