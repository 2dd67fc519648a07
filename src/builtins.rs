//! The builtin universe: the seed map injected as the parent of the
//! package scope.

use crate::scope::{Binding, ScopeStack};
use crate::symbol::Interner;
use crate::types::{PrimitiveTypes, TypeRef};

/// Installs primitive type names and the boolean constants into a fresh
/// universe scope. Must be called exactly once, before the caller pushes
/// and marks the package scope with `ScopeStack::mark_toplevel`.
pub fn install(scopes: &mut ScopeStack, interner: &Interner, prims: &PrimitiveTypes) {
    scopes.push();
    let mut bind_type = |name: &str, ty: TypeRef| {
        let sym = interner.intern_str(name);
        scopes.define(sym, Binding::Type(ty));
    };
    bind_type("void", prims.void);
    bind_type("bool", prims.bool_);
    bind_type("i8", prims.i8);
    bind_type("i16", prims.i16);
    bind_type("i32", prims.i32);
    bind_type("i64", prims.i64);
    bind_type("u8", prims.u8);
    bind_type("u16", prims.u16);
    bind_type("u32", prims.u32);
    bind_type("u64", prims.u64);
    bind_type("int", prims.int);
    bind_type("uint", prims.uint);
    bind_type("f32", prims.f32);
    bind_type("f64", prims.f64);

    // Boolean constants are expression bindings, not types; they carry no
    // definition index of their own since the universe scope has no
    // backing AST statement — `u32::MAX` marks "builtin, no statement".
    let true_sym = interner.intern_str("true");
    let false_sym = interner.intern_str("false");
    scopes.define(true_sym, Binding::Expr(u32::MAX));
    scopes.define(false_sym, Binding::Expr(u32::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universe_scope_resolves_primitive_names() {
        let interner = Interner::new();
        let store = crate::types::TypeStore::new(&interner, 8, 8);
        let mut scopes = ScopeStack::new();
        install(&mut scopes, &interner, &store.primitives);
        let int_sym = interner.intern_str("int");
        assert_eq!(
            scopes.lookup(int_sym, None),
            Some(Binding::Type(store.primitives.int))
        );
    }

    #[test]
    fn universe_scope_resolves_boolean_constants() {
        let interner = Interner::new();
        let store = crate::types::TypeStore::new(&interner, 8, 8);
        let mut scopes = ScopeStack::new();
        install(&mut scopes, &interner, &store.primitives);
        let true_sym = interner.intern_str("true");
        assert!(scopes.lookup(true_sym, None).is_some());
    }
}
