//! Pratt parser: drives the scanner, builds the AST, and resolves names
//! and types in the same left-to-right pass.

mod expr;
mod stmt;
mod types;

use std::collections::HashMap;

use bumpalo::Bump;

use crate::ast::{NodeFlags, Stmt, Unit};
use crate::builtins;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Severity};
use crate::scanner::Scanner;
use crate::scope::{Binding, ScopeStack};
use crate::source::{SourceId, SourceRange};
use crate::symbol::{Interner, Keywords, Symbol};
use crate::token::{Token, TokenKind};
use crate::types::{TypeRef, TypeStore};

/// Resolved information about a non-type binding (local, parameter,
/// function). `Binding::Expr` indexes into the parser's `locals` table
/// rather than carrying this information inline, so that scope entries
/// stay a fixed four bytes.
#[derive(Debug, Clone, Copy)]
pub struct LocalInfo {
    pub ty: TypeRef,
    pub mutable: bool,
}

struct DefEntry {
    binding: Binding,
    range: SourceRange,
}

/// Precedence levels, weakest to strongest, per §4.5's ladder. Listed
/// variants double as the climbing threshold passed to `parse_expr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Prec {
    Lowest,
    Comma,
    Assignment,
    LogicalOr,
    LogicalAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Comparison,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    Postfix,
    Member,
}

pub struct Parser<'a, 'b> {
    bump: &'a Bump,
    interner: &'b Interner,
    keywords: Keywords,
    diags: &'b Diagnostics,
    types: &'b mut TypeStore,
    scanner: Scanner<'a>,
    cur: Token,
    scopes: ScopeStack,
    locals: Vec<LocalInfo>,
    package_defs: HashMap<Symbol, DefEntry>,
    type_ctx: Vec<TypeRef>,
    /// The receiver type of the method body currently being parsed, used
    /// to resolve the leading-dot shorthand `.name`.
    dot_ctx: Vec<TypeRef>,
    /// The enclosing struct type while parsing methods declared inline in
    /// a `type Name { ... }` body, consulted as the receiver type for a
    /// bare `this`/`mut this` parameter with no `Recv.name`-qualified name.
    struct_ctx: Vec<TypeRef>,
}

impl<'a, 'b> Parser<'a, 'b> {
    pub fn new(
        bump: &'a Bump,
        interner: &'b Interner,
        diags: &'b Diagnostics,
        types: &'b mut TypeStore,
        file: SourceId,
        bytes: &'a [u8],
    ) -> Self {
        let keywords = Keywords::install(interner);
        let mut scopes = ScopeStack::new();
        builtins::install(&mut scopes, interner, &types.primitives);
        scopes.push();
        scopes.mark_toplevel();

        let mut scanner = Scanner::new(file, bytes);
        let cur = scanner.next(interner, diags);

        Parser {
            bump,
            interner,
            keywords,
            diags,
            types,
            scanner,
            cur,
            scopes,
            locals: Vec::new(),
            package_defs: HashMap::new(),
            type_ctx: Vec::new(),
            dot_ctx: Vec::new(),
            struct_ctx: Vec::new(),
        }
    }

    /// Parses one compilation unit to completion. The scope stack is
    /// guaranteed empty of everything pushed by this call on return — the
    /// package scope pushed in `new` is popped here.
    pub fn parse(mut self) -> Unit<'a> {
        let mut stmts: Vec<&'a Stmt<'a>> = Vec::new();
        while !self.at(TokenKind::Eof) {
            if self.at(TokenKind::ImplicitSemicolon) || self.at(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            let stmt = self.parse_top_level_statement();
            stmts.push(self.bump.alloc(stmt));
        }
        self.scopes.pop();
        Unit {
            top_level: self.bump.alloc_slice_copy(&stmts),
        }
    }

    // --- token stream helpers ---

    fn advance(&mut self) -> Token {
        let prev = self.cur;
        self.cur = self.scanner.next(self.interner, self.diags);
        prev
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.cur.kind == kind
    }

    fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|k| self.cur.kind == *k)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Token {
        if self.at(kind) {
            self.advance()
        } else {
            self.error(DiagnosticKind::Syntax, format!("expected {what}"));
            self.cur
        }
    }

    fn error(&mut self, kind: DiagnosticKind, message: String) {
        self.diags.report(kind, Severity::Error, self.cur.range, message);
    }

    /// Skips tokens until the next synchronizing token (a semicolon, an
    /// implicit semicolon, or end-of-file) is reached, per the "fast
    /// forward to the nearest semicolon" failure policy.
    fn synchronize(&mut self) {
        while !self.at_any(&[
            TokenKind::Semicolon,
            TokenKind::ImplicitSemicolon,
            TokenKind::Eof,
        ]) {
            self.advance();
        }
        self.eat(TokenKind::Semicolon);
        self.eat(TokenKind::ImplicitSemicolon);
    }

    fn expect_identifier(&mut self) -> Option<Symbol> {
        if let TokenKind::Identifier(sym) = self.cur.kind {
            self.advance();
            Some(sym)
        } else {
            self.error(DiagnosticKind::Syntax, "expected an identifier".to_string());
            None
        }
    }

    // --- definitions ---

    /// Enters `name` into the current scope and, if the current scope is
    /// the package scope, into the package-wide name map. Reports
    /// "redefinition" for a same-scope duplicate (top-level scope checks
    /// the package map; inner scopes check only their own frame, per
    /// §4.5's "duplicates at inner scopes are rejected only against the
    /// innermost frame").
    fn define(&mut self, name: Symbol, binding: Binding, range: SourceRange) {
        if self.scopes.is_toplevel() {
            if let Some(prior) = self.package_defs.get(&name) {
                self.diags.report(
                    DiagnosticKind::NameResolution,
                    Severity::Error,
                    range,
                    format!(
                        "redefinition of `{}`, previously defined at {}",
                        self.interner.as_str(name),
                        prior.range.start
                    ),
                );
                return;
            }
            self.package_defs.insert(name, DefEntry { binding, range });
            self.scopes.define(name, binding);
        } else {
            if self.scopes.lookup(name, Some(0)).is_some() {
                self.diags.report(
                    DiagnosticKind::NameResolution,
                    Severity::Error,
                    range,
                    format!("redefinition of `{}`", self.interner.as_str(name)),
                );
                return;
            }
            self.scopes.define(name, binding);
        }
    }

    fn define_local(&mut self, name: Symbol, ty: TypeRef, mutable: bool, range: SourceRange) -> u32 {
        let idx = self.locals.len() as u32;
        self.locals.push(LocalInfo { ty, mutable });
        self.define(name, Binding::Expr(idx), range);
        idx
    }

    fn local(&self, idx: u32) -> LocalInfo {
        self.locals[idx as usize]
    }

    // --- type context / dot context (scoped acquisition) ---

    fn push_type_ctx(&mut self, ty: TypeRef) {
        self.type_ctx.push(ty);
    }

    fn pop_type_ctx(&mut self) {
        self.type_ctx.pop();
    }

    fn current_type_ctx(&self) -> Option<TypeRef> {
        self.type_ctx.last().copied()
    }

    fn push_dot_ctx(&mut self, receiver: TypeRef) {
        self.dot_ctx.push(receiver);
    }

    fn pop_dot_ctx(&mut self) {
        self.dot_ctx.pop();
    }

    fn void_ty(&self) -> TypeRef {
        self.types.primitives.void
    }

    fn lookup_binding(&self, sym: Symbol) -> Option<Binding> {
        self.scopes.lookup(sym, None)
    }

    /// Bit width and signedness of `ty` if it is one of the fixed-width
    /// integer primitives (not `int`/`uint`, whose width is target-defined
    /// and handled by the caller's native-width fallback).
    fn int_type_bits_signed(&self, ty: TypeRef) -> Option<(u32, bool)> {
        let p = &self.types.primitives;
        Some(match ty {
            t if t == p.i8 => (8, true),
            t if t == p.i16 => (16, true),
            t if t == p.i32 => (32, true),
            t if t == p.i64 => (64, true),
            t if t == p.u8 => (8, false),
            t if t == p.u16 => (16, false),
            t if t == p.u32 => (32, false),
            t if t == p.u64 => (64, false),
            t if t == p.int => (self.types.native_int_width() as u32 * 8, true),
            t if t == p.uint => (self.types.native_int_width() as u32 * 8, false),
            _ => return None,
        })
    }

    /// Follows `Alias` chains to the underlying structural type — named
    /// struct types are looked up through their alias, so field/method
    /// resolution and the small-receiver ABI check need the real node.
    fn underlying(&self, ty: TypeRef) -> TypeRef {
        let mut ty = ty;
        loop {
            match &self.types.get(ty).kind {
                crate::types::TypeKind::Alias { target, .. } => ty = *target,
                _ => return ty,
            }
        }
    }

    fn type_is_optional(&self, ty: TypeRef) -> bool {
        matches!(self.types.get(ty).kind, crate::types::TypeKind::Optional(_))
    }

    fn optional_inner(&self, ty: TypeRef) -> Option<TypeRef> {
        match self.types.get(ty).kind {
            crate::types::TypeKind::Optional(inner) => Some(inner),
            _ => None,
        }
    }

    fn set_rvalue(flags: NodeFlags, on: bool) -> NodeFlags {
        if on {
            flags | NodeFlags::RVALUE
        } else {
            flags & !NodeFlags::RVALUE
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Owns everything a `Parser` borrows from, so tests can build one
    /// without threading lifetimes through every call site.
    pub struct Harness {
        pub bump: Bump,
        pub interner: Interner,
        pub diags: Diagnostics,
        pub types: TypeStore,
    }

    impl Harness {
        pub fn new() -> Self {
            let interner = Interner::new();
            let types = TypeStore::new(&interner, 8, 8);
            Harness {
                bump: Bump::new(),
                interner,
                diags: Diagnostics::new(),
                types,
            }
        }

        pub fn parse<'h>(&'h mut self, src: &'h str) -> Unit<'h> {
            let parser = Parser::new(
                &self.bump,
                &self.interner,
                &self.diags,
                &mut self.types,
                SourceId(0),
                src.as_bytes(),
            );
            parser.parse()
        }
    }
}
