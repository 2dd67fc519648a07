//! Statement parselets: declarations (`let`/`var`/`fun`/`type`),
//! `return`/`break`/`continue`, and expression-statements.

use std::collections::HashSet;

use crate::ast::{FieldDecl, FunDef, NodeFlags, Param, Stmt, StmtKind, TypeDef, TypeExpr, TypeExprKind};
use crate::diagnostics::{DiagnosticKind, Severity};
use crate::scope::Binding;
use crate::source::SourceRange;
use crate::symbol::Symbol;
use crate::token::TokenKind;
use crate::types::{Field, FunctionFlags, StructFlags, TypeKind, TypeRef};

use super::Parser;

impl<'a, 'b> Parser<'a, 'b> {
    pub(super) fn parse_top_level_statement(&mut self) -> Stmt<'a> {
        self.parse_statement()
    }

    pub(super) fn parse_statement(&mut self) -> Stmt<'a> {
        match self.cur.kind {
            TokenKind::KwFun => self.parse_fun_def(),
            TokenKind::KwType => self.parse_type_def(),
            TokenKind::KwLet => self.parse_binding(false),
            TokenKind::KwVar => self.parse_binding(true),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwBreak => {
                let range = self.cur.range;
                self.advance();
                let s = Stmt::new(StmtKind::Break, range);
                s.flags.set(s.flags.get() | NodeFlags::EXITS);
                s
            }
            TokenKind::KwContinue => {
                let range = self.cur.range;
                self.advance();
                let s = Stmt::new(StmtKind::Continue, range);
                s.flags.set(s.flags.get() | NodeFlags::EXITS);
                s
            }
            _ => self.parse_expr_statement(),
        }
    }

    fn parse_expr_statement(&mut self) -> Stmt<'a> {
        let expr = self.parse_expression();
        Stmt::new(StmtKind::Expr(expr), expr.range)
    }

    fn parse_return(&mut self) -> Stmt<'a> {
        let start = self.cur.range;
        self.advance();
        let value = if self.at_statement_end() {
            None
        } else {
            Some(self.parse_expression())
        };
        let end = value.map(|v| v.range).unwrap_or(start);
        let range = SourceRange::new(start.start, end.end);
        let s = Stmt::new(StmtKind::Return(value), range);
        s.flags.set(s.flags.get() | NodeFlags::EXITS);
        s
    }

    fn at_statement_end(&self) -> bool {
        matches!(
            self.cur.kind,
            TokenKind::Semicolon | TokenKind::ImplicitSemicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    /// `let name [type] = init` / `var name [type] = init`. The declared
    /// type, when present, is spelled with no separating punctuation
    /// (`let p ?int = 3`), so it is recognized by lookahead: anything other
    /// than `=` or a statement terminator starts a type expression.
    fn parse_binding(&mut self, mutable: bool) -> Stmt<'a> {
        let start = self.cur.range;
        self.advance();
        let Some(name) = self.expect_identifier() else {
            self.synchronize();
            return Stmt::new(StmtKind::Bad, start);
        };

        let declared_ty = if !self.at(TokenKind::Eq) && !self.at_statement_end() {
            Some(self.parse_type_expr())
        } else {
            None
        };
        let declared_ref = declared_ty.map(|t| self.resolve_type_expr(t));

        let init = if self.eat(TokenKind::Eq) {
            if let Some(ty) = declared_ref {
                self.push_type_ctx(ty);
            }
            let e = self.parse_expression();
            if declared_ref.is_some() {
                self.pop_type_ctx();
            }
            Some(e)
        } else {
            None
        };

        if let (Some(declared), Some(init_expr)) = (declared_ref, init) {
            if declared != init_expr.ty.get() && init_expr.ty.get() != self.void_ty() {
                self.diags.report(
                    DiagnosticKind::Type,
                    Severity::Error,
                    init_expr.range,
                    "initializer type does not match declared type".to_string(),
                );
            }
        }

        let binding_ty = declared_ref
            .or_else(|| init.map(|e| e.ty.get()))
            .unwrap_or_else(|| self.void_ty());

        let range = SourceRange::new(
            start.start,
            init.map(|e| e.range)
                .or(declared_ty.map(|t| t.range))
                .unwrap_or(start)
                .end,
        );

        self.define_local(name, binding_ty, mutable, range);

        Stmt::new(
            StmtKind::Let {
                name,
                mutable,
                declared_ty,
                init,
            },
            range,
        )
    }

    /// `fun name(...) [result] { body }`, `fun Recv.name(...) [result] {
    /// body }`. A leading `this`/`mut this` parameter, or a `Recv.`-
    /// qualified name, promotes the definition to a method registered on
    /// the receiver's method map rather than a package-scope binding.
    fn parse_fun_def(&mut self) -> Stmt<'a> {
        let start = self.cur.range;
        self.advance();
        let Some(first_name) = self.expect_identifier() else {
            self.synchronize();
            return Stmt::new(StmtKind::Bad, start);
        };

        let mut explicit_receiver_ty: Option<TypeRef> = None;
        let name = if self.eat(TokenKind::Dot) {
            let Some(method_name) = self.expect_identifier() else {
                self.synchronize();
                return Stmt::new(StmtKind::Bad, start);
            };
            match self.lookup_binding(first_name) {
                Some(Binding::Type(t)) => explicit_receiver_ty = Some(t),
                _ => self.error(
                    DiagnosticKind::NameResolution,
                    format!(
                        "`{}` is not a known type in method name `{}.{}`",
                        self.interner.as_str(first_name),
                        self.interner.as_str(first_name),
                        self.interner.as_str(method_name)
                    ),
                ),
            }
            method_name
        } else {
            first_name
        };

        self.expect(TokenKind::LParen, "`(` to open parameter list");
        let (mut receiver, params) = self.parse_param_list();
        self.expect(TokenKind::RParen, "`)` to close parameter list");

        let result_texpr = if !self.at(TokenKind::LBrace) {
            Some(self.parse_type_expr())
        } else {
            None
        };
        let result_ty = result_texpr
            .map(|t| self.resolve_type_expr(t))
            .unwrap_or_else(|| self.void_ty());

        let receiver_ty = explicit_receiver_ty.or_else(|| {
            if receiver.is_some() {
                self.struct_ctx.last().copied()
            } else {
                None
            }
        });
        if let Some(recv) = &mut receiver {
            match receiver_ty {
                Some(rty) => {
                    recv.ty.resolved.set(rty);
                    recv.by_value = !recv.mutable && self.receiver_is_small(rty);
                }
                None => self.error(DiagnosticKind::Type, "method receiver `this` has no enclosing type".to_string()),
            }
        }

        self.scopes.push();
        if let Some(recv) = &receiver {
            let rty = self.resolve_type_expr(recv.ty);
            self.define_local(recv.name, rty, recv.mutable, start);
            self.push_dot_ctx(rty);
        }
        for p in &params {
            let pty = self.resolve_type_expr(p.ty);
            self.define_local(p.name, pty, p.mutable, start);
        }
        let body = self.parse_block_expr();
        if receiver.is_some() {
            self.pop_dot_ctx();
        }
        self.scopes.pop();

        let param_tys: Vec<_> = params.iter().map(|p| p.ty.resolved.get()).collect();
        let mut flags = FunctionFlags::empty();
        if receiver.is_some() {
            flags |= FunctionFlags::METHOD;
            if receiver.as_ref().unwrap().mutable {
                flags |= FunctionFlags::MUTABLE_RECEIVER;
            }
        }
        let func_ty = self.types.make_function(self.interner, param_tys, result_ty, flags);

        let range = SourceRange::new(start.start, body.range.end);
        let fun_def = self.bump.alloc(FunDef {
            name,
            receiver,
            params: self.bump_alloc(params),
            result: result_texpr,
            body,
            func_ty: std::cell::Cell::new(func_ty),
        });

        match receiver_ty {
            Some(rty) => self.register_method(rty, name, func_ty, range),
            None => {
                self.define_local(name, func_ty, false, range);
            }
        }

        Stmt::new(StmtKind::FunDef(fun_def), range)
    }

    /// True for a receiver type small enough to pass `this` by value: any
    /// primitive, or a struct whose align does not exceed pointer width and
    /// whose size does not exceed twice pointer width.
    fn receiver_is_small(&self, ty: TypeRef) -> bool {
        let ptr = self.types.pointer_width();
        let ty = self.underlying(ty);
        let node = self.types.get(ty);
        match &node.kind {
            TypeKind::Primitive(_) => true,
            TypeKind::Struct { .. } => node.align <= ptr && node.size <= ptr * 2,
            _ => false,
        }
    }

    /// Registers `name` in `receiver`'s method map, rejecting a collision
    /// with a field or a previously-registered method of the same name.
    fn register_method(&mut self, receiver: TypeRef, name: Symbol, func_ty: TypeRef, range: SourceRange) {
        let receiver = self.underlying(receiver);
        let fields_collide = matches!(
            &self.types.get(receiver).kind,
            TypeKind::Struct { fields, .. } if fields.iter().any(|f| f.name == name)
        );
        if fields_collide {
            self.diags.report(
                DiagnosticKind::NameResolution,
                Severity::Error,
                range,
                format!(
                    "method `{}` collides with a field of the same name",
                    self.interner.as_str(name)
                ),
            );
            return;
        }
        if self.types.methods_of(receiver).iter().any(|m| m.name == name) {
            self.diags.report(
                DiagnosticKind::NameResolution,
                Severity::Error,
                range,
                format!("duplicate method `{}`", self.interner.as_str(name)),
            );
            return;
        }
        self.types.add_method(receiver, crate::types::Method { name, func_ty });
    }

    /// Parses the parameter list between `(` and `)`. Supports a leading
    /// `this`/`mut this` receiver, "name-and-type" groups (`x, y T`), and
    /// "type-only" groups (`T1, T2`); mixing the two group forms is an
    /// error. The receiver's type is left unresolved (pointing at a
    /// placeholder); the caller fills it in once the receiver type is
    /// known. A bare `mut` at the very head of the list is always taken
    /// to begin `mut this` — a mutable-slice type cannot be the first
    /// parameter's type in type-only form.
    fn parse_param_list(&mut self) -> (Option<Param<'a>>, Vec<Param<'a>>) {
        let mut receiver = None;
        let mut params = Vec::new();
        let mut saw_named_group = false;
        let mut saw_type_only_group = false;

        let leading_mut = self.eat(TokenKind::KwMut);
        if self.at(TokenKind::KwThis) {
            let this_range = self.cur.range;
            self.advance();
            let placeholder = self.placeholder_type_expr(this_range);
            receiver = Some(Param {
                name: self.keywords.this,
                ty: placeholder,
                mutable: leading_mut,
                by_value: false,
            });
            if !self.eat(TokenKind::Comma) {
                return (receiver, params);
            }
        } else if leading_mut {
            self.error(
                DiagnosticKind::Syntax,
                "expected `this` after `mut` at the start of a parameter list".to_string(),
            );
        }

        self.parse_param_groups(&mut params, &mut saw_named_group, &mut saw_type_only_group);

        if saw_named_group && saw_type_only_group {
            self.error(DiagnosticKind::Syntax, "cannot mix named and type-only parameter groups".to_string());
        }

        (receiver, params)
    }

    fn parse_param_groups(&mut self, params: &mut Vec<Param<'a>>, saw_named_group: &mut bool, saw_type_only_group: &mut bool) {
        let mut next_placeholder = params.len();
        while !self.at(TokenKind::RParen) && !self.at(TokenKind::Eof) {
            let mut idents = Vec::new();
            let Some(first) = self.expect_identifier() else {
                break;
            };
            idents.push(first);
            while self.at(TokenKind::Comma) {
                self.advance();
                if let TokenKind::Identifier(_) = self.cur.kind {
                    let Some(sym) = self.expect_identifier() else { break };
                    idents.push(sym);
                } else {
                    self.error(DiagnosticKind::Syntax, "expected a parameter name after `,`".to_string());
                    break;
                }
            }

            if self.token_starts_type() {
                *saw_named_group = true;
                let ty = self.parse_type_expr();
                for name in idents {
                    params.push(Param { name, ty, mutable: false, by_value: false });
                }
            } else {
                *saw_type_only_group = true;
                for name_as_type in idents {
                    let range = self.cur.range;
                    let resolved = self.lookup_type_name_for_param(name_as_type, range);
                    let ty = self.bump.alloc(TypeExpr::new(TypeExprKind::Name(name_as_type), range, resolved));
                    let pname = self.interner.intern_str(&format!("_{next_placeholder}"));
                    next_placeholder += 1;
                    params.push(Param { name: pname, ty, mutable: false, by_value: false });
                }
            }

            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
    }

    fn lookup_type_name_for_param(&mut self, sym: Symbol, range: SourceRange) -> TypeRef {
        match self.lookup_binding(sym) {
            Some(Binding::Type(t)) => t,
            _ => {
                self.diags.report(
                    DiagnosticKind::NameResolution,
                    Severity::Error,
                    range,
                    format!("use of undeclared type `{}`", self.interner.as_str(sym)),
                );
                self.void_ty()
            }
        }
    }

    fn token_starts_type(&self) -> bool {
        matches!(
            self.cur.kind,
            TokenKind::Identifier(_)
                | TokenKind::Star
                | TokenKind::Amp
                | TokenKind::Question
                | TokenKind::LBracket
                | TokenKind::KwFun
                | TokenKind::KwMut
        )
    }

    fn placeholder_type_expr(&mut self, range: SourceRange) -> &'a TypeExpr<'a> {
        let void = self.void_ty();
        self.bump.alloc(TypeExpr::new(TypeExprKind::Name(self.keywords.this), range, void))
    }

    /// `type name { ... }` or `type name <type-expr>` — both forms produce
    /// a named alias entered into scope under `name`.
    fn parse_type_def(&mut self) -> Stmt<'a> {
        let start = self.cur.range;
        self.advance();
        let Some(name) = self.expect_identifier() else {
            self.synchronize();
            return Stmt::new(StmtKind::Bad, start);
        };

        let target = if self.at(TokenKind::LBrace) {
            self.parse_struct_body(name)
        } else {
            self.parse_type_expr()
        };
        let resolved = self.resolve_type_expr(target);
        let alias = self.types.make_alias(self.interner, name, resolved);
        let range = SourceRange::new(start.start, target.range.end);
        self.define(name, Binding::Type(alias), range);

        let type_def = self.bump.alloc(TypeDef { name, target });
        Stmt::new(StmtKind::TypeDef(type_def), range)
    }

    /// Parses a struct body: a brace-delimited sequence of field-group
    /// declarations followed by zero or more inline `fun` method
    /// declarations. Field declarations must precede methods — once a
    /// method is seen the struct's field list is frozen so the method
    /// bodies can resolve `this` against a concrete receiver type.
    fn parse_struct_body(&mut self, type_name: Symbol) -> &'a TypeExpr<'a> {
        let open = self.expect(TokenKind::LBrace, "`{` to open struct body");
        let mut fields: Vec<Field> = Vec::new();
        let mut field_decls: Vec<FieldDecl<'a>> = Vec::new();
        let mut seen = HashSet::new();
        let mut struct_ty: Option<TypeRef> = None;

        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) || self.eat(TokenKind::ImplicitSemicolon) {
                continue;
            }
            if self.at(TokenKind::KwFun) {
                if struct_ty.is_none() {
                    let built = self.types.make_struct(self.interner, Some(type_name), fields.clone(), StructFlags::empty());
                    struct_ty = Some(built);
                    self.struct_ctx.push(built);
                }
                let _ = self.parse_fun_def();
                continue;
            }

            let mut names = Vec::new();
            let Some(first) = self.expect_identifier() else { break };
            names.push(first);
            while self.eat(TokenKind::Comma) {
                let Some(n) = self.expect_identifier() else { break };
                names.push(n);
            }
            let ty = self.parse_type_expr();
            if struct_ty.is_some() {
                self.diags.report(
                    DiagnosticKind::Syntax,
                    Severity::Error,
                    ty.range,
                    "field declarations must precede method declarations in a struct body".to_string(),
                );
            }
            let resolved = self.resolve_type_expr(ty);
            for n in names {
                if !seen.insert(n) {
                    self.diags.report(
                        DiagnosticKind::NameResolution,
                        Severity::Error,
                        ty.range,
                        format!("duplicate field `{}`", self.interner.as_str(n)),
                    );
                    continue;
                }
                field_decls.push(FieldDecl { name: n, ty });
                fields.push(Field { name: n, ty: resolved });
            }
            if !self.eat(TokenKind::Semicolon) {
                self.eat(TokenKind::ImplicitSemicolon);
            }
        }
        let close = self.expect(TokenKind::RBrace, "`}` to close struct body");
        if struct_ty.is_some() {
            self.struct_ctx.pop();
        }
        let final_ty = struct_ty
            .unwrap_or_else(|| self.types.make_struct(self.interner, Some(type_name), fields.clone(), StructFlags::empty()));

        let range = SourceRange::new(open.range.start, close.range.end);
        self.bump.alloc(TypeExpr::new(
            TypeExprKind::StructBody {
                fields: self.bump_alloc(field_decls),
            },
            range,
            final_ty,
        ))
    }

    fn resolve_type_expr(&mut self, t: &'a TypeExpr<'a>) -> TypeRef {
        t.ref_count.set(t.ref_count.get() + 1);
        t.resolved.get()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;
    use crate::ast::StmtKind;

    #[test]
    fn simple_function_parses_with_two_parameters() {
        let mut h = Harness::new();
        let unit = h.parse("fun add(x, y int) int { x + y }");
        assert_eq!(unit.top_level.len(), 1);
        match unit.top_level[0].kind {
            StmtKind::FunDef(f) => {
                assert_eq!(f.params.len(), 2);
            }
            _ => panic!("expected a function definition"),
        }
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn let_binding_with_inferred_type() {
        let mut h = Harness::new();
        let unit = h.parse("let x = 3");
        assert_eq!(unit.top_level.len(), 1);
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn let_binding_with_declared_optional_type() {
        let mut h = Harness::new();
        let unit = h.parse("let p ?int = 3");
        assert_eq!(unit.top_level.len(), 1);
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn redefinition_at_top_level_is_an_error() {
        let mut h = Harness::new();
        let _ = h.parse("fun f() { return }\nfun f() {}");
        assert!(h.diags.has_errors());
    }

    #[test]
    fn struct_with_inline_method_registers_it_without_field_collision() {
        let mut h = Harness::new();
        let _ = h.parse("type Point { x, y int\nfun len(this) int { 0 } }");
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn mixed_parameter_forms_are_rejected() {
        let mut h = Harness::new();
        let _ = h.parse("fun f(x int, int) int { 0 }");
        assert!(h.diags.has_errors());
    }
}
