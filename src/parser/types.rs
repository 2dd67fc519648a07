//! Type-expression parselets: pointer/reference/slice/optional/array/
//! function/name spellings, resolved eagerly to a canonical [`TypeRef`]
//! as each node is built.

use crate::ast::{TypeExpr, TypeExprKind};
use crate::diagnostics::{DiagnosticKind, Severity};
use crate::scope::Binding;
use crate::source::SourceRange;
use crate::token::{LiteralValue, TokenKind};
use crate::types::TypeRef;

use super::Parser;

impl<'a, 'b> Parser<'a, 'b> {
    /// Parses one type expression and resolves it to a canonical
    /// [`TypeRef`] in the same step; the result lives in the returned
    /// node's `resolved` cell.
    pub(super) fn parse_type_expr(&mut self) -> &'a TypeExpr<'a> {
        let start = self.cur.range;
        match self.cur.kind {
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_type_expr();
                let resolved = self.types.make_pointer(self.interner, inner.resolved.get());
                self.type_node(TypeExprKind::Pointer(inner), start, resolved)
            }
            TokenKind::Amp => {
                self.advance();
                let inner = self.parse_type_expr();
                let resolved = self.types.make_reference(self.interner, inner.resolved.get(), false);
                self.type_node(TypeExprKind::Reference { target: inner, mutable: false }, start, resolved)
            }
            TokenKind::KwMut => {
                self.advance();
                if self.eat(TokenKind::Amp) {
                    let inner = self.parse_type_expr();
                    let resolved = self.types.make_reference(self.interner, inner.resolved.get(), true);
                    self.type_node(TypeExprKind::Reference { target: inner, mutable: true }, start, resolved)
                } else if self.at(TokenKind::LBracket) {
                    self.advance();
                    let element = self.parse_type_expr();
                    self.expect(TokenKind::RBracket, "`]` to close a slice type");
                    let resolved = self.types.make_slice(self.interner, element.resolved.get(), true);
                    self.type_node(TypeExprKind::Slice { element, mutable: true }, start, resolved)
                } else {
                    self.error(DiagnosticKind::Syntax, "expected `&` or `[` after `mut` in a type".to_string());
                    self.bad_type(start)
                }
            }
            TokenKind::Question => {
                self.advance();
                let inner = self.parse_type_expr();
                let resolved = self.types.make_optional(self.interner, inner.resolved.get());
                self.type_node(TypeExprKind::Optional(inner), start, resolved)
            }
            TokenKind::LBracket => {
                self.advance();
                if self.at(TokenKind::IntLiteral) {
                    let len = match self.cur.literal {
                        Some(LiteralValue::Int(v)) => v as u64,
                        Some(LiteralValue::UInt(v)) => v,
                        _ => 0,
                    };
                    self.advance();
                    self.expect(TokenKind::RBracket, "`]` to close an array length");
                    let element = self.parse_type_expr();
                    let resolved = self.types.make_array(self.interner, element.resolved.get(), len);
                    self.type_node(TypeExprKind::Array { element, len }, start, resolved)
                } else {
                    let element = self.parse_type_expr();
                    self.expect(TokenKind::RBracket, "`]` to close a slice type");
                    let resolved = self.types.make_slice(self.interner, element.resolved.get(), false);
                    self.type_node(TypeExprKind::Slice { element, mutable: false }, start, resolved)
                }
            }
            TokenKind::KwFun => {
                self.advance();
                self.expect(TokenKind::LParen, "`(` to open a function type's parameter list");
                let mut params = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        params.push(self.parse_type_expr());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "`)` to close a function type's parameter list");
                let result = if self.type_starts_here() {
                    self.parse_type_expr()
                } else {
                    let void = self.void_ty();
                    self.bump.alloc(TypeExpr::new(
                        TypeExprKind::Name(self.interner.intern_str("void")),
                        self.cur.range,
                        void,
                    ))
                };
                let param_tys: Vec<TypeRef> = params.iter().map(|p| p.resolved.get()).collect();
                let resolved = self.types.make_function(
                    self.interner,
                    param_tys,
                    result.resolved.get(),
                    crate::types::FunctionFlags::empty(),
                );
                self.type_node(
                    TypeExprKind::Function {
                        params: self.bump_alloc(params),
                        result,
                    },
                    start,
                    resolved,
                )
            }
            TokenKind::Identifier(sym) => {
                self.advance();
                let resolved = self.lookup_type_name(sym, start);
                self.type_node(TypeExprKind::Name(sym), start, resolved)
            }
            _ => {
                self.error(DiagnosticKind::Syntax, "expected a type".to_string());
                self.bad_type(start)
            }
        }
    }

    fn type_starts_here(&self) -> bool {
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

    fn lookup_type_name(&mut self, sym: crate::symbol::Symbol, range: SourceRange) -> TypeRef {
        match self.lookup_binding(sym) {
            Some(Binding::Type(t)) => t,
            Some(Binding::Expr(_)) => {
                self.diags.report(
                    DiagnosticKind::NameResolution,
                    Severity::Error,
                    range,
                    format!("`{}` is a value, not a type", self.interner.as_str(sym)),
                );
                self.void_ty()
            }
            None => {
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

    fn type_node(&mut self, kind: TypeExprKind<'a>, range: SourceRange, resolved: TypeRef) -> &'a TypeExpr<'a> {
        self.bump.alloc(TypeExpr::new(kind, range, resolved))
    }

    fn bad_type(&mut self, range: SourceRange) -> &'a TypeExpr<'a> {
        let void = self.void_ty();
        self.bump.alloc(TypeExpr::new(TypeExprKind::Name(self.interner.intern_str("<error>")), range, void))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::Harness;

    #[test]
    fn optional_int_type_parses_and_resolves() {
        let mut h = Harness::new();
        let unit = h.parse("let x ?int = 1");
        assert_eq!(unit.top_level.len(), 1);
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn slice_and_mutable_slice_types_parse() {
        let mut h = Harness::new();
        let _ = h.parse("fun f(xs [int]) int { 0 }");
        assert!(!h.diags.has_errors());
    }

    #[test]
    fn pointer_type_parses() {
        let mut h = Harness::new();
        let _ = h.parse("fun f(p *int) int { 0 }");
        assert!(!h.diags.has_errors());
    }
}
