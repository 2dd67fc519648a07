//! Expression parselets: prefix/infix dispatch, precedence climbing,
//! literal type selection, reference/dereference, blocks, and `if`.

use crate::ast::{BinaryOp, Expr, ExprKind, NodeFlags, Stmt, UnaryOp};
use crate::diagnostics::{DiagnosticKind, Severity};
use crate::scope::Binding;
use crate::source::SourceRange;
use crate::token::{LiteralValue, TokenKind};
use crate::types::TypeRef;

use super::{Parser, Prec};

impl<'a, 'b> Parser<'a, 'b> {
    /// Entry point for any expression; parses at the weakest (comma)
    /// precedence.
    pub(super) fn parse_expression(&mut self) -> &'a Expr<'a> {
        self.parse_expr(Prec::Comma)
    }

    /// The Pratt engine's outer loop: invoke the prefix parselet for the
    /// current token, then repeatedly invoke infix parselets while their
    /// precedence is at least `min_prec`.
    pub(super) fn parse_expr(&mut self, min_prec: Prec) -> &'a Expr<'a> {
        let mut lhs = self.parse_prefix();
        loop {
            let Some((prec, op)) = self.infix_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            lhs = self.parse_infix(lhs, prec, op);
        }
        lhs
    }

    fn infix_op(&self) -> Option<(Prec, InfixOp)> {
        Some(match self.cur.kind {
            TokenKind::Eq => (Prec::Assignment, InfixOp::Assign),
            TokenKind::PlusEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Add)),
            TokenKind::MinusEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Sub)),
            TokenKind::StarEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Mul)),
            TokenKind::SlashEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Div)),
            TokenKind::PercentEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Rem)),
            TokenKind::AmpEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::BitAnd)),
            TokenKind::PipeEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::BitOr)),
            TokenKind::CaretEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::BitXor)),
            TokenKind::LtLtEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Shl)),
            TokenKind::GtGtEq => (Prec::Assignment, InfixOp::CompoundAssign(BinaryOp::Shr)),
            TokenKind::PipePipe => (Prec::LogicalOr, InfixOp::Binary(BinaryOp::LogOr)),
            TokenKind::AmpAmp => (Prec::LogicalAnd, InfixOp::Binary(BinaryOp::LogAnd)),
            TokenKind::Pipe => (Prec::BitOr, InfixOp::Binary(BinaryOp::BitOr)),
            TokenKind::Caret => (Prec::BitXor, InfixOp::Binary(BinaryOp::BitXor)),
            TokenKind::Amp => (Prec::BitAnd, InfixOp::Binary(BinaryOp::BitAnd)),
            TokenKind::EqEq => (Prec::Equality, InfixOp::Binary(BinaryOp::Eq)),
            TokenKind::BangEq => (Prec::Equality, InfixOp::Binary(BinaryOp::Ne)),
            TokenKind::Lt => (Prec::Comparison, InfixOp::Binary(BinaryOp::Lt)),
            TokenKind::LtEq => (Prec::Comparison, InfixOp::Binary(BinaryOp::Le)),
            TokenKind::Gt => (Prec::Comparison, InfixOp::Binary(BinaryOp::Gt)),
            TokenKind::GtEq => (Prec::Comparison, InfixOp::Binary(BinaryOp::Ge)),
            TokenKind::LtLt => (Prec::Shift, InfixOp::Binary(BinaryOp::Shl)),
            TokenKind::GtGt => (Prec::Shift, InfixOp::Binary(BinaryOp::Shr)),
            TokenKind::Plus => (Prec::Additive, InfixOp::Binary(BinaryOp::Add)),
            TokenKind::Minus => (Prec::Additive, InfixOp::Binary(BinaryOp::Sub)),
            TokenKind::Star => (Prec::Multiplicative, InfixOp::Binary(BinaryOp::Mul)),
            TokenKind::Slash => (Prec::Multiplicative, InfixOp::Binary(BinaryOp::Div)),
            TokenKind::Percent => (Prec::Multiplicative, InfixOp::Binary(BinaryOp::Rem)),
            TokenKind::LParen => (Prec::Postfix, InfixOp::Call),
            TokenKind::LBracket => (Prec::Postfix, InfixOp::Subscript),
            TokenKind::Dot => (Prec::Member, InfixOp::Member),
            _ => return None,
        })
    }

    fn parse_infix(&mut self, lhs: &'a Expr<'a>, prec: Prec, op: InfixOp) -> &'a Expr<'a> {
        let start = lhs.range;
        match op {
            InfixOp::Assign => {
                self.advance();
                let value = self.parse_expr(Prec::Assignment);
                let range = SourceRange::new(start.start, value.range.end);
                self.alloc_expr(ExprKind::Assign { target: lhs, value }, range)
            }
            InfixOp::CompoundAssign(bop) => {
                self.advance();
                let rhs = self.parse_expr(Prec::Assignment);
                let range = SourceRange::new(start.start, rhs.range.end);
                let synthesized = self.alloc_binary(bop, lhs, rhs, range);
                self.alloc_expr(ExprKind::Assign { target: lhs, value: synthesized }, range)
            }
            InfixOp::Binary(bop) => {
                self.advance();
                // Left-associative: the right operand climbs at one level
                // above this operator's own precedence.
                let next_min = bump_prec(prec);
                let rhs = self.parse_expr(next_min);
                let range = SourceRange::new(start.start, rhs.range.end);
                self.alloc_binary(bop, lhs, rhs, range)
            }
            InfixOp::Call => {
                self.advance();
                let mut args = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        args.push(self.parse_expr(Prec::Assignment));
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end_tok = self.expect(TokenKind::RParen, "`)` to close call arguments");
                let range = SourceRange::new(start.start, end_tok.range.end);
                let result_ty = match &self.types.get(lhs.ty.get()).kind {
                    crate::types::TypeKind::Function { result, .. } => *result,
                    _ => {
                        if !lhs.is_bad() {
                            self.error_at(DiagnosticKind::Type, range, "called expression is not a function".to_string());
                        }
                        self.void_ty()
                    }
                };
                let e = self.alloc_expr(
                    ExprKind::Call {
                        callee: lhs,
                        args: self.bump_alloc(args),
                    },
                    range,
                );
                e.ty.set(result_ty);
                e
            }
            InfixOp::Subscript => {
                self.advance();
                // Per the grounding ledger's open-question decision,
                // subscripts are parsed so `[` never desyncs the
                // expression table, but always rejected.
                if !self.at(TokenKind::RBracket) {
                    self.parse_expression();
                }
                let end_tok = self.expect(TokenKind::RBracket, "`]` to close subscript");
                self.error_at(
                    DiagnosticKind::Syntax,
                    SourceRange::new(start.start, end_tok.range.end),
                    "subscript expressions are not yet supported".to_string(),
                );
                self.bad_expr(SourceRange::new(start.start, end_tok.range.end))
            }
            InfixOp::Member => {
                self.advance();
                let Some(name) = self.expect_identifier() else {
                    return self.bad_expr(start);
                };
                let range = SourceRange::new(start.start, self.cur.range.start);
                let member_ty = self.resolve_member_type(lhs.ty.get(), name, range);
                let e = self.alloc_expr(ExprKind::Member { base: lhs, name }, range);
                e.ty.set(member_ty);
                if lhs.flags.get().contains(NodeFlags::MUTABLE) {
                    e.flags.set(e.flags.get() | NodeFlags::MUTABLE);
                }
                e
            }
        }
    }

    fn parse_prefix(&mut self) -> &'a Expr<'a> {
        let start = self.cur.range;
        match self.cur.kind {
            TokenKind::IntLiteral => self.parse_int_literal(false),
            TokenKind::FloatLiteral => self.parse_float_literal(),
            TokenKind::StringLiteral => {
                self.advance();
                let text = format!("<string literal at {}>", start.start);
                let sym = self.interner.intern_str(&text);
                self.alloc_expr(ExprKind::StringLiteral(sym), start)
            }
            TokenKind::Identifier(sym) => {
                self.advance();
                self.resolve_identifier(sym, start)
            }
            TokenKind::KwThis => {
                self.advance();
                let this_sym = self.keywords.this;
                self.resolve_identifier(this_sym, start)
            }
            TokenKind::Minus => {
                self.advance();
                self.parse_unary_minus(start)
            }
            TokenKind::Bang => {
                self.advance();
                let operand = self.parse_expr(Prec::Unary);
                let range = SourceRange::new(start.start, operand.range.end);
                self.alloc_expr(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand,
                    },
                    range,
                )
            }
            TokenKind::Amp => {
                self.advance();
                self.parse_reference(start, false)
            }
            TokenKind::KwMut => {
                self.advance();
                if !self.eat(TokenKind::Amp) {
                    self.error(DiagnosticKind::Syntax, "expected `&` after `mut` in a reference expression".to_string());
                    self.synchronize();
                    return self.bad_expr(start);
                }
                self.parse_reference(start, true)
            }
            TokenKind::Star => {
                self.advance();
                let operand = self.parse_expr(Prec::Unary);
                let range = SourceRange::new(start.start, operand.range.end);
                self.parse_deref(operand, range)
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression();
                self.expect(TokenKind::RParen, "`)` to close parenthesized expression");
                inner
            }
            TokenKind::LBrace => self.parse_block_expr(),
            TokenKind::KwIf => self.parse_if_expr(),
            _ => {
                self.error(DiagnosticKind::Syntax, "unexpected token where an expression is expected".to_string());
                self.synchronize();
                self.bad_expr(start)
            }
        }
    }

    fn parse_unary_minus(&mut self, start: SourceRange) -> &'a Expr<'a> {
        if self.at(TokenKind::IntLiteral) {
            return self.parse_int_literal(true);
        }
        let operand = self.parse_expr(Prec::Unary);
        let range = SourceRange::new(start.start, operand.range.end);
        self.alloc_expr(
            ExprKind::Unary {
                op: UnaryOp::Neg,
                operand,
            },
            range,
        )
    }

    /// Parses an integer literal, applying literal type selection per
    /// §4.5. `negated` is true when a unary minus immediately precedes the
    /// literal — the only case that widens the accepted range by one, to
    /// admit `-9223372036854775808` (`-2^63`, `i64::MIN`).
    fn parse_int_literal(&mut self, negated: bool) -> &'a Expr<'a> {
        let tok = self.cur;
        let range = if negated {
            SourceRange::new(tok.range.start, tok.range.end)
        } else {
            tok.range
        };
        self.advance();
        let raw = match tok.literal {
            Some(LiteralValue::Int(v)) => v as i128,
            Some(LiteralValue::UInt(v)) => v as i128,
            _ => 0,
        };

        if negated {
            let negated_value = -raw;
            if negated_value < i64::MIN as i128 {
                self.error_at(DiagnosticKind::Type, range, "integer literal overflows i64 after negation".to_string());
                return self.alloc_expr(ExprKind::IntLiteral(i64::MIN), range);
            }
            return self.alloc_expr(ExprKind::IntLiteral(negated_value as i64), range);
        }

        if let Some(ctx) = self.current_type_ctx() {
            if let Some((bits, signed)) = self.int_type_bits_signed(ctx) {
                let (lo, hi): (i128, i128) = if signed {
                    (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
                } else {
                    (0, (1i128 << bits) - 1)
                };
                if raw < lo || raw > hi {
                    self.error_at(DiagnosticKind::Type, range, "integer literal out of range for context type".to_string());
                }
                let e = if signed {
                    self.alloc_expr(ExprKind::IntLiteral(raw as i64), range)
                } else {
                    self.alloc_expr(ExprKind::UIntLiteral(raw as u64), range)
                };
                e.ty.set(ctx);
                return e;
            }
        }

        let native_bits = self.types.native_int_width() * 8;
        if raw >= -(1i128 << (native_bits - 1)) && raw < (1i128 << (native_bits - 1)) {
            let e = self.alloc_expr(ExprKind::IntLiteral(raw as i64), range);
            e.ty.set(self.types.primitives.int);
            e
        } else if raw <= i64::MAX as i128 {
            self.alloc_expr(ExprKind::IntLiteral(raw as i64), range)
        } else {
            let e = self.alloc_expr(ExprKind::UIntLiteral(raw as u64), range);
            e.ty.set(self.types.primitives.u64);
            e
        }
    }

    fn parse_float_literal(&mut self) -> &'a Expr<'a> {
        let tok = self.cur;
        self.advance();
        let value = match tok.literal {
            Some(LiteralValue::Float(v)) => v,
            _ => 0.0,
        };
        if let Some(ctx) = self.current_type_ctx() {
            if ctx == self.types.primitives.f32 {
                let narrowed = value as f32;
                if narrowed.is_infinite() {
                    self.error_at(DiagnosticKind::Type, tok.range, "float literal overflows f32".to_string());
                }
                let e = self.alloc_expr(ExprKind::FloatLiteral(narrowed as f64), tok.range);
                e.ty.set(ctx);
                return e;
            }
        }
        self.alloc_expr(ExprKind::FloatLiteral(value), tok.range)
    }

    fn resolve_identifier(&mut self, sym: crate::symbol::Symbol, range: SourceRange) -> &'a Expr<'a> {
        match self.lookup_binding(sym) {
            Some(Binding::Expr(idx)) if idx != u32::MAX => {
                let info = self.local(idx);
                let e = self.alloc_expr(ExprKind::Id(sym), range);
                e.ty.set(info.ty);
                if info.mutable {
                    e.flags.set(e.flags.get() | NodeFlags::MUTABLE);
                }
                e.ref_count.set(e.ref_count.get() + 1);
                e
            }
            Some(Binding::Expr(_)) => {
                // Builtin constant (`true`/`false`) resolved through the
                // scope but without a locals-table entry.
                let value = sym == self.keywords.true_;
                let e = self.alloc_expr(ExprKind::BoolLiteral(value), range);
                e.ty.set(self.types.primitives.bool_);
                e
            }
            Some(Binding::Type(_)) => {
                self.error_at(
                    DiagnosticKind::NameResolution,
                    range,
                    "used a type name where an expression is expected".to_string(),
                );
                self.bad_expr(range)
            }
            None => {
                self.error_at(
                    DiagnosticKind::NameResolution,
                    range,
                    format!("use of undeclared identifier `{}`", self.interner.as_str(sym)),
                );
                self.bad_expr(range)
            }
        }
    }

    fn parse_reference(&mut self, start: SourceRange, mutable: bool) -> &'a Expr<'a> {
        let operand = self.parse_expr(Prec::Unary);
        let range = SourceRange::new(start.start, operand.range.end);
        if matches!(operand.kind, ExprKind::Reference { .. }) {
            self.error_at(DiagnosticKind::Type, range, "cannot take a reference of a reference".to_string());
            return self.bad_expr(range);
        }
        if !self.is_storage_form(operand) {
            self.error_at(DiagnosticKind::Syntax, range, "operand of `&` must be a storage expression".to_string());
            return self.bad_expr(range);
        }
        if mutable && !operand.flags.get().contains(NodeFlags::MUTABLE) {
            self.error_at(DiagnosticKind::Type, range, "mutable reference to immutable binding".to_string());
            return self.alloc_expr(ExprKind::Reference { operand, mutable }, range);
        }
        self.alloc_expr(ExprKind::Reference { operand, mutable }, range)
    }

    fn is_storage_form(&self, e: &Expr<'a>) -> bool {
        matches!(
            e.kind,
            ExprKind::Id(_) | ExprKind::Member { .. } | ExprKind::Deref { .. }
        )
    }

    fn parse_deref(&mut self, operand: &'a Expr<'a>, range: SourceRange) -> &'a Expr<'a> {
        self.alloc_expr(ExprKind::Deref { operand }, range)
    }

    /// Resolves `.name` against a struct type's fields and then methods,
    /// transparently looking through a reference or pointer base.
    fn resolve_member_type(&mut self, base_ty: TypeRef, name: crate::symbol::Symbol, range: SourceRange) -> TypeRef {
        let base_ty = self.unwrap_reference(base_ty);
        match &self.types.get(base_ty).kind {
            crate::types::TypeKind::Struct { fields, methods, .. } => {
                if let Some(f) = fields.iter().find(|f| f.name == name) {
                    return f.ty;
                }
                if let Some(m) = methods.iter().find(|m| m.name == name) {
                    return m.func_ty;
                }
                self.error_at(
                    DiagnosticKind::NameResolution,
                    range,
                    format!("no field or method named `{}`", self.interner.as_str(name)),
                );
                self.void_ty()
            }
            _ => {
                self.error_at(DiagnosticKind::Type, range, "member access on a non-struct type".to_string());
                self.void_ty()
            }
        }
    }

    fn unwrap_reference(&self, ty: TypeRef) -> TypeRef {
        let mut ty = ty;
        loop {
            match &self.types.get(ty).kind {
                crate::types::TypeKind::Reference { target, .. } => ty = *target,
                crate::types::TypeKind::Pointer(target) => ty = *target,
                crate::types::TypeKind::Alias { target, .. } => ty = *target,
                _ => return ty,
            }
        }
    }

    pub(super) fn parse_block_expr(&mut self) -> &'a Expr<'a> {
        let open = self.expect(TokenKind::LBrace, "`{` to open a block");
        self.scopes.push();
        let mut stmts: Vec<&'a Stmt<'a>> = Vec::new();
        let mut exited = false;
        while !self.at(TokenKind::RBrace) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) || self.eat(TokenKind::ImplicitSemicolon) {
                continue;
            }
            let mut stmt = self.parse_statement();
            if exited {
                stmt.flags.set(stmt.flags.get() | NodeFlags::UNREACHABLE);
                self.diags.report(
                    DiagnosticKind::Syntax,
                    Severity::Warning,
                    stmt.range,
                    "statement is unreachable".to_string(),
                );
            }
            if stmt.flags.get().contains(NodeFlags::EXITS) {
                exited = true;
            }
            stmts.push(self.bump.alloc(stmt));
        }
        let close = self.expect(TokenKind::RBrace, "`}` to close block");
        self.scopes.pop();

        // Clear the r-value flag on every non-terminal child; the final
        // expression statement, if any, keeps it when the block itself is
        // in r-value position (simpler rule adopted per the open-question
        // decision in the grounding ledger).
        let n = stmts.len();
        for (i, s) in stmts.iter().enumerate() {
            if let Stmt { kind: crate::ast::StmtKind::Expr(e), .. } = s {
                if i + 1 < n {
                    e.flags.set(Self::set_rvalue(e.flags.get(), false));
                }
            }
        }

        let range = SourceRange::new(open.range.start, close.range.end);
        self.alloc_expr(ExprKind::Block(self.bump_alloc(stmts)), range)
    }

    fn parse_if_expr(&mut self) -> &'a Expr<'a> {
        let start = self.cur.range;
        self.advance();
        let cond = self.parse_expression();
        self.check_if_condition(cond);

        let narrowing = self.narrowed_optional_binding(cond);
        if let Some((sym, inner_ty)) = narrowing {
            self.scopes.push();
            self.define_local(sym, inner_ty, false, cond.range);
        }
        let then_branch = self.parse_block_expr();
        if narrowing.is_some() {
            self.scopes.pop();
        }

        let else_branch = if self.eat(TokenKind::KwElse) {
            if self.at(TokenKind::KwIf) {
                Some(self.parse_if_expr())
            } else {
                Some(self.parse_block_expr())
            }
        } else {
            None
        };

        let end = else_branch.map(|e| e.range).unwrap_or(then_branch.range);
        let range = SourceRange::new(start.start, end.end);
        self.alloc_expr(
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            },
            range,
        )
    }

    fn check_if_condition(&mut self, cond: &Expr<'a>) {
        let ty = cond.ty.get();
        let is_bool = ty == self.types.primitives.bool_;
        let is_optional = self.type_is_optional(ty);
        if !is_bool && !is_optional {
            self.error_at(DiagnosticKind::Type, cond.range, "`if` condition must be boolean or optional".to_string());
        }
    }

    /// If `cond` is a plain identifier reference of optional type, returns
    /// the symbol and the narrowed (non-optional) inner type, to be
    /// shadow-bound in the then-branch's scope.
    fn narrowed_optional_binding(&self, cond: &Expr<'a>) -> Option<(crate::symbol::Symbol, TypeRef)> {
        let ExprKind::Id(sym) = cond.kind else {
            return None;
        };
        let inner = self.optional_inner(cond.ty.get())?;
        Some((sym, inner))
    }

    /// Builds a `Binary` node, checking constant-folded overflow when both
    /// operands are integer literals (the only case where the result is
    /// known at construction time). On overflow the left operand is marked
    /// `BAD` in place so later passes don't cascade further errors from it.
    fn alloc_binary(&mut self, op: BinaryOp, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>, range: SourceRange) -> &'a Expr<'a> {
        if matches!(op, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul) {
            if let (Some((lv, l_unsigned)), Some((rv, r_unsigned))) = (literal_value(lhs), literal_value(rhs)) {
                let unsigned = l_unsigned || r_unsigned;
                let result = match op {
                    BinaryOp::Add => lv + rv,
                    BinaryOp::Sub => lv - rv,
                    BinaryOp::Mul => lv * rv,
                    _ => unreachable!(),
                };
                let (lo, hi): (i128, i128) =
                    if unsigned { (0, u64::MAX as i128) } else { (i64::MIN as i128, i64::MAX as i128) };
                if result < lo || result > hi {
                    self.error_at(
                        DiagnosticKind::Type,
                        range,
                        format!("arithmetic on integer literals overflows {}", if unsigned { "u64" } else { "i64" }),
                    );
                    lhs.flags.set(lhs.flags.get() | NodeFlags::BAD);
                }
            }
        }
        self.alloc_expr(ExprKind::Binary { op, lhs, rhs }, range)
    }

    fn alloc_expr(&mut self, kind: ExprKind<'a>, range: SourceRange) -> &'a Expr<'a> {
        let void = self.void_ty();
        self.bump.alloc(Expr::new(kind, range, void))
    }

    fn bad_expr(&mut self, range: SourceRange) -> &'a Expr<'a> {
        let void = self.void_ty();
        self.bump.alloc(Expr::bad(range, void))
    }

    fn error_at(&mut self, kind: DiagnosticKind, range: SourceRange, message: String) {
        self.diags.report(kind, Severity::Error, range, message);
    }

    pub(super) fn bump_alloc<T: Copy>(&self, items: Vec<T>) -> &'a [T] {
        self.bump.alloc_slice_copy(&items)
    }
}

fn bump_prec(p: Prec) -> Prec {
    match p {
        Prec::Lowest => Prec::Comma,
        Prec::Comma => Prec::Assignment,
        Prec::Assignment => Prec::LogicalOr,
        Prec::LogicalOr => Prec::LogicalAnd,
        Prec::LogicalAnd => Prec::BitOr,
        Prec::BitOr => Prec::BitXor,
        Prec::BitXor => Prec::BitAnd,
        Prec::BitAnd => Prec::Equality,
        Prec::Equality => Prec::Comparison,
        Prec::Comparison => Prec::Shift,
        Prec::Shift => Prec::Additive,
        Prec::Additive => Prec::Multiplicative,
        Prec::Multiplicative => Prec::Unary,
        Prec::Unary => Prec::Postfix,
        Prec::Postfix => Prec::Member,
        Prec::Member => Prec::Member,
    }
}

/// Extracts an integer literal's value and signedness, for the
/// constant-overflow check in `alloc_binary`. Anything else is `None`.
fn literal_value(e: &Expr<'_>) -> Option<(i128, bool)> {
    match e.kind {
        ExprKind::IntLiteral(v) => Some((v as i128, false)),
        ExprKind::UIntLiteral(v) => Some((v as i128, true)),
        _ => None,
    }
}

enum InfixOp {
    Assign,
    CompoundAssign(BinaryOp),
    Binary(BinaryOp),
    Call,
    Subscript,
    Member,
}
