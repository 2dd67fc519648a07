//! Abstract syntax tree: expression, statement, and type-expression nodes.
//!
//! Nodes are tagged variants embedding a common header (source range, flags)
//! rather than a class hierarchy; the three parselet tables stand in for
//! dynamic dispatch. All nodes are allocated from a single [`bumpalo::Bump`]
//! arena owned by the compilation unit and cross-reference each other by
//! direct `&'a` reference — there is no garbage collector and no per-node
//! deallocation.

use std::cell::Cell;

use bitflags::bitflags;

use crate::source::SourceRange;
use crate::symbol::Symbol;
use crate::types::TypeRef;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Set on an expression or statement that unconditionally transfers
        /// control out of its enclosing block (an explicit `return`).
        const EXITS = 0b0000_0001;
        /// Set on a statement that textually follows one with `EXITS` set.
        /// A warning, not an error.
        const UNREACHABLE = 0b0000_0010;
        /// Set when an expression's value is consumed by its parent
        /// (cleared on all non-terminal children of a block).
        const RVALUE = 0b0000_0100;
        /// Set on storage expressions (id, member, deref) that name a
        /// mutable binding.
        const MUTABLE = 0b0000_1000;
        /// Marks a node synthesized by error recovery; downstream passes
        /// should not report further errors rooted at it.
        const BAD = 0b0001_0000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogAnd,
    LogOr,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// An expression node. `ty` is never left unset after construction — the
/// parser initializes every expression with the void type as a placeholder
/// and overwrites it once the expression's type is resolved.
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub range: SourceRange,
    pub flags: Cell<NodeFlags>,
    pub ty: Cell<TypeRef>,
    /// Incremented each time this expression's bound name is referenced
    /// again at a new use site (only meaningful for `Id`).
    pub ref_count: Cell<u32>,
}

impl<'a> Expr<'a> {
    pub fn new(kind: ExprKind<'a>, range: SourceRange, placeholder_ty: TypeRef) -> Self {
        Expr {
            kind,
            range,
            flags: Cell::new(NodeFlags::RVALUE),
            ty: Cell::new(placeholder_ty),
            ref_count: Cell::new(0),
        }
    }

    pub fn bad(range: SourceRange, placeholder_ty: TypeRef) -> Self {
        let e = Self::new(ExprKind::Bad, range, placeholder_ty);
        e.flags.set(e.flags.get() | NodeFlags::BAD);
        e
    }

    pub fn is_bad(&self) -> bool {
        self.flags.get().contains(NodeFlags::BAD)
    }
}

pub enum ExprKind<'a> {
    IntLiteral(i64),
    UIntLiteral(u64),
    FloatLiteral(f64),
    BoolLiteral(bool),
    StringLiteral(Symbol),
    Id(Symbol),
    Binary {
        op: BinaryOp,
        lhs: &'a Expr<'a>,
        rhs: &'a Expr<'a>,
    },
    Unary {
        op: UnaryOp,
        operand: &'a Expr<'a>,
    },
    Assign {
        target: &'a Expr<'a>,
        value: &'a Expr<'a>,
    },
    Call {
        callee: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Member {
        base: &'a Expr<'a>,
        name: Symbol,
    },
    Reference {
        operand: &'a Expr<'a>,
        mutable: bool,
    },
    Deref {
        operand: &'a Expr<'a>,
    },
    /// A subscript expression. Per the open-question decision in the
    /// grounding ledger, these always carry `BAD` — the type system has no
    /// indexable types yet.
    Subscript {
        base: &'a Expr<'a>,
    },
    If {
        cond: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: Option<&'a Expr<'a>>,
    },
    Block(&'a [&'a Stmt<'a>]),
    Bad,
}

pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub range: SourceRange,
    pub flags: Cell<NodeFlags>,
}

impl<'a> Stmt<'a> {
    pub fn new(kind: StmtKind<'a>, range: SourceRange) -> Self {
        Stmt {
            kind,
            range,
            flags: Cell::new(NodeFlags::empty()),
        }
    }
}

pub enum StmtKind<'a> {
    Expr(&'a Expr<'a>),
    Let {
        name: Symbol,
        mutable: bool,
        declared_ty: Option<&'a TypeExpr<'a>>,
        init: Option<&'a Expr<'a>>,
    },
    Return(Option<&'a Expr<'a>>),
    Break,
    Continue,
    FunDef(&'a FunDef<'a>),
    TypeDef(&'a TypeDef<'a>),
    Bad,
}

#[derive(Clone, Copy)]
pub struct Param<'a> {
    pub name: Symbol,
    pub ty: &'a TypeExpr<'a>,
    pub mutable: bool,
    /// True when this parameter is passed by value. Only meaningful for a
    /// `this` receiver: small receivers (primitive, or a struct with
    /// align ≤ pointer-size and size ≤ 2×pointer-size) pass by value when
    /// immutable; every other receiver, and every non-receiver parameter,
    /// passes by reference.
    pub by_value: bool,
}

pub struct FunDef<'a> {
    pub name: Symbol,
    /// Present when the parameter list opened with `this` or `mut this`,
    /// promoting this definition to a method of the current receiver type.
    pub receiver: Option<Param<'a>>,
    pub params: &'a [Param<'a>],
    pub result: Option<&'a TypeExpr<'a>>,
    pub body: &'a Expr<'a>,
    pub func_ty: Cell<TypeRef>,
}

pub struct TypeDef<'a> {
    pub name: Symbol,
    pub target: &'a TypeExpr<'a>,
}

#[derive(Clone, Copy)]
pub struct FieldDecl<'a> {
    pub name: Symbol,
    pub ty: &'a TypeExpr<'a>,
}

/// A type-expression node — the syntactic spelling of a type before it is
/// resolved to a canonical [`TypeRef`]. User-defined type nodes carry a
/// reference counter, incremented at every use.
pub struct TypeExpr<'a> {
    pub kind: TypeExprKind<'a>,
    pub range: SourceRange,
    pub resolved: Cell<TypeRef>,
    pub ref_count: Cell<u32>,
}

impl<'a> TypeExpr<'a> {
    pub fn new(kind: TypeExprKind<'a>, range: SourceRange, placeholder: TypeRef) -> Self {
        TypeExpr {
            kind,
            range,
            resolved: Cell::new(placeholder),
            ref_count: Cell::new(0),
        }
    }
}

pub enum TypeExprKind<'a> {
    Name(Symbol),
    Pointer(&'a TypeExpr<'a>),
    Reference {
        target: &'a TypeExpr<'a>,
        mutable: bool,
    },
    Slice {
        element: &'a TypeExpr<'a>,
        mutable: bool,
    },
    Optional(&'a TypeExpr<'a>),
    Array {
        element: &'a TypeExpr<'a>,
        len: u64,
    },
    Function {
        params: &'a [&'a TypeExpr<'a>],
        result: &'a TypeExpr<'a>,
    },
    StructBody {
        fields: &'a [FieldDecl<'a>],
    },
}

/// The root node returned by `parse()`: one child per top-level statement,
/// in source order.
pub struct Unit<'a> {
    pub top_level: &'a [&'a Stmt<'a>],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SourceId, SourceLoc};

    fn pt() -> SourceRange {
        SourceRange::point(SourceLoc::new(SourceId(0), 1, 1))
    }

    #[test]
    fn new_expr_defaults_to_rvalue_and_not_bad() {
        let bump = bumpalo::Bump::new();
        let _ = &bump;
        let e = Expr::new(ExprKind::IntLiteral(1), pt(), 0);
        assert!(e.flags.get().contains(NodeFlags::RVALUE));
        assert!(!e.is_bad());
    }

    #[test]
    fn bad_expr_carries_bad_flag() {
        let e = Expr::bad(pt(), 0);
        assert!(e.is_bad());
    }

    #[test]
    fn binary_expr_references_children_through_arena() {
        let bump = bumpalo::Bump::new();
        let lhs = bump.alloc(Expr::new(ExprKind::IntLiteral(1), pt(), 0));
        let rhs = bump.alloc(Expr::new(ExprKind::IntLiteral(2), pt(), 0));
        let sum = Expr::new(
            ExprKind::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
            },
            pt(),
            0,
        );
        match sum.kind {
            ExprKind::Binary { op, .. } => assert_eq!(op, BinaryOp::Add),
            _ => panic!("expected Binary"),
        }
    }
}
