//! Statement nodes.

use crate::{DeclId, ExprId, Span, StmtId};

/// A statement node.
#[derive(Clone, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

/// One item of a `while` condition list.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConditionItem {
    /// A boolean expression.
    Expr(ExprId),
    /// A binding declaration tested for success.
    Decl(DeclId),
}

/// The closed set of statement kinds.
#[derive(Clone, Debug)]
pub enum StmtKind {
    /// A brace block; introduces a scope.
    Brace(Vec<StmtId>),
    Decl(DeclId),
    Expr(ExprId),
    /// `_ = e`; evaluates and discards.
    Discard(ExprId),
    Return(Option<ExprId>),
    Yield(ExprId),
    While {
        condition: Vec<ConditionItem>,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        condition: ExprId,
    },
    Assign {
        lhs: ExprId,
        rhs: ExprId,
    },
    For {
        body: StmtId,
    },
    Break,
    Continue,
}
