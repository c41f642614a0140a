//! Expression nodes.
//!
//! Value and type expressions share one arena; the realizer decides which
//! kinds are meaningful in type position.

use crate::{Capability, DeclId, ExprId, Name, Span};

/// An expression node.
#[derive(Clone, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// A labeled call argument.
#[derive(Clone, Debug)]
pub struct Argument {
    pub label: Option<Name>,
    pub value: ExprId,
}

/// The domain of a name expression.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NameDomain {
    /// Unqualified: `foo`.
    None,
    /// Leading-dot sugar: `.foo`; requires contextual type information.
    Implicit,
    /// Qualified by an expression: `bar.foo`.
    Expr(ExprId),
}

/// The name carried by a name expression or looked up in a declaration
/// space: a stem plus optional argument labels and a method-variant
/// introducer.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct NameRef {
    pub stem: Name,
    /// Argument labels; `None` when the reference does not constrain them.
    pub labels: Option<Vec<Option<Name>>>,
    /// Selects one variant of a method bundle.
    pub introducer: Option<Capability>,
}

impl NameRef {
    /// A bare reference constraining nothing but the stem.
    pub fn bare(stem: Name) -> Self {
        NameRef {
            stem,
            labels: None,
            introducer: None,
        }
    }
}

/// A name expression: domain, name, and static generic arguments.
#[derive(Clone, Debug)]
pub struct NameExpr {
    pub domain: NameDomain,
    pub name: NameRef,
    /// Static generic arguments, as type expressions.
    pub arguments: Vec<ExprId>,
}

/// A labeled element of a tuple expression or tuple type expression.
#[derive(Clone, Debug)]
pub struct TupleElement {
    pub label: Option<Name>,
    pub value: ExprId,
}

/// A parameter of a lambda type expression.
#[derive(Clone, Debug)]
pub struct LambdaTypeParameter {
    pub label: Option<Name>,
    /// A parameter type expression.
    pub annotation: ExprId,
}

/// The closed set of expression kinds.
#[derive(Clone, Debug)]
pub enum ExprKind {
    // Value expressions.
    IntLiteral(i64),
    /// Bits of an `f64`, stored raw so expressions stay hashable.
    FloatLiteral(u64),
    BoolLiteral(bool),
    Name(NameExpr),
    Call {
        callee: ExprId,
        arguments: Vec<Argument>,
    },
    /// A lambda; payload is its underlying function declaration.
    Lambda(DeclId),
    Tuple(Vec<TupleElement>),

    // Type expressions.
    /// `Subject::Lens`: the subject viewed through one of its traits.
    ConformanceLens {
        subject: ExprId,
        lens: ExprId,
    },
    /// `[E](P...) effect -> O`.
    LambdaType {
        receiver_effect: Option<Capability>,
        environment: Option<ExprId>,
        parameters: Vec<LambdaTypeParameter>,
        output: ExprId,
    },
    /// `convention T` in parameter position.
    ParameterType {
        convention: Capability,
        bare: ExprId,
    },
    TupleType(Vec<TupleElement>),
    /// `_`, standing for a type to infer.
    Wildcard,
}

impl ExprKind {
    /// Whether this is a name expression.
    pub fn as_name(&self) -> Option<&NameExpr> {
        match self {
            ExprKind::Name(n) => Some(n),
            _ => None,
        }
    }
}
