//! Pattern nodes.

use crate::{DeclId, ExprId, PatternId, Span};

/// How a binding pattern introduces its names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BindingIntroducer {
    Let,
    Var,
    SinkLet,
    Inout,
}

/// A pattern node.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

/// The closed set of pattern kinds.
#[derive(Clone, Debug)]
pub enum PatternKind {
    /// The root of a binding declaration's pattern: introducer, subpattern,
    /// and optional type annotation.
    Binding {
        introducer: BindingIntroducer,
        subpattern: PatternId,
        /// A type expression.
        annotation: Option<ExprId>,
    },
    /// A name introducing one variable declaration.
    Name(DeclId),
    Tuple(Vec<PatternId>),
    Wildcard,
}
