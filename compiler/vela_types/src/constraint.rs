//! Constraints handed to the solver.
//!
//! Each constraint pairs a shape with a cause: the syntactic reason it
//! exists and the span a failure diagnostic should anchor to.

use smallvec::SmallVec;
use vela_ir::{DeclId, ExprId, Span};

use crate::{CallableParam, DeclRef, Ty};

/// The class of a literal expression awaiting a type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LiteralClass {
    /// Defaults to `Int`; `Float` is also admissible.
    Integer,
    /// Defaults to `Float`.
    Floating,
    /// Always `Bool`.
    Boolean,
}

/// One candidate of an overloaded name.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct OverloadCandidate {
    /// The declaration the name would resolve to.
    pub reference: DeclRef,
    /// The candidate's contextual type.
    pub ty: Ty,
}

/// Why a constraint exists.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CauseKind {
    /// A type annotation in source.
    Annotation,
    /// The right side of an assignment must flow into the left.
    Assignment,
    /// A binding initializer must flow into its pattern.
    Initialization,
    /// An argument passed to a parameter.
    Argument,
    /// A returned value against the declared output.
    Return,
    /// A yielded value against the projected type.
    Yield,
    /// A literal awaiting a concrete type.
    Literal,
    /// A member accessed on a qualifying type.
    Member,
    /// A callee applied to arguments.
    Call,
    /// A generic argument against its parameter's bounds.
    Specialization,
    /// Structural decomposition of a compound type.
    Structural,
}

/// The origin of a constraint: kind plus diagnostic anchor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintCause {
    pub kind: CauseKind,
    pub span: Span,
}

impl ConstraintCause {
    pub fn new(kind: CauseKind, span: Span) -> Self {
        ConstraintCause { kind, span }
    }
}

/// The shape of a constraint.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ConstraintKind {
    /// The two types unify.
    Equality { lhs: Ty, rhs: Ty },
    /// `subtype` is convertible to `supertype`.
    Subtyping { subtype: Ty, supertype: Ty },
    /// `argument` can be passed to a parameter of type `parameter`.
    Parameter { argument: Ty, parameter: Ty },
    /// `subject` conforms to every trait in `traits`.
    Conformance {
        subject: Ty,
        traits: SmallVec<[DeclId; 2]>,
    },
    /// `subject` is a type admissible for a literal of `class`.
    Literal { subject: Ty, class: LiteralClass },
    /// `callee` accepts `inputs` and returns `output`.
    Apply {
        callee: Ty,
        inputs: Vec<CallableParam>,
        output: Ty,
    },
    /// The name expression resolves to exactly one of `candidates`, and
    /// `subject` (the type assigned to the expression) unifies with the
    /// chosen candidate's type.
    Overload {
        name: ExprId,
        subject: Ty,
        candidates: Vec<OverloadCandidate>,
    },
    /// An opaque value-level predicate. Accepted, never solved.
    Predicate(ExprId),
}

///// A constraint: shape plus origin.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub cause: ConstraintCause,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, cause: ConstraintCause) -> Self {
        Constraint { kind, cause }
    }

    /// Shorthand for an equality constraint.
    pub fn equality(lhs: Ty, rhs: Ty, cause: ConstraintCause) -> Self {
        Constraint::new(ConstraintKind::Equality { lhs, rhs }, cause)
    }

    /// Shorthand for a subtyping constraint.
    pub fn subtyping(subtype: Ty, supertype: Ty, cause: ConstraintCause) -> Self {
        Constraint::new(ConstraintKind::Subtyping { subtype, supertype }, cause)
    }

    /// Shorthand for a parameter-passing constraint.
    pub fn parameter(argument: Ty, parameter: Ty, cause: ConstraintCause) -> Self {
        Constraint::new(ConstraintKind::Parameter { argument, parameter }, cause)
    }

    /// Shorthand for a conformance constraint.
    pub fn conformance(
        subject: Ty,
        traits: impl IntoIterator<Item = DeclId>,
        cause: ConstraintCause,
    ) -> Self {
        Constraint::new(
            ConstraintKind::Conformance {
                subject,
                traits: traits.into_iter().collect(),
            },
            cause,
        )
    }
}
