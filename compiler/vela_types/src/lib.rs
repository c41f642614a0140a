//! The type algebra.
//!
//! [`Ty`] is a closed, structurally compared union; [`Ty::transform`] is
//! the single traversal behind canonicalization, specialization, and
//! reification; [`Constraint`]s describe what the solver must prove and
//! carry the cause a failure is reported against.

mod constraint;
mod decl_ref;
mod display;
mod flags;
mod transform;
mod ty;

pub use constraint::{
    CauseKind, Constraint, ConstraintCause, ConstraintKind, LiteralClass, OverloadCandidate,
};
pub use decl_ref::DeclRef;
pub use display::TyDisplay;
pub use flags::TypeFlags;
pub use transform::TransformAction;
pub use ty::{BuiltinType, CallableParam, CapabilitySet, Primitive, TupleField, Ty, TypeVar};
