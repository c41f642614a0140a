//! Unification failures.

use thiserror::Error;
use vela_types::{Ty, TypeVar};

/// Why two types failed to unify.
///
/// These are operational results inside the solver; the solver translates
/// them into diagnostics against the failing constraint's cause.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum UnifyError {
    #[error("the types are structurally incompatible")]
    Mismatch { lhs: Ty, rhs: Ty },
    #[error("the variable occurs in the type it would be bound to")]
    OccursCheck { var: TypeVar, ty: Ty },
    #[error("expected {expected} inputs, found {found}")]
    ArityMismatch { expected: usize, found: usize },
    #[error("argument labels do not match")]
    LabelMismatch,
}
