//! Constraint solving.
//!
//! The checker generates [`vela_types::Constraint`]s and hands them to a
//! [`Solver`], which runs a deterministic worklist unifier and returns a
//! [`Solution`]: variable assignments, overload bindings, and diagnostics.
//! Declaration knowledge flows in through [`SolverContext`] only; the
//! solver keeps no state of its own between systems.

mod context;
mod error;
mod solution;
mod solver;
mod substitution;

pub use context::SolverContext;
pub use error::UnifyError;
pub use solution::Solution;
pub use solver::{should_trace, Solver};
pub use substitution::Substitution;
