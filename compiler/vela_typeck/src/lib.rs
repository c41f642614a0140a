//! Semantic analysis for Vela programs.
//!
//! The entry point is [`TypeChecker`]: construct one over a finished
//! [`vela_ir::Ast`], call [`TypeChecker::check_all`] (or `check_module`
//! for a single module), and [`TypeChecker::release`] the results.
//! Checking is demand-driven and memoized; every per-declaration request
//! runs at most once and circular requests are diagnosed, not looped.

mod checker;
mod conformance;
mod env;
mod relations;
mod request;
mod stack;

pub use checker::{CheckedModule, DeferredObligation, ImplicitCapture, TypeChecker};
pub use conformance::Conformance;
pub use env::{GenericEnvironment, MemoState};
pub use relations::TypeRelations;
pub use request::{DeclProperty, RequestStatus};
pub use stack::ensure_sufficient_stack;
