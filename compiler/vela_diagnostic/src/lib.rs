//! Diagnostic types shared by the compiler phases.
//!
//! A [`Diagnostic`] carries an [`ErrorCode`], a severity, a message, an
//! anchor [`vela_ir::Span`], and nested notes. Checking accumulates them in
//! a [`DiagnosticSet`], which deduplicates and iterates in a deterministic
//! order.

mod diagnostic;
mod error_code;
mod set;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use set::DiagnosticSet;
