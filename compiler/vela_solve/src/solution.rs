//! Solver output.

use rustc_hash::FxHashMap;
use vela_diagnostic::DiagnosticSet;
use vela_ir::ExprId;
use vela_types::DeclRef;

use crate::Substitution;

/// The result of solving one constraint system.
#[derive(Clone, Default, Debug)]
pub struct Solution {
    /// Variable assignments.
    pub substitution: Substitution,
    /// Chosen declaration for each overloaded name expression.
    pub bindings: FxHashMap<ExprId, DeclRef>,
    /// Everything the solver had to report.
    pub diagnostics: DiagnosticSet,
}

impl Solution {
    /// Whether the system was solved without errors.
    pub fn is_sound(&self) -> bool {
        !self.diagnostics.contains_error()
    }
}
