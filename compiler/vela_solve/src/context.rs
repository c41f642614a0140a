//! The solver's view of the checker.

use vela_ir::{DeclId, ScopeId};
use vela_types::Ty;

/// Queries the solver makes back into the checker.
///
/// The solver owns no symbol tables; whenever a constraint needs knowledge
/// about declarations (canonical forms, conformance, rendering) it asks
/// through this trait.
pub trait SolverContext {
    /// The canonical form of `ty`: aliases stripped, known structure
    /// normalized.
    fn canonical(&mut self, ty: &Ty) -> Ty;

    /// Whether `subject` conforms to `trait_decl`, as seen from `scope`.
    fn conforms(&mut self, subject: &Ty, trait_decl: DeclId, scope: ScopeId) -> bool;

    /// Render `ty` for a diagnostic message.
    fn display(&self, ty: &Ty) -> String;
}
