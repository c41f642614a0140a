//! Generic environments.
//!
//! The environment of a generic declaration collects its parameters and the
//! constraints its where clause and parameter annotations impose. It is
//! built once per declaration and memoized; building is re-entrant only
//! through broken upstream input, which is a contract violation, not a user
//! error.

use vela_ir::DeclId;
use vela_types::Constraint;

/// The generic context a declaration introduces.
#[derive(Clone, Debug, Default)]
pub struct GenericEnvironment {
    /// The declaration the environment belongs to.
    pub decl: Option<DeclId>,
    /// Generic parameter declarations, in source order.
    pub parameters: Vec<DeclId>,
    /// Constraints established by annotations and the where clause.
    pub constraints: Vec<Constraint>,
}

impl GenericEnvironment {
    pub fn new(decl: DeclId) -> Self {
        GenericEnvironment {
            decl: Some(decl),
            parameters: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Whether the environment introduces no parameters and no constraints.
    pub fn is_trivial(&self) -> bool {
        self.parameters.is_empty() && self.constraints.is_empty()
    }
}

/// Memoization slot for a computation that may be observed mid-flight.
#[derive(Clone, Debug)]
pub enum MemoState<T> {
    /// The computation is on the call stack.
    InProgress,
    /// The computation finished with this result.
    Done(T),
}

impl<T> MemoState<T> {
    /// The finished result.
    ///
    /// # Panics
    /// Panics while the computation is still in progress.
    pub fn finished(&self) -> &T {
        match self {
            MemoState::Done(value) => value,
            MemoState::InProgress => panic!("memoized computation observed mid-flight"),
        }
    }
}
