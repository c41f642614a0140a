//! Per-declaration request bookkeeping.
//!
//! Checking is demand-driven and mutually recursive: realizing one
//! declaration's type may require checking another. [`RequestStatus`] is
//! the explicit state machine that makes re-entry observable, and
//! [`DeclProperty`] is the side table it (and every other per-declaration
//! fact) lives in.

use rustc_hash::FxHashMap;
use vela_ir::DeclId;

/// Where a declaration is in its checking lifecycle.
///
/// States only move forward. Observing a `*Started` state on re-entry means
/// the declaration depends on itself.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RequestStatus {
    /// Type realization is on the call stack.
    RealizationStarted,
    /// The declared type is known; the body is unchecked.
    RealizationCompleted,
    /// Full checking is on the call stack.
    CheckingStarted,
    /// Checked without errors.
    Success,
    /// Checked; at least one error was reported.
    Failure,
}

impl RequestStatus {
    /// Whether checking has finished, either way.
    pub fn is_final(self) -> bool {
        matches!(self, RequestStatus::Success | RequestStatus::Failure)
    }

    /// Whether a request for this declaration is currently on the stack.
    pub fn is_in_progress(self) -> bool {
        matches!(
            self,
            RequestStatus::RealizationStarted | RequestStatus::CheckingStarted
        )
    }
}

/// A side table of per-declaration facts; absence means "not computed".
#[derive(Clone, Debug)]
pub struct DeclProperty<T> {
    values: FxHashMap<DeclId, T>,
}

impl<T> Default for DeclProperty<T> {
    fn default() -> Self {
        DeclProperty {
            values: FxHashMap::default(),
        }
    }
}

impl<T> DeclProperty<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, decl: DeclId) -> Option<&T> {
        self.values.get(&decl)
    }

    pub fn insert(&mut self, decl: DeclId, value: T) -> Option<T> {
        self.values.insert(decl, value)
    }

    pub fn contains(&self, decl: DeclId) -> bool {
        self.values.contains_key(&decl)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Copy> DeclProperty<T> {
    pub fn get_copied(&self, decl: DeclId) -> Option<T> {
        self.values.get(&decl).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(RequestStatus::RealizationStarted.is_in_progress());
        assert!(RequestStatus::CheckingStarted.is_in_progress());
        assert!(!RequestStatus::RealizationCompleted.is_in_progress());
        assert!(RequestStatus::Success.is_final());
        assert!(RequestStatus::Failure.is_final());
        assert!(!RequestStatus::RealizationCompleted.is_final());
    }

    #[test]
    fn absent_means_unset() {
        let mut table: DeclProperty<RequestStatus> = DeclProperty::new();
        let d = DeclId::from_raw(0);
        assert_eq!(table.get_copied(d), None);
        table.insert(d, RequestStatus::RealizationStarted);
        assert_eq!(table.get_copied(d), Some(RequestStatus::RealizationStarted));
    }
}
