use std::collections::BTreeSet;

use crate::Diagnostic;

/// An append-only collection of unique diagnostics.
///
/// Insertion order does not matter; iteration is sorted by severity, span,
/// and code, so reports are deterministic regardless of the order checking
/// visited declarations in.
#[derive(Clone, Default, Debug, Eq, PartialEq)]
pub struct DiagnosticSet {
    elements: BTreeSet<Diagnostic>,
    contains_error: bool,
}

impl DiagnosticSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `diagnostic`, ignoring duplicates.
    pub fn insert(&mut self, diagnostic: Diagnostic) {
        self.contains_error |= diagnostic.is_error();
        self.elements.insert(diagnostic);
    }

    /// Insert every element of `other`.
    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        for d in other {
            self.insert(d);
        }
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: DiagnosticSet) {
        self.contains_error |= other.contains_error;
        self.elements.extend(other.elements);
    }

    /// Whether any element is an error.
    pub fn contains_error(&self) -> bool {
        self.contains_error
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of diagnostics reported.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Iterate in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.elements.iter()
    }
}

impl IntoIterator for DiagnosticSet {
    type Item = Diagnostic;
    type IntoIter = std::collections::btree_set::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl FromIterator<Diagnostic> for DiagnosticSet {
    fn from_iter<I: IntoIterator<Item = Diagnostic>>(iter: I) -> Self {
        let mut set = DiagnosticSet::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use vela_ir::Span;

    use super::*;
    use crate::ErrorCode;

    #[test]
    fn duplicates_are_ignored() {
        let mut set = DiagnosticSet::new();
        let d = Diagnostic::error(ErrorCode::UndefinedName, Span::new(0, 3))
            .with_message("undefined name `x`");
        set.insert(d.clone());
        set.insert(d);
        assert_eq!(set.len(), 1);
        assert!(set.contains_error());
    }

    #[test]
    fn warnings_do_not_set_error_flag() {
        let mut set = DiagnosticSet::new();
        set.insert(Diagnostic::warning(ErrorCode::UnusedResult, Span::new(0, 3)));
        assert!(!set.contains_error());
        assert!(!set.is_empty());
    }

    #[test]
    fn iteration_is_sorted_by_span() {
        let mut set = DiagnosticSet::new();
        set.insert(Diagnostic::error(ErrorCode::TypeMismatch, Span::new(9, 10)));
        set.insert(Diagnostic::error(ErrorCode::TypeMismatch, Span::new(2, 4)));
        let spans: Vec<_> = set.iter().map(|d| d.span.start).collect();
        assert_eq!(spans, vec![2, 9]);
    }
}
