use std::fmt;

use vela_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic: code, severity, message, anchor span, and nested notes
/// pointing at related locations.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
    /// Related diagnostics rendered under this one.
    pub notes: Vec<Diagnostic>,
}

impl Diagnostic {
    fn new_with_severity(severity: Severity, code: ErrorCode, span: Span) -> Self {
        Diagnostic {
            severity,
            code,
            message: String::new(),
            span,
            notes: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(code: ErrorCode, span: Span) -> Self {
        Self::new_with_severity(Severity::Error, code, span)
    }

    /// Create a new warning diagnostic.
    pub fn warning(code: ErrorCode, span: Span) -> Self {
        Self::new_with_severity(Severity::Warning, code, span)
    }

    /// Create a note, for nesting under another diagnostic.
    pub fn note(code: ErrorCode, span: Span) -> Self {
        Self::new_with_severity(Severity::Note, code, span)
    }

    /// Set the main message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Nest a related diagnostic under this one.
    pub fn with_note(mut self, note: Diagnostic) -> Self {
        self.notes.push(note);
        self
    }

    /// Nest several related diagnostics under this one.
    pub fn with_notes(mut self, notes: impl IntoIterator<Item = Diagnostic>) -> Self {
        self.notes.extend(notes);
        self
    }

    /// Check if this is an error (vs warning/note).
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] at {}: {}",
            self.severity, self.code, self.span, self.message
        )?;
        for note in &self.notes {
            write!(f, "\n  {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let diag = Diagnostic::error(ErrorCode::UndefinedName, Span::new(0, 5))
            .with_message("undefined name `foo`")
            .with_note(
                Diagnostic::note(ErrorCode::UndefinedName, Span::new(10, 12))
                    .with_message("searched from here"),
            );

        assert!(diag.is_error());
        assert_eq!(diag.code, ErrorCode::UndefinedName);
        assert_eq!(diag.notes.len(), 1);
        assert!(!diag.notes[0].is_error());
    }

    #[test]
    fn display_includes_code_and_notes() {
        let diag = Diagnostic::warning(ErrorCode::UnusedResult, Span::new(3, 9))
            .with_message("result of this expression is unused");
        let output = diag.to_string();
        assert!(output.contains("warning"));
        assert!(output.contains("W2001"));
        assert!(output.contains("unused"));
    }
}
