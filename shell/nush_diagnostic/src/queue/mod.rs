//! Diagnostic queue for collecting emitted diagnostics.
//!
//! The runtime reports every recoverable error through one queue; callers
//! inspect or drain it after an operation. Emitting an error yields an
//! [`ErrorGuaranteed`] proof token.

use crate::{Diagnostic, ErrorGuaranteed, Severity};

/// Queue for collecting diagnostics in emission order.
#[derive(Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        DiagnosticQueue::default()
    }

    /// Emit an error diagnostic, returning proof that an error was reported.
    pub fn emit_error(&mut self, diagnostic: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diagnostic.is_error());
        self.error_count += 1;
        self.diagnostics.push(diagnostic);
        ErrorGuaranteed::new_unchecked()
    }

    /// Emit a warning or note.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Number of error-severity diagnostics emitted so far.
    #[inline]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Whether any error has been emitted.
    #[inline]
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Proof token if any error has been emitted.
    pub fn error_guaranteed(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Borrow the collected diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drain all collected diagnostics, resetting the queue.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        self.error_count = 0;
        std::mem::take(&mut self.diagnostics)
    }

    /// Count of warnings in the queue.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests;
