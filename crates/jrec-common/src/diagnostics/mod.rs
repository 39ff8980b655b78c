//! Diagnostic types and message lookup.
//!
//! Message data lives in `data.rs`. Every diagnostic produced by jrec is
//! advisory: recovery never stops because of one.

use crate::span::Span;
use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        }
    }
}

/// A diagnostic message with its location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a diagnostic from a registered code, filling `{0}`, `{1}`, ...
    /// in the message template with `args`. The category comes from the
    /// message table.
    #[must_use]
    pub fn from_code(file: &str, span: Span, code: u32, args: &[&str]) -> Self {
        let (category, message_text) = match get_diagnostic_message(code) {
            Some(message) => (message.category, format_message(message.message, args)),
            None => (DiagnosticCategory::Error, format!("Unknown diagnostic {code}")),
        };
        Self {
            file: file.to_string(),
            start: span.start,
            length: span.len(),
            message_text,
            category,
            code,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.start.saturating_add(self.length))
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

/// Get the category for a diagnostic code.
#[must_use]
pub fn get_diagnostic_category(code: u32) -> Option<DiagnosticCategory> {
    get_diagnostic_message(code).map(|m| m.category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_message_fills_placeholders_in_order() {
        assert_eq!(
            format_message("'{0}' expected after '{1}'.", &[";", "x"]),
            "';' expected after 'x'."
        );
    }

    #[test]
    fn from_code_uses_registered_template_and_category() {
        let diag = Diagnostic::from_code(
            "A.java",
            Span::new(3, 4),
            diagnostic_codes::UNEXPECTED_CLOSING_BRACE,
            &[],
        );
        assert_eq!(diag.code, diagnostic_codes::UNEXPECTED_CLOSING_BRACE);
        assert_eq!(diag.length, 1);
        assert_eq!(diag.category, DiagnosticCategory::Warning);
        assert_eq!(
            diag.message_text,
            diagnostic_messages::UNEXPECTED_CLOSING_BRACE
        );
    }

    #[test]
    fn every_code_is_registered_once() {
        let mut codes: Vec<u32> = DIAGNOSTIC_MESSAGES.iter().map(|m| m.code).collect();
        let len = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), len);
        assert!(get_message_template(diagnostic_codes::TOKEN_EXPECTED).is_some());
        assert_eq!(
            get_diagnostic_category(diagnostic_codes::MISSING_CLOSING_BRACE),
            Some(DiagnosticCategory::Error)
        );
    }
}
