//! Diagnostic types and message lookup for the checker.
//!
//! Message data lives in `data.rs`.

use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl DiagnosticCategory {
    /// Lowercase name used by the reporters (`error`, `warning`, ...).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Suggestion => "suggestion",
            Self::Message => "note",
        }
    }
}

/// Related information for a diagnostic (e.g., "see also" locations).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

/// A checker diagnostic with optional related information.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    /// Notes explaining why the primary message holds
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub const fn error(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self::new(DiagnosticCategory::Error, file, start, length, message, code)
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub const fn warning(file: String, start: u32, length: u32, message: String, code: u32) -> Self {
        Self::new(DiagnosticCategory::Warning, file, start, length, message, code)
    }

    #[must_use]
    pub const fn new(
        category: DiagnosticCategory,
        file: String,
        start: u32,
        length: u32,
        message: String,
        code: u32,
    ) -> Self {
        Self {
            file,
            start,
            length,
            message_text: message,
            category,
            code,
            related_information: Vec::new(),
        }
    }

    /// Add a related note to this diagnostic.
    #[must_use]
    pub fn with_related(
        mut self,
        file: String,
        start: u32,
        length: u32,
        message: String,
        code: u32,
    ) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Message,
            code,
        });
        self
    }

    /// Returns `true` when this diagnostic should fail a check run.
    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
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
///
/// Returns the template string with `{0}`, `{1}`, etc. placeholders.
/// Use `format_message()` to fill in the placeholders.
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
#[path = "../tests/diagnostics_tests.rs"]
mod tests;
