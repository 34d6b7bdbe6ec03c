//! Checker options and the shared, per-file checking context.

use sable_common::{Diagnostic, DiagnosticCategory};
use sable_solver::{DefinitionStore, Prelude, TypeDatabase};

/// How aggressively concurrency diagnostics are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrictConcurrency {
    /// Only explicitly adopted concurrency features are checked.
    Minimal,
    Targeted,
    #[default]
    Complete,
}

impl StrictConcurrency {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "minimal" => Some(Self::Minimal),
            "targeted" => Some(Self::Targeted),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Targeted => "targeted",
            Self::Complete => "complete",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LanguageMode {
    #[default]
    Swift5,
    Swift6,
}

impl LanguageMode {
    /// Accepts `5`, `6`, `swift5`, `swift6`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().trim_start_matches("swift") {
            "5" => Some(Self::Swift5),
            "6" => Some(Self::Swift6),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Swift5 => "5",
            Self::Swift6 => "6",
        }
    }
}

/// Options for key-path Sendable checking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckerOptions {
    pub strict_concurrency: StrictConcurrency,
    pub language_mode: LanguageMode,
    /// Infer `& Sendable` on key-path literals whose captures all conform.
    pub infer_sendable_from_captures: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            strict_concurrency: StrictConcurrency::Complete,
            language_mode: LanguageMode::Swift5,
            infer_sendable_from_captures: true,
        }
    }
}

impl CheckerOptions {
    /// Severity of a Sendable violation, or `None` when it is not reported.
    pub fn sendable_diagnostic_category(&self) -> Option<DiagnosticCategory> {
        match (self.language_mode, self.strict_concurrency) {
            (LanguageMode::Swift6, _) => Some(DiagnosticCategory::Error),
            (LanguageMode::Swift5, StrictConcurrency::Minimal) => None,
            (LanguageMode::Swift5, _) => Some(DiagnosticCategory::Warning),
        }
    }
}

/// Shared state for checking one file.
pub struct CheckerContext<'a> {
    pub db: &'a dyn TypeDatabase,
    pub defs: &'a DefinitionStore,
    pub prelude: Prelude,
    pub options: CheckerOptions,
    pub file_name: String,
    /// Diagnostics collected so far, in use order.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckerContext<'a> {
    pub fn new(
        db: &'a dyn TypeDatabase,
        defs: &'a DefinitionStore,
        prelude: Prelude,
        options: CheckerOptions,
        file_name: String,
    ) -> Self {
        Self {
            db,
            defs,
            prelude,
            options,
            file_name,
            diagnostics: Vec::new(),
        }
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
