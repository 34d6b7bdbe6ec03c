//! Common types and utilities for the sable checker.
//!
//! This crate provides foundational types used across all sable crates:
//! - String interning (`Atom`, `ShardedInterner`)
//! - Source spans (`Span`)
//! - Diagnostic data model and message table
//! - Checker limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticRelatedInformation, format_message,
    get_message_template,
};
