//! Centralized limits and thresholds for the checker.
//!
//! Recursion limits for the conformance oracle live in
//! `sable_solver::recursion::RecursionProfile`; the constants here cover the
//! checker and the type annotation reader.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum generic nesting depth the conformance oracle will descend.
///
/// Every conditional requirement that substitutes a generic argument adds one
/// level. Real code rarely goes past a handful of levels; the cap exists for
/// pathological instantiations produced by generated code.
///
/// # Example
///
/// ```swift
/// // Each layer of `CondSendable` adds a level of recursion:
/// let _: KeyPath<V, Int> & Sendable =
///     \.[CondSendable(CondSendable(CondSendable(42)))]
/// ```
pub const MAX_CONFORMANCE_DEPTH: u32 = 64;

/// Maximum nesting depth accepted by the type annotation reader.
///
/// Annotations such as `[[[[Int]]]]` or deeply nested generic applications
/// recurse once per level. Exceeding this produces a syntax error rather than
/// a stack overflow.
pub const MAX_TYPE_ANNOTATION_DEPTH: u32 = 128;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Number of related notes attached to a single Sendable diagnostic.
///
/// The conformance failure trail can be as deep as the generic nesting;
/// only the outermost notes are useful to a reader.
pub const MAX_RELATED_NOTES: usize = 4;
