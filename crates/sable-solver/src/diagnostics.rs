//! Conformance failure reasons and tracers.
//!
//! The oracle is generic over a [`ConformanceTracer`]:
//! - [`FastTracer`] answers yes/no and never builds a reason.
//! - [`DiagnosticTracer`] records the chain of reasons from the innermost
//!   failing requirement outwards, which becomes the notes attached to a
//!   diagnostic.

use crate::def::{DefId, DefinitionStore};
use crate::db::TypeDatabase;
use crate::format::TypeFormatter;
use crate::types::TypeId;
use sable_common::diagnostics::{diagnostic_codes, diagnostic_messages, format_message};

/// Why a type failed to conform to a protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConformanceFailureReason {
    /// No declared conformance and no built-in rule applies.
    NoDeclaredConformance { ty: TypeId, protocol: DefId },
    /// The conformance exists but is marked unavailable.
    ExplicitlyUnavailable { ty: TypeId, protocol: DefId },
    /// A `where` clause of a conditional conformance does not hold.
    ConditionalRequirement {
        ty: TypeId,
        protocol: DefId,
        subject: TypeId,
        requirement: DefId,
    },
    /// A function type without `@Sendable`.
    NonSendableFunction { ty: TypeId },
    /// Tuple element at `index` does not conform.
    TupleElement {
        ty: TypeId,
        index: usize,
        element: TypeId,
        protocol: DefId,
    },
    /// A generic parameter with no constraint implying the protocol.
    UnconstrainedTypeParameter { ty: TypeId, protocol: DefId },
    /// Nesting went past the recursion limit; treated as not conforming.
    DepthExceeded { ty: TypeId, protocol: DefId },
}

impl ConformanceFailureReason {
    /// The type this step is about.
    pub fn ty(&self) -> TypeId {
        match *self {
            Self::NoDeclaredConformance { ty, .. }
            | Self::ExplicitlyUnavailable { ty, .. }
            | Self::ConditionalRequirement { ty, .. }
            | Self::NonSendableFunction { ty }
            | Self::TupleElement { ty, .. }
            | Self::UnconstrainedTypeParameter { ty, .. }
            | Self::DepthExceeded { ty, .. } => ty,
        }
    }

    /// Render as `(code, message)` for a related-information note.
    pub fn to_note(
        &self,
        db: &dyn TypeDatabase,
        defs: &DefinitionStore,
    ) -> (u32, String) {
        let fmt = TypeFormatter::new(db, defs);
        let proto = |id: DefId| -> String {
            defs.get_name(id)
                .map(|atom| db.resolve_atom(atom).to_string())
                .unwrap_or_else(|| "<unknown>".to_string())
        };
        match *self {
            Self::NoDeclaredConformance { ty, protocol } => (
                diagnostic_codes::TYPE_HAS_NO_DECLARED_CONFORMANCE,
                format_message(
                    diagnostic_messages::TYPE_HAS_NO_DECLARED_CONFORMANCE,
                    &[&fmt.format(ty), &proto(protocol)],
                ),
            ),
            Self::ExplicitlyUnavailable { ty, protocol } => (
                diagnostic_codes::CONFORMANCE_EXPLICITLY_UNAVAILABLE,
                format_message(
                    diagnostic_messages::CONFORMANCE_EXPLICITLY_UNAVAILABLE,
                    &[&fmt.format(ty), &proto(protocol)],
                ),
            ),
            Self::ConditionalRequirement {
                ty,
                protocol,
                subject,
                requirement,
            } => (
                diagnostic_codes::CONDITIONAL_REQUIREMENT_NOT_SATISFIED,
                format_message(
                    diagnostic_messages::CONDITIONAL_REQUIREMENT_NOT_SATISFIED,
                    &[
                        &fmt.format(ty),
                        &proto(protocol),
                        &fmt.format(subject),
                        &proto(requirement),
                    ],
                ),
            ),
            Self::NonSendableFunction { ty } => (
                diagnostic_codes::FUNCTION_TYPE_NOT_SENDABLE,
                format_message(
                    diagnostic_messages::FUNCTION_TYPE_NOT_SENDABLE,
                    &[&fmt.format(ty)],
                ),
            ),
            Self::TupleElement {
                index,
                element,
                protocol,
                ..
            } => (
                diagnostic_codes::TUPLE_ELEMENT_DOES_NOT_CONFORM,
                format_message(
                    diagnostic_messages::TUPLE_ELEMENT_DOES_NOT_CONFORM,
                    &[&index.to_string(), &fmt.format(element), &proto(protocol)],
                ),
            ),
            Self::UnconstrainedTypeParameter { ty, protocol } => (
                diagnostic_codes::TYPE_PARAMETER_NOT_CONSTRAINED,
                format_message(
                    diagnostic_messages::TYPE_PARAMETER_NOT_CONSTRAINED,
                    &[&fmt.format(ty), &proto(protocol)],
                ),
            ),
            Self::DepthExceeded { ty, protocol } => (
                diagnostic_codes::CONFORMANCE_CHECK_TOO_DEEP,
                format_message(
                    diagnostic_messages::CONFORMANCE_CHECK_TOO_DEEP,
                    &[&fmt.format(ty), &proto(protocol)],
                ),
            ),
        }
    }
}

/// Result of [`ConformanceOracle::explain`](crate::ConformanceOracle::explain)
/// when the type does not conform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConformanceFailure {
    pub ty: TypeId,
    pub protocol: DefId,
    /// Outermost reason first.
    pub trail: Vec<ConformanceFailureReason>,
}

impl ConformanceFailure {
    /// The innermost reason: the type that actually lacks the conformance.
    pub fn root_cause(&self) -> Option<&ConformanceFailureReason> {
        self.trail.last()
    }
}

// =============================================================================
// Tracers
// =============================================================================

/// Hook called by the oracle whenever a check fails.
pub trait ConformanceTracer {
    /// Record a failure. The closure is only called by tracers that keep
    /// reasons. Returns the value the failing check should produce, which
    /// is always `false` for the tracers in this crate.
    fn on_failure(&mut self, reason: impl FnOnce() -> ConformanceFailureReason) -> bool;
}

/// Yes/no tracer with no allocation.
pub struct FastTracer;

impl ConformanceTracer for FastTracer {
    #[inline(always)]
    fn on_failure(&mut self, _reason: impl FnOnce() -> ConformanceFailureReason) -> bool {
        false
    }
}

/// Tracer that keeps the chain of reasons.
#[derive(Debug, Default)]
pub struct DiagnosticTracer {
    /// Innermost reason first, in the order failures propagate outwards.
    reasons: Vec<ConformanceFailureReason>,
}

impl DiagnosticTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Take the recorded reasons, outermost first.
    pub fn take_trail(&mut self) -> Vec<ConformanceFailureReason> {
        let mut trail = std::mem::take(&mut self.reasons);
        trail.reverse();
        trail
    }
}

impl ConformanceTracer for DiagnosticTracer {
    fn on_failure(&mut self, reason: impl FnOnce() -> ConformanceFailureReason) -> bool {
        self.reasons.push(reason());
        false
    }
}
