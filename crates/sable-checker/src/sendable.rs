//! Sendable checking for key-path literals and key-path values.
//!
//! ```swift
//! let _: KeyPath<K, Bool> & Sendable = \.[NonSendable()]
//! // warning: type 'KeyPath<K, Bool>' does not conform to the 'Sendable' protocol
//! let _: @Sendable (K) -> Bool = \.[NonSendable()]   // ok: function conversion
//! ```
//!
//! The diagnostic spells the type derived from the literal's components,
//! which can be more specific than the annotation
//! (`ReferenceWritableKeyPath<K, Int>` for `KeyPath<K, Int> & Sendable`).

use crate::capture::{CapturedValue, captured_values};
use crate::key_path_expr::KeyPathExpr;
use crate::usage::{UsageContext, classify, requests_capability};
use sable_common::diagnostics::{diagnostic_codes, diagnostic_messages};
use sable_common::limits::MAX_RELATED_NOTES;
use sable_common::{Diagnostic, DiagnosticCategory, Span, format_message};
use sable_solver::{
    ConformanceFailure, ConformanceOracle, DefId, DefinitionStore, Prelude, TypeData,
    TypeDatabase, TypeFormatter, TypeId,
};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// A literal captured a subscript argument that is not Sendable.
    NonConformingCapture {
        capture: CapturedValue,
        failure: ConformanceFailure,
    },
    /// A key-path value whose type was not inferred Sendable.
    NonSendableKeyPathValue {
        value_type: TypeId,
        failure: ConformanceFailure,
    },
}

/// A key path that flows into a Sendable-requiring context without being
/// Sendable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Concrete key-path type named in the diagnostic.
    pub key_path_type: TypeId,
    pub kind: ViolationKind,
    pub span: Span,
}

impl Violation {
    pub fn failure(&self) -> &ConformanceFailure {
        match &self.kind {
            ViolationKind::NonConformingCapture { failure, .. }
            | ViolationKind::NonSendableKeyPathValue { failure, .. } => failure,
        }
    }

    pub fn to_diagnostic(
        &self,
        db: &dyn TypeDatabase,
        defs: &DefinitionStore,
        file: &str,
        category: DiagnosticCategory,
    ) -> Diagnostic {
        let fmt = TypeFormatter::new(db, defs);
        let protocol = protocol_name(db, defs, self.failure().protocol);
        let message = format_message(
            diagnostic_messages::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
            &[&fmt.format(self.key_path_type), &protocol],
        );
        let mut diagnostic = Diagnostic::new(
            category,
            file.to_string(),
            self.span.start,
            self.span.len(),
            message,
            diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
        );

        match &self.kind {
            ViolationKind::NonConformingCapture { capture, failure } => {
                let at = if capture.span.is_dummy() {
                    self.span
                } else {
                    capture.span
                };
                diagnostic = diagnostic.with_related(
                    file.to_string(),
                    at.start,
                    at.len(),
                    format_message(
                        diagnostic_messages::CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM,
                        &[&fmt.format(capture.ty), &protocol],
                    ),
                    diagnostic_codes::CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM,
                );
                for reason in failure.trail.iter().take(MAX_RELATED_NOTES) {
                    let (code, text) = reason.to_note(db, defs);
                    diagnostic =
                        diagnostic.with_related(file.to_string(), at.start, at.len(), text, code);
                }
            }
            ViolationKind::NonSendableKeyPathValue { value_type, .. } => {
                diagnostic = diagnostic.with_related(
                    file.to_string(),
                    self.span.start,
                    self.span.len(),
                    format_message(
                        diagnostic_messages::KEY_PATH_VALUE_NOT_INFERRED_SENDABLE,
                        &[&fmt.format(*value_type), &protocol],
                    ),
                    diagnostic_codes::KEY_PATH_VALUE_NOT_INFERRED_SENDABLE,
                );
            }
        }
        diagnostic
    }
}

fn protocol_name(db: &dyn TypeDatabase, defs: &DefinitionStore, protocol: DefId) -> String {
    defs.get_name(protocol)
        .map(|atom| db.resolve_atom(atom).to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Decides whether key paths may cross concurrency domains.
pub struct KeyPathSendableChecker<'a> {
    oracle: ConformanceOracle<'a>,
    prelude: Prelude,
}

impl<'a> KeyPathSendableChecker<'a> {
    pub fn new(db: &'a dyn TypeDatabase, defs: &'a DefinitionStore, prelude: Prelude) -> Self {
        Self {
            oracle: ConformanceOracle::new(db, defs),
            prelude,
        }
    }

    pub fn oracle(&self) -> &ConformanceOracle<'a> {
        &self.oracle
    }

    pub fn prelude(&self) -> &Prelude {
        &self.prelude
    }

    /// Check a literal converted to `target`.
    pub fn check(&self, expr: &KeyPathExpr, target: TypeId) -> Result<(), Violation> {
        let db = self.oracle.db();
        let defs = self.oracle.defs();
        let sendable = self.prelude.sendable;

        if classify(db, &self.prelude, expr, target) == UsageContext::ImplicitFunctionConversion {
            return Ok(());
        }
        if !requests_capability(db, defs, &self.prelude, target, sendable) {
            return Ok(());
        }

        for capture in captured_values(expr) {
            if let Err(failure) = self.oracle.explain(capture.ty, sendable) {
                let key_path_type = expr.derived_type(db, defs);
                debug!(
                    key_path_type = key_path_type.0,
                    capture = capture.ty.0,
                    component = capture.component,
                    argument = capture.argument,
                    "key path captures a non-Sendable value"
                );
                return Err(Violation {
                    key_path_type,
                    kind: ViolationKind::NonConformingCapture { capture, failure },
                    span: expr.span(),
                });
            }
        }
        Ok(())
    }

    /// Type of a literal bound without an annotation: the derived key-path
    /// type, composed with `Sendable` when every capture conforms.
    pub fn infer_literal_type(&self, expr: &KeyPathExpr, infer_from_captures: bool) -> TypeId {
        let db = self.oracle.db();
        let derived = expr.derived_type(db, self.oracle.defs());
        if !infer_from_captures {
            return derived;
        }
        let all_sendable = captured_values(expr)
            .iter()
            .all(|capture| self.oracle.satisfies(capture.ty, self.prelude.sendable));
        if all_sendable {
            db.composition(vec![derived, self.prelude.sendable_type(db)])
        } else {
            derived
        }
    }

    /// Check a key-path value of type `value_type` converted to `target`.
    pub fn check_value(&self, value_type: TypeId, target: TypeId, span: Span) -> Result<(), Violation> {
        let db = self.oracle.db();
        let sendable = self.prelude.sendable;
        if !requests_capability(db, self.oracle.defs(), &self.prelude, target, sendable) {
            return Ok(());
        }
        let Err(failure) = self.oracle.explain(value_type, sendable) else {
            return Ok(());
        };
        let key_path_type = key_path_part(db, value_type);
        debug!(
            value_type = value_type.0,
            target = target.0,
            "key path value is not Sendable"
        );
        Err(Violation {
            key_path_type,
            kind: ViolationKind::NonSendableKeyPathValue {
                value_type,
                failure,
            },
            span,
        })
    }
}

/// The `KeyPath<..>` member of a value type such as `any KeyPath<K, V> & P`.
fn key_path_part(db: &dyn TypeDatabase, ty: TypeId) -> TypeId {
    match db.lookup(ty) {
        Some(TypeData::Existential(inner)) => key_path_part(db, inner),
        Some(TypeData::Composition(members)) => db
            .type_list(members)
            .iter()
            .copied()
            .find(|&member| matches!(db.lookup(member), Some(TypeData::KeyPath(_))))
            .unwrap_or(ty),
        _ => ty,
    }
}

#[cfg(test)]
#[path = "../tests/sendable_tests.rs"]
mod tests;
