//! How a key-path literal is used at its conversion site.
//!
//! A literal converted to a function type (`let f: (K) -> Int = \.count`)
//! never exists as a key-path value: the compiler emits a closure that
//! applies the path. Whether that closure may be `@Sendable` is decided by
//! closure isolation checking, not here. Every other target keeps the key
//! path as a first-class value.

use crate::key_path_expr::KeyPathExpr;
use sable_solver::{DefId, DefinitionStore, Prelude, TypeData, TypeDatabase, TypeId};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UsageContext {
    /// The key path is stored or passed as a value.
    DirectValue,
    /// The key path only seeds a synthesized function.
    ImplicitFunctionConversion,
}

/// Classify the use of `expr` converted to `target`.
pub fn classify(
    db: &dyn TypeDatabase,
    prelude: &Prelude,
    expr: &KeyPathExpr,
    target: TypeId,
) -> UsageContext {
    let context = if is_function_target(db, prelude, target) {
        UsageContext::ImplicitFunctionConversion
    } else {
        UsageContext::DirectValue
    };
    debug!(
        target = target.0,
        start = expr.span().start,
        ?context,
        "classified key path use"
    );
    context
}

/// `(T) -> U`, `@Sendable (T) -> U`, and optionals of either.
fn is_function_target(db: &dyn TypeDatabase, prelude: &Prelude, target: TypeId) -> bool {
    match db.lookup(target) {
        Some(TypeData::Function(_)) => true,
        Some(TypeData::Existential(inner)) => is_function_target(db, prelude, inner),
        Some(TypeData::Nominal { .. }) => prelude
            .optional_payload(db, target)
            .is_some_and(|payload| is_function_target(db, prelude, payload)),
        _ => false,
    }
}

/// Whether converting to `target` demands `requirement` of the value.
///
/// `KeyPath<K, V> & Sendable`, `any Sendable`, a protocol refining
/// `Sendable`, and a generic parameter `T: Sendable` all do. A bare
/// `KeyPath<K, V>` or `Any` does not.
pub fn requests_capability(
    db: &dyn TypeDatabase,
    defs: &DefinitionStore,
    prelude: &Prelude,
    target: TypeId,
    requirement: DefId,
) -> bool {
    match db.lookup(target) {
        Some(TypeData::Composition(members)) => db
            .type_list(members)
            .iter()
            .any(|&member| requests_capability(db, defs, prelude, member, requirement)),
        Some(TypeData::Existential(inner)) => {
            requests_capability(db, defs, prelude, inner, requirement)
        }
        Some(TypeData::Nominal { def, .. }) if defs.is_protocol(def) => {
            defs.implies(def, requirement)
        }
        Some(TypeData::Nominal { .. }) => prelude
            .optional_payload(db, target)
            .is_some_and(|payload| requests_capability(db, defs, prelude, payload, requirement)),
        Some(TypeData::TypeParameter(info)) => db
            .type_list(info.constraints)
            .iter()
            .any(|&constraint| requests_capability(db, defs, prelude, constraint, requirement)),
        _ => false,
    }
}

#[cfg(test)]
#[path = "../tests/usage_tests.rs"]
mod tests;
