//! Conformance oracle.
//!
//! Answers "does `T` conform to protocol `P`?" from declared conformance
//! tables. Conformance is opt-in: a class holding only an `Int` does not
//! conform to `Sendable` unless it says so.
//!
//! Resolution order for a nominal type:
//! 1. an unavailable declaration for the protocol fails outright;
//! 2. an unconditional declaration (directly, or to a protocol refining
//!    `P`) succeeds;
//! 3. a conditional declaration substitutes the type's generic arguments
//!    into each `where` clause and checks them recursively;
//! 4. otherwise the type does not conform.
//!
//! Marker protocols such as `Sendable` also get the structural rules of the
//! type system: built-in value types, tuples of conforming elements,
//! `@Sendable` functions, metatypes and actors.
//!
//! Recursion through conditional requirements is guarded by
//! `RecursionProfile::ConformanceCheck`. Revisiting a `(type, protocol)`
//! pair that is still being checked counts as success (coinductive), and
//! running out of depth counts as failure.
//!
//! Within one query, a pair proven without leaning on a cycle assumption is
//! remembered, so shared arguments (`[X: X]`) are checked once rather than
//! once per path.

use crate::db::TypeDatabase;
use crate::def::{ConformanceDecl, DefId, DefKind, DefinitionStore};
use crate::diagnostics::{
    ConformanceFailure, ConformanceFailureReason, ConformanceTracer, DiagnosticTracer, FastTracer,
};
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{TypeData, TypeId};
use rustc_hash::FxHashSet;
use tracing::{trace, warn};

type ConformanceKey = (TypeId, DefId);

/// State for a single `satisfies` or `explain` query.
struct ConformanceQuery {
    guard: RecursionGuard<ConformanceKey>,
    proven: FxHashSet<ConformanceKey>,
    /// Bumped whenever a cycle is assumed to hold.
    assumptions: u32,
}

impl ConformanceQuery {
    fn new(profile: RecursionProfile) -> Self {
        Self {
            guard: RecursionGuard::with_profile(profile),
            proven: FxHashSet::default(),
            assumptions: 0,
        }
    }
}

/// Read-only view over the type database and a frozen definition store.
pub struct ConformanceOracle<'a> {
    db: &'a dyn TypeDatabase,
    defs: &'a DefinitionStore,
    profile: RecursionProfile,
}

impl<'a> ConformanceOracle<'a> {
    pub fn new(db: &'a dyn TypeDatabase, defs: &'a DefinitionStore) -> Self {
        debug_assert!(
            defs.is_frozen(),
            "conformance queries require a frozen definition store"
        );
        Self {
            db,
            defs,
            profile: RecursionProfile::ConformanceCheck,
        }
    }

    /// Override the recursion limits (tests and stress fixtures).
    pub fn with_profile(mut self, profile: RecursionProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn db(&self) -> &'a dyn TypeDatabase {
        self.db
    }

    pub fn defs(&self) -> &'a DefinitionStore {
        self.defs
    }

    /// Does `ty` conform to `protocol`?
    pub fn satisfies(&self, ty: TypeId, protocol: DefId) -> bool {
        let mut query = ConformanceQuery::new(self.profile);
        self.check(ty, protocol, &mut query, &mut FastTracer)
    }

    /// Like [`satisfies`](Self::satisfies), but reports why not.
    pub fn explain(&self, ty: TypeId, protocol: DefId) -> Result<(), ConformanceFailure> {
        let mut query = ConformanceQuery::new(self.profile);
        let mut tracer = DiagnosticTracer::new();
        if self.check(ty, protocol, &mut query, &mut tracer) {
            return Ok(());
        }
        let mut trail = tracer.take_trail();
        if trail.is_empty() {
            trail.push(ConformanceFailureReason::NoDeclaredConformance { ty, protocol });
        }
        Err(ConformanceFailure {
            ty,
            protocol,
            trail,
        })
    }

    fn check<T: ConformanceTracer>(
        &self,
        ty: TypeId,
        protocol: DefId,
        query: &mut ConformanceQuery,
        tracer: &mut T,
    ) -> bool {
        if ty.is_error() || ty.is_none() {
            return true;
        }

        let key = (ty, protocol);
        if query.proven.contains(&key) {
            return true;
        }

        match query.guard.enter(key) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(ty = ty.0, protocol = protocol.0, "conformance cycle, assuming success");
                query.assumptions += 1;
                return true;
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                warn!(
                    ty = ty.0,
                    protocol = protocol.0,
                    depth = query.guard.depth(),
                    "conformance check exceeded recursion limit"
                );
                return tracer.on_failure(|| ConformanceFailureReason::DepthExceeded { ty, protocol });
            }
        }

        let assumptions = query.assumptions;
        let result = self.check_structure(ty, protocol, query, tracer);
        query.guard.leave(key);

        // A success that assumed an open cycle may not survive that cycle's
        // own outcome, so only unconditional successes are kept.
        if result && query.assumptions == assumptions {
            query.proven.insert(key);
        }

        trace!(ty = ty.0, protocol = protocol.0, result, "conformance");
        result
    }

    fn check_structure<T: ConformanceTracer>(
        &self,
        ty: TypeId,
        protocol: DefId,
        query: &mut ConformanceQuery,
        tracer: &mut T,
    ) -> bool {
        let marker = self.defs.is_marker(protocol);
        let no_conformance =
            || ConformanceFailureReason::NoDeclaredConformance { ty, protocol };

        let Some(data) = self.db.lookup(ty) else {
            return tracer.on_failure(no_conformance);
        };

        match data {
            TypeData::Error => true,
            TypeData::Intrinsic(kind) => {
                if marker && kind.is_sendable() {
                    true
                } else {
                    tracer.on_failure(no_conformance)
                }
            }
            TypeData::Nominal { def, args } => {
                self.check_nominal(ty, def, &self.db.type_list(args), protocol, query, tracer)
            }
            TypeData::TypeParameter(info) => {
                let constrained = self
                    .db
                    .type_list(info.constraints)
                    .iter()
                    .any(|&constraint| self.protocol_type_implies(constraint, protocol));
                if constrained {
                    true
                } else {
                    tracer.on_failure(|| ConformanceFailureReason::UnconstrainedTypeParameter {
                        ty,
                        protocol,
                    })
                }
            }
            // A key path is only known to conform when composed with the
            // protocol, which lands in the `Composition` arm.
            TypeData::KeyPath(_) => tracer.on_failure(no_conformance),
            TypeData::Function(func) => {
                if marker && func.is_sendable() {
                    true
                } else if marker {
                    tracer.on_failure(|| ConformanceFailureReason::NonSendableFunction { ty })
                } else {
                    tracer.on_failure(no_conformance)
                }
            }
            TypeData::Tuple(elements) => {
                if !marker {
                    return tracer.on_failure(no_conformance);
                }
                for (index, &element) in self.db.type_list(elements).iter().enumerate() {
                    if !self.check(element, protocol, query, tracer) {
                        return tracer.on_failure(|| ConformanceFailureReason::TupleElement {
                            ty,
                            index,
                            element,
                            protocol,
                        });
                    }
                }
                true
            }
            TypeData::Composition(members) => {
                let members = self.db.type_list(members);
                if members
                    .iter()
                    .any(|&member| self.check(member, protocol, query, &mut FastTracer))
                {
                    true
                } else {
                    tracer.on_failure(no_conformance)
                }
            }
            TypeData::Existential(inner) => {
                if self.check(inner, protocol, query, &mut FastTracer) {
                    true
                } else {
                    tracer.on_failure(no_conformance)
                }
            }
            TypeData::Metatype(_) => marker || tracer.on_failure(no_conformance),
        }
    }

    fn check_nominal<T: ConformanceTracer>(
        &self,
        ty: TypeId,
        def: DefId,
        args: &[TypeId],
        protocol: DefId,
        query: &mut ConformanceQuery,
        tracer: &mut T,
    ) -> bool {
        let Some(info) = self.defs.get(def) else {
            return tracer.on_failure(|| ConformanceFailureReason::NoDeclaredConformance {
                ty,
                protocol,
            });
        };

        // A protocol in type position is an existential: `Message` conforms
        // to `Sendable` when `Message` refines it.
        if info.kind == DefKind::Protocol {
            if self.defs.implies(def, protocol) {
                return true;
            }
            return tracer.on_failure(|| ConformanceFailureReason::NoDeclaredConformance {
                ty,
                protocol,
            });
        }

        if info.conformances.iter().any(|decl| decl.protocol == protocol && decl.unavailable) {
            return tracer.on_failure(|| ConformanceFailureReason::ExplicitlyUnavailable {
                ty,
                protocol,
            });
        }

        if info.kind == DefKind::Actor && self.defs.is_marker(protocol) {
            return true;
        }

        let candidates: Vec<&ConformanceDecl> = info
            .conformances
            .iter()
            .filter(|decl| !decl.unavailable && self.defs.implies(decl.protocol, protocol))
            .collect();

        if candidates.is_empty() {
            return tracer.on_failure(|| ConformanceFailureReason::NoDeclaredConformance {
                ty,
                protocol,
            });
        }
        if candidates.iter().any(|decl| !decl.is_conditional()) {
            return true;
        }

        let subst = TypeSubstitution::from_args(&info.type_params, args);

        if let [decl] = candidates.as_slice() {
            return self.check_requirements(ty, protocol, decl, &subst, query, tracer);
        }

        // Several conditional declarations: try each quietly, and if none
        // holds replay the first through the caller's tracer to record why.
        for decl in &candidates {
            if self.check_requirements(ty, protocol, decl, &subst, query, &mut FastTracer) {
                return true;
            }
        }
        self.check_requirements(ty, protocol, candidates[0], &subst, query, tracer)
    }

    fn check_requirements<T: ConformanceTracer>(
        &self,
        ty: TypeId,
        protocol: DefId,
        decl: &ConformanceDecl,
        subst: &TypeSubstitution,
        query: &mut ConformanceQuery,
        tracer: &mut T,
    ) -> bool {
        for req in &decl.requirements {
            let subject = instantiate_type(self.db, req.subject, subst);
            if !self.check(subject, req.protocol, query, tracer) {
                return tracer.on_failure(|| ConformanceFailureReason::ConditionalRequirement {
                    ty,
                    protocol,
                    subject,
                    requirement: req.protocol,
                });
            }
        }
        true
    }

    /// Whether a constraint type (a protocol, or a composition of
    /// protocols) implies `protocol`.
    fn protocol_type_implies(&self, constraint: TypeId, protocol: DefId) -> bool {
        match self.db.lookup(constraint) {
            Some(TypeData::Nominal { def, .. }) => {
                self.defs.is_protocol(def) && self.defs.implies(def, protocol)
            }
            Some(TypeData::Composition(members)) => self
                .db
                .type_list(members)
                .iter()
                .any(|&member| self.protocol_type_implies(member, protocol)),
            Some(TypeData::Existential(inner)) => self.protocol_type_implies(inner, protocol),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/conformance_oracle_tests.rs"]
mod tests;
