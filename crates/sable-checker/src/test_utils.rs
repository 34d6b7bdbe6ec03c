//! Shared declarations for checker unit tests.
//!
//! ```swift
//! class NonSendable: Hashable {}
//! final class CondSendable<T>: Hashable {}
//! extension CondSendable: Sendable where T: Sendable {}
//! class K {
//!     var data: String
//!     subscript<T>(_: T) -> Bool { get }
//!     subscript<Q>(_: Int, _: Q) -> Int { get set }
//! }
//! struct S { var count: Int; let label: String }
//! ```

use crate::key_path_expr::{KeyPathExpr, SubscriptArgument};
use sable_solver::{
    ConformanceDecl, DefId, DefinitionInfo, DefinitionStore, Prelude, TypeDatabase, TypeId,
    TypeInterner,
};

pub(crate) struct TestModule {
    pub interner: TypeInterner,
    pub defs: DefinitionStore,
    pub prelude: Prelude,
    pub k: TypeId,
    pub s: TypeId,
    pub non_sendable: TypeId,
    pub cond: DefId,
}

impl TestModule {
    pub fn new() -> Self {
        let interner = TypeInterner::new();
        let defs = DefinitionStore::new();
        let prelude = Prelude::install(&interner, &defs).expect("prelude");

        let non_sendable = defs
            .register(
                DefinitionInfo::class(interner.intern_string("NonSendable"))
                    .with_conformance(ConformanceDecl::explicit(prelude.hashable)),
            )
            .expect("NonSendable");
        let cond = defs
            .register(
                DefinitionInfo::class(interner.intern_string("CondSendable"))
                    .with_conformance(ConformanceDecl::explicit(prelude.hashable)),
            )
            .expect("CondSendable");
        let t = interner.type_param(interner.intern_string("T"), Some(cond), Vec::new());
        defs.set_type_params(cond, vec![t]).expect("params");
        defs.add_conformance(
            cond,
            ConformanceDecl::explicit(prelude.sendable).with_requirement(t, prelude.sendable),
        )
        .expect("conditional");
        let k = defs
            .register(DefinitionInfo::class(interner.intern_string("K")))
            .expect("K");
        let s = defs
            .register(DefinitionInfo::structure(interner.intern_string("S")))
            .expect("S");
        defs.freeze();

        let k = interner.nominal(k, Vec::new());
        let s = interner.nominal(s, Vec::new());
        let non_sendable = interner.nominal(non_sendable, Vec::new());
        Self {
            interner,
            defs,
            prelude,
            k,
            s,
            non_sendable,
            cond,
        }
    }

    pub fn db(&self) -> &dyn TypeDatabase {
        &self.interner
    }

    pub fn cond_of(&self, arg: TypeId) -> TypeId {
        self.interner.nominal(self.cond, vec![arg])
    }

    pub fn sendable(&self) -> TypeId {
        self.prelude.sendable_type(&self.interner)
    }

    /// `KeyPath<root, value> & Sendable`
    pub fn sendable_key_path(&self, root: TypeId, value: TypeId) -> TypeId {
        let kp = self
            .interner
            .key_path(sable_solver::KeyPathKind::ReadOnly, root, value);
        self.interner.composition(vec![kp, self.sendable()])
    }

    /// `\K.data`
    pub fn k_data(&self) -> KeyPathExpr {
        KeyPathExpr::builder(self.k)
            .property(self.interner.intern_string("data"), TypeId::STRING, true)
            .build()
            .expect("non-empty")
    }

    /// `\K.[arg]` through the read-only generic subscript.
    pub fn k_subscript(&self, arg: TypeId) -> KeyPathExpr {
        KeyPathExpr::builder(self.k)
            .subscript(TypeId::BOOL, false, vec![SubscriptArgument::new(arg)])
            .build()
            .expect("non-empty")
    }

    /// `\K.[42, arg]` through the settable two-argument subscript.
    pub fn k_settable_subscript(&self, arg: TypeId) -> KeyPathExpr {
        KeyPathExpr::builder(self.k)
            .subscript(
                TypeId::INT,
                true,
                vec![SubscriptArgument::new(TypeId::INT), SubscriptArgument::new(arg)],
            )
            .build()
            .expect("non-empty")
    }
}
