//! Type database abstraction for the solver.
//!
//! Solver and checker code talks to `&dyn TypeDatabase` so tests and the
//! driver can share one interner without reaching into its storage.

use crate::def::DefId;
use crate::intern::TypeInterner;
use crate::key_path::KeyPathKind;
use crate::types::{FunctionFlags, TypeData, TypeId, TypeListId};
use sable_common::interner::Atom;
use std::sync::Arc;

/// Query interface for the solver.
pub trait TypeDatabase: Sync {
    fn intern(&self, key: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> Arc<str>;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;

    fn nominal(&self, def: DefId, args: Vec<TypeId>) -> TypeId;
    fn type_param(&self, name: Atom, owner: Option<DefId>, constraints: Vec<TypeId>) -> TypeId;
    fn key_path(&self, kind: KeyPathKind, root: TypeId, value: TypeId) -> TypeId;
    fn function(&self, params: Vec<TypeId>, result: TypeId, flags: FunctionFlags) -> TypeId;
    fn tuple(&self, elements: Vec<TypeId>) -> TypeId;
    fn composition(&self, members: Vec<TypeId>) -> TypeId;
    fn existential(&self, inner: TypeId) -> TypeId;
    fn metatype(&self, instance: TypeId) -> TypeId;
}

impl TypeDatabase for TypeInterner {
    fn intern(&self, key: TypeData) -> TypeId {
        TypeInterner::intern(self, key)
    }

    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        TypeInterner::lookup(self, id)
    }

    fn intern_string(&self, s: &str) -> Atom {
        TypeInterner::intern_string(self, s)
    }

    fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom(self, atom)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        TypeInterner::type_list(self, id)
    }

    fn nominal(&self, def: DefId, args: Vec<TypeId>) -> TypeId {
        TypeInterner::nominal(self, def, args)
    }

    fn type_param(&self, name: Atom, owner: Option<DefId>, constraints: Vec<TypeId>) -> TypeId {
        TypeInterner::type_param(self, name, owner, constraints)
    }

    fn key_path(&self, kind: KeyPathKind, root: TypeId, value: TypeId) -> TypeId {
        TypeInterner::key_path(self, kind, root, value)
    }

    fn function(&self, params: Vec<TypeId>, result: TypeId, flags: FunctionFlags) -> TypeId {
        TypeInterner::function(self, params, result, flags)
    }

    fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        TypeInterner::tuple(self, elements)
    }

    fn composition(&self, members: Vec<TypeId>) -> TypeId {
        TypeInterner::composition(self, members)
    }

    fn existential(&self, inner: TypeId) -> TypeId {
        TypeInterner::existential(self, inner)
    }

    fn metatype(&self, instance: TypeId) -> TypeId {
        TypeInterner::metatype(self, instance)
    }
}
