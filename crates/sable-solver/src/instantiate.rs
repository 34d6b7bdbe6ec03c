//! Generic substitution.
//!
//! Conditional conformances are written against the declaring type's own
//! parameters (`extension Box: Sendable where T: Sendable`). Checking
//! `Box<Int>` substitutes `T := Int` into each requirement's subject.

use crate::db::TypeDatabase;
use crate::types::{FunctionType, KeyPathType, TypeData, TypeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Mapping from type parameters to their arguments.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair parameters with arguments positionally. Missing arguments map
    /// to the error type; extra arguments are ignored.
    pub fn from_args(params: &[TypeId], args: &[TypeId]) -> Self {
        let mut map = FxHashMap::default();
        for (i, &param) in params.iter().enumerate() {
            map.insert(param, args.get(i).copied().unwrap_or(TypeId::ERROR));
        }
        Self { map }
    }

    pub fn insert(&mut self, param: TypeId, arg: TypeId) {
        self.map.insert(param, arg);
    }

    pub fn get(&self, param: TypeId) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Apply `subst` to `ty`, rebuilding any structure that mentions a
/// substituted parameter.
pub fn instantiate_type(db: &dyn TypeDatabase, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() {
        return ty;
    }
    if let Some(arg) = subst.get(ty) {
        return arg;
    }
    let Some(data) = db.lookup(ty) else {
        return ty;
    };

    let map_list = |list| -> SmallVec<[TypeId; 4]> {
        db.type_list(list)
            .iter()
            .map(|&member| instantiate_type(db, member, subst))
            .collect()
    };

    match data {
        TypeData::Intrinsic(_) | TypeData::Error | TypeData::TypeParameter(_) => ty,
        TypeData::Nominal { def, args } => db.nominal(def, map_list(args).into_vec()),
        TypeData::KeyPath(KeyPathType { kind, root, value }) => db.key_path(
            kind,
            instantiate_type(db, root, subst),
            instantiate_type(db, value, subst),
        ),
        TypeData::Function(FunctionType {
            params,
            result,
            flags,
        }) => db.function(
            map_list(params).into_vec(),
            instantiate_type(db, result, subst),
            flags,
        ),
        TypeData::Tuple(elements) => db.tuple(map_list(elements).into_vec()),
        TypeData::Composition(members) => db.composition(map_list(members).into_vec()),
        TypeData::Existential(inner) => db.existential(instantiate_type(db, inner, subst)),
        TypeData::Metatype(instance) => db.metatype(instantiate_type(db, instance, subst)),
    }
}

#[cfg(test)]
#[path = "tests/instantiate_tests.rs"]
mod tests;
