//! Type interning for structural deduplication.
//!
//! Converts `TypeData` structures into lightweight `TypeId` handles:
//! - O(1) type equality (just compare ids)
//! - each unique structure stored once
//! - safe to share between checking threads
//!
//! Storage is split into shards keyed by the hash of the `TypeData`, each
//! behind its own `RwLock`, so concurrent interning rarely contends.

use crate::def::DefId;
use crate::key_path::KeyPathKind;
use crate::types::{
    FunctionFlags, FunctionType, IntrinsicKind, KeyPathType, TypeData, TypeId, TypeListId,
    TypeParamInfo,
};
use rustc_hash::{FxHashMap, FxHasher};
use sable_common::interner::{Atom, ShardedInterner};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

struct TypeShard {
    key_to_index: RwLock<FxHashMap<TypeData, u32>>,
    index_to_key: RwLock<Vec<TypeData>>,
}

impl TypeShard {
    fn new() -> Self {
        TypeShard {
            key_to_index: RwLock::new(FxHashMap::default()),
            index_to_key: RwLock::new(Vec::new()),
        }
    }
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }
        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }
        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

/// Thread-safe type interner.
pub struct TypeInterner {
    shards: Vec<TypeShard>,
    type_lists: RwLock<SliceInterner<TypeId>>,
    /// Identifier names (type parameter names, member names)
    pub atoms: ShardedInterner,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let atoms = ShardedInterner::new();
        atoms.intern_common();
        TypeInterner {
            shards: (0..SHARD_COUNT).map(|_| TypeShard::new()).collect(),
            type_lists: RwLock::new(SliceInterner::new()),
            atoms,
        }
    }

    pub fn intern_string(&self, s: &str) -> Atom {
        self.atoms.intern(s)
    }

    pub fn resolve_atom(&self, atom: Atom) -> Arc<str> {
        self.atoms.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn intern_type_list(&self, members: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern(members))
    }

    /// Intern a type structure and return its id.
    pub fn intern(&self, key: TypeData) -> TypeId {
        match key {
            TypeData::Intrinsic(kind) => return kind.to_type_id(),
            TypeData::Error => return TypeId::ERROR,
            _ => {}
        }

        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        let shard_idx = (hasher.finish() as usize) & (SHARD_COUNT - 1);
        let shard = &self.shards[shard_idx];

        {
            let map = shard.key_to_index.read().expect("shard key_to_index lock poisoned");
            if let Some(&local_index) = map.get(&key) {
                return self.make_id(local_index, shard_idx as u32);
            }
        }

        let mut map = shard.key_to_index.write().expect("shard key_to_index lock poisoned");
        let mut storage = shard.index_to_key.write().expect("shard index_to_key lock poisoned");

        if let Some(&local_index) = map.get(&key) {
            return self.make_id(local_index, shard_idx as u32);
        }

        let local_index = storage.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return TypeId::ERROR;
        }

        storage.push(key.clone());
        map.insert(key, local_index);
        self.make_id(local_index, shard_idx as u32)
    }

    /// Look up the structure behind an id.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_error() {
            return Some(TypeData::Error);
        }
        if let Some(kind) = IntrinsicKind::from_type_id(id) {
            return Some(TypeData::Intrinsic(kind));
        }

        let raw_val = id.0.checked_sub(TypeId::FIRST_USER)?;
        let shard_idx = (raw_val & SHARD_MASK) as usize;
        let local_index = raw_val >> SHARD_BITS;

        let shard = self.shards.get(shard_idx)?;
        let storage = shard.index_to_key.read().expect("shard index_to_key lock poisoned");
        storage.get(local_index as usize).cloned()
    }

    /// Number of interned types, intrinsics included.
    pub fn len(&self) -> usize {
        let mut total = TypeId::FIRST_USER as usize;
        for shard in &self.shards {
            total += shard.index_to_key.read().expect("shard index_to_key lock poisoned").len();
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_USER as usize
    }

    #[inline]
    fn make_id(&self, local_index: u32, shard_idx: u32) -> TypeId {
        let raw_val = (local_index << SHARD_BITS) | (shard_idx & SHARD_MASK);
        TypeId(TypeId::FIRST_USER + raw_val)
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn nominal(&self, def: DefId, args: Vec<TypeId>) -> TypeId {
        let args = self.intern_type_list(args);
        self.intern(TypeData::Nominal { def, args })
    }

    pub fn type_param(&self, name: Atom, owner: Option<DefId>, constraints: Vec<TypeId>) -> TypeId {
        let constraints = self.intern_type_list(constraints);
        self.intern(TypeData::TypeParameter(TypeParamInfo {
            name,
            owner,
            constraints,
        }))
    }

    pub fn key_path(&self, kind: KeyPathKind, root: TypeId, value: TypeId) -> TypeId {
        let root = if kind == KeyPathKind::Any { TypeId::NONE } else { root };
        let value = if kind.arity() == 2 { value } else { TypeId::NONE };
        self.intern(TypeData::KeyPath(KeyPathType { kind, root, value }))
    }

    pub fn function(&self, params: Vec<TypeId>, result: TypeId, flags: FunctionFlags) -> TypeId {
        let params = self.intern_type_list(params);
        self.intern(TypeData::Function(FunctionType {
            params,
            result,
            flags,
        }))
    }

    /// `()` is `Void` and a one-element tuple is its element.
    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        match elements.len() {
            0 => TypeId::VOID,
            1 => elements[0],
            _ => {
                let list = self.intern_type_list(elements);
                self.intern(TypeData::Tuple(list))
            }
        }
    }

    /// `A & B & ...`. Nested compositions are flattened and duplicates
    /// dropped; member order is kept for printing.
    pub fn composition(&self, members: Vec<TypeId>) -> TypeId {
        let mut flat: SmallVec<[TypeId; 4]> = SmallVec::new();
        for member in members {
            match self.lookup(member) {
                Some(TypeData::Composition(list)) => {
                    for &inner in self.type_list(list).iter() {
                        if !flat.contains(&inner) {
                            flat.push(inner);
                        }
                    }
                }
                _ => {
                    if !flat.contains(&member) {
                        flat.push(member);
                    }
                }
            }
        }
        match flat.len() {
            0 => TypeId::ANY,
            1 => flat[0],
            _ => {
                let list = self.intern_type_list(flat.into_vec());
                self.intern(TypeData::Composition(list))
            }
        }
    }

    pub fn existential(&self, inner: TypeId) -> TypeId {
        if matches!(self.lookup(inner), Some(TypeData::Existential(_))) {
            return inner;
        }
        self.intern(TypeData::Existential(inner))
    }

    pub fn metatype(&self, instance: TypeId) -> TypeId {
        self.intern(TypeData::Metatype(instance))
    }
}

#[cfg(test)]
#[path = "tests/intern_tests.rs"]
mod tests;
