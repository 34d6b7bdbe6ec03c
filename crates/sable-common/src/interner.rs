//! String interner for type and member names.
//!
//! Names are interned into a shared pool and passed around as u32 indices
//! (`Atom`). Comparing two names is an integer comparison, and type data that
//! embeds names stays `Copy` and cheap to hash.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `ShardedInterner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;
const COMMON_STRINGS: &[&str] = &[
    // Standard library names the prelude registers
    "Sendable",
    "Array",
    "Optional",
    "Dictionary",
    "Set",
    "Element",
    "Wrapped",
    "Key",
    "Value",
    // Key path family
    "AnyKeyPath",
    "PartialKeyPath",
    "KeyPath",
    "WritableKeyPath",
    "ReferenceWritableKeyPath",
    "Root",
    // Common member names
    "self",
    "data",
    "value",
    "count",
    "first",
    "last",
];

#[derive(Default)]
struct ShardState {
    map: FxHashMap<Arc<str>, Atom>,
    strings: Vec<Arc<str>>,
}

struct InternerShard {
    state: RwLock<ShardState>,
}

impl InternerShard {
    fn new() -> Self {
        InternerShard {
            state: RwLock::new(ShardState::default()),
        }
    }
}

/// Sharded string interner for concurrent use.
///
/// Uses fixed buckets to reduce lock contention while keeping Atom lookups O(1).
pub struct ShardedInterner {
    shards: [InternerShard; SHARD_COUNT],
}

impl ShardedInterner {
    /// Create a new sharded interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let shards = std::array::from_fn(|_| InternerShard::new());

        if let Ok(mut state) = shards[0].state.write() {
            let empty: Arc<str> = Arc::from("");
            state.strings.push(empty.clone());
            state.map.insert(empty, Atom::NONE);
        }

        ShardedInterner { shards }
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }

        let shard_idx = Self::shard_for(s);
        let shard = &self.shards[shard_idx];

        if let Ok(state) = shard.state.read()
            && let Some(&atom) = state.map.get(s)
        {
            return atom;
        }

        let Ok(mut state) = shard.state.write() else {
            return Atom::NONE;
        };

        if let Some(&atom) = state.map.get(s) {
            return atom;
        }

        let local_index = state.strings.len() as u32;
        if local_index > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }

        let atom = Self::make_atom(local_index, shard_idx as u32);
        let owned: Arc<str> = Arc::from(s);
        state.strings.push(owned.clone());
        state.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds (safety for error recovery).
    #[inline]
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let (shard_idx, local_index) = Self::split_atom(atom);
        let shard = self.shards.get(shard_idx)?;
        let state = shard.state.read().ok()?;
        state.strings.get(local_index).cloned()
    }

    /// Look up an already interned string without inserting it.
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        if s.is_empty() {
            return Some(Atom::NONE);
        }
        let shard = &self.shards[Self::shard_for(s)];
        let state = shard.state.read().ok()?;
        state.map.get(s).copied()
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .state
                    .read()
                    .map(|state| state.strings.len())
                    .unwrap_or(0)
            })
            .sum()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern the standard library and key path names.
    pub fn intern_common(&self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }

    #[inline]
    fn make_atom(local_index: u32, shard_idx: u32) -> Atom {
        Atom((local_index << SHARD_BITS) | (shard_idx & SHARD_MASK))
    }

    #[inline]
    fn split_atom(atom: Atom) -> (usize, usize) {
        if atom == Atom::NONE {
            return (0, 0);
        }

        let raw = atom.0;
        let shard_idx = (raw & SHARD_MASK) as usize;
        let local_index = (raw >> SHARD_BITS) as usize;
        (shard_idx, local_index)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/interner_tests.rs"]
mod tests;
