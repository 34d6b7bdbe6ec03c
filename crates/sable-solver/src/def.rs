//! Definition identifiers and conformance tables.
//!
//! Every nominal type and protocol is registered once in a
//! `DefinitionStore`. Its declared conformances (explicit, `@unchecked`,
//! inferred or synthesized, possibly conditional or unavailable) are the
//! only source of truth for the conformance oracle: nothing is derived from
//! stored properties.
//!
//! The store is filled while declarations are processed and then frozen.
//! Checks only run against a frozen store, which makes it safe to share
//! between checking threads.

use crate::types::TypeId;
use bitflags::bitflags;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxHashSet;
use sable_common::interner::Atom;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::trace;

// =============================================================================
// DefId
// =============================================================================

/// Identifier of a registered definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

// =============================================================================
// DefKind
// =============================================================================

/// Kind of nominal definition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    Class,
    Struct,
    Enum,
    Actor,
    Protocol,
}

impl DefKind {
    /// Classes and actors have reference semantics; a settable member on one
    /// makes a key path reference-writable.
    pub const fn is_reference_type(self) -> bool {
        matches!(self, Self::Class | Self::Actor)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Actor => "actor",
            Self::Protocol => "protocol",
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DefFlags: u8 {
        /// Protocol with no requirements that the type system checks
        /// structurally (tuples, functions, metatypes, actors).
        const MARKER = 1 << 0;
        /// Registered by the prelude rather than user declarations.
        const PRELUDE = 1 << 1;
    }
}

// =============================================================================
// Conformance declarations
// =============================================================================

/// How a conformance came to exist.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConformanceSource {
    /// `struct S: Sendable`
    Explicit,
    /// `class C: @unchecked Sendable`
    Unchecked,
    /// Implicit conformance inferred for non-public value types.
    Inferred,
    /// Provided by the prelude or the compiler.
    Synthesized,
}

/// One `where Subject: Protocol` clause of a conditional conformance.
///
/// `subject` is written in terms of the declaring type's own generic
/// parameters and is substituted with the actual arguments at check time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConditionalRequirement {
    pub subject: TypeId,
    pub protocol: DefId,
}

/// A declared conformance of a nominal type to a protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConformanceDecl {
    pub protocol: DefId,
    pub requirements: Vec<ConditionalRequirement>,
    pub source: ConformanceSource,
    /// `@available(*, unavailable) extension S: Sendable {}`
    pub unavailable: bool,
}

impl ConformanceDecl {
    pub fn new(protocol: DefId, source: ConformanceSource) -> Self {
        Self {
            protocol,
            requirements: Vec::new(),
            source,
            unavailable: false,
        }
    }

    pub fn explicit(protocol: DefId) -> Self {
        Self::new(protocol, ConformanceSource::Explicit)
    }

    pub fn unavailable(protocol: DefId) -> Self {
        Self {
            unavailable: true,
            ..Self::new(protocol, ConformanceSource::Explicit)
        }
    }

    pub fn with_requirement(mut self, subject: TypeId, protocol: DefId) -> Self {
        self.requirements.push(ConditionalRequirement { subject, protocol });
        self
    }

    pub fn is_conditional(&self) -> bool {
        !self.requirements.is_empty()
    }
}

// =============================================================================
// DefinitionInfo
// =============================================================================

/// Everything the solver knows about a nominal definition.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    /// Name of the definition (for diagnostics)
    pub name: Atom,
    /// Generic parameters, as `TypeData::TypeParameter` types
    pub type_params: Vec<TypeId>,
    pub flags: DefFlags,
    pub conformances: Vec<ConformanceDecl>,
    /// For protocols: directly inherited protocols (`protocol P: Sendable`)
    pub refines: Vec<DefId>,
}

impl DefinitionInfo {
    pub fn nominal(kind: DefKind, name: Atom) -> Self {
        Self {
            kind,
            name,
            type_params: Vec::new(),
            flags: DefFlags::empty(),
            conformances: Vec::new(),
            refines: Vec::new(),
        }
    }

    pub fn class(name: Atom) -> Self {
        Self::nominal(DefKind::Class, name)
    }

    pub fn structure(name: Atom) -> Self {
        Self::nominal(DefKind::Struct, name)
    }

    pub fn protocol(name: Atom) -> Self {
        Self::nominal(DefKind::Protocol, name)
    }

    pub fn with_type_params(mut self, params: Vec<TypeId>) -> Self {
        self.type_params = params;
        self
    }

    pub fn with_flags(mut self, flags: DefFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_conformance(mut self, decl: ConformanceDecl) -> Self {
        self.conformances.push(decl);
        self
    }

    pub fn with_refines(mut self, protocols: Vec<DefId>) -> Self {
        self.refines = protocols;
        self
    }
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Error raised when the store is modified incorrectly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionError {
    /// Declarations were added after checking started.
    Frozen,
    /// A second definition with the same name.
    Duplicate(Atom),
    /// The id does not name a registered definition.
    Unknown(DefId),
}

impl std::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Frozen => write!(f, "definition store is frozen"),
            Self::Duplicate(atom) => write!(f, "duplicate definition (atom {})", atom.index()),
            Self::Unknown(id) => write!(f, "unknown definition {}", id.0),
        }
    }
}

impl std::error::Error for DefinitionError {}

/// Concurrent storage for nominal definitions.
pub struct DefinitionStore {
    definitions: DashMap<DefId, DefinitionInfo>,
    by_name: DashMap<Atom, DefId>,
    next_id: AtomicU32,
    frozen: AtomicBool,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
            by_name: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
            frozen: AtomicBool::new(false),
        }
    }

    /// Register a definition and return its id.
    pub fn register(&self, info: DefinitionInfo) -> Result<DefId, DefinitionError> {
        if self.is_frozen() {
            return Err(DefinitionError::Frozen);
        }
        // The name stays locked until the definition is stored, so a
        // concurrent register of the same name sees `Occupied`.
        let slot = match self.by_name.entry(info.name) {
            Entry::Occupied(_) => return Err(DefinitionError::Duplicate(info.name)),
            Entry::Vacant(slot) => slot,
        };
        let id = DefId(self.next_id.fetch_add(1, Ordering::SeqCst));
        trace!(
            def_id = id.0,
            kind = info.kind.name(),
            conformances = info.conformances.len(),
            "DefinitionStore::register"
        );
        self.definitions.insert(id, info);
        slot.insert(id);
        Ok(id)
    }

    /// Replace the generic parameters of a definition. Type parameters name
    /// their owner, so they can only be built after the id exists.
    pub fn set_type_params(&self, id: DefId, params: Vec<TypeId>) -> Result<(), DefinitionError> {
        self.update(id, |info| info.type_params = params)
    }

    /// Attach a conformance declared in an extension.
    pub fn add_conformance(&self, id: DefId, decl: ConformanceDecl) -> Result<(), DefinitionError> {
        trace!(def_id = id.0, protocol = decl.protocol.0, "DefinitionStore::add_conformance");
        self.update(id, |info| info.conformances.push(decl))
    }

    pub fn add_refinement(&self, id: DefId, protocol: DefId) -> Result<(), DefinitionError> {
        self.update(id, |info| info.refines.push(protocol))
    }

    fn update(
        &self,
        id: DefId,
        f: impl FnOnce(&mut DefinitionInfo),
    ) -> Result<(), DefinitionError> {
        if self.is_frozen() {
            return Err(DefinitionError::Frozen);
        }
        let mut entry = self
            .definitions
            .get_mut(&id)
            .ok_or(DefinitionError::Unknown(id))?;
        f(entry.value_mut());
        Ok(())
    }

    /// Stop accepting declarations. Checks require a frozen store.
    pub fn freeze(&self) {
        trace!(definitions = self.definitions.len(), "DefinitionStore::freeze");
        self.frozen.store(true, Ordering::Release);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.definitions.get(&id).map(|r| r.clone())
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn lookup_name(&self, name: Atom) -> Option<DefId> {
        self.by_name.get(&name).map(|r| *r)
    }

    pub fn get_kind(&self, id: DefId) -> Option<DefKind> {
        self.definitions.get(&id).map(|r| r.kind)
    }

    pub fn get_name(&self, id: DefId) -> Option<Atom> {
        self.definitions.get(&id).map(|r| r.name)
    }

    pub fn get_flags(&self, id: DefId) -> DefFlags {
        self.definitions
            .get(&id)
            .map(|r| r.flags)
            .unwrap_or_default()
    }

    pub fn get_type_params(&self, id: DefId) -> Option<Vec<TypeId>> {
        self.definitions.get(&id).map(|r| r.type_params.clone())
    }

    pub fn get_conformances(&self, id: DefId) -> Vec<ConformanceDecl> {
        self.definitions
            .get(&id)
            .map(|r| r.conformances.clone())
            .unwrap_or_default()
    }

    pub fn is_protocol(&self, id: DefId) -> bool {
        self.get_kind(id) == Some(DefKind::Protocol)
    }

    pub fn is_marker(&self, id: DefId) -> bool {
        self.get_flags(id).contains(DefFlags::MARKER)
    }

    /// Whether `protocol` is `target` or inherits from it, transitively.
    pub fn implies(&self, protocol: DefId, target: DefId) -> bool {
        if protocol == target {
            return true;
        }
        let mut visited = FxHashSet::default();
        let mut stack = vec![protocol];
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            if let Some(info) = self.definitions.get(&current) {
                for &parent in &info.refines {
                    if parent == target {
                        return true;
                    }
                    stack.push(parent);
                }
            }
        }
        false
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/def_tests.rs"]
mod tests;
