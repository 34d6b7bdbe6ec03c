//! Standard library declarations every checked module can see.
//!
//! ```swift
//! @_marker protocol Sendable {}
//! protocol Equatable {}
//! protocol Hashable: Equatable {}
//! protocol Error: Sendable {}
//! struct Array<Element> {}              // Sendable where Element: Sendable
//! enum Optional<Wrapped> {}             // Sendable where Wrapped: Sendable
//! struct Dictionary<Key, Value> {}      // Sendable where Key: Sendable, Value: Sendable
//! struct Set<Element> {}                // Sendable where Element: Sendable
//! ```

use crate::db::TypeDatabase;
use crate::def::{
    ConformanceDecl, ConformanceSource, DefFlags, DefId, DefKind, DefinitionError,
    DefinitionInfo, DefinitionStore,
};
use crate::types::TypeId;
use tracing::debug;

/// Ids of the prelude definitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prelude {
    pub sendable: DefId,
    pub equatable: DefId,
    pub hashable: DefId,
    pub error: DefId,
    pub array: DefId,
    pub optional: DefId,
    pub dictionary: DefId,
    pub set: DefId,
}

impl Prelude {
    /// Register the prelude into an empty store.
    pub fn install(db: &dyn TypeDatabase, defs: &DefinitionStore) -> Result<Self, DefinitionError> {
        let protocol = |name: &str, flags: DefFlags, refines: Vec<DefId>| {
            defs.register(
                DefinitionInfo::protocol(db.intern_string(name))
                    .with_flags(flags | DefFlags::PRELUDE)
                    .with_refines(refines),
            )
        };

        let sendable = protocol("Sendable", DefFlags::MARKER, Vec::new())?;
        let equatable = protocol("Equatable", DefFlags::empty(), Vec::new())?;
        let hashable = protocol("Hashable", DefFlags::empty(), vec![equatable])?;
        let error = protocol("Error", DefFlags::empty(), vec![sendable])?;

        let container = |kind: DefKind, name: &str, params: &[&str]| -> Result<DefId, DefinitionError> {
            let id = defs.register(
                DefinitionInfo::nominal(kind, db.intern_string(name)).with_flags(DefFlags::PRELUDE),
            )?;
            let params: Vec<TypeId> = params
                .iter()
                .map(|param| db.type_param(db.intern_string(param), Some(id), Vec::new()))
                .collect();
            let mut decl = ConformanceDecl::new(sendable, ConformanceSource::Synthesized);
            for &param in &params {
                decl = decl.with_requirement(param, sendable);
            }
            defs.set_type_params(id, params)?;
            defs.add_conformance(id, decl)?;
            Ok(id)
        };

        let array = container(DefKind::Struct, "Array", &["Element"])?;
        let optional = container(DefKind::Enum, "Optional", &["Wrapped"])?;
        let dictionary = container(DefKind::Struct, "Dictionary", &["Key", "Value"])?;
        let set = container(DefKind::Struct, "Set", &["Element"])?;

        debug!(definitions = defs.len(), "prelude installed");

        Ok(Self {
            sendable,
            equatable,
            hashable,
            error,
            array,
            optional,
            dictionary,
            set,
        })
    }

    /// `Sendable` used in type position.
    pub fn sendable_type(&self, db: &dyn TypeDatabase) -> TypeId {
        db.nominal(self.sendable, Vec::new())
    }

    /// `[Element]`
    pub fn array_of(&self, db: &dyn TypeDatabase, element: TypeId) -> TypeId {
        db.nominal(self.array, vec![element])
    }

    /// `Wrapped?`
    pub fn optional_of(&self, db: &dyn TypeDatabase, wrapped: TypeId) -> TypeId {
        db.nominal(self.optional, vec![wrapped])
    }

    /// `[Key: Value]`
    pub fn dictionary_of(&self, db: &dyn TypeDatabase, key: TypeId, value: TypeId) -> TypeId {
        db.nominal(self.dictionary, vec![key, value])
    }

    pub fn set_of(&self, db: &dyn TypeDatabase, element: TypeId) -> TypeId {
        db.nominal(self.set, vec![element])
    }

    /// Element type of `Wrapped?`, if `ty` is an optional.
    pub fn optional_payload(&self, db: &dyn TypeDatabase, ty: TypeId) -> Option<TypeId> {
        match db.lookup(ty) {
            Some(crate::types::TypeData::Nominal { def, args }) if def == self.optional => {
                db.type_list(args).first().copied()
            }
            _ => None,
        }
    }
}
