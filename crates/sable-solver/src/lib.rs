//! Type model and conformance oracle.
//!
//! - **Interning**: structural `TypeData` maps to a `TypeId`, so equality is
//!   an integer comparison and the interner can be shared between threads.
//! - **Definitions**: nominal types and protocols with their declared
//!   conformance tables, frozen before any check runs.
//! - **Conformance**: `ConformanceOracle` resolves declared, conditional and
//!   structural conformances with coinductive cycle handling and a depth cap.

pub mod conformance;
mod db;
pub mod def;
pub mod diagnostics;
pub mod format;
pub mod instantiate;
mod intern;
pub mod key_path;
pub mod prelude;
pub mod recursion;
pub mod types;

pub use conformance::ConformanceOracle;
pub use db::TypeDatabase;
pub use def::{
    ConditionalRequirement, ConformanceDecl, ConformanceSource, DefFlags, DefId, DefKind,
    DefinitionError, DefinitionInfo, DefinitionStore,
};
pub use diagnostics::{ConformanceFailure, ConformanceFailureReason};
pub use format::TypeFormatter;
pub use intern::TypeInterner;
pub use key_path::KeyPathKind;
pub use prelude::Prelude;
pub use types::{FunctionFlags, IntrinsicKind, KeyPathType, TypeData, TypeId, TypeListId};
