//! Type representation for the conformance solver.
//!
//! Types are interned: structurally identical `TypeData` values map to the
//! same `TypeId`, so equality is a single integer comparison.

use crate::def::DefId;
use crate::key_path::KeyPathKind;
use bitflags::bitflags;
use sable_common::interner::Atom;

/// Handle to an interned type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// No type. Used for the missing root/value of erased key paths.
    pub const NONE: TypeId = TypeId(0);
    /// Error recovery type. Conforms to everything so one bad annotation
    /// does not cascade into conformance diagnostics.
    pub const ERROR: TypeId = TypeId(1);

    pub const INT: TypeId = TypeId(2);
    pub const INT8: TypeId = TypeId(3);
    pub const INT16: TypeId = TypeId(4);
    pub const INT32: TypeId = TypeId(5);
    pub const INT64: TypeId = TypeId(6);
    pub const UINT: TypeId = TypeId(7);
    pub const UINT8: TypeId = TypeId(8);
    pub const UINT16: TypeId = TypeId(9);
    pub const UINT32: TypeId = TypeId(10);
    pub const UINT64: TypeId = TypeId(11);
    pub const FLOAT: TypeId = TypeId(12);
    pub const DOUBLE: TypeId = TypeId(13);
    pub const BOOL: TypeId = TypeId(14);
    pub const STRING: TypeId = TypeId(15);
    pub const CHARACTER: TypeId = TypeId(16);
    pub const VOID: TypeId = TypeId(17);
    pub const NEVER: TypeId = TypeId(18);
    pub const ANY: TypeId = TypeId(19);
    pub const ANY_OBJECT: TypeId = TypeId(20);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 64;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 >= Self::INT.0 && self.0 <= Self::ANY_OBJECT.0
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }
}

/// Built-in types known to the solver without any declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IntrinsicKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float,
    Double,
    Bool,
    String,
    Character,
    Void,
    Never,
    Any,
    AnyObject,
}

impl IntrinsicKind {
    pub const ALL: [IntrinsicKind; 19] = [
        Self::Int,
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::UInt,
        Self::UInt8,
        Self::UInt16,
        Self::UInt32,
        Self::UInt64,
        Self::Float,
        Self::Double,
        Self::Bool,
        Self::String,
        Self::Character,
        Self::Void,
        Self::Never,
        Self::Any,
        Self::AnyObject,
    ];

    pub const fn to_type_id(self) -> TypeId {
        TypeId(TypeId::INT.0 + self as u32)
    }

    pub fn from_type_id(id: TypeId) -> Option<Self> {
        if !id.is_intrinsic() {
            return None;
        }
        Self::ALL.get((id.0 - TypeId::INT.0) as usize).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::UInt => "UInt",
            Self::UInt8 => "UInt8",
            Self::UInt16 => "UInt16",
            Self::UInt32 => "UInt32",
            Self::UInt64 => "UInt64",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Character => "Character",
            Self::Void => "Void",
            Self::Never => "Never",
            Self::Any => "Any",
            Self::AnyObject => "AnyObject",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Fixed table of built-ins that are safe to share across concurrency
    /// domains. `Any` and `AnyObject` can hold arbitrary references.
    pub const fn is_sendable(self) -> bool {
        !matches!(self, Self::Any | Self::AnyObject)
    }
}

/// Handle to an interned list of types.
///
/// Id 0 is always the empty list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

impl TypeListId {
    pub const EMPTY: TypeListId = TypeListId(0);
}

bitflags! {
    /// Attributes on a function type.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u8 {
        /// `@Sendable (T) -> U`
        const SENDABLE = 1 << 0;
        const ASYNC = 1 << 1;
        const THROWS = 1 << 2;
    }
}

/// A generic parameter in scope at a use site or on a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    /// Declaring definition; `None` for parameters of a generic function
    /// introduced at a use site.
    pub owner: Option<DefId>,
    /// Protocols the parameter is constrained by (`T: Sendable`).
    pub constraints: TypeListId,
}

/// `KeyPath<Root, Value>` and its relatives.
///
/// `AnyKeyPath` has neither root nor value; `PartialKeyPath<Root>` has no
/// value. Missing parts are `TypeId::NONE`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyPathType {
    pub kind: KeyPathKind,
    pub root: TypeId,
    pub value: TypeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: TypeListId,
    pub result: TypeId,
    pub flags: FunctionFlags,
}

impl FunctionType {
    #[inline]
    pub fn is_sendable(&self) -> bool {
        self.flags.contains(FunctionFlags::SENDABLE)
    }
}

/// Structural description of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    Error,
    /// A declared class/struct/enum/actor/protocol, possibly applied to
    /// generic arguments. Protocols used in type position are existential.
    Nominal { def: DefId, args: TypeListId },
    TypeParameter(TypeParamInfo),
    KeyPath(KeyPathType),
    Function(FunctionType),
    /// `(A, B)`; always at least two elements.
    Tuple(TypeListId),
    /// `A & B`; flattened, deduplicated, at least two members.
    Composition(TypeListId),
    /// `any P`
    Existential(TypeId),
    /// `T.Type`
    Metatype(TypeId),
}

#[cfg(test)]
#[path = "tests/types_tests.rs"]
mod tests;
