//! Key-path type family.
//!
//! Literals derive one of three concrete kinds from their components:
//!
//! | Kind | Spelling | Meaning |
//! |------|----------|---------|
//! | `ReadOnly` | `KeyPath<Root, Value>` | at least one component has no setter |
//! | `Writable` | `WritableKeyPath<Root, Value>` | every component is settable through value semantics |
//! | `ReferenceWritable` | `ReferenceWritableKeyPath<Root, Value>` | settable, and some setter lives on a class or actor |
//!
//! `PartialKeyPath<Root>` and `AnyKeyPath` only appear in annotations.

/// Which member of the key-path class hierarchy a type is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyPathKind {
    Any,
    Partial,
    ReadOnly,
    Writable,
    ReferenceWritable,
}

impl KeyPathKind {
    pub const ALL: [KeyPathKind; 5] = [
        Self::Any,
        Self::Partial,
        Self::ReadOnly,
        Self::Writable,
        Self::ReferenceWritable,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Any => "AnyKeyPath",
            Self::Partial => "PartialKeyPath",
            Self::ReadOnly => "KeyPath",
            Self::Writable => "WritableKeyPath",
            Self::ReferenceWritable => "ReferenceWritableKeyPath",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Number of generic arguments the spelling takes.
    pub const fn arity(self) -> usize {
        match self {
            Self::Any => 0,
            Self::Partial => 1,
            Self::ReadOnly | Self::Writable | Self::ReferenceWritable => 2,
        }
    }

    /// Kinds a literal can be inferred to. Annotation-only kinds are erased.
    pub const fn is_derivable(self) -> bool {
        matches!(self, Self::ReadOnly | Self::Writable | Self::ReferenceWritable)
    }

    /// Restrictiveness rank used by [`join`](Self::join).
    const fn rank(self) -> u8 {
        match self {
            Self::Writable => 0,
            Self::ReferenceWritable => 1,
            Self::ReadOnly => 2,
            Self::Partial => 3,
            Self::Any => 4,
        }
    }

    /// Most restrictive of two component kinds.
    ///
    /// `Writable < ReferenceWritable < ReadOnly`: a single read-only
    /// component makes the whole path read-only, and a reference-writable
    /// component survives any number of writable ones.
    #[must_use]
    pub fn join(self, other: KeyPathKind) -> KeyPathKind {
        if other.rank() > self.rank() { other } else { self }
    }
}

impl std::fmt::Display for KeyPathKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_is_most_restrictive() {
        use KeyPathKind::*;
        assert_eq!(Writable.join(Writable), Writable);
        assert_eq!(Writable.join(ReferenceWritable), ReferenceWritable);
        assert_eq!(ReferenceWritable.join(Writable), ReferenceWritable);
        assert_eq!(ReferenceWritable.join(ReadOnly), ReadOnly);
        assert_eq!(ReadOnly.join(Writable), ReadOnly);
    }

    #[test]
    fn names_round_trip() {
        for kind in KeyPathKind::ALL {
            assert_eq!(KeyPathKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(KeyPathKind::ReadOnly.arity(), 2);
        assert_eq!(KeyPathKind::Partial.arity(), 1);
    }
}
