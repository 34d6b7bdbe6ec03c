//! Typed key-path literals.
//!
//! A literal such as `\K.items[0, default: 1]?.count` is an ordered chain
//! of components. Each component carries the type it produces, so the base
//! of component *i* is the result of component *i - 1* (or the root).
//!
//! Only subscripts capture values: their arguments are evaluated when the
//! key path is formed and stored inside it.

use sable_common::Span;
use sable_common::interner::Atom;
use sable_solver::{DefinitionStore, KeyPathKind, TypeData, TypeDatabase, TypeId};
use smallvec::SmallVec;

/// One argument of a subscript component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptArgument {
    pub ty: TypeId,
    /// The argument was not written at the use site; the subscript's
    /// default value is captured instead.
    pub defaulted: bool,
    pub span: Span,
}

impl SubscriptArgument {
    pub fn new(ty: TypeId) -> Self {
        Self {
            ty,
            defaulted: false,
            span: Span::DUMMY,
        }
    }

    pub fn defaulted(ty: TypeId) -> Self {
        Self {
            defaulted: true,
            ..Self::new(ty)
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPathComponent {
    /// `.name` on a stored property.
    StoredProperty { name: Atom, ty: TypeId, mutable: bool },
    /// `.name` on a computed property; `settable` when it has a setter.
    ComputedProperty { name: Atom, ty: TypeId, settable: bool },
    /// `[a, b]`
    Subscript {
        ty: TypeId,
        settable: bool,
        arguments: SmallVec<[SubscriptArgument; 2]>,
    },
    /// `?` in `.a?.b`; `ty` is the unwrapped type.
    OptionalChain { ty: TypeId },
    /// `!`; `ty` is the unwrapped type.
    ForceUnwrap { ty: TypeId },
    /// `.0` on a tuple.
    TupleElement { index: u32, ty: TypeId },
    /// `\.self`
    Identity,
}

impl KeyPathComponent {
    pub fn subscript(ty: TypeId, settable: bool, arguments: Vec<SubscriptArgument>) -> Self {
        Self::Subscript {
            ty,
            settable,
            arguments: arguments.into(),
        }
    }

    /// Type produced by applying this component to a value of type `base`.
    pub fn result_type(&self, base: TypeId) -> TypeId {
        match *self {
            Self::StoredProperty { ty, .. }
            | Self::ComputedProperty { ty, .. }
            | Self::Subscript { ty, .. }
            | Self::OptionalChain { ty }
            | Self::ForceUnwrap { ty }
            | Self::TupleElement { ty, .. } => ty,
            Self::Identity => base,
        }
    }

    /// Subscript arguments; empty for every other component.
    pub fn arguments(&self) -> &[SubscriptArgument] {
        match self {
            Self::Subscript { arguments, .. } => arguments.as_slice(),
            _ => &[],
        }
    }

    /// Key-path kind this component alone allows, given whether its base
    /// has reference semantics.
    pub fn kind(&self, base_is_reference: bool) -> KeyPathKind {
        let settable = match *self {
            Self::StoredProperty { mutable, .. } => mutable,
            Self::ComputedProperty { settable, .. } | Self::Subscript { settable, .. } => settable,
            Self::OptionalChain { .. } => return KeyPathKind::ReadOnly,
            Self::ForceUnwrap { .. } | Self::TupleElement { .. } | Self::Identity => {
                return KeyPathKind::Writable;
            }
        };
        match (settable, base_is_reference) {
            (false, _) => KeyPathKind::ReadOnly,
            (true, true) => KeyPathKind::ReferenceWritable,
            (true, false) => KeyPathKind::Writable,
        }
    }
}

/// Error building a [`KeyPathExpr`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPathBuildError {
    /// `\K` with nothing after the root.
    Empty,
    /// No root type was supplied.
    InvalidRoot,
}

impl std::fmt::Display for KeyPathBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "key path must have at least one component"),
            Self::InvalidRoot => write!(f, "key path root type is missing"),
        }
    }
}

impl std::error::Error for KeyPathBuildError {}

/// A fully typed key-path literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPathExpr {
    root: TypeId,
    components: Vec<KeyPathComponent>,
    span: Span,
}

impl KeyPathExpr {
    pub fn new(
        root: TypeId,
        components: Vec<KeyPathComponent>,
        span: Span,
    ) -> Result<Self, KeyPathBuildError> {
        if root.is_none() {
            return Err(KeyPathBuildError::InvalidRoot);
        }
        if components.is_empty() {
            return Err(KeyPathBuildError::Empty);
        }
        Ok(Self {
            root,
            components,
            span,
        })
    }

    pub fn builder(root: TypeId) -> KeyPathExprBuilder {
        KeyPathExprBuilder {
            root,
            components: Vec::new(),
            span: Span::DUMMY,
        }
    }

    pub fn root(&self) -> TypeId {
        self.root
    }

    pub fn components(&self) -> &[KeyPathComponent] {
        &self.components
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Type of the value the key path reads.
    pub fn value_type(&self) -> TypeId {
        self.components
            .iter()
            .fold(self.root, |base, component| component.result_type(base))
    }

    /// Each component paired with its base type.
    pub fn with_bases(&self) -> impl Iterator<Item = (TypeId, &KeyPathComponent)> + '_ {
        self.components.iter().scan(self.root, |base, component| {
            let this_base = *base;
            *base = component.result_type(this_base);
            Some((this_base, component))
        })
    }

    pub fn has_subscripts(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, KeyPathComponent::Subscript { .. }))
    }

    /// Kind of the literal: the join of every component's kind.
    pub fn derived_kind(&self, db: &dyn TypeDatabase, defs: &DefinitionStore) -> KeyPathKind {
        self.with_bases()
            .fold(KeyPathKind::Writable, |kind, (base, component)| {
                kind.join(component.kind(is_reference_type(db, defs, base)))
            })
    }

    /// `KeyPath<Root, Value>` (or a writable form) for this literal.
    pub fn derived_type(&self, db: &dyn TypeDatabase, defs: &DefinitionStore) -> TypeId {
        db.key_path(self.derived_kind(db, defs), self.root, self.value_type())
    }
}

/// Classes and actors.
fn is_reference_type(db: &dyn TypeDatabase, defs: &DefinitionStore, ty: TypeId) -> bool {
    match db.lookup(ty) {
        Some(TypeData::Nominal { def, .. }) => defs
            .get_kind(def)
            .is_some_and(|kind| kind.is_reference_type()),
        _ => false,
    }
}

/// Incremental construction, mostly for tests and the fixture loader.
#[derive(Clone, Debug)]
pub struct KeyPathExprBuilder {
    root: TypeId,
    components: Vec<KeyPathComponent>,
    span: Span,
}

impl KeyPathExprBuilder {
    pub fn property(mut self, name: Atom, ty: TypeId, mutable: bool) -> Self {
        self.components
            .push(KeyPathComponent::StoredProperty { name, ty, mutable });
        self
    }

    pub fn computed(mut self, name: Atom, ty: TypeId, settable: bool) -> Self {
        self.components
            .push(KeyPathComponent::ComputedProperty { name, ty, settable });
        self
    }

    pub fn subscript(mut self, ty: TypeId, settable: bool, arguments: Vec<SubscriptArgument>) -> Self {
        self.components
            .push(KeyPathComponent::subscript(ty, settable, arguments));
        self
    }

    pub fn component(mut self, component: KeyPathComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn build(self) -> Result<KeyPathExpr, KeyPathBuildError> {
        KeyPathExpr::new(self.root, self.components, self.span)
    }
}

#[cfg(test)]
#[path = "../tests/key_path_expr_tests.rs"]
mod tests;
