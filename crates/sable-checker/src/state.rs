//! Per-file checking driver.
//!
//! `CheckerState` walks the uses of one file in order: it records key-path
//! bindings (with inferred or annotated types), resolves conversion targets
//! (including parameters of generic functions at a call site) and turns
//! violations into diagnostics at the configured severity.

use crate::context::CheckerContext;
use crate::key_path_expr::KeyPathExpr;
use crate::sendable::{KeyPathSendableChecker, Violation};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use sable_common::Span;
use sable_common::interner::Atom;
use sable_solver::instantiate::{TypeSubstitution, instantiate_type};
use sable_solver::{TypeDatabase, TypeId};
use tracing::{debug, trace};

/// A named key-path value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub ty: TypeId,
    pub span: Span,
}

/// A function key paths can be passed to.
///
/// ```swift
/// func testSendableKP<T, U>(v: T, _ kp: any KeyPath<T, U> & Sendable) {}
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub generic_params: Vec<TypeId>,
    pub params: Vec<TypeId>,
}

/// What a use converts its key path to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseTarget {
    /// An annotation or a non-generic parameter type.
    Type(TypeId),
    /// Parameter `index` of `function`, with the generic arguments inferred
    /// at the call site.
    Argument {
        function: Atom,
        index: usize,
        generic_args: Vec<TypeId>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyPathSource {
    Literal(KeyPathExpr),
    Binding(Atom),
}

/// A key path converted to some target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPathUse {
    pub source: KeyPathSource,
    pub target: UseTarget,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckError {
    UnknownBinding(String),
    UnknownFunction(String),
    ArgumentOutOfRange { function: String, index: usize },
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBinding(name) => write!(f, "cannot find key path '{name}' in scope"),
            Self::UnknownFunction(name) => write!(f, "cannot find function '{name}' in scope"),
            Self::ArgumentOutOfRange { function, index } => {
                write!(f, "function '{function}' has no parameter at index {index}")
            }
        }
    }
}

impl std::error::Error for CheckError {}

pub struct CheckerState<'a> {
    pub ctx: CheckerContext<'a>,
    checker: KeyPathSendableChecker<'a>,
    bindings: IndexMap<Atom, Binding>,
    functions: FxHashMap<Atom, FunctionSignature>,
}

impl<'a> CheckerState<'a> {
    pub fn new(ctx: CheckerContext<'a>) -> Self {
        let checker = KeyPathSendableChecker::new(ctx.db, ctx.defs, ctx.prelude);
        Self {
            ctx,
            checker,
            bindings: IndexMap::new(),
            functions: FxHashMap::default(),
        }
    }

    pub fn checker(&self) -> &KeyPathSendableChecker<'a> {
        &self.checker
    }

    fn db(&self) -> &'a dyn TypeDatabase {
        self.ctx.db
    }

    /// `let name = \K.path`: the type is inferred from the literal.
    pub fn declare_literal_binding(&mut self, name: Atom, expr: &KeyPathExpr) -> TypeId {
        let ty = self
            .checker
            .infer_literal_type(expr, self.ctx.options.infer_sendable_from_captures);
        trace!(name = name.0, ty = ty.0, "inferred key path binding");
        self.bindings.insert(name, Binding { ty, span: expr.span() });
        ty
    }

    /// `let name: T = ...` or a parameter `name: T`.
    pub fn declare_typed_binding(&mut self, name: Atom, ty: TypeId, span: Span) {
        self.bindings.insert(name, Binding { ty, span });
    }

    pub fn binding_type(&self, name: Atom) -> Option<TypeId> {
        self.bindings.get(&name).map(|binding| binding.ty)
    }

    /// Bindings in declaration order.
    pub fn bindings(&self) -> impl Iterator<Item = (Atom, &Binding)> + '_ {
        self.bindings.iter().map(|(&name, binding)| (name, binding))
    }

    pub fn declare_function(&mut self, name: Atom, signature: FunctionSignature) {
        self.functions.insert(name, signature);
    }

    /// Concrete type a use converts to.
    pub fn resolve_target(&self, target: &UseTarget) -> Result<TypeId, CheckError> {
        match target {
            UseTarget::Type(ty) => Ok(*ty),
            UseTarget::Argument {
                function,
                index,
                generic_args,
            } => {
                let name = || self.db().resolve_atom(*function).to_string();
                let signature = self
                    .functions
                    .get(function)
                    .ok_or_else(|| CheckError::UnknownFunction(name()))?;
                let param = signature.params.get(*index).copied().ok_or_else(|| {
                    CheckError::ArgumentOutOfRange {
                        function: name(),
                        index: *index,
                    }
                })?;
                let subst = TypeSubstitution::from_args(&signature.generic_params, generic_args);
                Ok(instantiate_type(self.db(), param, &subst))
            }
        }
    }

    /// Check one use. Returns whether a violation was found, reported or not.
    pub fn check_use(&mut self, key_path_use: &KeyPathUse) -> Result<bool, CheckError> {
        let target = self.resolve_target(&key_path_use.target)?;
        let result = match &key_path_use.source {
            KeyPathSource::Literal(expr) => self.checker.check(expr, target),
            KeyPathSource::Binding(name) => {
                let ty = self.binding_type(*name).ok_or_else(|| {
                    CheckError::UnknownBinding(self.db().resolve_atom(*name).to_string())
                })?;
                self.checker.check_value(ty, target, key_path_use.span)
            }
        };
        match result {
            Ok(()) => Ok(false),
            Err(violation) => {
                self.report(violation, key_path_use.span);
                Ok(true)
            }
        }
    }

    fn report(&mut self, mut violation: Violation, span: Span) {
        if violation.span.is_dummy() {
            violation.span = span;
        }
        let Some(category) = self.ctx.options.sendable_diagnostic_category() else {
            debug!(
                strict_concurrency = self.ctx.options.strict_concurrency.as_str(),
                "Sendable violation suppressed"
            );
            return;
        };
        let diagnostic =
            violation.to_diagnostic(self.ctx.db, self.ctx.defs, &self.ctx.file_name, category);
        self.ctx.push_diagnostic(diagnostic);
    }

    pub fn take_diagnostics(&mut self) -> Vec<sable_common::Diagnostic> {
        std::mem::take(&mut self.ctx.diagnostics)
    }
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod tests;
