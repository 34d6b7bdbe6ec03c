//! Values a key-path literal captures.
//!
//! Forming `\K.[a, b]` evaluates `a` and `b` and stores them in the key
//! path, so the key path can only cross a concurrency boundary when every
//! stored value can. Property components store nothing.

use crate::key_path_expr::{KeyPathComponent, KeyPathExpr};
use sable_common::Span;
use sable_solver::TypeId;

/// One captured subscript argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CapturedValue {
    pub ty: TypeId,
    /// Index of the subscript component in the chain.
    pub component: usize,
    /// Index of the argument within that subscript.
    pub argument: usize,
    pub defaulted: bool,
    pub span: Span,
}

/// Every captured value, outer component first and left to right within
/// a subscript. Defaulted arguments are captured too.
pub fn captured_values(expr: &KeyPathExpr) -> Vec<CapturedValue> {
    let mut captures = Vec::new();
    for (component, comp) in expr.components().iter().enumerate() {
        let KeyPathComponent::Subscript { arguments, .. } = comp else {
            continue;
        };
        captures.extend(arguments.iter().enumerate().map(|(argument, arg)| CapturedValue {
            ty: arg.ty,
            component,
            argument,
            defaulted: arg.defaulted,
            span: arg.span,
        }));
    }
    captures
}

/// Types of [`captured_values`], in the same order.
pub fn captured_types(expr: &KeyPathExpr) -> Vec<TypeId> {
    expr.components()
        .iter()
        .flat_map(KeyPathComponent::arguments)
        .map(|arg| arg.ty)
        .collect()
}

#[cfg(test)]
#[path = "../tests/capture_tests.rs"]
mod tests;
