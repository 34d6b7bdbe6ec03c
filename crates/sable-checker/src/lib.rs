//! Key-path Sendable checking.
//!
//! Given a typed key-path literal (or a key-path value) and the type it is
//! converted to, decide whether the key path may cross concurrency domains:
//!
//! 1. [`usage`] classifies the conversion. Function targets only seed a
//!    synthesized closure and are never checked here.
//! 2. [`capture`] lists the subscript arguments stored in the key path.
//! 3. [`sendable`] asks the conformance oracle about each capture and turns
//!    the first failure into a [`Violation`].
//!
//! [`state::CheckerState`] drives these over the uses of one file and
//! renders diagnostics at the configured severity.

pub mod capture;
pub mod context;
pub mod key_path_expr;
pub mod sendable;
pub mod state;
pub mod type_syntax;
pub mod usage;

#[cfg(test)]
mod test_utils;

pub use capture::{CapturedValue, captured_types, captured_values};
pub use context::{CheckerContext, CheckerOptions, LanguageMode, StrictConcurrency};
pub use key_path_expr::{KeyPathBuildError, KeyPathComponent, KeyPathExpr, SubscriptArgument};
pub use sendable::{KeyPathSendableChecker, Violation, ViolationKind};
pub use state::{
    Binding, CheckError, CheckerState, FunctionSignature, KeyPathSource, KeyPathUse, UseTarget,
};
pub use type_syntax::{TypeSyntaxError, TypeSyntaxErrorKind, TypeSyntaxReader};
pub use usage::{UsageContext, classify, requests_capability};
