//! `sable`: checks whether key-path literals and values may cross
//! concurrency domains.
//!
//! The checking itself lives in the workspace crates:
//!
//! - `sable-common`: spans, interning and the diagnostic model
//! - `sable-solver`: the type model and the conformance oracle
//! - `sable-checker`: key-path literals, capture analysis and the checker
//!
//! This crate adds the fixture format, configuration and the CLI.

pub mod cli;
pub mod tracing_config;

pub use sable_checker as checker;
pub use sable_common as common;
pub use sable_solver as solver;
