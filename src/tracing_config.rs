//! Tracing setup for the `sable` binary.
//!
//! Logging is off unless `SABLE_LOG` (or `RUST_LOG`) is set. The output
//! format is picked with `SABLE_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: indented spans via `tracing-tree`, useful for following one
//!   conformance query through its nested requirements
//! - `json`: one JSON object per event
//!
//! ```bash
//! SABLE_LOG=debug SABLE_LOG_FORMAT=tree sable fixtures/
//! SABLE_LOG="sable_solver::conformance=trace" sable fixtures/captures.json
//! ```
//!
//! Everything is written to stderr; stdout carries only diagnostics.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown values fall back to `Text`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("SABLE_LOG_FORMAT").unwrap_or_default())
    }
}

/// `SABLE_LOG` wins over `RUST_LOG`.
fn build_filter() -> EnvFilter {
    match std::env::var("SABLE_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::from_default_env(),
    }
}

/// Install the global subscriber, if logging was requested.
pub fn init_tracing() {
    if std::env::var_os("SABLE_LOG").is_none() && std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    let filter = build_filter();
    match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);
            Registry::default().with(filter).with(tree_layer).init();
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);
            Registry::default().with(filter).with(json_layer).init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
