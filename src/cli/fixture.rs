//! JSON fixture format.
//!
//! A fixture stands in for one checked source file: the declarations it
//! can see, the generic functions key paths are passed to, key-path
//! bindings, and the uses to check. Types are written as source text and
//! read with `TypeSyntaxReader`.
//!
//! ```json
//! {
//!   "declarations": [
//!     { "name": "NonSendable", "kind": "class", "conformances": ["Hashable"] },
//!     { "name": "CondSendable", "kind": "class", "generics": ["T"],
//!       "conformances": [{ "protocol": "Sendable", "where": ["T: Sendable"] }] },
//!     { "name": "K", "kind": "class" }
//!   ],
//!   "uses": [
//!     { "keyPath": { "root": "K", "components": [
//!         { "subscript": { "type": "Bool", "arguments": [{ "type": "NonSendable" }] } }
//!       ] },
//!       "target": "KeyPath<K, Bool> & Sendable" }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use sable_common::Span;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    /// Source text the spans point into, for rendering locations.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub functions: Vec<FunctionDecl>,
    #[serde(default)]
    pub bindings: Vec<BindingDecl>,
    #[serde(default)]
    pub uses: Vec<UseDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Struct,
    Enum,
    Actor,
    Protocol,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    /// `"T"` or `"T: Hashable"`.
    #[serde(default)]
    pub generics: Vec<String>,
    #[serde(default)]
    pub conformances: Vec<ConformanceEntry>,
    /// Protocols a protocol refines.
    #[serde(default)]
    pub refines: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConformanceEntry {
    /// `"Sendable"`
    Name(String),
    Detailed(ConformanceDetail),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConformanceDetail {
    pub protocol: String,
    /// `where` clause requirements such as `"T: Sendable"`.
    #[serde(default, rename = "where")]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default)]
    pub unchecked: bool,
}

impl ConformanceEntry {
    pub fn protocol(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed(detail) => &detail.protocol,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub generics: Vec<String>,
    pub params: Vec<String>,
}

/// `let name = <keyPath>`, `let name: <type> = <keyPath>` or a parameter
/// `name: <type>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingDecl {
    pub name: String,
    #[serde(default)]
    pub key_path: Option<KeyPathLiteral>,
    #[serde(default, rename = "type")]
    pub annotation: Option<String>,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPathLiteral {
    pub root: String,
    pub components: Vec<ComponentDecl>,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentDecl {
    Property {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        mutable: bool,
    },
    Computed {
        name: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        settable: bool,
    },
    Subscript {
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        settable: bool,
        #[serde(default)]
        arguments: Vec<ArgumentDecl>,
    },
    OptionalChain {
        #[serde(rename = "type")]
        ty: String,
    },
    ForceUnwrap {
        #[serde(rename = "type")]
        ty: String,
    },
    TupleElement {
        index: u32,
        #[serde(rename = "type")]
        ty: String,
    },
    Identity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDecl {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub defaulted: bool,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseDecl {
    /// A literal at the use site...
    #[serde(default)]
    pub key_path: Option<KeyPathLiteral>,
    /// ...or a previously declared binding.
    #[serde(default)]
    pub binding: Option<String>,
    /// Annotation or parameter type the key path converts to.
    #[serde(default)]
    pub target: Option<String>,
    /// Argument position of a call.
    #[serde(default)]
    pub call: Option<CallDecl>,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDecl {
    pub function: String,
    pub argument: usize,
    #[serde(default)]
    pub generic_args: Vec<String>,
}

pub fn parse_fixture(source: &str) -> Result<Fixture> {
    serde_json::from_str(source).context("failed to parse fixture JSON")
}

pub fn load_fixture(path: &Path) -> Result<Fixture> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture: {}", path.display()))?;
    parse_fixture(&source).with_context(|| format!("invalid fixture: {}", path.display()))
}
