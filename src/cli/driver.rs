use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info_span};
use walkdir::WalkDir;

use crate::cli::args::CliArgs;
use crate::cli::config::{
    CONFIG_FILE_NAME, SableConfig, apply_cli_overrides, load_config, resolve_checker_options,
    resolve_config_path,
};
use crate::cli::fixture::{
    ComponentDecl, ConformanceEntry, Declaration, DeclarationKind, Fixture, KeyPathLiteral,
    load_fixture,
};
use sable_checker::{
    CheckerContext, CheckerOptions, CheckerState, FunctionSignature, KeyPathComponent,
    KeyPathExpr, KeyPathSource, KeyPathUse, SubscriptArgument, TypeSyntaxReader, UseTarget,
};
use sable_common::{Diagnostic, Span};
use sable_solver::{
    ConformanceDecl, ConformanceSource, DefId, DefKind, DefinitionInfo, DefinitionStore, Prelude,
    TypeFormatter, TypeId, TypeInterner,
};

/// Result of checking one fixture.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub file_name: String,
    pub source: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// `(name, type)` for every binding, in declaration order.
    pub bindings: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct CheckRun {
    pub options: CheckerOptions,
    pub files: Vec<FileReport>,
}

impl CheckRun {
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|file| file.diagnostics.iter())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().any(Diagnostic::is_error)
    }
}

/// Resolve configuration and inputs, then check every fixture.
pub fn run(args: &CliArgs, cwd: &Path) -> Result<CheckRun> {
    let config_path = resolve_config_path(cwd, args.project.as_deref())?;
    let config = match config_path.as_deref() {
        Some(path) => load_config(path)?,
        None => SableConfig::default(),
    };
    let mut options = resolve_checker_options(config.checker_options.as_ref())?;
    apply_cli_overrides(&mut options, args);

    let inputs = if args.inputs.is_empty() {
        let base = config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(cwd);
        config
            .files
            .iter()
            .flatten()
            .map(|file| base.join(file))
            .collect()
    } else {
        args.inputs.iter().map(|input| cwd.join(input)).collect::<Vec<_>>()
    };
    if inputs.is_empty() {
        bail!("no input fixtures; pass files or list them in {CONFIG_FILE_NAME}");
    }

    let paths = collect_fixtures(&inputs)?;
    debug!(files = paths.len(), ?options, "checking fixtures");
    Ok(CheckRun {
        options,
        files: check_files(&paths, options)?,
    })
}

/// Expand directories into the `*.json` fixtures below them, sorted.
pub fn collect_fixtures(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
            continue;
        }
        if !input.is_dir() {
            bail!("input not found: {}", input.display());
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(input).follow_links(true) {
            let entry = entry.with_context(|| format!("failed to walk {}", input.display()))?;
            let path = entry.path();
            let is_fixture = entry.file_type().is_file()
                && path.extension().is_some_and(|ext| ext == "json")
                && path.file_name().is_some_and(|name| name != CONFIG_FILE_NAME);
            if is_fixture {
                found.push(path.to_path_buf());
            }
        }
        found.sort();
        paths.extend(found);
    }
    Ok(paths)
}

/// Check fixtures in parallel. All files share one type interner; each gets
/// its own definition store.
pub fn check_files(paths: &[PathBuf], options: CheckerOptions) -> Result<Vec<FileReport>> {
    let interner = TypeInterner::new();
    paths
        .par_iter()
        .map(|path| {
            let fixture = load_fixture(path)?;
            check_fixture(&interner, &fixture, &path.display().to_string(), options)
                .with_context(|| format!("failed to check {}", path.display()))
        })
        .collect()
}

pub fn check_fixture(
    interner: &TypeInterner,
    fixture: &Fixture,
    file_name: &str,
    options: CheckerOptions,
) -> Result<FileReport> {
    let _span = info_span!("check_fixture", file = file_name).entered();

    let defs = DefinitionStore::new();
    let prelude = Prelude::install(interner, &defs)?;
    declare(interner, &defs, prelude, &fixture.declarations)?;
    defs.freeze();

    let reader = TypeSyntaxReader::new(interner, &defs, prelude);
    let read = |text: &str| -> Result<TypeId> {
        reader
            .read(text)
            .map_err(|err| anyhow!("invalid type '{text}': {err}"))
    };

    let mut state = CheckerState::new(CheckerContext::new(
        interner,
        &defs,
        prelude,
        options,
        file_name.to_string(),
    ));

    for function in &fixture.functions {
        let generic_params = function
            .generics
            .iter()
            .map(|text| {
                reader
                    .read_generic_parameter(text, None)
                    .map_err(|err| anyhow!("invalid generic parameter '{text}': {err}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let scoped =
            TypeSyntaxReader::new(interner, &defs, prelude).with_scope(generic_params.clone());
        let params = function
            .params
            .iter()
            .map(|text| {
                scoped
                    .read(text)
                    .map_err(|err| anyhow!("invalid type '{text}' in '{}': {err}", function.name))
            })
            .collect::<Result<Vec<_>>>()?;
        state.declare_function(
            interner.intern_string(&function.name),
            FunctionSignature {
                generic_params,
                params,
            },
        );
    }

    for binding in &fixture.bindings {
        let name = interner.intern_string(&binding.name);
        let span = binding.span.unwrap_or(Span::DUMMY);
        let annotation = binding.annotation.as_deref().map(read).transpose()?;
        let literal = binding
            .key_path
            .as_ref()
            .map(|literal| build_key_path(interner, &read, literal))
            .transpose()?;
        match (literal, annotation) {
            (Some(expr), None) => {
                state.declare_literal_binding(name, &expr);
            }
            (literal, Some(ty)) => {
                if let Some(expr) = literal {
                    let span = span.merge(expr.span());
                    state.check_use(&KeyPathUse {
                        source: KeyPathSource::Literal(expr),
                        target: UseTarget::Type(ty),
                        span,
                    })?;
                }
                state.declare_typed_binding(name, ty, span);
            }
            (None, None) => bail!("binding '{}' needs a keyPath or a type", binding.name),
        }
    }

    for (index, use_decl) in fixture.uses.iter().enumerate() {
        let source = match (&use_decl.key_path, &use_decl.binding) {
            (Some(literal), None) => {
                KeyPathSource::Literal(build_key_path(interner, &read, literal)?)
            }
            (None, Some(name)) => KeyPathSource::Binding(interner.intern_string(name)),
            _ => bail!("use #{index} needs exactly one of keyPath or binding"),
        };
        let target = match (&use_decl.target, &use_decl.call) {
            (Some(text), None) => UseTarget::Type(read(text)?),
            (None, Some(call)) => UseTarget::Argument {
                function: interner.intern_string(&call.function),
                index: call.argument,
                generic_args: call
                    .generic_args
                    .iter()
                    .map(|text| read(text))
                    .collect::<Result<Vec<_>>>()?,
            },
            _ => bail!("use #{index} needs exactly one of target or call"),
        };
        let span = match &source {
            KeyPathSource::Literal(expr) => use_decl.span.unwrap_or(expr.span()),
            KeyPathSource::Binding(_) => use_decl.span.unwrap_or(Span::DUMMY),
        };
        state.check_use(&KeyPathUse {
            source,
            target,
            span,
        })?;
    }

    let formatter = TypeFormatter::new(interner, &defs);
    let bindings = state
        .bindings()
        .map(|(name, binding)| {
            (
                interner.resolve_atom(name).to_string(),
                formatter.format(binding.ty),
            )
        })
        .collect();

    Ok(FileReport {
        file_name: file_name.to_string(),
        source: fixture.source.clone(),
        diagnostics: state.take_diagnostics(),
        bindings,
    })
}

/// Register declarations in three passes so they can refer to each other:
/// names first, then generic parameters, then conformances and refinements.
fn declare(
    interner: &TypeInterner,
    defs: &DefinitionStore,
    prelude: Prelude,
    declarations: &[Declaration],
) -> Result<()> {
    let mut ids: Vec<DefId> = Vec::with_capacity(declarations.len());
    for decl in declarations {
        let kind = match decl.kind {
            DeclarationKind::Class => DefKind::Class,
            DeclarationKind::Struct => DefKind::Struct,
            DeclarationKind::Enum => DefKind::Enum,
            DeclarationKind::Actor => DefKind::Actor,
            DeclarationKind::Protocol => DefKind::Protocol,
        };
        let id = defs
            .register(DefinitionInfo::nominal(kind, interner.intern_string(&decl.name)))
            .with_context(|| format!("cannot declare '{}'", decl.name))?;
        ids.push(id);
    }

    let reader = TypeSyntaxReader::new(interner, defs, prelude);
    let mut params_of: Vec<Vec<TypeId>> = Vec::with_capacity(declarations.len());
    for (decl, &id) in declarations.iter().zip(&ids) {
        let params = decl
            .generics
            .iter()
            .map(|text| {
                reader
                    .read_generic_parameter(text, Some(id))
                    .map_err(|err| {
                        anyhow!("invalid generic parameter '{text}' on '{}': {err}", decl.name)
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        if !params.is_empty() {
            defs.set_type_params(id, params.clone())?;
        }
        params_of.push(params);
    }

    for ((decl, &id), params) in declarations.iter().zip(&ids).zip(params_of) {
        let protocol_id = |name: &str| -> Result<DefId> {
            defs.lookup_name(interner.intern_string(name))
                .filter(|&def| defs.is_protocol(def))
                .ok_or_else(|| anyhow!("'{}' refers to unknown protocol '{name}'", decl.name))
        };
        for refined in &decl.refines {
            defs.add_refinement(id, protocol_id(refined)?)?;
        }

        let scoped = TypeSyntaxReader::new(interner, defs, prelude).with_scope(params);
        for entry in &decl.conformances {
            let protocol = protocol_id(entry.protocol())?;
            let conformance = match entry {
                ConformanceEntry::Name(_) => ConformanceDecl::explicit(protocol),
                ConformanceEntry::Detailed(detail) if detail.unavailable => {
                    ConformanceDecl::unavailable(protocol)
                }
                ConformanceEntry::Detailed(detail) => {
                    let source = if detail.unchecked {
                        ConformanceSource::Unchecked
                    } else {
                        ConformanceSource::Explicit
                    };
                    let mut conformance = ConformanceDecl::new(protocol, source);
                    for text in &detail.requirements {
                        let (subject, requirement) = scoped.read_requirement(text).map_err(|err| {
                            anyhow!("invalid requirement '{text}' on '{}': {err}", decl.name)
                        })?;
                        conformance = conformance.with_requirement(subject, requirement);
                    }
                    conformance
                }
            };
            defs.add_conformance(id, conformance)?;
        }
    }
    Ok(())
}

fn build_key_path(
    interner: &TypeInterner,
    read: &dyn Fn(&str) -> Result<TypeId>,
    literal: &KeyPathLiteral,
) -> Result<KeyPathExpr> {
    let mut components = Vec::with_capacity(literal.components.len());
    for component in &literal.components {
        let component = match component {
            ComponentDecl::Property { name, ty, mutable } => KeyPathComponent::StoredProperty {
                name: interner.intern_string(name),
                ty: read(ty)?,
                mutable: *mutable,
            },
            ComponentDecl::Computed { name, ty, settable } => KeyPathComponent::ComputedProperty {
                name: interner.intern_string(name),
                ty: read(ty)?,
                settable: *settable,
            },
            ComponentDecl::Subscript {
                ty,
                settable,
                arguments,
            } => {
                let arguments = arguments
                    .iter()
                    .map(|arg| -> Result<SubscriptArgument> {
                        let ty = read(&arg.ty)?;
                        let argument = if arg.defaulted {
                            SubscriptArgument::defaulted(ty)
                        } else {
                            SubscriptArgument::new(ty)
                        };
                        Ok(argument.with_span(arg.span.unwrap_or(Span::DUMMY)))
                    })
                    .collect::<Result<Vec<_>>>()?;
                KeyPathComponent::subscript(read(ty)?, *settable, arguments)
            }
            ComponentDecl::OptionalChain { ty } => {
                KeyPathComponent::OptionalChain { ty: read(ty)? }
            }
            ComponentDecl::ForceUnwrap { ty } => KeyPathComponent::ForceUnwrap { ty: read(ty)? },
            ComponentDecl::TupleElement { index, ty } => KeyPathComponent::TupleElement {
                index: *index,
                ty: read(ty)?,
            },
            ComponentDecl::Identity => KeyPathComponent::Identity,
        };
        components.push(component);
    }
    KeyPathExpr::new(
        read(&literal.root)?,
        components,
        literal.span.unwrap_or(Span::DUMMY),
    )
    .with_context(|| format!("invalid key path rooted at '{}'", literal.root))
}
