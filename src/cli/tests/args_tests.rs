use clap::Parser;
use std::path::{Path, PathBuf};

use super::args::{CliArgs, LanguageModeArg, OutputFormat, StrictConcurrencyArg};
use sable_checker::{LanguageMode, StrictConcurrency};

#[test]
fn parses_defaults() {
    let args = CliArgs::try_parse_from(["sable"]).expect("default args should parse");

    assert!(args.inputs.is_empty());
    assert!(args.project.is_none());
    assert_eq!(args.strict_concurrency, None);
    assert_eq!(args.language_mode, None);
    assert_eq!(args.infer_sendable_from_captures, None);
    assert_eq!(args.format, OutputFormat::Pretty);
    assert!(!args.print_bindings);
    assert!(!args.no_color);
}

#[test]
fn parses_common_flags() {
    let args = CliArgs::try_parse_from([
        "sable",
        "--strictConcurrency",
        "targeted",
        "--languageMode",
        "6",
        "--inferSendableFromCaptures",
        "false",
        "--format",
        "json",
        "--project",
        "configs/sable.json",
        "--printBindings",
        "fixtures/captures.json",
        "fixtures/generic",
    ])
    .expect("flagged args should parse");

    assert_eq!(args.strict_concurrency, Some(StrictConcurrencyArg::Targeted));
    assert_eq!(args.language_mode, Some(LanguageModeArg::Swift6));
    assert_eq!(args.infer_sendable_from_captures, Some(false));
    assert_eq!(args.format, OutputFormat::Json);
    assert_eq!(
        args.project.as_deref(),
        Some(Path::new("configs/sable.json"))
    );
    assert!(args.print_bindings);
    assert_eq!(
        args.inputs,
        vec![
            PathBuf::from("fixtures/captures.json"),
            PathBuf::from("fixtures/generic")
        ]
    );
}

#[test]
fn accepts_kebab_case_aliases() {
    let args = CliArgs::try_parse_from([
        "sable",
        "--strict-concurrency",
        "MINIMAL",
        "--language-mode",
        "swift5",
        "--no-color",
    ])
    .expect("kebab-case aliases should parse");

    assert_eq!(args.strict_concurrency, Some(StrictConcurrencyArg::Minimal));
    assert_eq!(args.language_mode, Some(LanguageModeArg::Swift5));
    assert!(args.no_color);
}

#[test]
fn rejects_unknown_language_mode() {
    let result = CliArgs::try_parse_from(["sable", "--languageMode", "7"]);
    assert!(result.is_err());
}

#[test]
fn arg_enums_convert_to_checker_options() {
    assert_eq!(
        StrictConcurrency::from(StrictConcurrencyArg::Complete),
        StrictConcurrency::Complete
    );
    assert_eq!(
        LanguageMode::from(LanguageModeArg::Swift6),
        LanguageMode::Swift6
    );
}
