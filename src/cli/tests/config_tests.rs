use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::args::CliArgs;
use super::config::{
    CONFIG_FILE_NAME, apply_cli_overrides, load_config, parse_config, resolve_checker_options,
    resolve_config_path,
};
use sable_checker::{CheckerOptions, LanguageMode, StrictConcurrency};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn parses_checker_options() {
    let config = parse_config(
        r#"{
          "checkerOptions": {
            "strictConcurrency": "targeted",
            "languageMode": 6,
            "inferSendableFromCaptures": "false"
          },
          "files": ["a.json", "nested/b.json"]
        }"#,
    )
    .expect("config should parse");

    let options = config.checker_options.expect("checkerOptions missing");
    assert_eq!(options.strict_concurrency.as_deref(), Some("targeted"));
    assert_eq!(options.language_mode.as_deref(), Some("6"));
    assert_eq!(options.infer_sendable_from_captures, Some(false));
    assert_eq!(
        config.files,
        Some(vec!["a.json".to_string(), "nested/b.json".to_string()])
    );
}

#[test]
fn empty_config_resolves_to_defaults() {
    let config = parse_config("{}").expect("empty config should parse");
    let options = resolve_checker_options(config.checker_options.as_ref()).expect("resolve");
    assert_eq!(options, CheckerOptions::default());
}

#[test]
fn resolves_option_values() {
    let config = parse_config(
        r#"{ "checkerOptions": { "strictConcurrency": "Minimal", "languageMode": "swift6" } }"#,
    )
    .expect("config should parse");
    let options = resolve_checker_options(config.checker_options.as_ref()).expect("resolve");

    assert_eq!(options.strict_concurrency, StrictConcurrency::Minimal);
    assert_eq!(options.language_mode, LanguageMode::Swift6);
    assert!(options.infer_sendable_from_captures);
}

#[test]
fn rejects_invalid_option_values() {
    let config = parse_config(r#"{ "checkerOptions": { "strictConcurrency": "maximal" } }"#)
        .expect("config should parse");
    let err = resolve_checker_options(config.checker_options.as_ref())
        .expect_err("maximal is not a level");
    assert!(format!("{err:#}").contains("strictConcurrency"));

    let bad_bool = parse_config(r#"{ "checkerOptions": { "inferSendableFromCaptures": "maybe" } }"#);
    assert!(bad_bool.is_err());
}

#[test]
fn cli_flags_override_config() {
    let config = parse_config(
        r#"{ "checkerOptions": { "strictConcurrency": "minimal", "inferSendableFromCaptures": true } }"#,
    )
    .expect("config should parse");
    let mut options = resolve_checker_options(config.checker_options.as_ref()).expect("resolve");

    let args = CliArgs::try_parse_from([
        "sable",
        "--strictConcurrency",
        "complete",
        "--inferSendableFromCaptures",
        "false",
    ])
    .expect("args should parse");
    apply_cli_overrides(&mut options, &args);

    assert_eq!(options.strict_concurrency, StrictConcurrency::Complete);
    assert_eq!(options.language_mode, LanguageMode::Swift5);
    assert!(!options.infer_sendable_from_captures);
}

#[test]
fn finds_config_in_working_directory() {
    let temp = TempDir::new().expect("temp dir");
    assert_eq!(resolve_config_path(temp.path(), None).expect("resolve"), None);

    let path = write_file(temp.path(), CONFIG_FILE_NAME, "{}");
    assert_eq!(
        resolve_config_path(temp.path(), None).expect("resolve"),
        Some(path)
    );
}

#[test]
fn project_may_name_a_directory_or_a_file() {
    let temp = TempDir::new().expect("temp dir");
    let in_dir = write_file(temp.path(), "proj/sable.json", "{}");
    let custom = write_file(temp.path(), "custom.json", "{}");

    assert_eq!(
        resolve_config_path(temp.path(), Some(Path::new("proj"))).expect("dir"),
        Some(in_dir)
    );
    assert_eq!(
        resolve_config_path(temp.path(), Some(&custom)).expect("file"),
        Some(custom)
    );
    assert!(resolve_config_path(temp.path(), Some(Path::new("missing"))).is_err());
}

#[test]
fn load_config_reports_path_on_error() {
    let temp = TempDir::new().expect("temp dir");
    let path = write_file(temp.path(), CONFIG_FILE_NAME, "{ not json");

    let err = load_config(&path).expect_err("invalid JSON");
    assert!(format!("{err:#}").contains("invalid config"));
}
