use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::args::CliArgs;
use super::driver::{check_fixture, collect_fixtures, run};
use super::fixture::parse_fixture;
use sable_checker::{CheckerOptions, LanguageMode, StrictConcurrency};
use sable_common::DiagnosticCategory;
use sable_common::diagnostics::diagnostic_codes;
use sable_solver::TypeInterner;

const KEY_PATHS: &str = r#"{
  "declarations": [
    { "name": "NonSendable", "kind": "class", "conformances": ["Hashable"] },
    { "name": "CondSendable", "kind": "class", "generics": ["T"],
      "conformances": ["Hashable", { "protocol": "Sendable", "where": ["T: Sendable"] }] },
    { "name": "K", "kind": "class" }
  ],
  "functions": [
    { "name": "testSendableKP", "generics": ["T", "U"],
      "params": ["T", "any KeyPath<T, U> & Sendable"] },
    { "name": "testKP", "generics": ["T", "U"], "params": ["T", "KeyPath<T, U>"] }
  ],
  "bindings": [
    { "name": "sendableKP", "keyPath": { "root": "K", "components": [
        { "subscript": { "type": "Bool", "arguments": [{ "type": "CondSendable<Int>" }] } }
      ], "span": { "start": 0, "end": 10 } } },
    { "name": "nonSendableKP", "keyPath": { "root": "K", "components": [
        { "subscript": { "type": "Bool", "arguments": [{ "type": "NonSendable" }] } }
      ], "span": { "start": 20, "end": 30 } } }
  ],
  "uses": [
    { "keyPath": { "root": "K", "components": [
        { "subscript": { "type": "Bool", "arguments": [{ "type": "CondSendable<NonSendable>" }] } }
      ], "span": { "start": 40, "end": 50 } },
      "target": "KeyPath<K, Bool> & Sendable" },
    { "binding": "sendableKP",
      "call": { "function": "testSendableKP", "argument": 1, "genericArgs": ["K", "Bool"] },
      "span": { "start": 60, "end": 70 } },
    { "binding": "nonSendableKP",
      "call": { "function": "testKP", "argument": 1, "genericArgs": ["K", "Bool"] },
      "span": { "start": 80, "end": 90 } },
    { "binding": "nonSendableKP",
      "call": { "function": "testSendableKP", "argument": 1, "genericArgs": ["K", "Bool"] },
      "span": { "start": 100, "end": 110 } }
  ]
}"#;

fn check(source: &str, options: CheckerOptions) -> anyhow::Result<super::driver::FileReport> {
    let interner = TypeInterner::new();
    let fixture = parse_fixture(source)?;
    check_fixture(&interner, &fixture, "key_paths.json", options)
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn reports_non_sendable_captures_and_values() {
    let report = check(KEY_PATHS, CheckerOptions::default()).expect("fixture checks");

    let summary: Vec<(u32, u32, &str)> = report
        .diagnostics
        .iter()
        .map(|d| (d.code, d.start, d.message_text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (
                diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
                40,
                "type 'KeyPath<K, Bool>' does not conform to the 'Sendable' protocol"
            ),
            (
                diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
                100,
                "type 'KeyPath<K, Bool>' does not conform to the 'Sendable' protocol"
            ),
        ]
    );
    assert!(
        report
            .diagnostics
            .iter()
            .all(|d| d.category == DiagnosticCategory::Warning && d.file == "key_paths.json")
    );

    let capture_notes: Vec<u32> = report.diagnostics[0]
        .related_information
        .iter()
        .map(|note| note.code)
        .collect();
    assert_eq!(capture_notes[0], diagnostic_codes::CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM);
    assert!(capture_notes.contains(&diagnostic_codes::CONDITIONAL_REQUIREMENT_NOT_SATISFIED));

    let value_notes: Vec<u32> = report.diagnostics[1]
        .related_information
        .iter()
        .map(|note| note.code)
        .collect();
    assert_eq!(
        value_notes,
        vec![diagnostic_codes::KEY_PATH_VALUE_NOT_INFERRED_SENDABLE]
    );
}

#[test]
fn records_inferred_binding_types() {
    let report = check(KEY_PATHS, CheckerOptions::default()).expect("fixture checks");
    assert_eq!(
        report.bindings,
        vec![
            (
                "sendableKP".to_string(),
                "KeyPath<K, Bool> & Sendable".to_string()
            ),
            ("nonSendableKP".to_string(), "KeyPath<K, Bool>".to_string()),
        ]
    );
}

#[test]
fn language_mode_six_reports_errors() {
    let options = CheckerOptions {
        language_mode: LanguageMode::Swift6,
        ..CheckerOptions::default()
    };
    let report = check(KEY_PATHS, options).expect("fixture checks");
    assert_eq!(report.diagnostics.len(), 2);
    assert!(report.diagnostics.iter().all(|d| d.is_error()));
}

#[test]
fn minimal_strict_concurrency_is_silent() {
    let options = CheckerOptions {
        strict_concurrency: StrictConcurrency::Minimal,
        ..CheckerOptions::default()
    };
    let report = check(KEY_PATHS, options).expect("fixture checks");
    assert!(report.diagnostics.is_empty());
}

#[test]
fn annotated_binding_is_checked_then_declared() {
    let report = check(
        r#"{
          "declarations": [
            { "name": "NonSendable", "kind": "class" },
            { "name": "K", "kind": "class" }
          ],
          "bindings": [
            { "name": "kp", "type": "ReferenceWritableKeyPath<K, Int> & Sendable",
              "keyPath": { "root": "K", "components": [
                { "subscript": { "type": "Int", "settable": true,
                                 "arguments": [{ "type": "Int" }, { "type": "NonSendable" }] } }
              ], "span": { "start": 5, "end": 9 } } }
          ]
        }"#,
        CheckerOptions::default(),
    )
    .expect("fixture checks");

    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics[0].message_text,
        "type 'ReferenceWritableKeyPath<K, Int>' does not conform to the 'Sendable' protocol"
    );
    assert_eq!(
        report.bindings,
        vec![(
            "kp".to_string(),
            "ReferenceWritableKeyPath<K, Int> & Sendable".to_string()
        )]
    );
}

#[test]
fn rejects_unknown_protocols_and_types() {
    let err = check(
        r#"{ "declarations": [ { "name": "K", "kind": "class", "conformances": ["Codable"] } ] }"#,
        CheckerOptions::default(),
    )
    .expect_err("Codable is not declared");
    assert!(format!("{err:#}").contains("unknown protocol 'Codable'"));

    let err = check(
        r#"{ "uses": [ { "keyPath": { "root": "Missing", "components": ["identity"] },
                        "target": "Sendable" } ] }"#,
        CheckerOptions::default(),
    )
    .expect_err("Missing is not declared");
    assert!(format!("{err:#}").contains("invalid type 'Missing'"));
}

#[test]
fn rejects_ambiguous_uses() {
    let err = check(
        r#"{ "declarations": [ { "name": "K", "kind": "class" } ],
             "uses": [ { "keyPath": { "root": "K", "components": ["identity"] } } ] }"#,
        CheckerOptions::default(),
    )
    .expect_err("use without a target");
    assert!(format!("{err:#}").contains("exactly one of target or call"));
}

#[test]
fn unknown_binding_is_an_error() {
    let err = check(
        r#"{ "uses": [ { "binding": "missing", "target": "Sendable" } ] }"#,
        CheckerOptions::default(),
    )
    .expect_err("binding is not declared");
    assert!(format!("{err:#}").contains("missing"));
}

#[test]
fn collects_json_fixtures_but_not_the_config() {
    let temp = TempDir::new().expect("temp dir");
    write_file(temp.path(), "b.json", "{}");
    write_file(temp.path(), "nested/a.json", "{}");
    write_file(temp.path(), "sable.json", "{}");
    write_file(temp.path(), "notes.txt", "");

    let found = collect_fixtures(&[temp.path().to_path_buf()]).expect("collect");
    let names: Vec<_> = found
        .iter()
        .map(|path| path.strip_prefix(temp.path()).expect("under temp"))
        .map(|path| path.to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["b.json", "nested/a.json"]);

    assert!(collect_fixtures(&[temp.path().join("missing.json")]).is_err());
}

#[test]
fn run_uses_config_files_and_options() {
    let temp = TempDir::new().expect("temp dir");
    write_file(temp.path(), "fixtures/key_paths.json", KEY_PATHS);
    write_file(
        temp.path(),
        "sable.json",
        r#"{ "checkerOptions": { "languageMode": 6 }, "files": ["fixtures"] }"#,
    );

    let args = CliArgs::try_parse_from(["sable"]).expect("args");
    let result = run(&args, temp.path()).expect("run succeeds");

    assert_eq!(result.options.language_mode, LanguageMode::Swift6);
    assert_eq!(result.files.len(), 1);
    assert!(result.has_errors());
    assert_eq!(result.diagnostics().count(), 2);
}

#[test]
fn run_without_inputs_fails() {
    let temp = TempDir::new().expect("temp dir");
    let args = CliArgs::try_parse_from(["sable"]).expect("args");
    let err = run(&args, temp.path()).expect_err("nothing to check");
    assert!(format!("{err:#}").contains("no input fixtures"));
}

#[test]
fn cli_inputs_override_config_files() {
    let temp = TempDir::new().expect("temp dir");
    write_file(temp.path(), "one.json", KEY_PATHS);
    write_file(temp.path(), "two.json", KEY_PATHS);
    write_file(temp.path(), "sable.json", r#"{ "files": ["one.json", "two.json"] }"#);

    let args = CliArgs::try_parse_from(["sable", "two.json", "--strictConcurrency", "minimal"])
        .expect("args");
    let result = run(&args, temp.path()).expect("run succeeds");

    assert_eq!(result.files.len(), 1);
    assert!(result.files[0].file_name.ends_with("two.json"));
    assert_eq!(result.diagnostics().count(), 0);
}
