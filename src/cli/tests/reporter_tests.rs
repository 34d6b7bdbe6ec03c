use super::reporter::Reporter;
use sable_common::Diagnostic;
use sable_common::diagnostics::diagnostic_codes;

const SOURCE: &str = "let a = \\K.data\nlet kp: KeyPath<K, Bool> & Sendable = \\K.[NonSendable()]\n";

fn warning_at(start: u32, length: u32) -> Diagnostic {
    Diagnostic::warning(
        "file.swift".to_string(),
        start,
        length,
        "type 'KeyPath<K, Bool>' does not conform to the 'Sendable' protocol".to_string(),
        diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
    )
}

#[test]
fn formats_location_code_and_snippet() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("file.swift", SOURCE);

    let start = SOURCE.find("\\K.[").expect("literal") as u32;
    let output = reporter.format_diagnostic(&warning_at(start, 18));

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines[0],
        "file.swift:2:39 - warning SABLE5001: type 'KeyPath<K, Bool>' does not conform to the 'Sendable' protocol"
    );
    assert_eq!(
        lines[1],
        "    2   let kp: KeyPath<K, Bool> & Sendable = \\K.[NonSendable()]"
    );
    assert_eq!(lines[2], format!("       {}{}", " ".repeat(38), "~".repeat(18)));
}

#[test]
fn formats_related_notes() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("file.swift", SOURCE);

    let start = SOURCE.find("NonSendable()").expect("argument") as u32;
    let diagnostic = warning_at(start, 13).with_related(
        "file.swift".to_string(),
        start,
        13,
        "subscript argument of type 'NonSendable' is captured by the key path and does not conform to 'Sendable'".to_string(),
        diagnostic_codes::CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM,
    );
    let output = reporter.format_diagnostic(&diagnostic);

    let last = output.lines().last().expect("related line");
    assert_eq!(
        last,
        "  Related: file.swift:2:43 - subscript argument of type 'NonSendable' is captured by the key path and does not conform to 'Sendable'"
    );
}

#[test]
fn falls_back_to_file_name_without_source() {
    let reporter = Reporter::new(false);
    let output = reporter.format_diagnostic(&warning_at(3, 4));
    assert!(output.starts_with("file.swift - warning SABLE5001: "));
    assert_eq!(output.lines().count(), 1);
}

#[test]
fn summarizes_counts() {
    let reporter = Reporter::new(false);
    let error = Diagnostic::error(
        "a".to_string(),
        0,
        0,
        "message".to_string(),
        diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
    );

    assert_eq!(reporter.format_summary(&[], 1), "Found no issues in 1 file.");
    assert_eq!(
        reporter.format_summary(&[warning_at(0, 1)], 2),
        "Found 1 warning in 2 files."
    );
    assert_eq!(
        reporter.format_summary(&[error.clone(), error, warning_at(0, 1)], 1),
        "Found 2 errors and 1 warning in 1 file."
    );
}

#[test]
fn render_separates_diagnostics() {
    let reporter = Reporter::new(false);
    let output = reporter.render(&[warning_at(0, 1), warning_at(2, 1)]);
    assert_eq!(output.lines().count(), 2);
}
