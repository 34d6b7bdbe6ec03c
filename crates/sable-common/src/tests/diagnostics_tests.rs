use super::*;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message(
        diagnostic_messages::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
        &["KeyPath<K, Bool>", "Sendable"],
    );
    assert_eq!(
        text,
        "type 'KeyPath<K, Bool>' does not conform to the 'Sendable' protocol"
    );
}

#[test]
fn test_message_table_codes_are_unique() {
    let mut codes: Vec<u32> = DIAGNOSTIC_MESSAGES.iter().map(|m| m.code).collect();
    codes.sort_unstable();
    let before = codes.len();
    codes.dedup();
    assert_eq!(before, codes.len(), "duplicate diagnostic codes in table");
}

#[test]
fn test_lookup_by_code() {
    assert_eq!(
        get_message_template(diagnostic_codes::CONFORMANCE_EXPLICITLY_UNAVAILABLE),
        Some(diagnostic_messages::CONFORMANCE_EXPLICITLY_UNAVAILABLE)
    );
    assert_eq!(
        get_diagnostic_category(diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL),
        Some(DiagnosticCategory::Error)
    );
    assert_eq!(get_message_template(1), None);
}

#[test]
fn test_with_related_appends_note() {
    let diag = Diagnostic::warning(
        "test.json".to_string(),
        10,
        4,
        "primary".to_string(),
        diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
    )
    .with_related(
        "test.json".to_string(),
        12,
        1,
        "note".to_string(),
        diagnostic_codes::TYPE_HAS_NO_DECLARED_CONFORMANCE,
    );

    assert!(!diag.is_error());
    assert_eq!(diag.related_information.len(), 1);
    assert_eq!(
        diag.related_information[0].category,
        DiagnosticCategory::Message
    );
}

#[test]
fn test_serializes_camel_case_and_skips_empty_related() {
    let diag = Diagnostic::error(
        "a.json".to_string(),
        0,
        3,
        "msg".to_string(),
        diagnostic_codes::TYPE_DOES_NOT_CONFORM_TO_PROTOCOL,
    );
    let json = serde_json::to_value(&diag).expect("diagnostic serializes");
    assert_eq!(json["messageText"], "msg");
    assert_eq!(json["category"], "error");
    assert!(json.get("relatedInformation").is_none());
}
