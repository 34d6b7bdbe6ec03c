use super::*;
use crate::key_path_expr::SubscriptArgument;
use crate::test_utils::TestModule;

#[test]
fn test_properties_capture_nothing() {
    let m = TestModule::new();
    let db = m.db();
    let expr = KeyPathExpr::builder(m.s)
        .property(db.intern_string("owner"), m.k, true)
        .computed(db.intern_string("summary"), TypeId::STRING, false)
        .build()
        .expect("non-empty");
    assert!(captured_types(&expr).is_empty());
    assert!(captured_values(&expr).is_empty());
}

#[test]
fn test_capture_order_is_outer_then_left_to_right() {
    let m = TestModule::new();
    let db = m.db();
    let table = m.prelude.dictionary_of(db, TypeId::STRING, m.k);
    // \S.table["x"].[1, ns]
    let expr = KeyPathExpr::builder(m.s)
        .property(db.intern_string("table"), table, true)
        .subscript(m.k, false, vec![SubscriptArgument::new(TypeId::STRING)])
        .subscript(
            TypeId::INT,
            true,
            vec![
                SubscriptArgument::new(TypeId::INT),
                SubscriptArgument::new(m.non_sendable),
            ],
        )
        .build()
        .expect("non-empty");

    assert_eq!(
        captured_types(&expr),
        vec![TypeId::STRING, TypeId::INT, m.non_sendable]
    );
    let positions: Vec<(usize, usize)> = captured_values(&expr)
        .iter()
        .map(|c| (c.component, c.argument))
        .collect();
    assert_eq!(positions, vec![(1, 0), (2, 0), (2, 1)]);
}

#[test]
fn test_defaulted_arguments_are_captured() {
    let m = TestModule::new();
    let expr = KeyPathExpr::builder(m.k)
        .subscript(
            TypeId::INT,
            false,
            vec![
                SubscriptArgument::new(TypeId::INT),
                SubscriptArgument::defaulted(m.non_sendable),
            ],
        )
        .build()
        .expect("non-empty");

    let captures = captured_values(&expr);
    assert_eq!(captures.len(), 2);
    assert!(!captures[0].defaulted);
    assert!(captures[1].defaulted);
    assert_eq!(captures[1].ty, m.non_sendable);
}

#[test]
fn test_capture_spans_are_kept() {
    let m = TestModule::new();
    let expr = KeyPathExpr::builder(m.k)
        .subscript(
            TypeId::BOOL,
            false,
            vec![SubscriptArgument::new(m.non_sendable).with_span(Span::new(10, 23))],
        )
        .build()
        .expect("non-empty");
    assert_eq!(captured_values(&expr)[0].span, Span::new(10, 23));
}
