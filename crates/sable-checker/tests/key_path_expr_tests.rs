use super::*;
use crate::test_utils::TestModule;

#[test]
fn test_empty_key_path_is_rejected() {
    let m = TestModule::new();
    assert_eq!(
        KeyPathExpr::builder(m.k).build(),
        Err(KeyPathBuildError::Empty)
    );
    assert_eq!(
        KeyPathExpr::new(TypeId::NONE, vec![KeyPathComponent::Identity], Span::DUMMY),
        Err(KeyPathBuildError::InvalidRoot)
    );
}

#[test]
fn test_value_type_follows_chain() {
    let m = TestModule::new();
    let db = m.db();
    let items = m.prelude.array_of(db, TypeId::INT);
    let expr = KeyPathExpr::builder(m.s)
        .property(db.intern_string("items"), items, true)
        .subscript(TypeId::INT, true, vec![SubscriptArgument::new(TypeId::INT)])
        .build()
        .expect("non-empty");

    assert_eq!(expr.value_type(), TypeId::INT);
    let bases: Vec<TypeId> = expr.with_bases().map(|(base, _)| base).collect();
    assert_eq!(bases, vec![m.s, items]);
}

#[test]
fn test_identity_keeps_root() {
    let m = TestModule::new();
    let expr = KeyPathExpr::builder(m.k)
        .component(KeyPathComponent::Identity)
        .build()
        .expect("non-empty");
    assert_eq!(expr.value_type(), m.k);
    assert_eq!(expr.derived_kind(m.db(), &m.defs), KeyPathKind::Writable);
}

#[test]
fn test_read_only_subscript_makes_key_path() {
    let m = TestModule::new();
    let expr = m.k_subscript(m.non_sendable);
    assert_eq!(expr.derived_kind(m.db(), &m.defs), KeyPathKind::ReadOnly);
    assert_eq!(
        expr.derived_type(m.db(), &m.defs),
        m.db().key_path(KeyPathKind::ReadOnly, m.k, TypeId::BOOL)
    );
}

#[test]
fn test_settable_member_on_class_is_reference_writable() {
    let m = TestModule::new();
    assert_eq!(
        m.k_settable_subscript(TypeId::INT).derived_kind(m.db(), &m.defs),
        KeyPathKind::ReferenceWritable
    );
    assert_eq!(
        m.k_data().derived_kind(m.db(), &m.defs),
        KeyPathKind::ReferenceWritable
    );
}

#[test]
fn test_settable_member_on_struct_is_writable() {
    let m = TestModule::new();
    let db = m.db();
    let count = KeyPathExpr::builder(m.s)
        .property(db.intern_string("count"), TypeId::INT, true)
        .build()
        .expect("non-empty");
    let label = KeyPathExpr::builder(m.s)
        .property(db.intern_string("label"), TypeId::STRING, false)
        .build()
        .expect("non-empty");
    assert_eq!(count.derived_kind(db, &m.defs), KeyPathKind::Writable);
    assert_eq!(label.derived_kind(db, &m.defs), KeyPathKind::ReadOnly);
}

#[test]
fn test_join_along_chain() {
    let m = TestModule::new();
    let db = m.db();
    // \S.owner.data: struct member (writable) then class member (reference writable)
    let chain = KeyPathExpr::builder(m.s)
        .property(db.intern_string("owner"), m.k, true)
        .property(db.intern_string("data"), TypeId::STRING, true)
        .build()
        .expect("non-empty");
    assert_eq!(chain.derived_kind(db, &m.defs), KeyPathKind::ReferenceWritable);

    // \S.owner?.data: optional chaining forces read-only
    let optional_owner = m.prelude.optional_of(db, m.k);
    let chained = KeyPathExpr::builder(m.s)
        .property(db.intern_string("owner"), optional_owner, true)
        .component(KeyPathComponent::OptionalChain { ty: m.k })
        .property(db.intern_string("data"), TypeId::STRING, true)
        .build()
        .expect("non-empty");
    assert_eq!(chained.derived_kind(db, &m.defs), KeyPathKind::ReadOnly);
}

#[test]
fn test_arguments_only_on_subscripts() {
    let m = TestModule::new();
    let expr = m.k_settable_subscript(m.non_sendable);
    assert_eq!(expr.components()[0].arguments().len(), 2);
    assert!(expr.has_subscripts());
    assert!(m.k_data().components()[0].arguments().is_empty());
    assert!(!m.k_data().has_subscripts());
}
