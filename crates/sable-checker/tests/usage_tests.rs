use super::*;
use crate::test_utils::TestModule;
use sable_solver::{FunctionFlags, KeyPathKind};

#[test]
fn test_key_path_targets_are_direct_values() {
    let m = TestModule::new();
    let db = m.db();
    let expr = m.k_data();
    let bare = db.key_path(KeyPathKind::ReadOnly, m.k, TypeId::STRING);
    let composed = m.sendable_key_path(m.k, TypeId::STRING);
    let existential = db.existential(composed);

    for target in [bare, composed, existential, TypeId::ANY, m.sendable()] {
        assert_eq!(
            classify(db, &m.prelude, &expr, target),
            UsageContext::DirectValue
        );
    }
}

#[test]
fn test_function_targets_are_conversions() {
    let m = TestModule::new();
    let db = m.db();
    let expr = m.k_subscript(m.non_sendable);
    let plain = db.function(vec![m.k], TypeId::BOOL, FunctionFlags::empty());
    let sendable = db.function(vec![m.k], TypeId::BOOL, FunctionFlags::SENDABLE);
    let optional = m.prelude.optional_of(db, sendable);

    for target in [plain, sendable, optional] {
        assert_eq!(
            classify(db, &m.prelude, &expr, target),
            UsageContext::ImplicitFunctionConversion
        );
    }
}

#[test]
fn test_generic_parameter_target_is_direct_value() {
    let m = TestModule::new();
    let db = m.db();
    let t = db.type_param(db.intern_string("T"), None, vec![m.sendable()]);
    assert_eq!(
        classify(db, &m.prelude, &m.k_data(), t),
        UsageContext::DirectValue
    );
}

#[test]
fn test_requests_capability() {
    let m = TestModule::new();
    let db = m.db();
    let sendable = m.prelude.sendable;
    let bare = db.key_path(KeyPathKind::ReadOnly, m.k, TypeId::BOOL);
    let composed = m.sendable_key_path(m.k, TypeId::BOOL);
    let bound = db.type_param(db.intern_string("T"), None, vec![m.sendable()]);
    let unbound = db.type_param(db.intern_string("U"), None, Vec::new());

    let requested = |ty| requests_capability(db, &m.defs, &m.prelude, ty, sendable);
    assert!(requested(composed));
    assert!(requested(db.existential(composed)));
    assert!(requested(m.sendable()));
    assert!(requested(bound));
    assert!(requested(m.prelude.optional_of(db, composed)));
    assert!(!requested(bare));
    assert!(!requested(TypeId::ANY));
    assert!(!requested(unbound));
    assert!(!requested(m.k));
}

#[test]
fn test_refining_protocol_requests_capability() {
    let m = TestModule::new();
    let db = m.db();
    // Error refines Sendable; Hashable does not.
    let error = db.nominal(m.prelude.error, Vec::new());
    let hashable = db.nominal(m.prelude.hashable, Vec::new());
    assert!(requests_capability(db, &m.defs, &m.prelude, error, m.prelude.sendable));
    assert!(!requests_capability(db, &m.defs, &m.prelude, hashable, m.prelude.sendable));
}
