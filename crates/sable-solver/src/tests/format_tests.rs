use super::*;
use crate::TypeInterner;
use crate::def::DefinitionInfo;
use crate::key_path::KeyPathKind;
use crate::prelude::Prelude;
use crate::types::FunctionFlags;

struct Fixture {
    interner: TypeInterner,
    defs: DefinitionStore,
    prelude: Prelude,
}

fn fixture() -> Fixture {
    let interner = TypeInterner::new();
    let defs = DefinitionStore::new();
    let prelude = Prelude::install(&interner, &defs).expect("prelude installs");
    Fixture {
        interner,
        defs,
        prelude,
    }
}

impl Fixture {
    fn class(&self, name: &str) -> TypeId {
        let def = self
            .defs
            .register(DefinitionInfo::class(self.interner.intern_string(name)))
            .expect("register class");
        self.interner.nominal(def, Vec::new())
    }

    fn format(&self, ty: TypeId) -> String {
        TypeFormatter::new(&self.interner, &self.defs).format(ty)
    }
}

#[test]
fn test_key_path_spellings() {
    let f = fixture();
    let k = f.class("K");
    let db = &f.interner;
    assert_eq!(
        f.format(db.key_path(KeyPathKind::ReadOnly, k, TypeId::BOOL)),
        "KeyPath<K, Bool>"
    );
    assert_eq!(
        f.format(db.key_path(KeyPathKind::ReferenceWritable, k, TypeId::INT)),
        "ReferenceWritableKeyPath<K, Int>"
    );
    assert_eq!(
        f.format(db.key_path(KeyPathKind::Partial, k, TypeId::INT)),
        "PartialKeyPath<K>"
    );
    assert_eq!(
        f.format(db.key_path(KeyPathKind::Any, k, TypeId::INT)),
        "AnyKeyPath"
    );
}

#[test]
fn test_composition_and_existential() {
    let f = fixture();
    let k = f.class("K");
    let db = &f.interner;
    let kp = db.key_path(KeyPathKind::ReadOnly, k, TypeId::INT);
    let composed = db.composition(vec![kp, f.prelude.sendable_type(db)]);
    assert_eq!(f.format(composed), "KeyPath<K, Int> & Sendable");
    assert_eq!(
        f.format(db.existential(composed)),
        "any KeyPath<K, Int> & Sendable"
    );
}

#[test]
fn test_prelude_sugar() {
    let f = fixture();
    let db = &f.interner;
    let p = &f.prelude;
    assert_eq!(f.format(p.array_of(db, TypeId::INT)), "[Int]");
    assert_eq!(f.format(p.optional_of(db, TypeId::STRING)), "String?");
    assert_eq!(
        f.format(p.dictionary_of(db, TypeId::STRING, p.array_of(db, TypeId::INT))),
        "[String: [Int]]"
    );
    assert_eq!(f.format(p.set_of(db, TypeId::INT)), "Set<Int>");
}

#[test]
fn test_function_spellings() {
    let f = fixture();
    let k = f.class("K");
    let db = &f.interner;
    let plain = db.function(vec![k], TypeId::BOOL, FunctionFlags::empty());
    let sendable = db.function(vec![k], TypeId::BOOL, FunctionFlags::SENDABLE);
    assert_eq!(f.format(plain), "(K) -> Bool");
    assert_eq!(f.format(sendable), "@Sendable (K) -> Bool");
    assert_eq!(
        f.format(f.prelude.optional_of(db, plain)),
        "((K) -> Bool)?"
    );
    let effects = db.function(
        Vec::new(),
        TypeId::VOID,
        FunctionFlags::ASYNC | FunctionFlags::THROWS,
    );
    assert_eq!(f.format(effects), "() async throws -> Void");
}

#[test]
fn test_tuple_metatype_and_parameters() {
    let f = fixture();
    let k = f.class("K");
    let db = &f.interner;
    let t = db.type_param(db.intern_string("T"), None, Vec::new());
    assert_eq!(f.format(db.tuple(vec![TypeId::INT, t])), "(Int, T)");
    assert_eq!(f.format(db.metatype(k)), "K.Type");
    assert_eq!(f.format(TypeId::ERROR), "<<error type>>");
}
