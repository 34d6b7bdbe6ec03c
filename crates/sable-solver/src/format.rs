//! Type printing in source spelling.
//!
//! Output matches what a user would write: `KeyPath<K, Bool>`, `[Int]`,
//! `Int?`, `[String: Int]`, `@Sendable (K) -> Bool`, `any P & Sendable`.

use crate::db::TypeDatabase;
use crate::def::{DefFlags, DefinitionStore};
use crate::types::{FunctionFlags, TypeData, TypeId};

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
    defs: &'a DefinitionStore,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase, defs: &'a DefinitionStore) -> Self {
        Self { db, defs }
    }

    pub fn format(&self, ty: TypeId) -> String {
        let mut out = String::new();
        self.write(&mut out, ty);
        out
    }

    fn write(&self, out: &mut String, ty: TypeId) {
        let Some(data) = self.db.lookup(ty) else {
            out.push_str("<unknown>");
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.name()),
            TypeData::Error => out.push_str("<<error type>>"),
            TypeData::Nominal { def, args } => {
                let args = self.db.type_list(args);
                let name = self
                    .defs
                    .get_name(def)
                    .map(|atom| self.db.resolve_atom(atom));
                let name = name.as_deref().unwrap_or("<unknown>");
                let sugared = self.defs.get_flags(def).contains(DefFlags::PRELUDE);
                match (sugared, name, args.as_ref()) {
                    (true, "Array", [element]) => {
                        out.push('[');
                        self.write(out, *element);
                        out.push(']');
                    }
                    (true, "Optional", [wrapped]) => {
                        self.write_postfix_operand(out, *wrapped);
                        out.push('?');
                    }
                    (true, "Dictionary", [key, value]) => {
                        out.push('[');
                        self.write(out, *key);
                        out.push_str(": ");
                        self.write(out, *value);
                        out.push(']');
                    }
                    _ => {
                        out.push_str(name);
                        self.write_args(out, &args);
                    }
                }
            }
            TypeData::TypeParameter(info) => out.push_str(&self.db.resolve_atom(info.name)),
            TypeData::KeyPath(kp) => {
                out.push_str(kp.kind.name());
                let args: Vec<TypeId> = [kp.root, kp.value]
                    .into_iter()
                    .take(kp.kind.arity())
                    .collect();
                self.write_args(out, &args);
            }
            TypeData::Function(func) => {
                if func.is_sendable() {
                    out.push_str("@Sendable ");
                }
                out.push('(');
                self.write_list(out, &self.db.type_list(func.params), ", ");
                out.push(')');
                if func.flags.contains(FunctionFlags::ASYNC) {
                    out.push_str(" async");
                }
                if func.flags.contains(FunctionFlags::THROWS) {
                    out.push_str(" throws");
                }
                out.push_str(" -> ");
                self.write(out, func.result);
            }
            TypeData::Tuple(elements) => {
                out.push('(');
                self.write_list(out, &self.db.type_list(elements), ", ");
                out.push(')');
            }
            TypeData::Composition(members) => {
                self.write_list(out, &self.db.type_list(members), " & ");
            }
            TypeData::Existential(inner) => {
                out.push_str("any ");
                self.write(out, inner);
            }
            TypeData::Metatype(instance) => {
                self.write_postfix_operand(out, instance);
                out.push_str(".Type");
            }
        }
    }

    /// Operand of `?` or `.Type`; compound types need parentheses.
    fn write_postfix_operand(&self, out: &mut String, ty: TypeId) {
        let needs_parens = matches!(
            self.db.lookup(ty),
            Some(TypeData::Function(_) | TypeData::Composition(_) | TypeData::Existential(_))
        );
        if needs_parens {
            out.push('(');
            self.write(out, ty);
            out.push(')');
        } else {
            self.write(out, ty);
        }
    }

    fn write_args(&self, out: &mut String, args: &[TypeId]) {
        if args.is_empty() {
            return;
        }
        out.push('<');
        self.write_list(out, args, ", ");
        out.push('>');
    }

    fn write_list(&self, out: &mut String, items: &[TypeId], separator: &str) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            self.write(out, item);
        }
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
