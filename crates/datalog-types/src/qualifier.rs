//! Type qualifier strings
//!
//! A deterministic one-line encoding of a type, used by later passes as a
//! stable key: primitives render as `i:`/`u:`/`f:`/`s:` followed by the
//! name, records as `r:Name{f1#<elt>,f2#<elt>}`, unions as
//! `<elt>[e1,e2]`, and sums as `+:Name[n1=<elt>;n2=<elt>]`. Recursive
//! occurrences render as the bare prefixed name of the type.

use crate::attribute::type_attribute;
use crate::env::{TypeEnvironment, TypeId, TypeKind};
use datalog_ast::TypeAttribute;
use std::collections::HashMap;

/// Generate the unique type qualifier string for a type
pub fn type_qualifier(env: &TypeEnvironment, ty: TypeId) -> String {
    visit(env, ty, &mut HashMap::new())
}

fn prefix(env: &TypeEnvironment, ty: TypeId) -> &'static str {
    match type_attribute(env, ty) {
        Some(TypeAttribute::Signed) => "i",
        Some(TypeAttribute::Unsigned) => "u",
        Some(TypeAttribute::Float) => "f",
        Some(TypeAttribute::Symbol) => "s",
        Some(TypeAttribute::Record) => "r",
        Some(TypeAttribute::Sum) => "+",
        // unions straddling categories have no attribute; key them as symbols
        None => "s",
    }
}

fn visit(env: &TypeEnvironment, ty: TypeId, memo: &mut HashMap<TypeId, String>) -> String {
    if let Some(known) = memo.get(&ty) {
        return known.clone();
    }

    let base = format!("{}:{}", prefix(env, ty), env.name(ty));
    // recursive references below resolve to the bare name
    memo.insert(ty, base.clone());

    let full = match env.kind(ty) {
        TypeKind::Root(_) | TypeKind::Primitive { .. } => base,
        TypeKind::Union { elements } => {
            let inner: Vec<String> = elements
                .iter()
                .map(|&element| visit(env, element, memo))
                .collect();
            format!("{}[{}]", base, inner.join(","))
        }
        TypeKind::Record { fields } => {
            let inner: Vec<String> = fields
                .iter()
                .map(|field| format!("{}#{}", field.name, visit(env, field.ty, memo)))
                .collect();
            format!("{}{{{}}}", base, inner.join(","))
        }
        TypeKind::Sum { branches } => {
            let inner: Vec<String> = branches
                .iter()
                .map(|branch| format!("{}={}", branch.name, visit(env, branch.ty, memo)))
                .collect();
            format!("{}[{}]", base, inner.join(";"))
        }
    };

    memo.insert(ty, full.clone());
    full
}
