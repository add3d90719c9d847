//! Type classification
//!
//! Maps registered types onto the scalar/structural categories used by the
//! qualifier encoding and the constant typing rules.

use crate::env::{TypeEnvironment, TypeId, TypeKind};
use crate::typeset::TypeSet;
use datalog_ast::TypeAttribute;
use std::collections::{HashMap, HashSet};

/// Determines whether the given type is a sub-type of the given root,
/// chasing primitive base chains and union elements. Memoized per call to
/// terminate on recursive types; a union counts only when it is non-empty
/// and every element is of the root.
pub(crate) fn is_of_root(env: &TypeEnvironment, ty: TypeId, root: TypeId) -> bool {
    fn go(
        env: &TypeEnvironment,
        ty: TypeId,
        root: TypeId,
        memo: &mut HashMap<TypeId, bool>,
    ) -> bool {
        if let Some(&known) = memo.get(&ty) {
            return known;
        }
        // mark in-progress nodes as failing, breaking recursive cycles
        memo.insert(ty, false);
        let result = match env.kind(ty) {
            TypeKind::Root(_) => ty == root,
            TypeKind::Primitive { base } => go(env, *base, root, memo),
            TypeKind::Union { elements } => {
                !elements.is_empty() && elements.iter().all(|&e| go(env, e, root, memo))
            }
            TypeKind::Record { .. } | TypeKind::Sum { .. } => false,
        };
        memo.insert(ty, result);
        result
    }
    go(env, ty, root, &mut HashMap::new())
}

/// Determines whether the given type is a number type
pub fn is_number_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    is_of_root(env, ty, env.number_type())
}

/// Determines whether the given type is an unsigned type
pub fn is_unsigned_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    is_of_root(env, ty, env.unsigned_type())
}

/// Determines whether the given type is a float type
pub fn is_float_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    is_of_root(env, ty, env.float_type())
}

/// Determines whether the given type is a symbol type
pub fn is_symbol_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    is_of_root(env, ty, env.symbol_type())
}

/// Determines whether the given type is a record type
pub fn is_record_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    matches!(env.kind(ty), TypeKind::Record { .. })
}

/// Determines whether the given type is a sum type
pub fn is_sum_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    matches!(env.kind(ty), TypeKind::Sum { .. })
}

/// The category of a type: its root for scalars, `Record`/`Sum` for the
/// structural kinds. A union whose members straddle categories has none.
pub fn type_attribute(env: &TypeEnvironment, ty: TypeId) -> Option<TypeAttribute> {
    match env.kind(ty) {
        TypeKind::Record { .. } => Some(TypeAttribute::Record),
        TypeKind::Sum { .. } => Some(TypeAttribute::Sum),
        _ => {
            if is_number_type(env, ty) {
                Some(TypeAttribute::Signed)
            } else if is_unsigned_type(env, ty) {
                Some(TypeAttribute::Unsigned)
            } else if is_float_type(env, ty) {
                Some(TypeAttribute::Float)
            } else if is_symbol_type(env, ty) {
                Some(TypeAttribute::Symbol)
            } else {
                None
            }
        }
    }
}

/// The common category of a non-empty, non-universal set whose members all
/// share one; `None` otherwise
pub fn set_attribute(env: &TypeEnvironment, set: &TypeSet) -> Option<TypeAttribute> {
    if set.is_all() || set.is_empty() {
        return None;
    }
    let mut members = set.iter();
    let first = type_attribute(env, members.next()?)?;
    for ty in members {
        if type_attribute(env, ty) != Some(first) {
            return None;
        }
    }
    Some(first)
}

/// Is any value in the set signed
pub fn has_signed_type(env: &TypeEnvironment, set: &TypeSet) -> bool {
    set.is_all() || set.iter().any(|ty| is_number_type(env, ty))
}

/// Is any value in the set unsigned
pub fn has_unsigned_type(env: &TypeEnvironment, set: &TypeSet) -> bool {
    set.is_all() || set.iter().any(|ty| is_unsigned_type(env, ty))
}

/// Is any value in the set float
pub fn has_float_type(env: &TypeEnvironment, set: &TypeSet) -> bool {
    set.is_all() || set.iter().any(|ty| is_float_type(env, ty))
}

/// Whether a record or sum type reaches itself through its own fields or
/// branches, possibly via unions
pub fn is_recursive_type(env: &TypeEnvironment, ty: TypeId) -> bool {
    fn reaches(
        env: &TypeEnvironment,
        from: TypeId,
        target: TypeId,
        seen: &mut HashSet<TypeId>,
    ) -> bool {
        if from == target {
            return true;
        }
        if !seen.insert(from) {
            return false;
        }
        match env.kind(from) {
            TypeKind::Union { elements } => elements
                .iter()
                .any(|&element| reaches(env, element, target, seen)),
            TypeKind::Record { fields } => fields
                .iter()
                .any(|field| reaches(env, field.ty, target, seen)),
            TypeKind::Sum { branches } => branches
                .iter()
                .any(|branch| reaches(env, branch.ty, target, seen)),
            _ => false,
        }
    }

    let mut seen = HashSet::new();
    match env.kind(ty) {
        TypeKind::Record { fields } => fields
            .iter()
            .any(|field| reaches(env, field.ty, ty, &mut seen)),
        TypeKind::Sum { branches } => branches
            .iter()
            .any(|branch| reaches(env, branch.ty, ty, &mut seen)),
        _ => false,
    }
}
