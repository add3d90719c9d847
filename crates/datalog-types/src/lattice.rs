//! The subtype lattice
//!
//! The partial order induced by [`is_subtype_of`], with meet given by
//! [`greatest_common_subtypes`] and join by [`least_common_supertypes`].
//! Both extend to [`TypeSet`]s pairwise, where the empty set absorbs and the
//! universal set is the identity.

use crate::attribute::is_of_root;
use crate::env::{TypeEnvironment, TypeId, TypeKind};
use crate::typeset::TypeSet;
use std::collections::HashSet;

/// Determines whether type `a` is a subtype of type `b`
pub fn is_subtype_of(env: &TypeEnvironment, a: TypeId, b: TypeId) -> bool {
    // a type is a subtype of itself
    if a == b {
        return true;
    }

    // roots cover everything derived from them
    if let TypeKind::Root(attribute) = env.kind(b) {
        if let Some(root) = env.root(*attribute) {
            if is_of_root(env, a, root) {
                return true;
            }
        }
    }

    // user primitives inherit the supertypes of their base
    if let TypeKind::Primitive { base } = env.kind(a) {
        if is_subtype_of(env, *base, b) {
            return true;
        }
    }

    // a union covers its transitive members
    if matches!(env.kind(b), TypeKind::Union { .. }) {
        return is_in_union(env, a, b, &mut HashSet::new());
    }

    false
}

/// Whether `a` occurs in the transitive closure of union `b`
fn is_in_union(env: &TypeEnvironment, a: TypeId, b: TypeId, seen: &mut HashSet<TypeId>) -> bool {
    if a == b {
        return true;
    }
    if !seen.insert(b) {
        return false;
    }
    match env.kind(b) {
        TypeKind::Union { elements } => elements
            .iter()
            .any(|&element| is_in_union(env, a, element, seen)),
        _ => false,
    }
}

/// Computes the greatest common subtypes of the two given types
pub fn greatest_common_subtypes(env: &TypeEnvironment, a: TypeId, b: TypeId) -> TypeSet {
    if a == b {
        return TypeSet::of(a);
    }

    if is_subtype_of(env, a, b) {
        return TypeSet::of(a);
    }
    if is_subtype_of(env, b, a) {
        return TypeSet::of(b);
    }

    // remaining option: two unions with common sub-types
    let mut result = TypeSet::new();
    if matches!(env.kind(a), TypeKind::Union { .. })
        && matches!(env.kind(b), TypeKind::Union { .. })
    {
        collect_common_subtypes(env, a, b, &mut result, &mut HashSet::new());
    }
    result
}

/// Collect the types reachable from union `a` that are subtypes of `b`,
/// flattening nested unions
fn collect_common_subtypes(
    env: &TypeEnvironment,
    a: TypeId,
    b: TypeId,
    result: &mut TypeSet,
    seen: &mut HashSet<TypeId>,
) {
    if !seen.insert(a) {
        return;
    }
    if is_subtype_of(env, a, b) {
        result.insert(a);
        return;
    }
    if let TypeKind::Union { elements } = env.kind(a) {
        for &element in elements {
            collect_common_subtypes(env, element, b, result, seen);
        }
    }
}

/// The set of pairwise greatest common subtypes of the types in two sets
pub fn greatest_common_subtypes_of_sets(
    env: &TypeEnvironment,
    a: &TypeSet,
    b: &TypeSet,
) -> TypeSet {
    // the empty set absorbs, the universal set is the identity
    if a.is_empty() {
        return a.clone();
    }
    if b.is_empty() {
        return b.clone();
    }
    if a.is_all() {
        return b.clone();
    }
    if b.is_all() {
        return a.clone();
    }

    let mut result = TypeSet::new();
    for x in a.iter() {
        for y in b.iter() {
            result.insert_set(&greatest_common_subtypes(env, x, y));
        }
    }
    result
}

/// Computes the least common supertypes of the two given types
pub fn least_common_supertypes(env: &TypeEnvironment, a: TypeId, b: TypeId) -> TypeSet {
    if a == b {
        return TypeSet::of(a);
    }

    if is_subtype_of(env, a, b) {
        return TypeSet::of(b);
    }
    if is_subtype_of(env, b, a) {
        return TypeSet::of(a);
    }

    // no obvious relation: gather all common supertypes ...
    let mut super_types = TypeSet::new();
    for cur in env.all_types() {
        if is_subtype_of(env, a, cur) && is_subtype_of(env, b, cur) {
            super_types.insert(cur);
        }
    }

    // ... and filter out those with a strictly smaller common supertype
    let mut result = TypeSet::new();
    for cur in super_types.iter() {
        let least = !super_types
            .iter()
            .any(|other| other != cur && is_subtype_of(env, other, cur));
        if least {
            result.insert(cur);
        }
    }
    result
}

/// The set of pairwise least common supertypes of the types in two sets
pub fn least_common_supertypes_of_sets(env: &TypeEnvironment, a: &TypeSet, b: &TypeSet) -> TypeSet {
    if a.is_empty() {
        return a.clone();
    }
    if b.is_empty() {
        return b.clone();
    }
    if a.is_all() {
        return b.clone();
    }
    if b.is_all() {
        return a.clone();
    }

    let mut result = TypeSet::new();
    for x in a.iter() {
        for y in b.iter() {
            result.insert_set(&least_common_supertypes(env, x, y));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalog_ast::TypeAttribute;

    fn is_not_subtype_of(env: &TypeEnvironment, a: TypeId, b: TypeId) -> bool {
        !is_subtype_of(env, a, b)
    }

    #[test]
    fn test_subtype_basic() {
        let mut env = TypeEnvironment::new();
        let n = env.number_type();
        let s = env.symbol_type();

        assert!(is_subtype_of(&env, n, n));
        assert!(is_subtype_of(&env, s, s));
        assert!(is_not_subtype_of(&env, n, s));
        assert!(is_not_subtype_of(&env, s, n));

        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let b = env.create_primitive("B".into(), TypeAttribute::Signed);

        assert!(is_subtype_of(&env, a, a));
        assert!(is_not_subtype_of(&env, a, b));
        assert!(is_not_subtype_of(&env, b, a));

        assert!(is_subtype_of(&env, a, n));
        assert!(is_subtype_of(&env, b, n));
        assert!(is_not_subtype_of(&env, a, s));
        assert!(is_not_subtype_of(&env, n, a));
    }

    #[test]
    fn test_subtype_roots_are_disjoint() {
        let env = TypeEnvironment::new();
        let roots = [
            env.number_type(),
            env.unsigned_type(),
            env.float_type(),
            env.symbol_type(),
        ];
        for &x in &roots {
            for &y in &roots {
                assert_eq!(is_subtype_of(&env, x, y), x == y);
            }
        }
    }

    #[test]
    fn test_subtype_through_union() {
        let mut env = TypeEnvironment::new();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let b = env.create_primitive("B".into(), TypeAttribute::Signed);
        let c = env.create_primitive("C".into(), TypeAttribute::Signed);
        let u = env.create_union("U".into());
        env.add_member(u, a);
        env.add_member(u, b);

        assert!(is_subtype_of(&env, a, u));
        assert!(is_subtype_of(&env, b, u));
        assert!(is_not_subtype_of(&env, c, u));

        // nested unions are transitive
        let v = env.create_union("V".into());
        env.add_member(v, u);
        env.add_member(v, c);
        assert!(is_subtype_of(&env, a, v));
        assert!(is_subtype_of(&env, c, v));

        // a homogeneous union is below its root
        let n = env.number_type();
        assert!(is_subtype_of(&env, u, n));
    }

    #[test]
    fn test_records_are_nominal() {
        let mut env = TypeEnvironment::new();
        let n = env.number_type();
        let r1 = env.create_record("R1".into());
        let r2 = env.create_record("R2".into());
        let name = internment::Intern::new("a".to_string());
        env.add_field(r1, name, n);
        env.add_field(r2, name, n);

        // identical structure, still unrelated
        assert!(is_not_subtype_of(&env, r1, r2));
        assert!(is_not_subtype_of(&env, r2, r1));
        assert!(is_subtype_of(&env, r1, r1));
    }

    #[test]
    fn test_subtype_terminates_on_recursive_union() {
        let mut env = TypeEnvironment::new();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let u = env.create_union("U".into());
        env.add_member(u, u);
        env.add_member(u, a);

        assert!(is_subtype_of(&env, a, u));
        assert!(is_not_subtype_of(&env, env.symbol_type(), u));
    }

    #[test]
    fn test_gcs_basic() {
        let mut env = TypeEnvironment::new();
        let n = env.number_type();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);

        assert_eq!(greatest_common_subtypes(&env, a, a), TypeSet::of(a));
        assert_eq!(greatest_common_subtypes(&env, a, n), TypeSet::of(a));
        assert_eq!(greatest_common_subtypes(&env, n, a), TypeSet::of(a));
        assert!(greatest_common_subtypes(&env, a, env.symbol_type()).is_empty());
    }

    #[test]
    fn test_gcs_of_unions() {
        let mut env = TypeEnvironment::new();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let b = env.create_primitive("B".into(), TypeAttribute::Signed);
        let c = env.create_primitive("C".into(), TypeAttribute::Signed);
        let u = env.create_union("U".into());
        env.add_member(u, a);
        env.add_member(u, b);
        let v = env.create_union("V".into());
        env.add_member(v, b);
        env.add_member(v, c);

        let common = greatest_common_subtypes(&env, u, v);
        assert!(common.contains(b));
        assert!(!common.contains(a));
        assert!(!common.contains(c));
    }

    #[test]
    fn test_gcs_sets_identity_and_absorption() {
        let mut env = TypeEnvironment::new();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let set = TypeSet::of(a);

        assert_eq!(
            greatest_common_subtypes_of_sets(&env, &set, &TypeSet::all()),
            set
        );
        assert!(greatest_common_subtypes_of_sets(&env, &set, &TypeSet::new()).is_empty());
    }

    #[test]
    fn test_lcs_picks_minimal_supertypes() {
        let mut env = TypeEnvironment::new();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let b = env.create_primitive("B".into(), TypeAttribute::Signed);
        let u = env.create_union("U".into());
        env.add_member(u, a);
        env.add_member(u, b);

        // both number and U are common supertypes; U <: number, so U is least
        let join = least_common_supertypes(&env, a, b);
        assert!(join.contains(u));
        assert!(!join.contains(env.number_type()));
    }

    #[test]
    fn test_lcs_sets_identity_and_absorption() {
        let mut env = TypeEnvironment::new();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        let n = env.number_type();
        let set = TypeSet::of(a);

        assert_eq!(
            least_common_supertypes_of_sets(&env, &set, &TypeSet::all()),
            set
        );
        assert!(least_common_supertypes_of_sets(&env, &set, &TypeSet::new()).is_empty());
        assert_eq!(
            least_common_supertypes_of_sets(&env, &set, &TypeSet::of(n)),
            TypeSet::of(n)
        );
    }

    #[test]
    fn test_lcs_subtype_shortcut() {
        let mut env = TypeEnvironment::new();
        let n = env.number_type();
        let a = env.create_primitive("A".into(), TypeAttribute::Signed);
        assert_eq!(least_common_supertypes(&env, a, n), TypeSet::of(n));
        assert_eq!(least_common_supertypes(&env, n, a), TypeSet::of(n));
    }
}
