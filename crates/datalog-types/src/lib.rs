//! The type system of the Datalog front end
//!
//! Types live in a [`TypeEnvironment`]: an arena of named type nodes
//! addressed by copyable [`TypeId`]s. Four root primitives (`number`,
//! `unsigned`, `float`, `symbol`) always exist; user declarations add
//! primitives derived from a root, unions, records, and sums. Because every
//! edge between types is a `TypeId` resolved through the environment,
//! recursive records, sums, and unions are representable, and every
//! traversal carries a visited set to terminate on them.
//!
//! On top of the environment sits the subtype lattice used by clause type
//! inference: [`is_subtype_of`], greatest common subtypes (the meet), and
//! least common supertypes (the join), each lifted pairwise to [`TypeSet`]s.
//!
//! # Subtyping
//!
//! `a <: b` holds when `a = b`, when `b` is a root and `a` is of that root,
//! when `a` is a user primitive whose base is a subtype of `b`, or when `b`
//! is a union with a member above `a`. Records and sums relate by identity
//! only; structural equality between distinct record or sum types does not
//! make them subtypes.

mod attribute;
mod env;
mod lattice;
mod qualifier;
mod typeset;

pub use attribute::{
    has_float_type, has_signed_type, has_unsigned_type, is_float_type, is_number_type,
    is_record_type, is_recursive_type, is_sum_type, is_symbol_type, is_unsigned_type,
    set_attribute, type_attribute,
};
pub use env::{Branch, Field, Type, TypeEnvironment, TypeId, TypeKind};
pub use lattice::{
    greatest_common_subtypes, greatest_common_subtypes_of_sets, is_subtype_of,
    least_common_supertypes, least_common_supertypes_of_sets,
};
pub use qualifier::type_qualifier;
pub use typeset::TypeSet;
