//! Component instantiation
//!
//! Expands every top-level `.init name = C<args>` into concrete types,
//! relations, and clauses, honoring base components, overrides, and nested
//! instantiations. Afterwards the program contains no components or
//! instantiations; all instantiated content appears under names mangled with
//! the instance name, and every clause has migrated to its head relation or
//! to the program's free-clause list.
//!
//! # Expansion
//!
//! Instantiating `C<args>` binds the formal type parameters of `C` to the
//! actuals, recursively collects the content of base components and nested
//! instantiations, and clones the local declarations with parameter
//! substitution applied. Clause overrides declared by a derived component
//! suppress the matching clauses of its ancestors. Collected names are then
//! rewritten to `<instance>.<original>` throughout.

mod binding;
mod instantiate;
mod lookup;

pub use binding::TypeBinding;
pub use instantiate::{instantiate_components, instantiate_components_with_depth, MAX_INSTANTIATION_DEPTH};
pub use lookup::ComponentLookup;
