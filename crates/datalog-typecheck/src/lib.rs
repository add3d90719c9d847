//! Clause type inference
//!
//! Two analyses over the AST:
//!
//! - [`TypeEnvironmentAnalysis`] builds the [`datalog_types::TypeEnvironment`]
//!   from the program's type declarations, tolerating malformed input.
//! - [`TypeAnalysis`] computes, for every argument occurrence in every
//!   clause, the set of types it may belong to.
//!
//! # The constraint solver
//!
//! Each clause induces a small constraint system over variables addressed by
//! the argument's depth-first index. The value domain is [`TypeSet`] ordered
//! by the subtype lattice; every variable starts at the universal set and
//! constraints only ever shrink it (supertype seeds fire once), so iterating
//! all constraints to a fixed point terminates.
//!
//! An argument whose final set is empty has no valid type; a constant whose
//! set keeps more than one minimal type is ambiguous. Both are reported by
//! the semantic checks downstream.

mod analysis;
mod constraints;
mod env_builder;

pub use analysis::{analyse_clause, annotated_clause, ClauseTypes, TypeAnalysis};
pub use constraints::{solve, Assignment, Constraint};
pub use env_builder::TypeEnvironmentAnalysis;

pub use datalog_types::TypeSet;
