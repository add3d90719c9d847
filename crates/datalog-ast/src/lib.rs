//! Abstract Syntax Tree (AST) definitions for Datalog programs
//!
//! This crate defines the data structures representing a parsed Datalog
//! program, ready for semantic analysis.
//!
//! # Key Components
//!
//! - **Program**: types, relations, clauses, components, and I/O directives
//! - **TypeDecl**: primitive, union, record, and sum type declarations
//! - **Relation**: a declared relation with typed attributes and its clauses
//! - **Clause**: a head atom and an ordered body of literals
//! - **Argument**: terms at argument positions (variables, constants,
//!   functors, record/sum initializers, casts, aggregators)
//! - **Component**: a parameterized template of types, relations, and clauses
//!
//! Every node carries a [`Span`] pointing back into the source text.

mod arg;
mod ast;
mod component;
mod name;
mod span;
mod src;
mod utils;
mod visit;

pub use arg::{AggregateOp, Argument, ArgumentKind, FunctorOp};
pub use ast::{
    Attribute, Atom, BranchDecl, Clause, Comparison, ComparisonOp, Directive, FieldDecl,
    FunctorDeclaration, Literal, Program, Relation, RelationQualifier, RelationRepresentation,
    Symbol, TypeAttribute, TypeDecl, TypeDeclKind,
};
pub use component::{Component, ComponentInit, ComponentType};
pub use name::QualifiedName;
pub use span::Span;
pub use src::SrcId;
pub use utils::{
    atom_relation, body_atoms, body_comparisons, body_negations, clause_num, clone_head,
    head_relation, is_fact, is_recursive_clause, is_rule, record_inits, reorder_atoms, sum_inits,
    variables,
};
pub use visit::{
    for_each_argument, for_each_argument_in_clause, for_each_argument_in_clause_mut,
    for_each_atom_in_clause, for_each_atom_in_clause_mut, for_each_attribute_mut,
    index_arguments, ArgId,
};
