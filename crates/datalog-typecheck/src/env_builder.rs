//! Building the type environment from AST declarations
//!
//! A two-phase pass: the first phase registers a symbol for every type
//! declaration, the second links member, field, and branch references by
//! name. Duplicate declarations and unresolvable references are skipped
//! silently here; the validator reports them. This keeps the environment
//! usable on partially valid input.

use datalog_ast::{Program, TypeDeclKind};
use datalog_types::{TypeEnvironment, TypeKind};
use std::collections::HashSet;

/// The result of building the type environment for a program
pub struct TypeEnvironmentAnalysis {
    env: TypeEnvironment,
}

impl TypeEnvironmentAnalysis {
    /// Build the environment from the program's type declarations. The
    /// builder is idempotent: re-running it on the same AST yields a
    /// registry of equal structure.
    pub fn run(program: &Program) -> Self {
        let mut env = TypeEnvironment::new();

        // create all type symbols in a first step
        for decl in &program.types {
            // tolerate faulty code with multiple definitions
            if env.is_type(&decl.name) {
                continue;
            }
            match &decl.kind {
                TypeDeclKind::Primitive(root) => {
                    env.create_primitive(decl.name.clone(), *root);
                }
                TypeDeclKind::Union(_) => {
                    env.create_union(decl.name.clone());
                }
                TypeDeclKind::Record(_) => {
                    env.create_record(decl.name.clone());
                }
                TypeDeclKind::Sum(_) => {
                    env.create_sum(decl.name.clone());
                }
            }
        }

        // link symbols in a second step
        for decl in &program.types {
            let Some(id) = env.type_id(&decl.name) else {
                continue;
            };
            match &decl.kind {
                TypeDeclKind::Primitive(_) => {}
                TypeDeclKind::Union(members) => {
                    // a duplicate declaration of another kind leaves the
                    // registered type untouched
                    if !matches!(env.kind(id), TypeKind::Union { .. }) {
                        continue;
                    }
                    for member in members {
                        if let Some(member_id) = env.type_id(member) {
                            env.add_member(id, member_id);
                        }
                    }
                }
                TypeDeclKind::Record(fields) => {
                    if !matches!(env.kind(id), TypeKind::Record { .. }) {
                        continue;
                    }
                    for field in fields {
                        if let Some(field_ty) = env.type_id(&field.type_name) {
                            env.add_field(id, field.name, field_ty);
                        }
                    }
                }
                TypeDeclKind::Sum(branches) => {
                    if !matches!(env.kind(id), TypeKind::Sum { .. }) {
                        continue;
                    }
                    // branch names stay unique within the sum
                    let mut seen = HashSet::new();
                    for branch in branches {
                        if !seen.insert(branch.name) {
                            continue;
                        }
                        if let Some(branch_ty) = env.type_id(&branch.type_name) {
                            env.add_branch(id, branch.name, branch_ty);
                        }
                    }
                }
            }
        }

        TypeEnvironmentAnalysis { env }
    }

    pub fn type_environment(&self) -> &TypeEnvironment {
        &self.env
    }
}
