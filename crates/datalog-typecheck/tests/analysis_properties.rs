//! Property-based tests for the analyses using proptest
//!
//! The environment builder must be idempotent over arbitrary (including
//! partially invalid) declaration lists, and the constraint solver must
//! reach the same fixed point every time it runs.

use datalog_ast::{
    Argument, ArgumentKind, Atom, Attribute, Clause, Program, QualifiedName, Relation, Span,
    TypeAttribute, TypeDecl, TypeDeclKind,
};
use datalog_typecheck::{analyse_clause, TypeEnvironmentAnalysis};
use datalog_types::{type_qualifier, TypeEnvironment};
use internment::Intern;
use proptest::prelude::*;

const ROOTS: [TypeAttribute; 4] = [
    TypeAttribute::Signed,
    TypeAttribute::Unsigned,
    TypeAttribute::Float,
    TypeAttribute::Symbol,
];

/// A declaration recipe: primitives by root, unions over arbitrary names
/// (possibly duplicate or dangling)
#[derive(Debug, Clone)]
struct Decls {
    primitives: Vec<(u8, u8)>,
    unions: Vec<(u8, Vec<u8>)>,
}

fn decls() -> impl Strategy<Value = Decls> {
    (
        prop::collection::vec((0u8..6, 0u8..4), 0..6),
        prop::collection::vec((0u8..6, prop::collection::vec(0u8..10, 0..4)), 0..4),
    )
        .prop_map(|(primitives, unions)| Decls { primitives, unions })
}

fn type_name(index: u8) -> QualifiedName {
    QualifiedName::from(format!("T{}", index).as_str())
}

fn program_of(decls: &Decls) -> Program {
    let mut program = Program::new();
    for &(name, root) in &decls.primitives {
        program.types.push(TypeDecl {
            name: type_name(name),
            kind: TypeDeclKind::Primitive(ROOTS[root as usize % ROOTS.len()]),
            span: Span::none(),
        });
    }
    for (name, members) in &decls.unions {
        program.types.push(TypeDecl {
            name: type_name(*name),
            kind: TypeDeclKind::Union(members.iter().map(|&m| type_name(m)).collect()),
            span: Span::none(),
        });
    }
    program
}

/// Structural fingerprint of an environment: every name with its qualifier
fn fingerprint(env: &TypeEnvironment) -> Vec<(String, String)> {
    env.all_types()
        .map(|ty| (env.name(ty).to_string(), type_qualifier(env, ty)))
        .collect()
}

proptest! {
    /// Running the builder twice on the same AST yields registries of equal
    /// structure
    #[test]
    fn builder_is_idempotent(decls in decls()) {
        let program = program_of(&decls);
        let first = TypeEnvironmentAnalysis::run(&program);
        let second = TypeEnvironmentAnalysis::run(&program);
        prop_assert_eq!(
            fingerprint(first.type_environment()),
            fingerprint(second.type_environment())
        );
    }

    /// Solving a clause's constraint system twice produces the same
    /// assignment
    #[test]
    fn solver_is_idempotent(
        decls in decls(),
        attrs in prop::collection::vec(0u8..10, 1..4),
        constants in prop::collection::vec(0u8..3, 1..4),
    ) {
        let mut program = program_of(&decls);

        // a relation whose attributes reference arbitrary (maybe dangling)
        // type names, and a fact mixing constant kinds
        let arity = attrs.len().min(constants.len());
        let attributes = attrs[..arity]
            .iter()
            .enumerate()
            .map(|(i, &ty)| Attribute {
                name: Intern::new(format!("a{}", i)),
                type_name: type_name(ty),
                span: Span::none(),
            })
            .collect();
        program.add_relation(Relation::new(QualifiedName::from("r"), attributes, Span::none()));

        let args: Vec<Argument> = constants[..arity]
            .iter()
            .map(|&kind| {
                let kind = match kind {
                    0 => ArgumentKind::NumberConstant(1),
                    1 => ArgumentKind::StringConstant(Intern::new("x".to_string())),
                    _ => ArgumentKind::UnsignedConstant(1),
                };
                Argument::new(kind, Span::none())
            })
            .collect();
        let clause = Clause::new(
            Atom {
                name: QualifiedName::from("r"),
                args,
                span: Span::none(),
            },
            Vec::new(),
            Span::none(),
        );

        let analysis = TypeEnvironmentAnalysis::run(&program);
        let env = analysis.type_environment();
        let first = analyse_clause(env, &clause, &program);
        let second = analyse_clause(env, &clause, &program);
        prop_assert_eq!(first, second);
    }
}
