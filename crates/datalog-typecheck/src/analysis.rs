//! The clause type analysis
//!
//! Emits the constraints induced by one clause, solves them to a fixed
//! point, and records the resulting [`TypeSet`] per argument. The analysis
//! is pure: it never mutates the program, and errors surface later when the
//! semantic checks inspect the computed sets.

use crate::constraints::{solve, Assignment, Constraint};
use datalog_ast::{
    for_each_argument_in_clause_mut, index_arguments, ArgId, Argument, ArgumentKind, Atom, Clause,
    Literal, Program, QualifiedName, TypeAttribute,
};
use datalog_types::{TypeEnvironment, TypeKind, TypeSet};
use internment::Intern;
use std::collections::HashMap;

/// The inferred types of one clause, indexed by argument depth-first
/// position
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseTypes {
    types: Vec<TypeSet>,
}

impl ClauseTypes {
    pub fn get(&self, arg: ArgId) -> &TypeSet {
        &self.types[arg.0]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArgId, &TypeSet)> {
        self.types.iter().enumerate().map(|(i, t)| (ArgId(i), t))
    }
}

/// Compute the possible types of every argument of a clause
pub fn analyse_clause(env: &TypeEnvironment, clause: &Clause, program: &Program) -> ClauseTypes {
    let args = index_arguments(clause);

    // all occurrences of a named variable share one solver variable; every
    // other argument stands for itself
    let mut first_occurrence: HashMap<datalog_ast::Symbol, ArgId> = HashMap::new();
    let mut canonical: Vec<ArgId> = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let id = ArgId(i);
        match &arg.kind {
            ArgumentKind::Variable(name) => {
                canonical.push(*first_occurrence.entry(*name).or_insert(id));
            }
            _ => canonical.push(id),
        }
    }

    let ids: HashMap<*const Argument, ArgId> = args
        .iter()
        .enumerate()
        .map(|(i, &arg)| (arg as *const Argument, canonical[i]))
        .collect();

    let mut generator = Generator {
        env,
        program,
        ids: &ids,
        constraints: Vec::new(),
    };

    // upper bounds from the relation signatures
    generator.visit_atom(&clause.head, false);
    for literal in &clause.body {
        generator.visit_literal(literal);
    }

    // structural constraints per argument
    for &arg in &args {
        generator.visit_argument(arg);
    }

    let mut constraints = generator.constraints;
    let mut assignment = Assignment::new(args.len());
    solve(&mut constraints, &mut assignment, env);

    let values = assignment.into_values();
    ClauseTypes {
        types: canonical.iter().map(|id| values[id.0].clone()).collect(),
    }
}

struct Generator<'a> {
    env: &'a TypeEnvironment,
    program: &'a Program,
    ids: &'a HashMap<*const Argument, ArgId>,
    constraints: Vec<Constraint>,
}

impl Generator<'_> {
    fn var(&self, arg: &Argument) -> ArgId {
        self.ids[&(arg as *const Argument)]
    }

    fn add(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    fn subtype_of_root(&mut self, arg: &Argument, attribute: TypeAttribute) {
        if let Some(root) = self.env.root(attribute) {
            self.add(Constraint::SubtypeOfType {
                a: self.var(arg),
                ty: root,
            });
        }
    }

    fn visit_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Positive(atom) => self.visit_atom(atom, false),
            Literal::Negative(atom) => self.visit_atom(atom, true),
            Literal::Comparison(cmp) => {
                let lhs = self.var(&cmp.left);
                let rhs = self.var(&cmp.right);
                self.add(Constraint::SubtypeOfVar { a: lhs, b: rhs });
                self.add(Constraint::SubtypeOfVar { a: rhs, b: lhs });
            }
        }
    }

    /// Bound each argument by the declared attribute type of its relation.
    /// Positive occurrences narrow; negated occurrences only seed.
    fn visit_atom(&mut self, atom: &Atom, negated: bool) {
        let Some(rel) = self.program.relation(&atom.name) else {
            // error in the input program, reported elsewhere
            return;
        };
        if rel.arity() != atom.arity() {
            return;
        }

        for (arg, attr) in atom.args.iter().zip(&rel.attributes) {
            let Some(ty) = self.env.type_id(&attr.type_name) else {
                continue;
            };
            if negated {
                self.add(Constraint::SupertypeOfType {
                    a: self.var(arg),
                    ty,
                    applied: false,
                });
            } else {
                self.add(Constraint::SubtypeOfType {
                    a: self.var(arg),
                    ty,
                });
            }
        }
    }

    fn visit_argument(&mut self, arg: &Argument) {
        match &arg.kind {
            ArgumentKind::Variable(_) | ArgumentKind::UnnamedVariable => {}

            ArgumentKind::StringConstant(_) => self.subtype_of_root(arg, TypeAttribute::Symbol),
            ArgumentKind::NumberConstant(_) => self.subtype_of_root(arg, TypeAttribute::Signed),
            ArgumentKind::UnsignedConstant(_) => {
                self.subtype_of_root(arg, TypeAttribute::Unsigned)
            }
            ArgumentKind::FloatConstant(_) => self.subtype_of_root(arg, TypeAttribute::Float),
            ArgumentKind::Counter => self.subtype_of_root(arg, TypeAttribute::Signed),
            ArgumentKind::NilConstant => self.add(Constraint::IsRecord { a: self.var(arg) }),

            ArgumentKind::IntrinsicFunctor(op, args) => {
                if op.is_overloaded() {
                    // all operands and the result are forced pairwise
                    // subtype-equal
                    let result = self.var(arg);
                    for operand in args {
                        let operand = self.var(operand);
                        self.add(Constraint::SubtypeOfVar { a: operand, b: result });
                        self.add(Constraint::SubtypeOfVar { a: result, b: operand });
                    }
                    return;
                }
                if let Some(result) = op.result_type() {
                    self.subtype_of_root(arg, result);
                }
                for (i, operand) in args.iter().enumerate() {
                    // ord places no constraint on its operand
                    if let Some(attribute) = op.arg_type(i) {
                        self.subtype_of_root(operand, attribute);
                    }
                }
            }

            ArgumentKind::UserFunctor(name, args) => {
                let Some(decl) = self.program.functor(name) else {
                    return;
                };
                if decl.arity() != args.len() {
                    return;
                }
                self.subtype_of_root(arg, decl.result_type);
                for (operand, &attribute) in args.iter().zip(&decl.arg_types) {
                    self.subtype_of_root(operand, attribute);
                }
            }

            ArgumentKind::RecordInit { ty, args } => {
                let record = self.var(arg);
                self.add(Constraint::RecordArity {
                    record,
                    arity: args.len(),
                });
                if let Some(declared) = ty.as_ref().and_then(|name| self.env.type_id(name)) {
                    self.add(Constraint::SubtypeOfType { a: record, ty: declared });
                    self.add(Constraint::SupertypeOfType {
                        a: record,
                        ty: declared,
                        applied: false,
                    });
                }
                for (i, element) in args.iter().enumerate() {
                    self.add(Constraint::FieldOf {
                        a: self.var(element),
                        record,
                        index: i,
                    });
                }
            }

            ArgumentKind::SumInit { ty, branch, value } => {
                let sum = self.var(arg);
                if let Some(declared) = self.env.type_id(ty) {
                    self.add(Constraint::SubtypeOfType { a: sum, ty: declared });
                    self.add(Constraint::SupertypeOfType {
                        a: sum,
                        ty: declared,
                        applied: false,
                    });
                    if let TypeKind::Sum { branches } = self.env.kind(declared) {
                        if let Some(payload) = branches.iter().find(|b| b.name == *branch) {
                            self.add(Constraint::SubtypeOfType {
                                a: self.var(value),
                                ty: payload.ty,
                            });
                        }
                    }
                }
            }

            ArgumentKind::TypeCast { ty, .. } => {
                // the cast pins its own type; the operand stays free
                if let Some(target) = self.env.type_id(ty) {
                    self.add(Constraint::SubtypeOfType {
                        a: self.var(arg),
                        ty: target,
                    });
                }
            }

            ArgumentKind::Aggregator { target, body, .. } => {
                self.subtype_of_root(arg, TypeAttribute::Signed);
                if let Some(target) = target {
                    self.subtype_of_root(target, TypeAttribute::Signed);
                }
                for literal in body {
                    self.visit_literal(literal);
                }
            }
        }
    }
}

/// The analysis results for a whole program, cached per clause
pub struct TypeAnalysis {
    clause_types: HashMap<(QualifiedName, usize), ClauseTypes>,
}

impl TypeAnalysis {
    /// Analyse every clause attached to a relation
    pub fn run(env: &TypeEnvironment, program: &Program) -> Self {
        let mut clause_types = HashMap::new();
        for (name, rel) in &program.relations {
            for (index, clause) in rel.clauses.iter().enumerate() {
                clause_types.insert((name.clone(), index), analyse_clause(env, clause, program));
            }
        }
        TypeAnalysis { clause_types }
    }

    /// The types computed for clause `index` of the given relation
    pub fn clause_types(&self, relation: &QualifiedName, index: usize) -> Option<&ClauseTypes> {
        self.clause_types.get(&(relation.clone(), index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(QualifiedName, usize), &ClauseTypes)> {
        self.clause_types.iter()
    }
}

/// A clone of the clause whose variables carry their inferred type sets in
/// their names, for debug output. Analysis results transfer to the clone by
/// depth-first argument correlation.
pub fn annotated_clause(clause: &Clause, types: &ClauseTypes, env: &TypeEnvironment) -> Clause {
    let mut annotated = clause.clone();
    let mut next = 0usize;
    for_each_argument_in_clause_mut(&mut annotated, |arg| {
        let id = ArgId(next);
        next += 1;
        let rendered = |name: &str| {
            Intern::new(format!("{}∈{}", name, types.get(id).display(env)))
        };
        match &mut arg.kind {
            ArgumentKind::Variable(name) => {
                *name = rendered(name.as_ref());
            }
            ArgumentKind::UnnamedVariable => {
                arg.kind = ArgumentKind::Variable(rendered("_"));
            }
            _ => {}
        }
    });
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_builder::TypeEnvironmentAnalysis;
    use datalog_ast::{Attribute, Relation, Span, TypeDecl, TypeDeclKind};

    fn sym(s: &str) -> datalog_ast::Symbol {
        Intern::new(s.to_string())
    }

    fn var(name: &str) -> Argument {
        Argument::new(ArgumentKind::Variable(sym(name)), Span::none())
    }

    fn num(value: i64) -> Argument {
        Argument::new(ArgumentKind::NumberConstant(value), Span::none())
    }

    fn atom(name: &str, args: Vec<Argument>) -> Atom {
        Atom {
            name: QualifiedName::from(name),
            args,
            span: Span::none(),
        }
    }

    fn decl_relation(program: &mut Program, name: &str, attrs: &[(&str, &str)]) {
        let attributes = attrs
            .iter()
            .map(|(attr, ty)| Attribute {
                name: sym(attr),
                type_name: QualifiedName::from(*ty),
                span: Span::none(),
            })
            .collect();
        program.add_relation(Relation::new(QualifiedName::from(name), attributes, Span::none()));
    }

    fn decl_type(program: &mut Program, name: &str, kind: TypeDeclKind) {
        program.types.push(TypeDecl {
            name: QualifiedName::from(name),
            kind,
            span: Span::none(),
        });
    }

    #[test]
    fn test_fact_argument_narrows_to_attribute_type() {
        let mut program = Program::new();
        decl_type(&mut program, "N", TypeDeclKind::Primitive(TypeAttribute::Signed));
        decl_relation(&mut program, "r", &[("x", "N")]);

        let analysis = TypeEnvironmentAnalysis::run(&program);
        let env = analysis.type_environment();
        let n = env.type_id(&QualifiedName::from("N")).unwrap();

        let clause = Clause::new(atom("r", vec![num(1)]), Vec::new(), Span::none());
        let types = analyse_clause(env, &clause, &program);
        assert_eq!(types.get(ArgId(0)), &TypeSet::of(n));
    }

    #[test]
    fn test_ill_typed_constant_becomes_empty() {
        let mut program = Program::new();
        decl_type(&mut program, "S", TypeDeclKind::Primitive(TypeAttribute::Symbol));
        decl_relation(&mut program, "r", &[("x", "S")]);

        let analysis = TypeEnvironmentAnalysis::run(&program);
        let env = analysis.type_environment();

        let clause = Clause::new(atom("r", vec![num(1)]), Vec::new(), Span::none());
        let types = analyse_clause(env, &clause, &program);
        assert!(types.get(ArgId(0)).is_empty());
    }

    #[test]
    fn test_variable_joins_body_and_head_bounds() {
        let mut program = Program::new();
        decl_type(&mut program, "N", TypeDeclKind::Primitive(TypeAttribute::Signed));
        decl_relation(&mut program, "r", &[("x", "N")]);
        decl_relation(&mut program, "s", &[("x", "number")]);

        let analysis = TypeEnvironmentAnalysis::run(&program);
        let env = analysis.type_environment();
        let n = env.type_id(&QualifiedName::from("N")).unwrap();

        // r(X) :- s(X).
        let clause = Clause::new(
            atom("r", vec![var("X")]),
            vec![Literal::Positive(atom("s", vec![var("X")]))],
            Span::none(),
        );
        let types = analyse_clause(env, &clause, &program);
        // both occurrences of X narrow to N
        assert_eq!(types.get(ArgId(0)), &TypeSet::of(n));
    }

    #[test]
    fn test_unknown_relation_leaves_argument_unconstrained() {
        let program = Program::new();
        let env = TypeEnvironment::new();
        let clause = Clause::new(atom("missing", vec![var("X")]), Vec::new(), Span::none());
        let types = analyse_clause(&env, &clause, &program);
        assert!(types.get(ArgId(0)).is_all());
    }

    #[test]
    fn test_overloaded_functor_unifies_operands() {
        let mut program = Program::new();
        decl_relation(&mut program, "r", &[("x", "number")]);

        let env = TypeEnvironment::new();
        let number = env.number_type();

        // r(X + 1).
        let clause = Clause::new(
            atom(
                "r",
                vec![Argument::new(
                    ArgumentKind::IntrinsicFunctor(
                        datalog_ast::FunctorOp::Add,
                        vec![var("X"), num(1)],
                    ),
                    Span::none(),
                )],
            ),
            Vec::new(),
            Span::none(),
        );
        let types = analyse_clause(&env, &clause, &program);
        // functor, X, and 1 all agree on number
        assert_eq!(types.get(ArgId(0)), &TypeSet::of(number));
        assert_eq!(types.get(ArgId(1)), &TypeSet::of(number));
        assert_eq!(types.get(ArgId(2)), &TypeSet::of(number));
    }

    #[test]
    fn test_annotated_clause_renders_types() {
        let mut program = Program::new();
        decl_relation(&mut program, "r", &[("x", "number")]);

        let env = TypeEnvironment::new();
        let clause = Clause::new(atom("r", vec![var("X")]), Vec::new(), Span::none());
        let types = analyse_clause(&env, &clause, &program);

        let annotated = annotated_clause(&clause, &types, &env);
        match &annotated.head.args[0].kind {
            ArgumentKind::Variable(name) => {
                assert!(name.as_ref().starts_with("X∈"));
                assert!(name.as_ref().contains("number"));
            }
            other => panic!("unexpected argument {:?}", other),
        }
    }
}
