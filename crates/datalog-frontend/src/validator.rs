//! Semantic validation
//!
//! Best-effort checks feeding the shared report. The environment builder and
//! the instantiator silently skip what they cannot resolve; the checks here
//! turn those gaps into diagnostics while leaving the analyses usable.

use datalog_ast::{
    index_arguments, ArgumentKind, Component, ComponentInit, Program, QualifiedName, Span,
    TypeDeclKind,
};
use datalog_report::{Diagnostic, DiagnosticMessage, ErrorReport};
use datalog_typecheck::TypeAnalysis;
use datalog_types::{is_subtype_of, TypeEnvironment, TypeSet};
use std::collections::{HashMap, HashSet};

/// Check component instantiations before expansion: every `.init` must name
/// a known component and match its parameter count
pub fn check_components(program: &Program, report: &mut ErrorReport) {
    fn collect(components: &[Component], arities: &mut HashMap<String, usize>) {
        for component in components {
            arities
                .entry(component.name().as_ref().clone())
                .or_insert(component.ty.type_params.len());
            collect(&component.components, arities);
        }
    }

    fn check_inits(
        inits: &[ComponentInit],
        params: &HashSet<String>,
        arities: &HashMap<String, usize>,
        report: &mut ErrorReport,
    ) {
        for init in inits {
            // a formal type parameter may stand in for a component; those
            // resolve only at instantiation time
            if params.contains(init.component.name.as_ref()) {
                continue;
            }
            match arities.get(init.component.name.as_ref()) {
                None => report.add_error(
                    format!("Component {} is not defined", init.component.name),
                    init.span,
                ),
                Some(&arity) if arity != init.component.type_params.len() => report.add_error(
                    format!(
                        "Component {} expects {} type parameters",
                        init.component.name, arity
                    ),
                    init.span,
                ),
                Some(_) => {}
            }
        }
    }

    fn check_component(
        component: &Component,
        outer_params: &HashSet<String>,
        arities: &HashMap<String, usize>,
        report: &mut ErrorReport,
    ) {
        let mut params = outer_params.clone();
        params.extend(component.ty.type_params.iter().map(|p| p.to_string()));
        check_inits(&component.instantiations, &params, arities, report);
        for nested in &component.components {
            check_component(nested, &params, arities, report);
        }
    }

    let mut arities = HashMap::new();
    collect(&program.components, &mut arities);

    let no_params = HashSet::new();
    check_inits(&program.instantiations, &no_params, &arities, report);
    for component in &program.components {
        check_component(component, &no_params, &arities, report);
    }
}

/// Check type declarations and relation signatures against the built
/// environment
pub fn check_declarations(program: &Program, env: &TypeEnvironment, report: &mut ErrorReport) {
    // duplicate type declarations
    let mut first_seen: HashMap<&QualifiedName, Span> = HashMap::new();
    for decl in &program.types {
        match first_seen.get(&decl.name) {
            Some(&previous) => report.add_diagnostic(
                Diagnostic::error(DiagnosticMessage::new(
                    format!("Redefinition of type {}", decl.name),
                    decl.span,
                ))
                .with_followup(DiagnosticMessage::new("Previous definition", previous)),
            ),
            None => {
                first_seen.insert(&decl.name, decl.span);
            }
        }
    }

    // unresolved references inside type declarations
    for decl in &program.types {
        match &decl.kind {
            TypeDeclKind::Primitive(_) => {}
            TypeDeclKind::Union(members) => {
                for member in members {
                    if !env.is_type(member) {
                        report.add_error(format!("Undefined type {}", member), decl.span);
                    }
                }
            }
            TypeDeclKind::Record(fields) => {
                for field in fields {
                    if !env.is_type(&field.type_name) {
                        report
                            .add_error(format!("Undefined type {}", field.type_name), decl.span);
                    }
                }
            }
            TypeDeclKind::Sum(branches) => {
                let mut names = HashSet::new();
                for branch in branches {
                    if !names.insert(branch.name) {
                        report.add_error(
                            format!("Duplicate branch {} in sum type {}", branch.name, decl.name),
                            decl.span,
                        );
                    }
                    if !env.is_type(&branch.type_name) {
                        report
                            .add_error(format!("Undefined type {}", branch.type_name), decl.span);
                    }
                }
            }
        }
    }

    // unresolved attribute types
    for rel in program.relations.values() {
        for attr in &rel.attributes {
            if !env.is_type(&attr.type_name) {
                report.add_error(
                    format!("Undefined type in attribute {}:{}", attr.name, attr.type_name),
                    attr.span,
                );
            }
        }
    }
}

/// Check the computed clause types: empty sets are type mismatches, and a
/// constant must narrow to exactly one minimal type
pub fn check_typing(
    program: &Program,
    env: &TypeEnvironment,
    analysis: &TypeAnalysis,
    report: &mut ErrorReport,
) {
    for (name, rel) in &program.relations {
        for (index, clause) in rel.clauses.iter().enumerate() {
            let Some(types) = analysis.clause_types(name, index) else {
                continue;
            };
            for (id, arg) in index_arguments(clause).into_iter().enumerate() {
                let set = types.get(datalog_ast::ArgId(id));
                if set.is_empty() {
                    let what = match &arg.kind {
                        ArgumentKind::Variable(name) => format!("variable {}", name),
                        _ => "expression".to_string(),
                    };
                    report.add_error(format!("Unable to deduce type for {}", what), arg.span);
                    continue;
                }
                if is_constant(&arg.kind) && minimal_types(env, set).len() > 1 {
                    report.add_error("Ambiguous type for constant", arg.span);
                }
            }
        }
    }
}

fn is_constant(kind: &ArgumentKind) -> bool {
    matches!(
        kind,
        ArgumentKind::NumberConstant(_)
            | ArgumentKind::UnsignedConstant(_)
            | ArgumentKind::FloatConstant(_)
            | ArgumentKind::StringConstant(_)
            | ArgumentKind::NilConstant
    )
}

/// The minimal elements of a finite set under the subtype order
fn minimal_types(env: &TypeEnvironment, set: &TypeSet) -> Vec<datalog_types::TypeId> {
    if set.is_all() {
        return Vec::new();
    }
    set.iter()
        .filter(|&t| {
            !set.iter()
                .any(|other| other != t && is_subtype_of(env, other, t))
        })
        .collect()
}
