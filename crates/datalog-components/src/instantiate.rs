//! The instantiation pass

use crate::binding::TypeBinding;
use crate::lookup::{CompId, ComponentLookup};
use datalog_ast::{
    for_each_argument_in_clause_mut, for_each_atom_in_clause_mut, ArgumentKind, Clause, Component,
    ComponentInit, Directive, Program, QualifiedName, Relation, Symbol, TypeDecl, TypeDeclKind,
};
use datalog_report::{Diagnostic, DiagnosticMessage, ErrorReport};
use std::collections::{HashMap, HashSet};

/// Bound on the depth of nested component expansion
pub const MAX_INSTANTIATION_DEPTH: usize = 1000;

/// The instantiated content of one component, accumulated bottom-up
#[derive(Default)]
struct ComponentContent {
    types: Vec<TypeDecl>,
    relations: Vec<Relation>,
    loads: Vec<Directive>,
    print_sizes: Vec<Directive>,
    stores: Vec<Directive>,
}

impl ComponentContent {
    fn add_type(&mut self, ty: TypeDecl, report: &mut ErrorReport) {
        if let Some(previous) = self.types.iter().find(|t| t.name == ty.name) {
            report.add_diagnostic(
                Diagnostic::error(DiagnosticMessage::new(
                    format!("Redefinition of type {}", ty.name),
                    ty.span,
                ))
                .with_followup(DiagnosticMessage::new("Previous definition", previous.span)),
            );
        }
        self.types.push(ty);
    }

    fn add_relation(&mut self, rel: Relation, report: &mut ErrorReport) {
        if let Some(previous) = self.relations.iter().find(|r| r.name == rel.name) {
            report.add_diagnostic(
                Diagnostic::error(DiagnosticMessage::new(
                    format!("Redefinition of relation {}", rel.name),
                    rel.span,
                ))
                .with_followup(DiagnosticMessage::new("Previous definition", previous.span)),
            );
        }
        self.relations.push(rel);
    }

    fn add_load(&mut self, directive: Directive, report: &mut ErrorReport) {
        if let Some(previous) = self.loads.iter().find(|d| d.name == directive.name) {
            report.add_diagnostic(
                Diagnostic::error(DiagnosticMessage::new(
                    format!("Redefinition of IO directive {}", directive.name),
                    directive.span,
                ))
                .with_followup(DiagnosticMessage::new("Previous definition", previous.span)),
            );
        }
        self.loads.push(directive);
    }

    fn add_print_size(&mut self, directive: Directive, report: &mut ErrorReport) {
        if let Some(previous) = self.print_sizes.iter().find(|d| d.name == directive.name) {
            report.add_diagnostic(
                Diagnostic::error(DiagnosticMessage::new(
                    format!("Redefinition of IO directive {}", directive.name),
                    directive.span,
                ))
                .with_followup(DiagnosticMessage::new("Previous definition", previous.span)),
            );
        }
        self.print_sizes.push(directive);
    }

    // duplicate stores are accepted silently
    fn add_store(&mut self, directive: Directive) {
        self.stores.push(directive);
    }

    fn absorb(&mut self, other: ComponentContent, report: &mut ErrorReport) {
        for ty in other.types {
            self.add_type(ty, report);
        }
        for rel in other.relations {
            self.add_relation(rel, report);
        }
        for io in other.loads {
            self.add_load(io, report);
        }
        for io in other.print_sizes {
            self.add_print_size(io, report);
        }
        for io in other.stores {
            self.add_store(io);
        }
    }
}

/// Apply the type parameter binding to the references of a cloned type
/// declaration
fn bind_type_decl(ty: &mut TypeDecl, binding: &TypeBinding) {
    match &mut ty.kind {
        TypeDeclKind::Primitive(_) => {}
        TypeDeclKind::Union(members) => {
            for member in members {
                if let Some(bound) = binding.find(member) {
                    *member = bound.clone();
                }
            }
        }
        TypeDeclKind::Record(fields) => {
            for field in fields {
                if let Some(bound) = binding.find(&field.type_name) {
                    field.set_type_name(bound.clone());
                }
            }
        }
        TypeDeclKind::Sum(branches) => {
            for branch in branches {
                if let Some(bound) = binding.find(&branch.type_name) {
                    branch.set_type_name(bound.clone());
                }
            }
        }
    }
}

/// Collects clones of all the content in the given component and its base
/// components
#[allow(clippy::too_many_arguments)]
fn collect_content(
    id: CompId,
    binding: &TypeBinding,
    enclosing: Option<CompId>,
    lookup: &ComponentLookup,
    res: &mut ComponentContent,
    orphans: &mut Vec<Clause>,
    overridden: &HashSet<Symbol>,
    report: &mut ErrorReport,
    max_depth: usize,
) {
    let component: &Component = lookup.component(id);

    // start with relations and clauses of the base components
    for base in &component.bases {
        let Some(base_id) = lookup.get(enclosing, base.name, binding) else {
            continue;
        };
        let base_component = lookup.component(base_id);

        // link formal with actual type parameters
        let active_binding =
            binding.extend(&base_component.ty.type_params, &base.type_params);

        // instantiate sub-components of the base
        for init in &base_component.instantiations {
            let content = instantiated_content(
                init,
                enclosing,
                lookup,
                orphans,
                report,
                &active_binding,
                max_depth.saturating_sub(1),
            );
            res.absorb(content, report);
        }

        // the derived component's overrides hide matching base clauses
        let mut super_overridden = overridden.clone();
        super_overridden.extend(component.overridden.iter().copied());
        collect_content(
            base_id,
            &active_binding,
            Some(base_id),
            lookup,
            res,
            orphans,
            &super_overridden,
            report,
            max_depth,
        );
    }

    // and continue with the local types
    for ty in &component.types {
        let mut ty = ty.clone();
        bind_type_decl(&mut ty, binding);
        res.add_type(ty, report);
    }

    // and the local relations
    for rel in &component.relations {
        let mut rel = rel.clone();
        for attr in &mut rel.attributes {
            if let Some(bound) = binding.find(&attr.type_name) {
                attr.set_type_name(bound.clone());
            }
        }
        res.add_relation(rel, report);
    }

    // and the local io directives
    for io in &component.loads {
        res.add_load(io.clone(), report);
    }
    for io in &component.print_sizes {
        res.add_print_size(io.clone(), report);
    }
    for io in &component.stores {
        res.add_store(io.clone());
    }

    // index the available relations
    let mut index: HashMap<QualifiedName, usize> = HashMap::new();
    for (i, rel) in res.relations.iter().enumerate() {
        index.insert(rel.name.clone(), i);
    }

    // add the local clauses, unless overridden by a deriving component
    for clause in &component.clauses {
        let head_key = clause.head.name.first();
        if head_key.is_some_and(|key| overridden.contains(&key)) {
            continue;
        }
        match index.get(&clause.head.name) {
            Some(&i) => res.relations[i].add_clause(clause.clone()),
            None => orphans.push(clause.clone()),
        }
    }

    // adopt orphan clauses that became resolvable at this level
    orphans.retain(|clause| match index.get(&clause.head.name) {
        Some(&i) => {
            res.relations[i].add_clause(clause.clone());
            false
        }
        None => true,
    });
}

/// Recursively computes the content introduced by one instantiation
fn instantiated_content(
    init: &ComponentInit,
    enclosing: Option<CompId>,
    lookup: &ComponentLookup,
    orphans: &mut Vec<Clause>,
    report: &mut ErrorReport,
    binding: &TypeBinding,
    max_depth: usize,
) -> ComponentContent {
    let mut res = ComponentContent::default();

    if max_depth == 0 {
        report.add_error("Component instantiation limit reached", init.span);
        return res;
    }

    // an unknown component triggers a semantic error elsewhere
    let Some(id) = lookup.get(enclosing, init.component.name, binding) else {
        return res;
    };
    let component = lookup.component(id);

    // update the type binding
    let active_binding =
        binding.extend(&component.ty.type_params, &init.component.type_params);

    // instantiate nested components first
    for nested in &component.instantiations {
        let content = instantiated_content(
            nested,
            Some(id),
            lookup,
            orphans,
            report,
            &active_binding,
            max_depth - 1,
        );
        res.absorb(content, report);
    }

    // collect all content in this component
    collect_content(
        id,
        &active_binding,
        enclosing,
        lookup,
        &mut res,
        orphans,
        &HashSet::new(),
        report,
        max_depth,
    );

    // mangle: prefix every local type and relation with the instance name
    let mut type_mapping: HashMap<QualifiedName, QualifiedName> = HashMap::new();
    for ty in &mut res.types {
        let new_name = init.instance_name.concat(&ty.name);
        type_mapping.insert(ty.name.clone(), new_name.clone());
        ty.name = new_name;
    }

    let mut relation_mapping: HashMap<QualifiedName, QualifiedName> = HashMap::new();
    for rel in &mut res.relations {
        let new_name = init.instance_name.concat(&rel.name);
        relation_mapping.insert(rel.name.clone(), new_name.clone());
        rel.set_name(new_name);
    }

    // rewrite every reference in the accumulated content
    let rewriter = NameRewriter {
        types: &type_mapping,
        relations: &relation_mapping,
    };
    for rel in &mut res.relations {
        rewriter.rewrite_relation(rel);
    }
    for clause in orphans.iter_mut() {
        rewriter.rewrite_clause(clause);
    }
    for io in res
        .loads
        .iter_mut()
        .chain(res.print_sizes.iter_mut())
        .chain(res.stores.iter_mut())
    {
        rewriter.rewrite_directive(io);
    }
    for ty in &mut res.types {
        rewriter.rewrite_type_decl(ty);
    }

    res
}

/// Rewrites type and relation references according to the mangling tables
struct NameRewriter<'a> {
    types: &'a HashMap<QualifiedName, QualifiedName>,
    relations: &'a HashMap<QualifiedName, QualifiedName>,
}

impl NameRewriter<'_> {
    fn rewrite_relation(&self, rel: &mut Relation) {
        for attr in &mut rel.attributes {
            if let Some(mapped) = self.types.get(&attr.type_name) {
                attr.set_type_name(mapped.clone());
            }
        }
        for clause in &mut rel.clauses {
            self.rewrite_clause(clause);
        }
    }

    fn rewrite_clause(&self, clause: &mut Clause) {
        for_each_atom_in_clause_mut(clause, |atom| {
            if let Some(mapped) = self.relations.get(&atom.name) {
                atom.set_name(mapped.clone());
            }
        });
        for_each_argument_in_clause_mut(clause, |arg| match &mut arg.kind {
            ArgumentKind::RecordInit { ty: Some(ty), .. }
            | ArgumentKind::SumInit { ty, .. }
            | ArgumentKind::TypeCast { ty, .. } => {
                if let Some(mapped) = self.types.get(ty) {
                    *ty = mapped.clone();
                }
            }
            _ => {}
        });
    }

    fn rewrite_directive(&self, directive: &mut Directive) {
        if let Some(mapped) = self.relations.get(&directive.name) {
            directive.set_name(mapped.clone());
        }
    }

    fn rewrite_type_decl(&self, ty: &mut TypeDecl) {
        match &mut ty.kind {
            TypeDeclKind::Primitive(_) => {}
            TypeDeclKind::Union(members) => {
                for member in members {
                    if let Some(mapped) = self.types.get(member) {
                        *member = mapped.clone();
                    }
                }
            }
            TypeDeclKind::Record(fields) => {
                for field in fields {
                    if let Some(mapped) = self.types.get(&field.type_name) {
                        field.set_type_name(mapped.clone());
                    }
                }
            }
            TypeDeclKind::Sum(branches) => {
                for branch in branches {
                    if let Some(mapped) = self.types.get(&branch.type_name) {
                        branch.set_type_name(mapped.clone());
                    }
                }
            }
        }
    }
}

/// Expand all instantiations of the program with the default depth limit
pub fn instantiate_components(program: &mut Program, report: &mut ErrorReport) {
    instantiate_components_with_depth(program, report, MAX_INSTANTIATION_DEPTH);
}

/// Expand all instantiations of the program, then migrate every free clause
/// to its head relation. Clauses whose head names no relation stay on the
/// program.
pub fn instantiate_components_with_depth(
    program: &mut Program,
    report: &mut ErrorReport,
    max_depth: usize,
) {
    let instantiations = std::mem::take(&mut program.instantiations);
    let components = std::mem::take(&mut program.components);
    let lookup = ComponentLookup::new(&components);

    // clauses with no relation defined
    let mut unbound: Vec<Clause> = Vec::new();

    for init in &instantiations {
        let mut orphans = Vec::new();
        let content = instantiated_content(
            init,
            None,
            &lookup,
            &mut orphans,
            report,
            &TypeBinding::new(),
            max_depth,
        );

        for ty in content.types {
            program.types.push(ty);
        }
        for rel in content.relations {
            // the first definition wins; redefinitions were reported above
            program.relations.entry(rel.name.clone()).or_insert(rel);
        }
        program.loads.extend(content.loads);
        program.print_sizes.extend(content.print_sizes);
        program.stores.extend(content.stores);

        for clause in orphans {
            match program.relations.get_mut(&clause.head.name) {
                Some(rel) => rel.add_clause(clause),
                None => unbound.push(clause),
            }
        }
    }

    // migrate the program's free clauses into their relations
    for clause in std::mem::take(&mut program.clauses) {
        match program.relations.get_mut(&clause.head.name) {
            Some(rel) => rel.add_clause(clause),
            None => unbound.push(clause),
        }
    }
    program.clauses = unbound;
}
