//! Components
//!
//! A component is a parameterized template of types, relations, clauses, and
//! I/O directives. Components may extend base components, contain nested
//! component definitions and instantiations, and suppress inherited clauses
//! through overrides. The instantiation pass flattens all of this into the
//! program.

use crate::ast::{Clause, Directive, Relation, Symbol, TypeDecl};
use crate::name::QualifiedName;
use crate::span::Span;
use std::collections::HashSet;

/// A component head: its name together with type parameters.
///
/// For a definition the parameters are formal names; for a base reference or
/// an instantiation they are the actual arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentType {
    pub name: Symbol,
    pub type_params: Vec<QualifiedName>,
    pub span: Span,
}

/// A component definition
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Name and formal type parameters
    pub ty: ComponentType,
    /// Base components this one extends, in declaration order
    pub bases: Vec<ComponentType>,
    pub types: Vec<TypeDecl>,
    pub relations: Vec<Relation>,
    pub clauses: Vec<Clause>,
    pub loads: Vec<Directive>,
    pub print_sizes: Vec<Directive>,
    pub stores: Vec<Directive>,
    /// Nested component definitions, visible to this component's own
    /// instantiations and bases
    pub components: Vec<Component>,
    pub instantiations: Vec<ComponentInit>,
    /// Head-relation identifiers whose inherited clauses are suppressed
    pub overridden: HashSet<Symbol>,
    pub span: Span,
}

impl Component {
    pub fn new(ty: ComponentType, span: Span) -> Self {
        Component {
            ty,
            bases: Vec::new(),
            types: Vec::new(),
            relations: Vec::new(),
            clauses: Vec::new(),
            loads: Vec::new(),
            print_sizes: Vec::new(),
            stores: Vec::new(),
            components: Vec::new(),
            instantiations: Vec::new(),
            overridden: HashSet::new(),
            span,
        }
    }

    pub fn name(&self) -> Symbol {
        self.ty.name
    }
}

/// An instantiation: `.init name = C<args>`
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInit {
    /// The instance name used to mangle the instantiated content
    pub instance_name: QualifiedName,
    /// The component being instantiated, with actual type arguments
    pub component: ComponentType,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;
    use internment::Intern;

    #[test]
    fn test_component_construction() {
        let ty = ComponentType {
            name: Intern::new("Graph".to_string()),
            type_params: vec![QualifiedName::from("T")],
            span: Span::none(),
        };
        let comp = Component::new(ty, Span::none());
        assert_eq!(comp.name().as_ref(), "Graph");
        assert!(comp.bases.is_empty());
        assert!(comp.overridden.is_empty());
    }
}
