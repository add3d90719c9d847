//! Scoped component lookup
//!
//! Components may be defined at the top level or nested inside other
//! components. Resolving a component name searches the nested definitions of
//! the enclosing component, then each outer scope in turn, and finally the
//! top level. A name bound as a type parameter in the active binding is
//! resolved through the binding first, so components can be passed as
//! parameters.

use crate::binding::TypeBinding;
use datalog_ast::{Component, QualifiedName, Symbol};

/// Index of a component definition within a [`ComponentLookup`]
pub(crate) type CompId = usize;

struct Node<'a> {
    component: &'a Component,
    parent: Option<CompId>,
    children: Vec<CompId>,
}

/// A flattened index over all component definitions of a program
pub struct ComponentLookup<'a> {
    nodes: Vec<Node<'a>>,
    roots: Vec<CompId>,
}

impl<'a> ComponentLookup<'a> {
    pub fn new(components: &'a [Component]) -> Self {
        let mut lookup = ComponentLookup {
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        for component in components {
            let id = lookup.add(component, None);
            lookup.roots.push(id);
        }
        lookup
    }

    fn add(&mut self, component: &'a Component, parent: Option<CompId>) -> CompId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            component,
            parent,
            children: Vec::new(),
        });
        for nested in &component.components {
            let child = self.add(nested, Some(id));
            self.nodes[id].children.push(child);
        }
        id
    }

    pub(crate) fn component(&self, id: CompId) -> &'a Component {
        self.nodes[id].component
    }

    /// Resolve a component name within the given scope, after resolving the
    /// name through the active binding
    pub(crate) fn get(
        &self,
        scope: Option<CompId>,
        name: Symbol,
        binding: &TypeBinding,
    ) -> Option<CompId> {
        let direct = QualifiedName::from(name);
        let effective = binding.find(&direct).cloned().unwrap_or(direct);
        let wanted = effective.to_string();

        let mut cur = scope;
        while let Some(id) = cur {
            for &child in &self.nodes[id].children {
                if self.component(child).name().as_ref() == &wanted {
                    return Some(child);
                }
            }
            cur = self.nodes[id].parent;
        }
        self.roots
            .iter()
            .copied()
            .find(|&root| self.component(root).name().as_ref() == &wanted)
    }
}
