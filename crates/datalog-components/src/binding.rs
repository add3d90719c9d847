//! Type parameter bindings
//!
//! A persistent mapping from formal type parameter names to actual type
//! names. Extending a binding resolves the new actuals through the current
//! binding first, so parameters chain correctly through nested
//! instantiations.

use datalog_ast::QualifiedName;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct TypeBinding {
    binding: HashMap<QualifiedName, QualifiedName>,
}

impl TypeBinding {
    pub fn new() -> Self {
        TypeBinding::default()
    }

    /// The name bound to `name`, if any
    pub fn find(&self, name: &QualifiedName) -> Option<&QualifiedName> {
        self.binding.get(name)
    }

    /// A fresh binding mapping each formal to its actual, where actuals that
    /// are themselves bound in `self` resolve through it. Mismatched
    /// parameter lists leave the binding unchanged; the validator reports
    /// the arity error.
    pub fn extend(&self, formals: &[QualifiedName], actuals: &[QualifiedName]) -> TypeBinding {
        if formals.len() != actuals.len() {
            return self.clone();
        }
        let mut binding = HashMap::new();
        for (formal, actual) in formals.iter().zip(actuals) {
            let resolved = self.find(actual).cloned().unwrap_or_else(|| actual.clone());
            binding.insert(formal.clone(), resolved);
        }
        TypeBinding { binding }
    }
}
