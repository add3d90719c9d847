//! The type environment
//!
//! Owns every type of a translation unit and manages their life cycle: types
//! are created while building the environment and live until the translation
//! unit ends. References between types are [`TypeId`]s resolved through the
//! environment, never direct pointers.

use datalog_ast::{QualifiedName, Symbol, TypeAttribute};
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a type within its environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A named field of a record type
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: Symbol,
    pub ty: TypeId,
}

/// A named branch of a sum type; branch names are unique within the sum
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub name: Symbol,
    pub ty: TypeId,
}

/// The shape of a registered type
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// One of the four pre-created roots
    Root(TypeAttribute),
    /// A user primitive; its base chains to a root
    Primitive { base: TypeId },
    /// An ordered union of member types
    Union { elements: Vec<TypeId> },
    /// An ordered sequence of named fields
    Record { fields: Vec<Field> },
    /// An ordered sequence of named branches
    Sum { branches: Vec<Branch> },
}

/// A type node owned by the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    name: QualifiedName,
    kind: TypeKind,
}

impl Type {
    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }
}

/// The set of all types within a program
pub struct TypeEnvironment {
    types: Vec<Type>,
    by_name: HashMap<QualifiedName, TypeId>,
    number: TypeId,
    unsigned: TypeId,
    float: TypeId,
    symbol: TypeId,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        let mut env = TypeEnvironment {
            types: Vec::new(),
            by_name: HashMap::new(),
            number: TypeId(0),
            unsigned: TypeId(0),
            float: TypeId(0),
            symbol: TypeId(0),
        };
        env.number = env.register("number".into(), TypeKind::Root(TypeAttribute::Signed));
        env.unsigned = env.register("unsigned".into(), TypeKind::Root(TypeAttribute::Unsigned));
        env.float = env.register("float".into(), TypeKind::Root(TypeAttribute::Float));
        env.symbol = env.register("symbol".into(), TypeKind::Root(TypeAttribute::Symbol));
        env
    }

    fn register(&mut self, name: QualifiedName, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.types.push(Type { name, kind });
        id
    }

    /// Create an empty type under `name`, returning the already-registered
    /// type when the name is bound. The environment builder relies on this to
    /// tolerate duplicate declarations.
    fn create(&mut self, name: QualifiedName, kind: TypeKind) -> TypeId {
        if let Some(&existing) = self.by_name.get(&name) {
            return existing;
        }
        self.register(name, kind)
    }

    /// Create a user primitive derived from the root of the given scalar
    /// attribute. Non-scalar attributes derive from `symbol`.
    pub fn create_primitive(&mut self, name: QualifiedName, root: TypeAttribute) -> TypeId {
        let base = self.root(root).unwrap_or(self.symbol);
        self.create(name, TypeKind::Primitive { base })
    }

    pub fn create_union(&mut self, name: QualifiedName) -> TypeId {
        self.create(name, TypeKind::Union { elements: Vec::new() })
    }

    pub fn create_record(&mut self, name: QualifiedName) -> TypeId {
        self.create(name, TypeKind::Record { fields: Vec::new() })
    }

    pub fn create_sum(&mut self, name: QualifiedName) -> TypeId {
        self.create(name, TypeKind::Sum { branches: Vec::new() })
    }

    /// Append a member type to a union, in declaration order
    pub fn add_member(&mut self, union: TypeId, member: TypeId) {
        if let TypeKind::Union { elements } = &mut self.types[union.index()].kind {
            elements.push(member);
        }
    }

    /// Append a field to a record, in declaration order
    pub fn add_field(&mut self, record: TypeId, name: Symbol, ty: TypeId) {
        if let TypeKind::Record { fields } = &mut self.types[record.index()].kind {
            fields.push(Field { name, ty });
        }
    }

    /// Append a branch to a sum, in declaration order
    pub fn add_branch(&mut self, sum: TypeId, name: Symbol, ty: TypeId) {
        if let TypeKind::Sum { branches } = &mut self.types[sum.index()].kind {
            branches.push(Branch { name, ty });
        }
    }

    pub fn is_type(&self, name: &QualifiedName) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn type_id(&self, name: &QualifiedName) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    pub fn name(&self, id: TypeId) -> &QualifiedName {
        self.get(id).name()
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        self.get(id).kind()
    }

    /// Every registered type, in registration order
    pub fn all_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len() as u32).map(TypeId)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        // the four roots always exist
        false
    }

    pub fn number_type(&self) -> TypeId {
        self.number
    }

    pub fn unsigned_type(&self) -> TypeId {
        self.unsigned
    }

    pub fn float_type(&self) -> TypeId {
        self.float
    }

    pub fn symbol_type(&self) -> TypeId {
        self.symbol
    }

    /// The root type for a scalar attribute
    pub fn root(&self, attribute: TypeAttribute) -> Option<TypeId> {
        match attribute {
            TypeAttribute::Signed => Some(self.number),
            TypeAttribute::Unsigned => Some(self.unsigned),
            TypeAttribute::Float => Some(self.float),
            TypeAttribute::Symbol => Some(self.symbol),
            TypeAttribute::Record | TypeAttribute::Sum => None,
        }
    }

    pub fn is_root(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Root(_))
    }
}

impl Default for TypeEnvironment {
    fn default() -> Self {
        TypeEnvironment::new()
    }
}

impl fmt::Debug for TypeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Types:")?;
        for ty in &self.types {
            writeln!(f, "\t{}", ty.name())?;
        }
        Ok(())
    }
}
