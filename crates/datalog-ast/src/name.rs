//! Qualified names
//!
//! A qualified name is a dotted sequence of identifiers such as `A.B.C`.
//! Component instantiation concatenates the instance name onto the names of
//! the instantiated content, so `Graph.node` names the `node` relation of an
//! instance `Graph`.

use internment::Intern;
use std::cmp::Ordering;
use std::fmt;

/// Interned string for efficient storage and comparison
pub type Symbol = Intern<String>;

/// A dotted sequence of identifiers identifying a type, relation, or instance
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    segments: Vec<Symbol>,
}

impl QualifiedName {
    /// An empty name, used as the "no binding" marker
    pub fn empty() -> Self {
        QualifiedName {
            segments: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Symbol] {
        &self.segments
    }

    /// The first qualifier, used as the key for clause overrides
    pub fn first(&self) -> Option<Symbol> {
        self.segments.first().copied()
    }

    /// Concatenation: `self` followed by all segments of `other`
    pub fn concat(&self, other: &QualifiedName) -> QualifiedName {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().copied());
        QualifiedName { segments }
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        QualifiedName {
            segments: name
                .split('.')
                .filter(|s| !s.is_empty())
                .map(|s| Intern::new(s.to_string()))
                .collect(),
        }
    }
}

impl From<Symbol> for QualifiedName {
    fn from(segment: Symbol) -> Self {
        QualifiedName {
            segments: vec![segment],
        }
    }
}

impl PartialOrd for QualifiedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QualifiedName {
    fn cmp(&self, other: &Self) -> Ordering {
        // interned symbols order by pointer, so compare the underlying strings
        self.segments
            .iter()
            .map(|s| s.as_ref())
            .cmp(other.segments.iter().map(|s| s.as_ref()))
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
