//! The constraint language of the clause type analysis
//!
//! A constraint acts on an assignment of [`TypeSet`]s to argument variables
//! and exposes one operation: `update`, which narrows the assignment and
//! reports whether anything changed. The solver sweeps all constraints
//! round-robin until a full sweep reports no change; termination follows
//! from every update shrinking a set over a finite lattice.

use datalog_ast::ArgId;
use datalog_types::{
    greatest_common_subtypes, greatest_common_subtypes_of_sets, least_common_supertypes,
    TypeEnvironment, TypeId, TypeKind, TypeSet,
};

/// The per-clause assignment of possible types to argument variables.
///
/// Every variable starts at the universal set: in the absence of
/// constraints an argument may be anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<TypeSet>,
}

impl Assignment {
    pub fn new(num_vars: usize) -> Self {
        Assignment {
            values: vec![TypeSet::all(); num_vars],
        }
    }

    pub fn get(&self, var: ArgId) -> &TypeSet {
        &self.values[var.0]
    }

    pub fn set(&mut self, var: ArgId, value: TypeSet) {
        self.values[var.0] = value;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<TypeSet> {
        self.values
    }
}

/// A single typing constraint over argument variables
#[derive(Debug, Clone)]
pub enum Constraint {
    /// `typeof(a) <: typeof(b)`
    SubtypeOfVar { a: ArgId, b: ArgId },
    /// `typeof(a) <: T`
    SubtypeOfType { a: ArgId, ty: TypeId },
    /// `typeof(a) :> T`; a seed that fires at most once so it cannot fight
    /// the narrowing done by subtype constraints
    SupertypeOfType { a: ArgId, ty: TypeId, applied: bool },
    /// `typeof(a) <: typeof(record)::index`; keeps `record` restricted to
    /// record types wide enough and projects field `index` into `a`
    FieldOf {
        a: ArgId,
        record: ArgId,
        index: usize,
    },
    /// `typeof(record)` is a record of exactly the given arity
    RecordArity { record: ArgId, arity: usize },
    /// `typeof(a)` is some record type
    IsRecord { a: ArgId },
}

impl Constraint {
    /// Narrow the assignment; returns whether anything changed
    pub fn update(&mut self, assignment: &mut Assignment, env: &TypeEnvironment) -> bool {
        match self {
            Constraint::SubtypeOfVar { a, b } => {
                let met =
                    greatest_common_subtypes_of_sets(env, assignment.get(*a), assignment.get(*b));
                if &met == assignment.get(*a) {
                    return false;
                }
                assignment.set(*a, met);
                true
            }

            Constraint::SubtypeOfType { a, ty } => {
                let current = assignment.get(*a);
                if current.is_all() {
                    assignment.set(*a, TypeSet::of(*ty));
                    return true;
                }
                let mut narrowed = TypeSet::new();
                for t in current.iter() {
                    narrowed.insert_set(&greatest_common_subtypes(env, t, *ty));
                }
                if &narrowed == current {
                    return false;
                }
                assignment.set(*a, narrowed);
                true
            }

            Constraint::SupertypeOfType { a, ty, applied } => {
                if *applied {
                    return false;
                }
                *applied = true;

                let current = assignment.get(*a);
                if current.is_all() {
                    assignment.set(*a, TypeSet::of(*ty));
                    return true;
                }
                let mut widened = TypeSet::new();
                for t in current.iter() {
                    widened.insert_set(&least_common_supertypes(env, t, *ty));
                }
                if &widened == current {
                    return false;
                }
                assignment.set(*a, widened);
                true
            }

            Constraint::FieldOf { a, record, index } => {
                let records = assignment.get(*record);
                // an unconstrained record tells us nothing yet
                if records.is_all() {
                    return false;
                }

                let mut kept_records = TypeSet::new();
                let mut fields = TypeSet::new();
                for t in records.iter() {
                    if let TypeKind::Record { fields: fs } = env.kind(t) {
                        if let Some(field) = fs.get(*index) {
                            kept_records.insert(t);
                            fields.insert(field.ty);
                        }
                    }
                }

                let narrowed = greatest_common_subtypes_of_sets(env, assignment.get(*a), &fields);

                let mut changed = false;
                if assignment.get(*record) != &kept_records {
                    assignment.set(*record, kept_records);
                    changed = true;
                }
                if assignment.get(*a) != &narrowed {
                    assignment.set(*a, narrowed);
                    changed = true;
                }
                changed
            }

            Constraint::RecordArity { record, arity } => {
                let current = assignment.get(*record);
                let narrowed: TypeSet = if current.is_all() {
                    env.all_types()
                        .filter(|&t| record_arity(env, t) == Some(*arity))
                        .collect()
                } else {
                    current
                        .iter()
                        .filter(|&t| record_arity(env, t) == Some(*arity))
                        .collect()
                };
                if &narrowed == assignment.get(*record) {
                    return false;
                }
                assignment.set(*record, narrowed);
                true
            }

            Constraint::IsRecord { a } => {
                let current = assignment.get(*a);
                let narrowed: TypeSet = if current.is_all() {
                    env.all_types()
                        .filter(|&t| matches!(env.kind(t), TypeKind::Record { .. }))
                        .collect()
                } else {
                    current
                        .iter()
                        .filter(|&t| matches!(env.kind(t), TypeKind::Record { .. }))
                        .collect()
                };
                if &narrowed == assignment.get(*a) {
                    return false;
                }
                assignment.set(*a, narrowed);
                true
            }
        }
    }
}

fn record_arity(env: &TypeEnvironment, ty: TypeId) -> Option<usize> {
    match env.kind(ty) {
        TypeKind::Record { fields } => Some(fields.len()),
        _ => None,
    }
}

/// Iterate all constraints in insertion order until a full sweep reports no
/// change
pub fn solve(constraints: &mut [Constraint], assignment: &mut Assignment, env: &TypeEnvironment) {
    loop {
        let mut changed = false;
        for constraint in constraints.iter_mut() {
            if constraint.update(assignment, env) {
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}
