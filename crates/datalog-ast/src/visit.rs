//! Depth-first traversal
//!
//! The constraint solver and the instantiation pass both address argument
//! nodes by their depth-first position within a clause. Deep clones preserve
//! structure, so the index of an argument is stable across clones of the
//! same clause; [`ArgId`] is that index. All walkers here visit in the same
//! canonical pre-order: head atom, then body literals left to right, each
//! argument before its children.

use crate::arg::{Argument, ArgumentKind};
use crate::ast::{Atom, Clause, Literal};

/// Stable identity of an argument within one clause: its depth-first index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArgId(pub usize);

/// Visit every argument below `arg` in pre-order, including `arg` itself
pub fn for_each_argument<'a, F>(arg: &'a Argument, f: &mut F)
where
    F: FnMut(&'a Argument),
{
    f(arg);
    match &arg.kind {
        ArgumentKind::IntrinsicFunctor(_, args)
        | ArgumentKind::UserFunctor(_, args)
        | ArgumentKind::RecordInit { args, .. } => {
            for a in args {
                for_each_argument(a, f);
            }
        }
        ArgumentKind::SumInit { value, .. } | ArgumentKind::TypeCast { value, .. } => {
            for_each_argument(value, f);
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                for_each_argument(target, f);
            }
            for literal in body {
                for_each_argument_in_literal(literal, f);
            }
        }
        _ => {}
    }
}

fn for_each_argument_in_literal<'a, F>(literal: &'a Literal, f: &mut F)
where
    F: FnMut(&'a Argument),
{
    match literal {
        Literal::Positive(atom) | Literal::Negative(atom) => {
            for arg in &atom.args {
                for_each_argument(arg, f);
            }
        }
        Literal::Comparison(cmp) => {
            for_each_argument(&cmp.left, f);
            for_each_argument(&cmp.right, f);
        }
    }
}

/// Visit every argument of a clause in canonical pre-order
pub fn for_each_argument_in_clause<'a, F>(clause: &'a Clause, f: &mut F)
where
    F: FnMut(&'a Argument),
{
    for arg in &clause.head.args {
        for_each_argument(arg, f);
    }
    for literal in &clause.body {
        for_each_argument_in_literal(literal, f);
    }
}

/// Collect every argument of a clause in canonical pre-order; the position
/// of an argument in the result is its [`ArgId`]
pub fn index_arguments(clause: &Clause) -> Vec<&Argument> {
    let mut args = Vec::new();
    for_each_argument_in_clause(clause, &mut |arg| args.push(arg));
    args
}

fn for_each_argument_mut<F>(arg: &mut Argument, f: &mut F)
where
    F: FnMut(&mut Argument),
{
    f(arg);
    match &mut arg.kind {
        ArgumentKind::IntrinsicFunctor(_, args)
        | ArgumentKind::UserFunctor(_, args)
        | ArgumentKind::RecordInit { args, .. } => {
            for a in args {
                for_each_argument_mut(a, f);
            }
        }
        ArgumentKind::SumInit { value, .. } | ArgumentKind::TypeCast { value, .. } => {
            for_each_argument_mut(value, f);
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                for_each_argument_mut(target, f);
            }
            for literal in body {
                for_each_argument_in_literal_mut(literal, f);
            }
        }
        _ => {}
    }
}

fn for_each_argument_in_literal_mut<F>(literal: &mut Literal, f: &mut F)
where
    F: FnMut(&mut Argument),
{
    match literal {
        Literal::Positive(atom) | Literal::Negative(atom) => {
            for arg in &mut atom.args {
                for_each_argument_mut(arg, f);
            }
        }
        Literal::Comparison(cmp) => {
            for_each_argument_mut(&mut cmp.left, f);
            for_each_argument_mut(&mut cmp.right, f);
        }
    }
}

/// Rewrite every argument of a clause in place, in canonical pre-order
pub fn for_each_argument_in_clause_mut<F>(clause: &mut Clause, mut f: F)
where
    F: FnMut(&mut Argument),
{
    for arg in &mut clause.head.args {
        for_each_argument_mut(arg, &mut f);
    }
    for literal in &mut clause.body {
        for_each_argument_in_literal_mut(literal, &mut f);
    }
}

/// Visit every atom of a clause, including atoms nested in aggregator bodies
pub fn for_each_atom_in_clause<'a, F>(clause: &'a Clause, f: &mut F)
where
    F: FnMut(&'a Atom),
{
    f(&clause.head);
    for literal in &clause.body {
        for_each_atom_in_literal(literal, f);
    }
}

fn for_each_atom_in_literal<'a, F>(literal: &'a Literal, f: &mut F)
where
    F: FnMut(&'a Atom),
{
    match literal {
        Literal::Positive(atom) | Literal::Negative(atom) => {
            f(atom);
            for arg in &atom.args {
                for_each_atom_in_argument(arg, f);
            }
        }
        Literal::Comparison(cmp) => {
            for_each_atom_in_argument(&cmp.left, f);
            for_each_atom_in_argument(&cmp.right, f);
        }
    }
}

fn for_each_atom_in_argument<'a, F>(arg: &'a Argument, f: &mut F)
where
    F: FnMut(&'a Atom),
{
    match &arg.kind {
        ArgumentKind::IntrinsicFunctor(_, args)
        | ArgumentKind::UserFunctor(_, args)
        | ArgumentKind::RecordInit { args, .. } => {
            for a in args {
                for_each_atom_in_argument(a, f);
            }
        }
        ArgumentKind::SumInit { value, .. } | ArgumentKind::TypeCast { value, .. } => {
            for_each_atom_in_argument(value, f);
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                for_each_atom_in_argument(target, f);
            }
            for literal in body {
                for_each_atom_in_literal(literal, f);
            }
        }
        _ => {}
    }
}

/// Rewrite every atom of a clause in place, including atoms nested in
/// aggregator bodies
pub fn for_each_atom_in_clause_mut<F>(clause: &mut Clause, mut f: F)
where
    F: FnMut(&mut Atom),
{
    f(&mut clause.head);
    for literal in &mut clause.body {
        for_each_atom_in_literal_mut(literal, &mut f);
    }
}

fn for_each_atom_in_literal_mut<F>(literal: &mut Literal, f: &mut F)
where
    F: FnMut(&mut Atom),
{
    match literal {
        Literal::Positive(atom) | Literal::Negative(atom) => {
            f(atom);
            for arg in &mut atom.args {
                for_each_atom_in_argument_mut(arg, f);
            }
        }
        Literal::Comparison(cmp) => {
            for_each_atom_in_argument_mut(&mut cmp.left, f);
            for_each_atom_in_argument_mut(&mut cmp.right, f);
        }
    }
}

fn for_each_atom_in_argument_mut<F>(arg: &mut Argument, f: &mut F)
where
    F: FnMut(&mut Atom),
{
    match &mut arg.kind {
        ArgumentKind::IntrinsicFunctor(_, args)
        | ArgumentKind::UserFunctor(_, args)
        | ArgumentKind::RecordInit { args, .. } => {
            for a in args {
                for_each_atom_in_argument_mut(a, f);
            }
        }
        ArgumentKind::SumInit { value, .. } | ArgumentKind::TypeCast { value, .. } => {
            for_each_atom_in_argument_mut(value, f);
        }
        ArgumentKind::Aggregator { target, body, .. } => {
            if let Some(target) = target {
                for_each_atom_in_argument_mut(target, f);
            }
            for literal in body {
                for_each_atom_in_literal_mut(literal, f);
            }
        }
        _ => {}
    }
}

/// Rewrite every attribute of a relation in place
pub fn for_each_attribute_mut<F>(relation: &mut crate::ast::Relation, mut f: F)
where
    F: FnMut(&mut crate::ast::Attribute),
{
    for attr in &mut relation.attributes {
        f(attr);
    }
}
