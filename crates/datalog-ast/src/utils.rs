//! Utilities operating on AST constructs

use crate::arg::{Argument, ArgumentKind};
use crate::ast::{Atom, Clause, Literal, Program, Relation, Symbol};
use crate::visit::{for_each_argument_in_clause, for_each_atom_in_clause};

/// Collect the names of all named variables below the clause, in depth-first
/// order, duplicates included
pub fn variables(clause: &Clause) -> Vec<Symbol> {
    let mut vars = Vec::new();
    for_each_argument_in_clause(clause, &mut |arg| {
        if let ArgumentKind::Variable(name) = &arg.kind {
            vars.push(*name);
        }
    });
    vars
}

/// Collect all record initializers below the clause
pub fn record_inits(clause: &Clause) -> Vec<&Argument> {
    let mut inits = Vec::new();
    for_each_argument_in_clause(clause, &mut |arg| {
        if matches!(arg.kind, ArgumentKind::RecordInit { .. }) {
            inits.push(arg);
        }
    });
    inits
}

/// Collect all sum initializers below the clause
pub fn sum_inits(clause: &Clause) -> Vec<&Argument> {
    let mut inits = Vec::new();
    for_each_argument_in_clause(clause, &mut |arg| {
        if matches!(arg.kind, ArgumentKind::SumInit { .. }) {
            inits.push(arg);
        }
    });
    inits
}

/// The relation referenced by the given atom, if declared
pub fn atom_relation<'a>(atom: &Atom, program: &'a Program) -> Option<&'a Relation> {
    program.relation(&atom.name)
}

/// The relation referenced by the head of the given clause, if declared
pub fn head_relation<'a>(clause: &Clause, program: &'a Program) -> Option<&'a Relation> {
    atom_relation(&clause.head, program)
}

/// Whether the clause is a fact: a head with no body and no aggregates
pub fn is_fact(clause: &Clause) -> bool {
    if !clause.body.is_empty() {
        return false;
    }
    let mut has_aggregates = false;
    for arg in &clause.head.args {
        crate::visit::for_each_argument(arg, &mut |a| {
            if matches!(a.kind, ArgumentKind::Aggregator { .. }) {
                has_aggregates = true;
            }
        });
    }
    !has_aggregates
}

/// Whether the clause is a rule
pub fn is_rule(clause: &Clause) -> bool {
    !is_fact(clause)
}

/// Whether the clause's head relation appears in its own body
pub fn is_recursive_clause(clause: &Clause) -> bool {
    let head_name = &clause.head.name;
    let mut recursive = false;
    for_each_atom_in_clause(clause, &mut |atom| {
        if atom.name == *head_name && !std::ptr::eq(atom, &clause.head) {
            recursive = true;
        }
    });
    recursive
}

/// The number of a clause within its relation, used by provenance
/// instrumentation as a stable per-relation identifier.
///
/// Facts number 0; rules number 1.. in relation clause order, skipping facts.
/// Returns `None` when the clause's relation is unknown or the clause is not
/// attached to it.
pub fn clause_num(program: &Program, clause: &Clause) -> Option<usize> {
    let rel = head_relation(clause, program)?;

    let mut num = 1;
    for cur in &rel.clauses {
        let fact = is_fact(cur);
        if std::ptr::eq(cur, clause) || cur == clause {
            return Some(if fact { 0 } else { num });
        }
        if !fact {
            num += 1;
        }
    }
    None
}

/// The positive atoms of the clause body, in order
pub fn body_atoms(clause: &Clause) -> impl Iterator<Item = &Atom> {
    clause.body.iter().filter_map(|lit| match lit {
        Literal::Positive(atom) => Some(atom),
        _ => None,
    })
}

/// The negated atoms of the clause body, in order
pub fn body_negations(clause: &Clause) -> impl Iterator<Item = &Atom> {
    clause.body.iter().filter_map(|lit| match lit {
        Literal::Negative(atom) => Some(atom),
        _ => None,
    })
}

/// The binary constraints of the clause body, in order
pub fn body_comparisons(clause: &Clause) -> impl Iterator<Item = &crate::ast::Comparison> {
    clause.body.iter().filter_map(|lit| match lit {
        Literal::Comparison(cmp) => Some(cmp),
        _ => None,
    })
}

/// A clause containing only the head of the given clause
pub fn clone_head(clause: &Clause) -> Clause {
    Clause::new(clause.head.clone(), Vec::new(), clause.span)
}

/// Reorder the positive atoms of a clause body into the given order; all
/// other body literals keep their positions.
///
/// With atoms `[a, b, c]` and order `[1, 2, 0]`, the result's atoms read
/// `[b, c, a]`. The order must be a permutation of the atom positions.
pub fn reorder_atoms(clause: &Clause, new_order: &[usize]) -> Clause {
    let atom_positions: Vec<usize> = clause
        .body
        .iter()
        .enumerate()
        .filter_map(|(i, lit)| matches!(lit, Literal::Positive(_)).then_some(i))
        .collect();

    assert_eq!(new_order.len(), atom_positions.len());

    let mut result = clone_head(clause);
    let mut current_atom = 0;
    for literal in &clause.body {
        if matches!(literal, Literal::Positive(_)) {
            let source = atom_positions[new_order[current_atom]];
            current_atom += 1;
            result.body.push(clause.body[source].clone());
        } else {
            result.body.push(literal.clone());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::QualifiedName;
    use crate::span::Span;
    use internment::Intern;

    fn var(name: &str) -> Argument {
        Argument::new(
            ArgumentKind::Variable(Intern::new(name.to_string())),
            Span::none(),
        )
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

    fn fact(name: &str, args: Vec<Argument>) -> Clause {
        Clause::new(atom(name, args), Vec::new(), Span::none())
    }

    #[test]
    fn test_is_fact() {
        assert!(is_fact(&fact("r", vec![num(1)])));

        let rule = Clause::new(
            atom("r", vec![var("X")]),
            vec![Literal::Positive(atom("s", vec![var("X")]))],
            Span::none(),
        );
        assert!(!is_fact(&rule));
        assert!(is_rule(&rule));
    }

    #[test]
    fn test_recursive_clause() {
        let rule = Clause::new(
            atom("path", vec![var("X"), var("Z")]),
            vec![
                Literal::Positive(atom("edge", vec![var("X"), var("Y")])),
                Literal::Positive(atom("path", vec![var("Y"), var("Z")])),
            ],
            Span::none(),
        );
        assert!(is_recursive_clause(&rule));

        let base = Clause::new(
            atom("path", vec![var("X"), var("Y")]),
            vec![Literal::Positive(atom("edge", vec![var("X"), var("Y")]))],
            Span::none(),
        );
        assert!(!is_recursive_clause(&base));
    }

    #[test]
    fn test_clause_num_skips_facts() {
        let mut program = Program::new();
        let mut rel = crate::ast::Relation::new(QualifiedName::from("r"), Vec::new(), Span::none());

        let f1 = fact("r", vec![num(1)]);
        let rule = Clause::new(
            atom("r", vec![var("X")]),
            vec![Literal::Positive(atom("s", vec![var("X")]))],
            Span::none(),
        );
        let f2 = fact("r", vec![num(2)]);
        let rule2 = Clause::new(
            atom("r", vec![var("Y")]),
            vec![Literal::Positive(atom("t", vec![var("Y")]))],
            Span::none(),
        );

        rel.add_clause(f1.clone());
        rel.add_clause(rule.clone());
        rel.add_clause(f2.clone());
        rel.add_clause(rule2.clone());
        program.add_relation(rel);

        assert_eq!(clause_num(&program, &f1), Some(0));
        assert_eq!(clause_num(&program, &rule), Some(1));
        assert_eq!(clause_num(&program, &f2), Some(0));
        assert_eq!(clause_num(&program, &rule2), Some(2));
    }

    #[test]
    fn test_reorder_atoms() {
        let clause = Clause::new(
            atom("r", vec![var("X")]),
            vec![
                Literal::Positive(atom("a", Vec::new())),
                Literal::Negative(atom("n", Vec::new())),
                Literal::Positive(atom("b", Vec::new())),
                Literal::Positive(atom("c", Vec::new())),
            ],
            Span::none(),
        );

        let reordered = reorder_atoms(&clause, &[1, 2, 0]);
        let names: Vec<String> = reordered
            .body
            .iter()
            .map(|lit| match lit {
                Literal::Positive(a) => a.name.to_string(),
                Literal::Negative(a) => format!("!{}", a.name),
                Literal::Comparison(_) => "cmp".to_string(),
            })
            .collect();
        assert_eq!(names, vec!["b", "!n", "c", "a"]);
    }

    #[test]
    fn test_collect_initializers() {
        // r([1, nil], mk [2]).
        let rec = Argument::new(
            ArgumentKind::RecordInit {
                ty: None,
                args: vec![num(1), Argument::new(ArgumentKind::NilConstant, Span::none())],
            },
            Span::none(),
        );
        let sum = Argument::new(
            ArgumentKind::SumInit {
                ty: QualifiedName::from("S"),
                branch: Intern::new("mk".to_string()),
                value: Box::new(num(2)),
            },
            Span::none(),
        );
        let clause = fact("r", vec![rec, sum]);

        assert_eq!(record_inits(&clause).len(), 1);
        assert_eq!(sum_inits(&clause).len(), 1);
    }

    #[test]
    fn test_body_literal_accessors() {
        let clause = Clause::new(
            atom("r", vec![var("X")]),
            vec![
                Literal::Positive(atom("a", Vec::new())),
                Literal::Negative(atom("n", Vec::new())),
                Literal::Positive(atom("b", Vec::new())),
            ],
            Span::none(),
        );

        let positives: Vec<String> = body_atoms(&clause).map(|a| a.name.to_string()).collect();
        assert_eq!(positives, vec!["a", "b"]);

        let negatives: Vec<String> = body_negations(&clause).map(|a| a.name.to_string()).collect();
        assert_eq!(negatives, vec!["n"]);

        assert_eq!(body_comparisons(&clause).count(), 0);
    }

    #[test]
    fn test_variables_in_order() {
        let clause = Clause::new(
            atom("r", vec![var("X"), var("Y")]),
            vec![Literal::Positive(atom("s", vec![var("X")]))],
            Span::none(),
        );
        let vars = variables(&clause);
        let names: Vec<&str> = vars.iter().map(|s| s.as_str()).collect();
        assert_eq!(names, vec!["X", "Y", "X"]);
    }
}
