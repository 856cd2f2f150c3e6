//! Evaluation of an expression tree against borrowed records.
//!
//! Set operations work on positions in the caller's slice, never on
//! record values, so two structurally equal records stay distinct.

use super::parser::Expr;
use crate::record::Tagged;

/// Return the records matched by `expr`, reading tags from `field`.
///
/// Output keeps the input order for leaves and `!`; `&` follows the left
/// operand and `|` appends unseen right-hand records after the left ones.
///
/// Recursion depth equals tree depth; trees from [`super::parse`] are
/// bounded by [`super::MAX_DEPTH`].
pub fn evaluate<'a, R: Tagged>(expr: &Expr, records: &'a [R], field: &str) -> Vec<&'a R> {
    let positions = matching(expr, records, field);
    let mut matched = Vec::with_capacity(positions.len());
    for pos in positions {
        if let Some(record) = records.get(pos) {
            matched.push(record);
        }
    }
    matched
}

/// Positions in `records` matched by `expr`.
fn matching<R: Tagged>(expr: &Expr, records: &[R], field: &str) -> Vec<usize> {
    match expr {
        Expr::All => (0..records.len()).collect(),
        Expr::Tag(name) => records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.has_tag(field, name))
            .map(|(pos, _)| pos)
            .collect(),
        Expr::Not(inner) => {
            let excluded = matching(inner, records, field);
            (0..records.len())
                .filter(|pos| !excluded.contains(pos))
                .collect()
        }
        Expr::And(left, right) => intersect(
            matching(left, records, field),
            &matching(right, records, field),
        ),
        Expr::Or(left, right) => union(
            matching(left, records, field),
            matching(right, records, field),
        ),
        Expr::Group(inner) => matching(inner, records, field),
    }
}

/// One output element per (left, right) match.
fn intersect(left: Vec<usize>, right: &[usize]) -> Vec<usize> {
    let mut matched = Vec::new();
    for l in left {
        for r in right {
            if l == *r {
                matched.push(l);
            }
        }
    }
    matched
}

fn union(left: Vec<usize>, right: Vec<usize>) -> Vec<usize> {
    let mut merged = left;
    for r in right {
        if !merged.contains(&r) {
            merged.push(r);
        }
    }
    merged
}
