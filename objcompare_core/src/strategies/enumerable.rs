use super::unexpected_shape;
use crate::base::{ComparisonContext, Operand};
use crate::inspect::{Items, Shape, ValueRef};
use crate::path::{count_path, index_path, length_path};
use crate::registry::ObjectComparer;
use objcompare_common::{Difference, DifferenceType, Result};

/// Compares arrays, collections and lazy sequences element by element.
///
/// When both sides know their size up front a mismatch is reported once at
/// `path.Length` (arrays) or `path.Count` (collections) and no element is
/// compared. Lazy sequences are walked in lock step; if one side ends early
/// both remainders are counted and a single `NumberOfElementsMismatch` at
/// `path` replaces any element differences found on the way.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnumerableStrategy;

impl ObjectComparer for EnumerableStrategy {
    fn calculate_differences(
        &self,
        ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>> {
        let (left, right, size_path) = match (a.shape, b.shape) {
            (Shape::Array(x), Shape::Array(y)) => (x, y, length_path(path)),
            (Shape::Array(x), Shape::Collection(y))
            | (Shape::Collection(x), Shape::Array(y) | Shape::Collection(y)) => {
                (x, y, count_path(path))
            }
            (
                Shape::Array(x) | Shape::Collection(x) | Shape::Sequence(x),
                Shape::Array(y) | Shape::Collection(y) | Shape::Sequence(y),
            ) => (x, y, path.to_string()),
            (x, y) => return Err(unexpected_shape(path, "an enumerable", &x, &y)),
        };

        if let (Some(len1), Some(len2)) = (left.len, right.len) {
            if len1 != len2 {
                return Ok(vec![Difference::value_mismatch(
                    size_path,
                    len1.to_string(),
                    len2.to_string(),
                )]);
            }
        }

        walk(ctx, path, left, right)
    }
}

fn walk(
    ctx: &ComparisonContext<'_>,
    path: &str,
    left: Items<'_>,
    right: Items<'_>,
) -> Result<Vec<Difference>> {
    let element = left.element;
    let mut left = left.iter;
    let mut right = right.iter;
    let mut differences = Vec::new();
    let mut index = 0;

    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => {
                differences.extend(ctx.compare(&index_path(path, index), element, &*x, &*y)?);
                index += 1;
            }
            (None, None) => return Ok(differences),
            (x, y) => {
                let count1 = index + remaining(x, left.as_mut());
                let count2 = index + remaining(y, right.as_mut());
                return Ok(vec![Difference::new(
                    path,
                    count1.to_string(),
                    count2.to_string(),
                    DifferenceType::NumberOfElementsMismatch,
                )]);
            }
        }
    }
}

/// Elements left on one side, counting the one already taken
fn remaining<'a>(
    taken: Option<ValueRef<'a>>,
    rest: &mut dyn Iterator<Item = ValueRef<'a>>,
) -> usize {
    match taken {
        Some(_) => 1 + rest.count(),
        None => 0,
    }
}
