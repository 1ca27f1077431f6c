use super::unexpected_shape;
use crate::base::{compare_with, ComparisonContext, Operand};
use crate::inspect::{render_value, Member, Shape, ShapeKind, TypeDescriptor};
use crate::path::member_path;
use crate::policy::MemberInfo;
use crate::registry::ObjectComparer;
use objcompare_common::{Difference, ObjCompareError, Result};

/// Compares objects member by member, in declaration order.
///
/// Members excluded by the member policy are skipped, overridden members
/// go through their value comparer, and everything else recurses through
/// the registry. With `recursive_comparison` off, a nested object that
/// differs is reported as one `ValueMismatch` at its own path.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectStrategy;

impl ObjectComparer for ObjectStrategy {
    fn calculate_differences(
        &self,
        ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>> {
        let owner = a.value.descriptor();
        let (left, right) = match (a.shape, b.shape) {
            (Shape::Object(x), Shape::Object(y)) => (x, y),
            (x, y) => return Err(unexpected_shape(path, "an object", &x, &y)),
        };

        if left.len() != right.len() {
            return Err(ObjCompareError::MemberMismatch {
                path: path.to_string(),
                left: format!("{} members", left.len()),
                right: format!("{} members", right.len()),
            });
        }

        let mut differences = Vec::new();
        for (x, y) in left.iter().zip(right.iter()) {
            if x.name != y.name {
                return Err(ObjCompareError::MemberMismatch {
                    path: path.to_string(),
                    left: x.name.to_string(),
                    right: y.name.to_string(),
                });
            }
            differences.extend(compare_member(ctx, owner, &member_path(path, &x.name), x, y)?);
        }
        Ok(differences)
    }
}

/// Compares one member present on both sides, honouring the member policy.
pub(super) fn compare_member(
    ctx: &ComparisonContext<'_>,
    owner: TypeDescriptor,
    path: &str,
    x: &Member<'_>,
    y: &Member<'_>,
) -> Result<Vec<Difference>> {
    let info = MemberInfo {
        owner,
        name: &x.name,
        declared: x.declared,
    };
    let policy = ctx.member_policy();
    if !policy.include(&info) {
        return Ok(Vec::new());
    }
    if let Some(comparer) = policy.comparer_override(&info) {
        return compare_with(comparer.as_ref(), ctx.settings(), path, &*x.value, &*y.value);
    }

    let nested = ctx.compare(path, x.declared, &*x.value, &*y.value)?;
    if nested.is_empty()
        || ctx.settings().recursive_comparison
        || !is_complex(&x.value.shape())
        || !is_complex(&y.value.shape())
    {
        return Ok(nested);
    }

    Ok(vec![Difference::value_mismatch(
        path,
        render_value(&*x.value),
        render_value(&*y.value),
    )])
}

fn is_complex(shape: &Shape<'_>) -> bool {
    matches!(
        shape.kind(),
        Some(ShapeKind::Object | ShapeKind::Expando | ShapeKind::Map)
    )
}
