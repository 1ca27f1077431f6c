use super::unexpected_shape;
use crate::base::{ComparisonContext, Operand};
use crate::registry::ObjectComparer;
use objcompare_common::{Difference, Result};

/// For types whose shape varies per value: dispatches on the runtime shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicStrategy;

impl ObjectComparer for DynamicStrategy {
    fn calculate_differences(
        &self,
        ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>> {
        match a.shape.kind() {
            Some(kind) => ctx
                .registry()
                .strategy(kind)
                .calculate_differences(ctx, path, a, b),
            None => Err(unexpected_shape(path, "a present value", &a.shape, &b.shape)),
        }
    }
}
