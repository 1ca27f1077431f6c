use crate::base::{ComparisonContext, Operand};
use crate::inspect::Shape;
use crate::registry::ObjectComparer;
use objcompare_common::{Difference, Result};

/// Scalar equality, with rendered text as the last resort
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueStrategy;

impl ObjectComparer for ValueStrategy {
    fn calculate_differences(
        &self,
        _ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>> {
        let (value1, value2) = (a.render(), b.render());
        let equal = match (&a.shape, &b.shape) {
            (Shape::Primitive(x), Shape::Primitive(y)) => x.same_value(y),
            _ => value1 == value2,
        };

        if equal {
            Ok(Vec::new())
        } else {
            Ok(vec![Difference::value_mismatch(path, value1, value2)])
        }
    }
}
