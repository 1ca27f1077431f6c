use super::unexpected_shape;
use crate::base::{ComparisonContext, Operand};
use crate::inspect::Shape;
use crate::registry::ObjectComparer;
use objcompare_common::{Difference, Result};

/// Flag sets are equal when their bits are; a mismatch is one difference at
/// the member itself, however many bits differ.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlagsStrategy;

impl ObjectComparer for FlagsStrategy {
    fn calculate_differences(
        &self,
        _ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>> {
        match (&a.shape, &b.shape) {
            (Shape::Flags(x), Shape::Flags(y)) if x.bits == y.bits => Ok(Vec::new()),
            (Shape::Flags(x), Shape::Flags(y)) => Ok(vec![Difference::value_mismatch(
                path,
                x.render(),
                y.render(),
            )]),
            (x, y) => Err(unexpected_shape(path, "flags", x, y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComparerRegistry;
    use objcompare_common::ComparisonSettings;

    bitflags::bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct Access: u8 {
            const READ = 1;
            const WRITE = 2;
            const EXEC = 4;
        }
    }
    crate::inspect_bitflags!(Access);

    fn diff(a: Access, b: Access) -> Vec<Difference> {
        let settings = ComparisonSettings::default();
        let registry = ComparerRegistry::default();
        let ctx = ComparisonContext::new(&settings, &registry);
        FlagsStrategy
            .calculate_differences(&ctx, "Access", Operand::new(&a), Operand::new(&b))
            .unwrap()
    }

    #[test]
    fn test_one_difference_for_many_bits() {
        let d = diff(Access::READ | Access::WRITE, Access::EXEC);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].member_path(), "Access");
        assert_eq!(d[0].value1(), "READ, WRITE");
        assert_eq!(d[0].value2(), "EXEC");
    }

    #[test]
    fn test_equal_bits() {
        assert!(diff(Access::READ | Access::EXEC, Access::EXEC | Access::READ).is_empty());
    }
}
