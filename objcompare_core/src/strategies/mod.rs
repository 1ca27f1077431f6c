//! Built-in comparers, one per value shape.

mod dynamic;
mod enumerable;
mod flags;
mod keyed;
mod object;
mod value;

pub use dynamic::DynamicStrategy;
pub use enumerable::EnumerableStrategy;
pub use flags::FlagsStrategy;
pub use keyed::KeyedStrategy;
pub use object::ObjectStrategy;
pub use value::ValueStrategy;

use crate::inspect::{Shape, ShapeKind};
use crate::registry::ObjectComparer;
use objcompare_common::ObjCompareError;
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) fn builtin_strategies() -> HashMap<ShapeKind, Arc<dyn ObjectComparer>> {
    let enumerable: Arc<dyn ObjectComparer> = Arc::new(EnumerableStrategy);
    let keyed: Arc<dyn ObjectComparer> = Arc::new(KeyedStrategy);

    let mut strategies: HashMap<ShapeKind, Arc<dyn ObjectComparer>> = HashMap::new();
    strategies.insert(ShapeKind::Flags, Arc::new(FlagsStrategy));
    strategies.insert(ShapeKind::Array, Arc::clone(&enumerable));
    strategies.insert(ShapeKind::Collection, Arc::clone(&enumerable));
    strategies.insert(ShapeKind::Sequence, enumerable);
    strategies.insert(ShapeKind::Map, Arc::clone(&keyed));
    strategies.insert(ShapeKind::Expando, keyed);
    strategies.insert(ShapeKind::Object, Arc::new(ObjectStrategy));
    strategies.insert(ShapeKind::Dynamic, Arc::new(DynamicStrategy));
    strategies.insert(ShapeKind::Primitive, Arc::new(ValueStrategy));
    strategies
}

fn unexpected_shape(path: &str, expected: &str, a: &Shape<'_>, b: &Shape<'_>) -> ObjCompareError {
    ObjCompareError::UnexpectedShape {
        path: path.to_string(),
        expected: format!("{} (found {} and {})", expected, a.label(), b.label()),
    }
}
