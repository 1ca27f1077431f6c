pub mod base;
pub mod comparer;
pub mod inspect;
#[cfg(feature = "json")]
pub mod json;
pub mod path;
pub mod policy;
pub mod registry;
pub mod strategies;
pub mod value_comparers;

pub use bitflags;
pub use objcompare_common::{
    ComparisonSettings, Difference, DifferenceType, ObjCompareError, Result,
};

pub use base::{compare_with, ComparisonContext, Operand};
pub use comparer::{Comparer, ComparerBuilder, ComparersFactory, DefaultComparersFactory};
pub use inspect::{
    render_value, AsAny, Enumerable, FlagSet, Inspect, Items, Member, Scalar, Shape, ShapeKind,
    TypeDescriptor, ValueRef,
};
pub use path::{count_path, index_path, key_path, length_path, member_path, short_type_name};
pub use policy::{IncludeAllMembers, MemberFilter, MemberInfo, MemberPolicy, MemberRules};
pub use registry::{ComparerRegistry, ObjectComparer};
pub use strategies::{
    DynamicStrategy, EnumerableStrategy, FlagsStrategy, KeyedStrategy, ObjectStrategy,
    ValueStrategy,
};
pub use value_comparers::{
    downcast, DefaultValueComparer, DefaultValueValueComparer, DoNotCompareValueComparer,
    DynamicValueComparer, IgnoreCaseStringsValueComparer, NullableStringsValueComparer,
    ToStringComparer, ValueComparer,
};
