use crate::base::{ComparisonContext, Operand};
use crate::inspect::{ShapeKind, TypeDescriptor};
use crate::policy::{IncludeAllMembers, MemberPolicy};
use crate::strategies::{builtin_strategies, ObjectStrategy};
use crate::value_comparers::ValueComparer;
use objcompare_common::{Difference, Result};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::trace;

/// Comparer responsible for every value of one type or shape.
///
/// Implementations hold no per-comparison state; intermediate results flow
/// through the returned differences only.
pub trait ObjectComparer: Send + Sync {
    fn calculate_differences(
        &self,
        ctx: &ComparisonContext<'_>,
        path: &str,
        a: Operand<'_>,
        b: Operand<'_>,
    ) -> Result<Vec<Difference>>;
}

/// Resolves the comparer responsible for a type.
///
/// Lookup order is exact registration, then the comparer for the type's
/// shape, then the object strategy. Resolutions are cached per type.
///
/// Registrations happen before construction; afterwards the registry is
/// only read, so comparisons may share it across threads.
pub struct ComparerRegistry {
    comparers: HashMap<TypeId, Arc<dyn ObjectComparer>>,
    strategies: HashMap<ShapeKind, Arc<dyn ObjectComparer>>,
    type_overrides: HashMap<TypeId, Arc<dyn ValueComparer>>,
    members: Arc<dyn MemberPolicy>,
    cache: RwLock<HashMap<TypeId, Arc<dyn ObjectComparer>>>,
}

impl ComparerRegistry {
    pub fn new(
        comparers: HashMap<TypeId, Arc<dyn ObjectComparer>>,
        shape_comparers: HashMap<ShapeKind, Arc<dyn ObjectComparer>>,
        type_overrides: HashMap<TypeId, Arc<dyn ValueComparer>>,
        members: Arc<dyn MemberPolicy>,
    ) -> Self {
        let mut strategies = builtin_strategies();
        strategies.extend(shape_comparers);

        Self {
            comparers,
            strategies,
            type_overrides,
            members,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Comparer for values whose runtime type is `descriptor`. Never fails.
    pub fn resolve(&self, descriptor: TypeDescriptor) -> Arc<dyn ObjectComparer> {
        let cached = self
            .cache
            .read()
            .ok()
            .and_then(|cache| cache.get(&descriptor.id).cloned());
        if let Some(comparer) = cached {
            trace!("Comparer cache hit for {}", descriptor.name);
            return comparer;
        }

        let comparer = match self.comparers.get(&descriptor.id) {
            Some(registered) => Arc::clone(registered),
            None => self.strategy(descriptor.kind),
        };
        trace!(
            "Resolved {:?} comparer for {}",
            descriptor.kind,
            descriptor.name
        );

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(descriptor.id, Arc::clone(&comparer));
        }
        comparer
    }

    /// Comparer registered for a shape, falling back to the object strategy
    pub fn strategy(&self, kind: ShapeKind) -> Arc<dyn ObjectComparer> {
        self.strategies
            .get(&kind)
            .or_else(|| self.strategies.get(&ShapeKind::Object))
            .cloned()
            .unwrap_or_else(|| Arc::new(ObjectStrategy))
    }

    pub fn type_override(&self, id: TypeId) -> Option<&dyn ValueComparer> {
        self.type_overrides.get(&id).map(|comparer| comparer.as_ref())
    }

    pub fn member_policy(&self) -> &dyn MemberPolicy {
        self.members.as_ref()
    }

    /// Number of types resolved so far
    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl Default for ComparerRegistry {
    fn default() -> Self {
        Self::new(
            HashMap::new(),
            HashMap::new(),
            HashMap::new(),
            Arc::new(IncludeAllMembers),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::Inspect;

    struct AlwaysDifferent;

    impl ObjectComparer for AlwaysDifferent {
        fn calculate_differences(
            &self,
            _ctx: &ComparisonContext<'_>,
            path: &str,
            _a: Operand<'_>,
            _b: Operand<'_>,
        ) -> Result<Vec<Difference>> {
            Ok(vec![Difference::value_mismatch(path, "a", "b")])
        }
    }

    #[test]
    fn test_resolve_caches_per_type() {
        let registry = ComparerRegistry::default();
        assert_eq!(registry.cached_len(), 0);

        let first = registry.resolve(i32::type_descriptor());
        let second = registry.resolve(i32::type_descriptor());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_len(), 1);

        registry.resolve(String::type_descriptor());
        assert_eq!(registry.cached_len(), 2);
    }

    #[test]
    fn test_exact_registration_wins() {
        let registered: Arc<dyn ObjectComparer> = Arc::new(AlwaysDifferent);
        let mut comparers = HashMap::new();
        comparers.insert(TypeId::of::<i32>(), Arc::clone(&registered));
        let registry = ComparerRegistry::new(
            comparers,
            HashMap::new(),
            HashMap::new(),
            Arc::new(IncludeAllMembers),
        );

        assert!(Arc::ptr_eq(&registry.resolve(i32::type_descriptor()), &registered));
        assert!(!Arc::ptr_eq(&registry.resolve(i64::type_descriptor()), &registered));
    }

    #[test]
    fn test_shape_registration_applies_to_all_types_of_that_shape() {
        let registered: Arc<dyn ObjectComparer> = Arc::new(AlwaysDifferent);
        let mut shapes = HashMap::new();
        shapes.insert(ShapeKind::Collection, Arc::clone(&registered));
        let registry = ComparerRegistry::new(
            HashMap::new(),
            shapes,
            HashMap::new(),
            Arc::new(IncludeAllMembers),
        );

        assert!(Arc::ptr_eq(
            &registry.resolve(Vec::<u8>::type_descriptor()),
            &registered
        ));
        assert!(Arc::ptr_eq(
            &registry.resolve(Vec::<String>::type_descriptor()),
            &registered
        ));
    }
}
