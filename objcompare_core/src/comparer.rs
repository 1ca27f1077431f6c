//! Entry points: [`ComparerBuilder`], [`ComparersFactory`] and the typed
//! [`Comparer`] they produce.

use crate::base::ComparisonContext;
use crate::inspect::{Inspect, ShapeKind, TypeDescriptor};
use crate::policy::{IncludeAllMembers, LayeredPolicy, MemberInfo, MemberPolicy, MemberRules};
use crate::registry::{ComparerRegistry, ObjectComparer};
use crate::value_comparers::ValueComparer;
use objcompare_common::{ComparisonSettings, Difference, ObjCompareError, Result};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Collects settings and registrations before freezing them into a
/// [`Comparer`].
#[derive(Default)]
pub struct ComparerBuilder {
    settings: ComparisonSettings,
    comparers: HashMap<TypeId, Arc<dyn ObjectComparer>>,
    shape_comparers: HashMap<ShapeKind, Arc<dyn ObjectComparer>>,
    type_overrides: HashMap<TypeId, Arc<dyn ValueComparer>>,
    rules: MemberRules,
    policy: Option<Arc<dyn MemberPolicy>>,
}

impl ComparerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(mut self, settings: ComparisonSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Use `comparer` for every value whose runtime type is `T`
    pub fn register_comparer<T: Inspect>(mut self, comparer: impl ObjectComparer + 'static) -> Self {
        self.comparers.insert(TypeId::of::<T>(), Arc::new(comparer));
        self
    }

    /// Use `comparer` for every type of shape `kind` without its own registration
    pub fn register_shape_comparer(
        mut self,
        kind: ShapeKind,
        comparer: impl ObjectComparer + 'static,
    ) -> Self {
        self.shape_comparers.insert(kind, Arc::new(comparer));
        self
    }

    /// Compare values of type `T` with a value comparer instead of recursing
    pub fn add_type_override<T: Inspect>(mut self, comparer: impl ValueComparer + 'static) -> Self {
        self.type_overrides.insert(TypeId::of::<T>(), Arc::new(comparer));
        self
    }

    /// Compare member `name` of `O` with `comparer`
    pub fn add_member_override<O: Inspect>(
        mut self,
        name: &str,
        comparer: impl ValueComparer + 'static,
    ) -> Self {
        self.rules
            .add_override(TypeId::of::<O>(), name, Arc::new(comparer));
        self
    }

    /// Compare every member called `name` with `comparer`, whatever its owner
    pub fn add_member_name_override(
        mut self,
        name: &str,
        comparer: impl ValueComparer + 'static,
    ) -> Self {
        self.rules.add_name_override(name, Arc::new(comparer));
        self
    }

    pub fn add_member_override_where<F>(
        mut self,
        filter: F,
        comparer: impl ValueComparer + 'static,
    ) -> Self
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.rules.add_override_where(filter, Arc::new(comparer));
        self
    }

    pub fn ignore_member<O: Inspect>(mut self, name: &str) -> Self {
        self.rules.ignore(TypeId::of::<O>(), name);
        self
    }

    pub fn ignore_member_name(mut self, name: &str) -> Self {
        self.rules.ignore_name(name);
        self
    }

    pub fn ignore_members_where<F>(mut self, filter: F) -> Self
    where
        F: Fn(&MemberInfo<'_>) -> bool + Send + Sync + 'static,
    {
        self.rules.ignore_where(filter);
        self
    }

    /// Consult `policy` in addition to the rules registered on this builder.
    /// Builder rules take precedence for overrides.
    pub fn with_member_policy(mut self, policy: impl MemberPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    pub fn build<T: Inspect>(self) -> Comparer<T> {
        let members: Arc<dyn MemberPolicy> = match (self.rules.is_empty(), self.policy) {
            (true, Some(custom)) => custom,
            (true, None) => Arc::new(IncludeAllMembers),
            (false, Some(custom)) => Arc::new(LayeredPolicy {
                first: Arc::new(self.rules),
                second: custom,
            }),
            (false, None) => Arc::new(self.rules),
        };

        debug!(
            "Building comparer for {} ({} comparers, {} shape comparers, {} type overrides)",
            T::type_descriptor().short_name(),
            self.comparers.len(),
            self.shape_comparers.len(),
            self.type_overrides.len()
        );

        Comparer {
            registry: Arc::new(ComparerRegistry::new(
                self.comparers,
                self.shape_comparers,
                self.type_overrides,
                members,
            )),
            settings: Arc::new(self.settings),
            _marker: PhantomData,
        }
    }
}

/// Produces comparers for root types.
///
/// Implementors customise comparers through [`configure`](Self::configure),
/// which sees every builder before it is frozen.
pub trait ComparersFactory {
    fn configure(&self, root: TypeDescriptor, builder: ComparerBuilder) -> ComparerBuilder {
        let _ = root;
        builder
    }

    fn objects_comparer<T: Inspect>(&self, settings: ComparisonSettings) -> Comparer<T>
    where
        Self: Sized,
    {
        let builder = ComparerBuilder::new().with_settings(settings);
        self.configure(T::type_descriptor(), builder).build()
    }
}

/// Factory without customisation
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultComparersFactory;

impl ComparersFactory for DefaultComparersFactory {}

/// Structural comparer for values of type `T`.
///
/// Cloning is cheap; clones share the registry and its resolution cache.
pub struct Comparer<T> {
    registry: Arc<ComparerRegistry>,
    settings: Arc<ComparisonSettings>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Inspect> Comparer<T> {
    pub fn new() -> Self {
        ComparerBuilder::new().build()
    }

    pub fn with_settings(settings: ComparisonSettings) -> Self {
        ComparerBuilder::new().with_settings(settings).build()
    }

    pub fn builder() -> ComparerBuilder {
        ComparerBuilder::new()
    }

    pub fn settings(&self) -> &ComparisonSettings {
        &self.settings
    }

    pub fn registry(&self) -> &ComparerRegistry {
        &self.registry
    }

    /// `true` when the two values have no differences
    pub fn compare(&self, a: &T, b: &T) -> Result<bool> {
        Ok(self.calculate_differences(a, b)?.is_empty())
    }

    pub fn compare_with_differences(&self, a: &T, b: &T) -> Result<(bool, Vec<Difference>)> {
        let differences = self.calculate_differences(a, b)?;
        Ok((differences.is_empty(), differences))
    }

    /// Every difference between `a` and `b`, in traversal order
    pub fn calculate_differences(&self, a: &T, b: &T) -> Result<Vec<Difference>> {
        self.run(a, b)
    }

    /// Like [`calculate_differences`](Self::calculate_differences) for
    /// type-erased values, which must both be `T` at runtime.
    pub fn calculate_differences_dyn(
        &self,
        a: &dyn Inspect,
        b: &dyn Inspect,
    ) -> Result<Vec<Difference>> {
        check_root::<T>(a)?;
        check_root::<T>(b)?;
        self.run(a, b)
    }

    pub fn compare_dyn(&self, a: &dyn Inspect, b: &dyn Inspect) -> Result<bool> {
        Ok(self.calculate_differences_dyn(a, b)?.is_empty())
    }

    fn run(&self, a: &dyn Inspect, b: &dyn Inspect) -> Result<Vec<Difference>> {
        let declared = T::type_descriptor();
        debug!("Comparing two {} values", declared.short_name());

        let ctx = ComparisonContext::new(&self.settings, &self.registry);
        let differences = ctx.compare("", declared, a, b)?;

        debug!(
            "Found {} differences between {} values",
            differences.len(),
            declared.short_name()
        );
        Ok(differences)
    }
}

fn check_root<T: Inspect>(value: &dyn Inspect) -> Result<()> {
    let declared = T::type_descriptor();
    if declared.kind == ShapeKind::Dynamic || value.descriptor().id == declared.id {
        return Ok(());
    }
    Err(ObjCompareError::IncompatibleTypes {
        expected: declared.short_name(),
        found: value.type_name().into_owned(),
    })
}

impl<T: Inspect> Default for Comparer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Comparer<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            settings: Arc::clone(&self.settings),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Comparer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparer")
            .field("settings", &self.settings)
            .field("resolved_types", &self.registry.cached_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_comparers::{DoNotCompareValueComparer, IgnoreCaseStringsValueComparer};
    use objcompare_common::DifferenceType;

    #[derive(Clone)]
    struct Address {
        city: String,
        zip: u32,
    }
    crate::inspect_struct!(Address { city as "City", zip as "Zip" });

    #[derive(Clone)]
    struct Customer {
        id: u64,
        name: String,
        address: Option<Address>,
        tags: Vec<String>,
    }
    crate::inspect_struct!(Customer {
        id as "Id",
        name as "Name",
        address as "Address",
        tags as "Tags",
    });

    fn customer() -> Customer {
        Customer {
            id: 1,
            name: "Ann".to_string(),
            address: Some(Address {
                city: "Oslo".to_string(),
                zip: 150,
            }),
            tags: vec!["a".to_string(), "b".to_string()],
        }
    }

    #[test]
    fn test_equal_values() {
        let comparer = Comparer::<Customer>::new();
        let a = customer();
        assert!(comparer.compare(&a, &a).unwrap());
        assert!(comparer.compare(&a, &a.clone()).unwrap());
    }

    #[test]
    fn test_single_leaf_difference() {
        let comparer = Comparer::<Customer>::new();
        let a = customer();
        let mut b = customer();
        if let Some(address) = b.address.as_mut() {
            address.city = "Bergen".to_string();
        }

        let (equal, differences) = comparer.compare_with_differences(&a, &b).unwrap();
        assert!(!equal);
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].member_path(), "Address.City");
        assert_eq!(differences[0].value1(), "Oslo");
        assert_eq!(differences[0].value2(), "Bergen");
        assert_eq!(differences[0].difference_type(), DifferenceType::ValueMismatch);
    }

    #[test]
    fn test_absent_nested_object() {
        let comparer = Comparer::<Customer>::new();
        let a = customer();
        let mut b = customer();
        b.address = None;

        let differences = comparer.calculate_differences(&a, &b).unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].member_path(), "Address");
        assert_eq!(differences[0].value1(), "Address");
        assert_eq!(differences[0].value2(), "");
    }

    #[test]
    fn test_idempotent() {
        let comparer = Comparer::<Customer>::new();
        let a = customer();
        let mut b = customer();
        b.tags.push("c".to_string());
        b.id = 2;

        let first = comparer.calculate_differences(&a, &b).unwrap();
        let second = comparer.calculate_differences(&a, &b).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_builder_overrides() {
        let comparer = Comparer::<Customer>::builder()
            .ignore_member::<Customer>("Id")
            .add_member_override::<Address>("City", IgnoreCaseStringsValueComparer)
            .add_type_override::<Vec<String>>(DoNotCompareValueComparer)
            .build::<Customer>();

        let a = customer();
        let mut b = customer();
        b.id = 99;
        b.tags.clear();
        if let Some(address) = b.address.as_mut() {
            address.city = "OSLO".to_string();
        }
        assert!(comparer.compare(&a, &b).unwrap());
    }

    struct SkipTags;

    impl MemberPolicy for SkipTags {
        fn include(&self, member: &MemberInfo<'_>) -> bool {
            member.name != "Tags"
        }
    }

    #[test]
    fn test_member_policy_with_and_without_rules() {
        let a = customer();
        let mut b = customer();
        b.tags.clear();

        let policy_only = Comparer::<Customer>::builder()
            .with_member_policy(SkipTags)
            .build::<Customer>();
        assert!(policy_only.compare(&a, &b).unwrap());

        b.id = 7;
        assert!(!policy_only.compare(&a, &b).unwrap());

        let layered = Comparer::<Customer>::builder()
            .ignore_member::<Customer>("Id")
            .with_member_policy(SkipTags)
            .build::<Customer>();
        assert!(layered.compare(&a, &b).unwrap());
    }

    #[test]
    fn test_dyn_root_rejects_other_types() {
        let comparer = Comparer::<Customer>::new();
        let a = customer();
        let err = comparer.calculate_differences_dyn(&a, &5i32).unwrap_err();
        assert!(matches!(err, ObjCompareError::IncompatibleTypes { .. }));
    }

    #[test]
    fn test_dynamic_root_reports_type_mismatch() {
        let comparer = Comparer::<Box<dyn Inspect>>::new();
        let a: Box<dyn Inspect> = Box::new(1i32);
        let b: Box<dyn Inspect> = Box::new("1".to_string());

        let differences = comparer.calculate_differences(&a, &b).unwrap();
        assert_eq!(differences.len(), 1);
        assert_eq!(differences[0].difference_type(), DifferenceType::TypeMismatch);
        assert_eq!(differences[0].value1(), "i32");
        assert_eq!(differences[0].value2(), "String");
    }

    #[test]
    fn test_factory_configure_hook() {
        struct IgnoreNames;

        impl ComparersFactory for IgnoreNames {
            fn configure(&self, _root: TypeDescriptor, builder: ComparerBuilder) -> ComparerBuilder {
                builder.ignore_member_name("Name")
            }
        }

        let comparer = IgnoreNames.objects_comparer::<Customer>(ComparisonSettings::default());
        let a = customer();
        let mut b = customer();
        b.name = "Bob".to_string();
        assert!(comparer.compare(&a, &b).unwrap());

        let plain = DefaultComparersFactory.objects_comparer::<Customer>(ComparisonSettings::default());
        assert!(!plain.compare(&a, &b).unwrap());
    }

    #[test]
    fn test_comparer_is_send_sync() {
        fn assert_send_sync<C: Send + Sync + Clone>() {}
        assert_send_sync::<Comparer<Customer>>();
    }
}
